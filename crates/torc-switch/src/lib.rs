// torc-switch: Top-of-rack switch configuration client over torc-eapi.

pub mod arista;
pub mod client;
pub mod command;
pub mod error;
pub mod model;
pub mod response;
pub mod sim;
pub mod textvlan;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use arista::{AristaClient, AristaConfig};
pub use client::{
    AssignPortChannelRequest, SwitchClient, UpdateBgpCommunityRequest, UpdateDescriptionRequest,
    UpdateModeRequest, UpdateNativeVlanRequest, UpdateTrunkGroupsRequest, UpdateVlanRequest,
};
pub use error::SwitchError;
pub use sim::SimClient;

// Re-export domain types at the crate root for ergonomics.
pub use model::{
    IpMacInfo, LacpState, LldpNeighbor, LldpPortNeighbor, MacAddressTableEntry, PortChannel,
    PortChannelMember, SwitchPortStatus, VlanWithTrunkGroups,
};
