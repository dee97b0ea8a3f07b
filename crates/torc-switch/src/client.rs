// ── Capability trait ──
//
// The contract consumed by the orchestration layer. Two conformant
// implementations exist: `AristaClient` (hardware) and `SimClient`
// (in-memory). Callers hold `Arc<dyn SwitchClient>` and must not care
// which one they got.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::SwitchError;
use crate::model::{
    IpMacInfo, LldpNeighbor, LldpPortNeighbor, MacAddressTableEntry, PortChannel,
    SwitchPortStatus, VlanWithTrunkGroups,
};

/// Set a port's access VLAN. `update_lldp` additionally flips LLDP
/// transmit on the port: enabled when the VLAN is a provisioning VLAN,
/// disabled otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateVlanRequest {
    pub port: String,
    pub vlan: u16,
    pub update_lldp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateModeRequest {
    pub port: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDescriptionRequest {
    pub port: String,
    pub description: String,
}

/// Trunk groups may be given as a pre-split list or a comma-separated
/// string; the client splits, trims, and sorts either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTrunkGroupsRequest {
    pub port: String,
    pub trunk_groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNativeVlanRequest {
    pub port: String,
    pub native_vlan: u16,
}

/// Rewrites both directions of community policy: the advertised
/// community in the outbound route-map and the named incoming filter
/// group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBgpCommunityRequest {
    pub community: u32,
    pub incoming_group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignPortChannelRequest {
    pub port: String,
    pub port_channel: u32,
}

/// The full per-device operation surface.
///
/// Every mutating operation validates its input before anything is
/// sent, builds one command batch, and submits it as a single atomic
/// round trip. Retries are the caller's concern.
#[async_trait]
pub trait SwitchClient: Send + Sync {
    /// The device this client targets.
    fn host(&self) -> &str;

    /// Tear down and re-establish the session, re-reading credentials
    /// from the secrets file.
    async fn refresh_connection(&self) -> Result<(), SwitchError>;

    // ── Port configuration ──────────────────────────────────────────

    async fn update_vlan(&self, req: UpdateVlanRequest) -> Result<(), SwitchError>;
    async fn update_mode(&self, req: UpdateModeRequest) -> Result<(), SwitchError>;
    async fn update_description(&self, req: UpdateDescriptionRequest) -> Result<(), SwitchError>;
    async fn update_trunk_groups(&self, req: UpdateTrunkGroupsRequest)
        -> Result<(), SwitchError>;
    async fn update_native_vlan(&self, req: UpdateNativeVlanRequest) -> Result<(), SwitchError>;

    // ── BGP community policy ────────────────────────────────────────

    async fn update_bgp_community(
        &self,
        req: UpdateBgpCommunityRequest,
    ) -> Result<(), SwitchError>;
    async fn get_bgp_community(&self, incoming_group_name: &str) -> Result<u32, SwitchError>;

    // ── Reads ───────────────────────────────────────────────────────

    async fn get_switch_ports(&self) -> Result<BTreeMap<String, SwitchPortStatus>, SwitchError>;
    async fn list_vlans(&self) -> Result<Vec<VlanWithTrunkGroups>, SwitchError>;
    async fn get_mac_address_table(&self) -> Result<Vec<MacAddressTableEntry>, SwitchError>;
    /// Learned MACs joined with the ARP tables across all VRFs, so each
    /// entry carries the host's IPv4 address where one is known.
    async fn get_ip_mac_info(&self) -> Result<Vec<IpMacInfo>, SwitchError>;
    async fn get_lldp_neighbors(&self) -> Result<Vec<LldpNeighbor>, SwitchError>;
    /// `port_number` is the bare number form, e.g. `27/1`.
    async fn get_lldp_port_neighbors(
        &self,
        port_number: &str,
    ) -> Result<Vec<LldpPortNeighbor>, SwitchError>;
    async fn get_port_channels(&self) -> Result<BTreeMap<String, PortChannel>, SwitchError>;

    // ── Port-channel membership ─────────────────────────────────────

    async fn create_port_channel(&self, port_channel: u32) -> Result<(), SwitchError>;
    async fn delete_port_channel(&self, port_channel: u32) -> Result<(), SwitchError>;
    async fn assign_switch_port_to_port_channel(
        &self,
        req: AssignPortChannelRequest,
    ) -> Result<(), SwitchError>;
    async fn remove_switch_port_from_port_channel(&self, port: &str)
        -> Result<(), SwitchError>;

    // ── Config lifecycle & maintenance ──────────────────────────────

    async fn get_running_config(&self) -> Result<String, SwitchError>;
    async fn get_startup_config(&self) -> Result<String, SwitchError>;
    /// The config stanza for one interface, line by line.
    async fn get_port_running_config(&self, port: &str) -> Result<Vec<String>, SwitchError>;
    async fn save_running_config_as_startup_config(&self) -> Result<(), SwitchError>;
    async fn restore_running_config_from_startup_config(&self) -> Result<(), SwitchError>;
    async fn reload(&self) -> Result<(), SwitchError>;
    async fn clear_mac_address_table(&self) -> Result<(), SwitchError>;
}
