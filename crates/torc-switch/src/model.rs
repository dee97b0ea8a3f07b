// Canonical domain objects returned to callers. These are projections
// of device state, never round-tripped back to the device.

use std::collections::BTreeMap;

use serde::Serialize;

/// Full per-port view, reconciled from the status, VLAN-tagging, and
/// switchport-config queries (plus the detail query for timestamps).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SwitchPortStatus {
    /// Canonical long interface name, e.g. `Ethernet27/1`.
    pub name: String,
    /// Access VLAN (0 when none).
    pub vlan_id: u16,
    /// Native VLAN on a trunk port (0 when none).
    pub native_vlan: u16,
    /// The VLAN carried untagged: the access VLAN in access mode, the
    /// native VLAN in trunk mode.
    pub untagged_vlan: u16,
    /// `access`, `trunk`, `routed`, or `portchannel`.
    pub mode: String,
    /// Sorted trunk-group names.
    pub trunk_groups: Vec<String>,
    pub description: String,
    pub link_status: String,
    pub line_protocol_status: String,
    pub bandwidth: u64,
    pub duplex: String,
    pub interface_type: String,
    /// Owning port-channel number, 0 when the port is not a member.
    pub port_channel: u32,
    /// Seconds since the epoch of the last link-status change.
    pub last_status_change_timestamp: f64,
}

/// A device VLAN joined with its trunk-group memberships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VlanWithTrunkGroups {
    pub vlan_id: u16,
    pub name: String,
    pub status: String,
    pub dynamic: bool,
    /// Sorted alphabetically.
    pub interface_names: Vec<String>,
    /// Sorted alphabetically; empty when the VLAN belongs to no group.
    pub trunk_groups: Vec<String>,
}

/// LACP actor-state flags for one port-channel member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LacpState {
    pub activity: bool,
    pub timeout: bool,
    pub aggregation: bool,
    pub synchronization: bool,
    pub collecting: bool,
    pub distributing: bool,
}

/// One physical member of a port-channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortChannelMember {
    /// Device status text, e.g. `link-down`, `suspended`, `lacp-misconfig`.
    pub status: String,
    pub lacp_state: LacpState,
}

/// Read-only projection of one device port-channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortChannel {
    /// Canonical name, e.g. `Port-Channel24`.
    pub name: String,
    pub lacp_mode: String,
    pub protocol: String,
    pub link_state: String,
    /// Member-port name to member status, ordered by name.
    pub members: BTreeMap<String, PortChannelMember>,
}

/// One learned MAC address. Interfaces that are port-channel members
/// are remapped to the channel's interface name before this is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MacAddressTableEntry {
    pub interface: String,
    /// Colon-separated lowercase canonical form.
    pub mac_address: String,
    pub vlan_id: u16,
}

/// One learned MAC joined with the ARP tables across all VRFs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IpMacInfo {
    pub interface: String,
    /// IPv4 address resolved from the ARP tables; `None` when the MAC
    /// was never seen in any VRF.
    pub ip_address: Option<String>,
    /// Colon-separated lowercase canonical form.
    pub mac_address: String,
    pub vlan_id: u16,
}

/// Summary row from the switch-wide LLDP neighbor table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LldpNeighbor {
    pub port: String,
    pub neighbor_device: String,
    pub neighbor_port: String,
}

/// Detail record for one neighbor seen on one port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LldpPortNeighbor {
    pub port: String,
    pub chassis_id: String,
    /// Falls back to the management address when the neighbor does not
    /// advertise a system name.
    pub system_name: String,
    pub system_description: String,
    pub management_address: String,
    pub neighbor_interface_id: String,
    pub neighbor_interface_description: String,
    pub link_aggregation_status: String,
}
