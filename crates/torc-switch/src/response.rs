// ── Response documents & domain mapping ──
//
// Typed deserialization targets for the structured (json-encoded)
// query results, plus the projection functions that turn them into the
// canonical domain objects in `model`. Decoding and projection are kept
// separate from the device client so both the structured path and the
// text fallback path feed the same projection code.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::SwitchError;
use crate::model::{
    IpMacInfo, LacpState, LldpNeighbor, LldpPortNeighbor, MacAddressTableEntry, PortChannel,
    PortChannelMember, SwitchPortStatus, VlanWithTrunkGroups,
};
use crate::validate::normalize_mac;

// ── show version ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowVersion {
    pub model_name: String,
    pub version: String,
    pub serial_number: String,
}

// ── show interfaces status ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowInterfacesStatus {
    pub interface_statuses: HashMap<String, InterfaceStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceStatus {
    pub bandwidth: u64,
    pub interface_type: String,
    pub description: String,
    pub auto_negotiate_active: bool,
    pub duplex: String,
    pub link_status: String,
    pub line_protocol_status: String,
    pub vlan_information: VlanInformation,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VlanInformation {
    pub interface_mode: String,
    pub vlan_id: u16,
    pub interface_forwarding_model: String,
    pub vlan_explanation: String,
}

// ── show interfaces vlans ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowInterfacesVlans {
    pub interfaces: HashMap<String, InterfaceVlans>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceVlans {
    pub untagged_vlan: u16,
    pub tagged_vlans: Vec<u16>,
}

// ── show interfaces switchport ──────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowInterfacesSwitchport {
    pub switchports: HashMap<String, SwitchportEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwitchportEntry {
    pub enabled: bool,
    pub switchport_info: SwitchportInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwitchportInfo {
    pub mode: String,
    pub access_vlan_id: u16,
    pub access_vlan_name: String,
    pub trunking_native_vlan_id: u16,
    pub trunking_native_vlan_name: String,
    pub trunk_allowed_vlans: String,
    pub static_trunk_groups: Vec<String>,
}

// ── show interfaces <range> ─────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowInterfacesDetail {
    pub interfaces: HashMap<String, InterfaceDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceDetail {
    pub name: String,
    pub last_status_change_timestamp: f64,
}

// ── show interfaces phy ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowInterfacesPhy {
    /// Only the key set matters here; the per-port PHY detail is opaque.
    pub interface_phy_statuses: HashMap<String, serde_json::Value>,
}

// ── show ip arp vrf all ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowIpArp {
    pub vrfs: HashMap<String, VrfArpTable>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VrfArpTable {
    pub ip_v4_neighbors: Vec<ArpNeighbor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArpNeighbor {
    pub address: String,
    pub hw_address: String,
    /// SVI plus egress, e.g. `Vlan100, Port-Channel24`.
    pub interface: String,
}

// ── show vlan / show vlan trunk group ───────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowVlan {
    pub vlans: HashMap<String, VlanEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VlanEntry {
    pub name: String,
    pub status: String,
    pub dynamic: bool,
    pub interfaces: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowVlanTrunkGroup {
    pub trunk_groups: HashMap<String, TrunkGroupNames>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrunkGroupNames {
    pub names: Vec<String>,
}

// ── show mac address-table dynamic ──────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowMacAddressTable {
    pub unicast_table: MacUnicastTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MacUnicastTable {
    pub table_entries: Vec<MacTableEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MacTableEntry {
    pub interface: String,
    pub mac_address: String,
    pub vlan_id: u16,
}

// ── show port-channel dense ─────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowPortChannelDense {
    pub number_of_aggregators: u32,
    pub number_of_channels_in_use: u32,
    pub port_channels: HashMap<String, PortChannelDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortChannelDoc {
    pub lacp_mode: String,
    pub protocol: String,
    pub link_state: String,
    pub ports: HashMap<String, PortChannelMemberDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortChannelMemberDoc {
    pub intf: String,
    pub lag_member: bool,
    pub link_down: bool,
    pub suspended: bool,
    pub lacp_misconfig: Option<LacpMisconfigDoc>,
    pub lacp_state: LacpStateDoc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LacpMisconfigDoc {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LacpStateDoc {
    pub activity: bool,
    pub timeout: bool,
    pub aggregation: bool,
    pub synchronization: bool,
    pub collecting: bool,
    pub distributing: bool,
}

// ── show lldp neighbors ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowLldpNeighbors {
    pub lldp_neighbors: HashMap<String, LldpPortInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LldpPortInfo {
    pub lldp_neighbor_info: Vec<LldpNeighborEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LldpNeighborEntry {
    pub system_name: String,
    pub system_description: String,
    pub chassis_id: String,
    pub management_addresses: Vec<ManagementAddress>,
    pub neighbor_interface_info: NeighborInterfaceInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementAddress {
    pub interface_num: u32,
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeighborInterfaceInfo {
    pub interface_id: String,
    pub interface_description: String,
    pub interface_id_type: String,
    #[serde(rename = "linkAggregation8023Status")]
    pub link_aggregation_status: String,
}

// ── show ip community-list ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowIpCommunityList {
    pub ip_community_lists: HashMap<String, CommunityList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityList {
    pub entries: Vec<CommunityListEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityListEntry {
    pub filter_type: String,
    pub list_type: String,
    pub community_values: Vec<String>,
}

// ── Projections ─────────────────────────────────────────────────────

static MEMBER_PORT_CHANNEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^in Po([0-9]+)$").unwrap());

const MODE_BRIDGED: &str = "bridged";
const MODE_INACTIVE: &str = "inactive";
const MODE_TRUNK: &str = "trunk";
const MODE_ROUTED: &str = "routed";

/// Reconcile the status, VLAN-tagging, and switchport-config documents
/// into per-port domain objects, keyed by interface name.
///
/// Mode precedence: a switchport entry wins outright; otherwise the
/// interface mode from the VLAN information decides (`routed`,
/// `bridged`/`inactive` as access, `trunk`).
pub fn build_switch_ports(
    status: &ShowInterfacesStatus,
    vlans: &ShowInterfacesVlans,
    switchports: &ShowInterfacesSwitchport,
) -> BTreeMap<String, SwitchPortStatus> {
    let mut ports = BTreeMap::new();

    for (name, interface) in &status.interface_statuses {
        let info = &interface.vlan_information;

        let port_channel = MEMBER_PORT_CHANNEL_REGEX
            .captures(&info.vlan_explanation)
            .and_then(|c| c[1].parse::<u32>().ok())
            .unwrap_or(0);

        let mut port = SwitchPortStatus {
            name: name.clone(),
            vlan_id: info.vlan_id,
            description: interface.description.clone(),
            link_status: interface.link_status.clone(),
            line_protocol_status: interface.line_protocol_status.clone(),
            bandwidth: interface.bandwidth,
            duplex: interface.duplex.clone(),
            interface_type: interface.interface_type.clone(),
            port_channel,
            ..SwitchPortStatus::default()
        };

        if let Some(entry) = switchports.switchports.get(name) {
            let mut trunk_groups = entry.switchport_info.static_trunk_groups.clone();
            trunk_groups.sort();
            port.trunk_groups = trunk_groups;
            port.native_vlan = entry.switchport_info.trunking_native_vlan_id;
            port.mode = entry.switchport_info.mode.clone();
        } else {
            port.mode = match info.interface_mode.as_str() {
                MODE_ROUTED => "routed".to_string(),
                MODE_BRIDGED | MODE_INACTIVE => "access".to_string(),
                MODE_TRUNK => "trunk".to_string(),
                other => other.to_string(),
            };
        }

        port.untagged_vlan = match vlans.interfaces.get(name) {
            Some(interface_vlans) => interface_vlans.untagged_vlan,
            None if port.mode == "trunk" => port.native_vlan,
            None => port.vlan_id,
        };

        ports.insert(name.clone(), port);
    }

    ports
}

/// Join `show vlan` with `show vlan trunk group` by numeric VLAN id.
/// A non-numeric id from the device is a hard error; a VLAN with no
/// trunk-group entry gets an empty list.
pub fn build_vlans_with_trunk_groups(
    vlans: &ShowVlan,
    trunk_groups: &ShowVlanTrunkGroup,
) -> Result<Vec<VlanWithTrunkGroups>, SwitchError> {
    let mut entries = Vec::with_capacity(vlans.vlans.len());

    for (vlan_id, info) in &vlans.vlans {
        let numeric_id: u16 = vlan_id.parse().map_err(|_| {
            SwitchError::protocol(format!("got non-integer vlanId from switch: {vlan_id}"))
        })?;

        let mut interface_names: Vec<String> = info.interfaces.keys().cloned().collect();
        interface_names.sort();

        let mut groups = trunk_groups
            .trunk_groups
            .get(vlan_id)
            .map(|g| g.names.clone())
            .unwrap_or_default();
        groups.sort();

        entries.push(VlanWithTrunkGroups {
            vlan_id: numeric_id,
            name: info.name.clone(),
            status: info.status.clone(),
            dynamic: info.dynamic,
            interface_names,
            trunk_groups: groups,
        });
    }

    entries.sort_by_key(|e| e.vlan_id);
    Ok(entries)
}

/// Port-channels whose learned MACs belong to the fabric uplink rather
/// than to tenant hosts, per hardware model.
fn uplink_exclusions(model_name: &str) -> Vec<&'static str> {
    let mut excluded = vec!["Vxlan1"];
    match model_name {
        "DCS-7050CX3-32" => excluded.push("Port-Channel33"),
        "DCS-7050SX3-48" => excluded.extend(["Port-Channel47", "Port-Channel551"]),
        "DCS-7010T" => excluded.push("Port-Channel49"),
        // CCS-720XP-96ZC2 has no fixed uplink channel; nothing extra.
        _ => {}
    }
    excluded
}

/// Project the MAC table: normalize addresses, drop entries on the
/// overlay pseudo-interface and model-specific uplink channels, and
/// remap member interfaces to their owning port-channel's name.
pub fn build_mac_address_table(
    mac_table: &ShowMacAddressTable,
    port_channels: &ShowPortChannelDense,
    model_name: &str,
) -> Result<Vec<MacAddressTableEntry>, SwitchError> {
    let excluded = uplink_exclusions(model_name);

    let mut member_to_channel: HashMap<&str, &str> = HashMap::new();
    for (channel_name, channel) in &port_channels.port_channels {
        for member in channel.ports.keys() {
            if member != "Peer" {
                member_to_channel.insert(member.as_str(), channel_name.as_str());
            }
        }
    }

    let mut entries = Vec::new();
    for entry in &mac_table.unicast_table.table_entries {
        let interface = member_to_channel
            .get(entry.interface.as_str())
            .map_or(entry.interface.as_str(), |channel| channel);

        if excluded.contains(&interface) {
            continue;
        }

        let mac_address = normalize_mac(&entry.mac_address).ok_or_else(|| {
            SwitchError::protocol(format!(
                "unrecognized MAC address format from switch: {}",
                entry.mac_address
            ))
        })?;

        entries.push(MacAddressTableEntry {
            interface: interface.to_string(),
            mac_address,
            vlan_id: entry.vlan_id,
        });
    }
    Ok(entries)
}

/// Join learned MAC entries with the ARP tables across all VRFs. The
/// MAC rows keep their interface and VLAN; the first ARP row whose
/// hardware address matches supplies the IP. Entries learned over the
/// overlay pseudo-interface are skipped on both sides, and ARP rows
/// must carry an `SVI, egress` interface pair to count as local.
pub fn build_ip_mac_info(
    arp: &ShowIpArp,
    ethernet_macs: &ShowMacAddressTable,
    channel_macs: &ShowMacAddressTable,
) -> Result<Vec<IpMacInfo>, SwitchError> {
    let mut arp_by_mac: HashMap<String, String> = HashMap::new();
    for vrf in arp.vrfs.values() {
        for neighbor in &vrf.ip_v4_neighbors {
            let parts: Vec<&str> = neighbor.interface.split(',').map(str::trim).collect();
            if parts.len() != 2 || parts.contains(&"Vxlan1") {
                continue;
            }
            let vlan_is_numeric = parts[0]
                .strip_prefix("Vlan")
                .is_some_and(|v| v.parse::<u16>().is_ok());
            if !vlan_is_numeric {
                continue;
            }
            // Malformed hardware addresses drop the ARP row, not the op.
            if let Some(mac) = normalize_mac(&neighbor.hw_address) {
                arp_by_mac.entry(mac).or_insert_with(|| neighbor.address.clone());
            }
        }
    }

    let all_macs = ethernet_macs
        .unicast_table
        .table_entries
        .iter()
        .chain(&channel_macs.unicast_table.table_entries);

    let mut entries = Vec::new();
    for entry in all_macs {
        if entry.interface == "Vxlan1" {
            continue;
        }
        let mac_address = normalize_mac(&entry.mac_address).ok_or_else(|| {
            SwitchError::protocol(format!(
                "unrecognized MAC address format from switch: {}",
                entry.mac_address
            ))
        })?;
        entries.push(IpMacInfo {
            interface: entry.interface.clone(),
            ip_address: arp_by_mac.get(&mac_address).cloned(),
            mac_address,
            vlan_id: entry.vlan_id,
        });
    }
    Ok(entries)
}

fn member_status(member: &PortChannelMemberDoc) -> String {
    if member.link_down {
        return "link-down".to_string();
    }
    if member.suspended {
        return "suspended".to_string();
    }
    if let Some(misconfig) = &member.lacp_misconfig {
        if !misconfig.status.is_empty() && misconfig.status != "ok" {
            return "lacp-misconfig".to_string();
        }
    }
    "up".to_string()
}

/// Project `show port-channel dense` into domain port-channels keyed
/// by canonical channel name.
pub fn build_port_channels(doc: &ShowPortChannelDense) -> BTreeMap<String, PortChannel> {
    let mut channels = BTreeMap::new();
    for (name, channel) in &doc.port_channels {
        let mut members = BTreeMap::new();
        for (member_name, member) in &channel.ports {
            if member_name == "Peer" {
                continue;
            }
            members.insert(
                member_name.clone(),
                PortChannelMember {
                    status: member_status(member),
                    lacp_state: LacpState {
                        activity: member.lacp_state.activity,
                        timeout: member.lacp_state.timeout,
                        aggregation: member.lacp_state.aggregation,
                        synchronization: member.lacp_state.synchronization,
                        collecting: member.lacp_state.collecting,
                        distributing: member.lacp_state.distributing,
                    },
                },
            );
        }
        channels.insert(
            name.clone(),
            PortChannel {
                name: name.clone(),
                lacp_mode: channel.lacp_mode.clone(),
                protocol: channel.protocol.clone(),
                link_state: channel.link_state.clone(),
                members,
            },
        );
    }
    channels
}

/// Summary rows from the switch-wide neighbor table; ports with no
/// neighbors are omitted.
pub fn build_lldp_neighbors(doc: &ShowLldpNeighbors) -> Vec<LldpNeighbor> {
    let mut neighbors = Vec::new();
    for (port, info) in &doc.lldp_neighbors {
        for entry in &info.lldp_neighbor_info {
            neighbors.push(LldpNeighbor {
                port: port.clone(),
                neighbor_device: entry.system_name.clone(),
                neighbor_port: entry.neighbor_interface_info.interface_id.clone(),
            });
        }
    }
    neighbors.sort_by(|a, b| a.port.cmp(&b.port));
    neighbors
}

/// Detail rows for one port's neighbors.
pub fn build_lldp_port_neighbors(doc: &ShowLldpNeighbors) -> Vec<LldpPortNeighbor> {
    let mut neighbors = Vec::new();
    for (port, info) in &doc.lldp_neighbors {
        for entry in &info.lldp_neighbor_info {
            let management_address = entry
                .management_addresses
                .first()
                .map(|a| a.address.clone())
                .unwrap_or_default();
            let system_name = if entry.system_name.is_empty() {
                management_address.clone()
            } else {
                entry.system_name.clone()
            };
            neighbors.push(LldpPortNeighbor {
                port: port.clone(),
                chassis_id: entry.chassis_id.clone(),
                system_name,
                system_description: entry.system_description.clone(),
                management_address,
                neighbor_interface_id: entry.neighbor_interface_info.interface_id.clone(),
                neighbor_interface_description: entry
                    .neighbor_interface_info
                    .interface_description
                    .clone(),
                link_aggregation_status: entry
                    .neighbor_interface_info
                    .link_aggregation_status
                    .clone(),
            });
        }
    }
    neighbors
}

/// Extract the single configured community value for one filter group.
/// The group must exist and hold exactly one entry with exactly one
/// `101:<n>` value.
pub fn community_value_for_group(
    doc: &ShowIpCommunityList,
    group_name: &str,
) -> Result<u32, SwitchError> {
    let group = doc.ip_community_lists.get(group_name).ok_or_else(|| {
        SwitchError::NotFound {
            message: format!("community group {group_name} not present on switch"),
        }
    })?;

    if group.entries.len() != 1 {
        return Err(SwitchError::protocol(format!(
            "community group {group_name} did not have exactly one entry"
        )));
    }
    let entry = &group.entries[0];
    if entry.community_values.len() != 1 {
        return Err(SwitchError::protocol(format!(
            "community group {group_name} did not have exactly one community value"
        )));
    }
    crate::validate::bgp_community_string_to_value(&entry.community_values[0])
}
