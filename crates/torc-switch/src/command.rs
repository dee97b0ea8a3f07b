// ── Command model ──
//
// One `Command` variant per device CLI line. Mutating batches are
// assembled only by the fixed-shape builders below, which enforce the
// ordering invariants: `enable` first, `configure` second, and every
// per-interface command preceded by an interface selection scoped to
// exactly one interface. Callers never hand-assemble batches.

use crate::error::SwitchError;

/// A single renderable device command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Session / scope
    Enable,
    Configure,
    SelectInterface(String),
    SelectPortChannel(u32),
    Exit,

    // Switchport configuration
    AccessVlan(u16),
    NoAccessVlan,
    ModeAccess,
    ModeTrunk,
    TrunkGroup(String),
    NoTrunkGroup,
    TrunkNativeVlan(u16),
    NoTrunkNativeVlan,
    Description(String),
    LldpTransmit,
    NoLldpTransmit,

    // BGP community policy
    SelectAdvertiseRouteMap,
    NoSetCommunity,
    SetCommunity(u32),
    NoIpCommunityList(String),
    IpCommunityList { name: String, community: u32 },

    // Port-channel membership
    ChannelGroupActive(u32),
    LacpTimerFast,
    NoChannelGroup,
    NoInterfacePortChannel(u32),

    // Queries
    ShowVersion,
    ShowVlan,
    ShowVlanTrunkGroup,
    ShowInterfacesStatus,
    ShowInterfacesVlans,
    ShowInterfacesSwitchport,
    ShowInterfacesRange(String),
    ShowInterfacesPhy,
    ShowIpArpVrfAll,
    ShowMacAddressTableDynamic,
    /// `range` is the bare number form, e.g. `1/1-48/1`.
    ShowMacAddressTableInterfaceRange(String),
    ShowMacAddressTableDynamicPortChannels,
    ShowPortChannelDense,
    ShowLldpNeighborsDetail,
    ShowLldpPortNeighborsDetail(String),
    ShowIpCommunityList(String),
    ShowRunningConfig,
    ShowStartupConfig,
    ShowPortRunningConfig(String),

    // Config lifecycle / maintenance
    SaveRunningConfig,
    RestoreStartupConfig,
    Reload,
    ClearMacAddressTableDynamic,
}

impl Command {
    /// The device-facing CLI text for this command.
    pub fn render(&self) -> String {
        match self {
            Command::Enable => "enable".into(),
            Command::Configure => "configure".into(),
            Command::SelectInterface(port) => format!("interface {port}"),
            Command::SelectPortChannel(number) => format!("interface port-channel {number}"),
            Command::Exit => "exit".into(),

            Command::AccessVlan(vlan) => format!("switchport access vlan {vlan}"),
            Command::NoAccessVlan => "no switchport access vlan".into(),
            Command::ModeAccess => "switchport mode access".into(),
            Command::ModeTrunk => "switchport mode trunk".into(),
            Command::TrunkGroup(group) => format!("switchport trunk group {group}"),
            Command::NoTrunkGroup => "no switchport trunk group".into(),
            Command::TrunkNativeVlan(vlan) => format!("switchport trunk native vlan {vlan}"),
            Command::NoTrunkNativeVlan => "no switchport trunk native vlan".into(),
            Command::Description(text) => format!("description {text}"),
            Command::LldpTransmit => "lldp transmit".into(),
            Command::NoLldpTransmit => "no lldp transmit".into(),

            Command::SelectAdvertiseRouteMap => "route-map adv-set-comm permit 10".into(),
            Command::NoSetCommunity => "no set community".into(),
            Command::SetCommunity(value) => format!("set community 101:{value}"),
            Command::NoIpCommunityList(name) => format!("no ip community-list {name}"),
            Command::IpCommunityList { name, community } => {
                format!("ip community-list {name} permit 101:{community}")
            }

            Command::ChannelGroupActive(number) => format!("channel-group {number} mode active"),
            Command::LacpTimerFast => "lacp timer fast".into(),
            Command::NoChannelGroup => "no channel-group".into(),
            Command::NoInterfacePortChannel(number) => {
                format!("no interface port-channel {number}")
            }

            Command::ShowVersion => "show version".into(),
            Command::ShowVlan => "show vlan".into(),
            Command::ShowVlanTrunkGroup => "show vlan trunk group".into(),
            Command::ShowInterfacesStatus => "show interfaces status".into(),
            Command::ShowInterfacesVlans => "show interfaces vlans".into(),
            Command::ShowInterfacesSwitchport => "show interfaces switchport".into(),
            Command::ShowInterfacesRange(range) => format!("show interfaces {range}"),
            Command::ShowInterfacesPhy => "show interfaces phy".into(),
            Command::ShowIpArpVrfAll => "show ip arp vrf all".into(),
            Command::ShowMacAddressTableDynamic => "show mac address-table dynamic".into(),
            Command::ShowMacAddressTableInterfaceRange(range) => {
                format!("show mac address-table interface ethernet {range}")
            }
            Command::ShowMacAddressTableDynamicPortChannels => {
                "show mac address-table dynamic interface port-Channel 1-281".into()
            }
            Command::ShowPortChannelDense => "show port-channel dense".into(),
            Command::ShowLldpNeighborsDetail => "show lldp neighbors detail".into(),
            Command::ShowLldpPortNeighborsDetail(port_number) => {
                format!("show lldp neighbors ethernet {port_number} detail")
            }
            Command::ShowIpCommunityList(name) => format!("show ip community-list {name}"),
            Command::ShowRunningConfig => "show running-config".into(),
            Command::ShowStartupConfig => "show startup-config".into(),
            Command::ShowPortRunningConfig(port) => {
                format!("show running-config interfaces {port}")
            }

            Command::SaveRunningConfig => "copy running-config startup-config".into(),
            Command::RestoreStartupConfig => "configure replace startup-config".into(),
            Command::Reload => "reload".into(),
            Command::ClearMacAddressTableDynamic => "clear mac address-table dynamic".into(),
        }
    }
}

/// Render a batch to the wire form.
pub fn render_batch(batch: &[Command]) -> Vec<String> {
    batch.iter().map(Command::render).collect()
}

// ── Batch builders ──────────────────────────────────────────────────
//
// Inputs are assumed already validated; builders only encode shape.

fn interface_scope(port: &str) -> Vec<Command> {
    vec![
        Command::Enable,
        Command::Configure,
        Command::SelectInterface(port.to_string()),
    ]
}

/// `[enable, configure, interface, access vlan]`, optionally followed by
/// an LLDP transmit command whose polarity is decided by the caller.
pub fn update_vlan_batch(port: &str, vlan: u16, lldp_transmit: Option<bool>) -> Vec<Command> {
    let mut batch = interface_scope(port);
    batch.push(Command::AccessVlan(vlan));
    match lldp_transmit {
        Some(true) => batch.push(Command::LldpTransmit),
        Some(false) => batch.push(Command::NoLldpTransmit),
        None => {}
    }
    batch
}

/// Mode change. Trunk mode also drops the access VLAN. Access mode
/// optionally clears trunk groups and the native VLAN left behind by a
/// previous trunk configuration.
pub fn update_mode_batch(
    port: &str,
    mode: &str,
    clear_on_access: bool,
) -> Result<Vec<Command>, SwitchError> {
    let mut batch = interface_scope(port);
    match mode {
        "access" => {
            batch.push(Command::ModeAccess);
            if clear_on_access {
                batch.push(Command::NoTrunkGroup);
                batch.push(Command::NoTrunkNativeVlan);
            }
        }
        "trunk" => {
            batch.push(Command::ModeTrunk);
            batch.push(Command::NoAccessVlan);
        }
        other => {
            return Err(SwitchError::validation(format!(
                "mode {other} cannot be rendered as a command batch"
            )));
        }
    }
    Ok(batch)
}

pub fn update_description_batch(port: &str, description: &str) -> Vec<Command> {
    let mut batch = interface_scope(port);
    batch.push(Command::Description(description.to_string()));
    batch
}

/// Always clears before re-adding; there is no partial diff.
pub fn update_trunk_groups_batch(port: &str, trunk_groups: &[String]) -> Vec<Command> {
    let mut batch = interface_scope(port);
    batch.push(Command::NoTrunkGroup);
    for group in trunk_groups {
        batch.push(Command::TrunkGroup(group.clone()));
    }
    batch
}

pub fn update_native_vlan_batch(port: &str, vlan: u16) -> Vec<Command> {
    let mut batch = interface_scope(port);
    batch.push(Command::TrunkNativeVlan(vlan));
    batch
}

/// Route-map edit for the advertised community, then a full replace of
/// the incoming community-list filter. Order-significant.
pub fn update_bgp_community_batch(community: u32, group_name: &str) -> Vec<Command> {
    vec![
        Command::Enable,
        Command::Configure,
        Command::SelectAdvertiseRouteMap,
        Command::NoSetCommunity,
        Command::SetCommunity(community),
        Command::Exit,
        Command::NoIpCommunityList(group_name.to_string()),
        Command::IpCommunityList {
            name: group_name.to_string(),
            community,
        },
    ]
}

pub fn assign_port_channel_batch(port: &str, channel: u32) -> Vec<Command> {
    let mut batch = interface_scope(port);
    batch.push(Command::ChannelGroupActive(channel));
    batch.push(Command::LacpTimerFast);
    batch
}

pub fn remove_port_channel_batch(port: &str) -> Vec<Command> {
    let mut batch = interface_scope(port);
    batch.push(Command::NoChannelGroup);
    batch
}

pub fn create_port_channel_batch(number: u32) -> Vec<Command> {
    vec![
        Command::Enable,
        Command::Configure,
        Command::SelectPortChannel(number),
    ]
}

pub fn delete_port_channel_batch(number: u32) -> Vec<Command> {
    vec![
        Command::Enable,
        Command::Configure,
        Command::NoInterfacePortChannel(number),
    ]
}
