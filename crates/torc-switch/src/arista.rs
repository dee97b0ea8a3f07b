// ── Arista eAPI device client ──
//
// Composes validation, the command model, and the response decoders
// behind the `SwitchClient` trait. One client per device; the session
// is held behind an RwLock so `refresh_connection` can swap it while
// reads are in flight on other operations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use torc_eapi::{Connector, EapiSession, Encoding, TextOutput};

use crate::client::{
    AssignPortChannelRequest, SwitchClient, UpdateBgpCommunityRequest, UpdateDescriptionRequest,
    UpdateModeRequest, UpdateNativeVlanRequest, UpdateTrunkGroupsRequest, UpdateVlanRequest,
};
use crate::command::{
    self, Command, render_batch,
};
use crate::error::SwitchError;
use crate::model::{
    IpMacInfo, LldpNeighbor, LldpPortNeighbor, MacAddressTableEntry, PortChannel,
    SwitchPortStatus, VlanWithTrunkGroups,
};
use crate::response::{
    self, ShowInterfacesDetail, ShowInterfacesPhy, ShowInterfacesStatus,
    ShowInterfacesSwitchport, ShowInterfacesVlans, ShowIpArp, ShowIpCommunityList,
    ShowLldpNeighbors, ShowMacAddressTable, ShowPortChannelDense, ShowVlan, ShowVlanTrunkGroup,
};
use crate::textvlan::parse_text_vlans;
use crate::validate;

/// Policy knobs for one device client.
#[derive(Debug, Clone)]
pub struct AristaConfig {
    /// Build and validate every mutating batch but skip the network
    /// submission. Used for dry runs and test safety.
    pub read_only: bool,
    pub allowed_vlan_ids: Vec<u16>,
    pub allowed_native_vlan_ids: Vec<u16>,
    pub allowed_modes: Vec<String>,
    /// Empty means any well-formed trunk group name is accepted.
    pub allowed_trunk_groups: Vec<String>,
    /// VLANs on which LLDP transmit stays enabled during provisioning.
    pub provisioning_vlan_ids: Vec<u16>,
    /// When switching a port to access mode, also clear trunk groups
    /// and the native VLAN left over from a previous trunk config.
    pub clear_on_access: bool,
}

impl Default for AristaConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            allowed_vlan_ids: Vec::new(),
            allowed_native_vlan_ids: Vec::new(),
            allowed_modes: vec!["access".to_string(), "trunk".to_string()],
            allowed_trunk_groups: Vec::new(),
            provisioning_vlan_ids: Vec::new(),
            clear_on_access: false,
        }
    }
}

/// eAPI client for one Arista top-of-rack switch.
#[derive(Debug)]
pub struct AristaClient {
    connector: Connector,
    session: RwLock<EapiSession>,
    config: AristaConfig,
}

fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T, SwitchError> {
    serde_json::from_value(value.clone())
        .map_err(|e| SwitchError::protocol(format!("could not decode {what}: {e}")))
}

fn text_output(value: &Value, what: &str) -> Result<String, SwitchError> {
    let payload: TextOutput = decode(value, what)?;
    Ok(payload.output)
}

/// Failures while establishing a session are connection errors, even
/// when the device rejected the liveness probe at the RPC layer.
fn connect_error(err: torc_eapi::Error) -> SwitchError {
    match err {
        torc_eapi::Error::Rpc { code, message } => SwitchError::Connection {
            message: format!("liveness probe rejected (eAPI error {code}): {message}"),
        },
        other => other.into(),
    }
}

impl AristaClient {
    /// Connect and validate the session, then build the client.
    pub async fn connect(connector: Connector, config: AristaConfig) -> Result<Self, SwitchError> {
        let session = connector.connect().await.map_err(connect_error)?;
        Ok(Self {
            connector,
            session: RwLock::new(session),
            config,
        })
    }

    pub fn config(&self) -> &AristaConfig {
        &self.config
    }

    async fn run(&self, batch: &[Command], encoding: Encoding) -> Result<Vec<Value>, torc_eapi::Error> {
        let session = self.session.read().await;
        session.run_commands(&render_batch(batch), encoding).await
    }

    async fn run_json(&self, batch: &[Command]) -> Result<Vec<Value>, SwitchError> {
        Ok(self.run(batch, Encoding::Json).await?)
    }

    async fn run_text(&self, batch: &[Command]) -> Result<Vec<Value>, SwitchError> {
        Ok(self.run(batch, Encoding::Text).await?)
    }

    /// Submit a mutating batch, honoring read-only mode.
    async fn submit(
        &self,
        operation: &'static str,
        batch: &[Command],
        encoding: Encoding,
    ) -> Result<(), SwitchError> {
        if self.config.read_only {
            debug!(host = %self.connector.host(), operation, "read-only mode, batch built but not submitted");
            return Ok(());
        }
        self.run(batch, encoding).await?;
        info!(host = %self.connector.host(), operation, "batch applied");
        Ok(())
    }

    async fn model_name(&self) -> String {
        self.session.read().await.model_name().to_string()
    }

    /// Fallback for firmware that rejects the structured VLAN-tagging
    /// query: status and switchport still come back as json, the VLAN
    /// table is fetched as text and parsed. No timestamps on this path.
    async fn switch_ports_via_text_vlans(
        &self,
    ) -> Result<BTreeMap<String, SwitchPortStatus>, SwitchError> {
        warn!(host = %self.connector.host(), "falling back to text encoding for interface VLANs");

        let results = self
            .run_json(&[Command::ShowInterfacesStatus, Command::ShowInterfacesSwitchport])
            .await?;
        let status: ShowInterfacesStatus = decode(&results[0], "show interfaces status")?;
        let switchports: ShowInterfacesSwitchport =
            decode(&results[1], "show interfaces switchport")?;

        let text_results = self.run_text(&[Command::ShowInterfacesVlans]).await?;
        let raw = text_output(&text_results[0], "show interfaces vlans (text)")?;
        let vlans = parse_text_vlans(&raw)?;

        Ok(response::build_switch_ports(&status, &vlans, &switchports))
    }
}

#[async_trait]
impl SwitchClient for AristaClient {
    fn host(&self) -> &str {
        self.connector.host()
    }

    async fn refresh_connection(&self) -> Result<(), SwitchError> {
        let fresh = self.connector.connect().await.map_err(connect_error)?;
        *self.session.write().await = fresh;
        info!(host = %self.connector.host(), "session refreshed");
        Ok(())
    }

    // ── Port configuration ──────────────────────────────────────────

    async fn update_vlan(&self, req: UpdateVlanRequest) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        validate::validate_vlan_value(req.vlan, &self.config.allowed_vlan_ids)?;

        // The VLAN must already exist in the device's VLAN table.
        let device_vlans = self.list_vlans().await?;
        if !device_vlans.iter().any(|v| v.vlan_id == req.vlan) {
            return Err(SwitchError::NotFound {
                message: format!("VLAN {} not present on the switch", req.vlan),
            });
        }

        let lldp_transmit = req
            .update_lldp
            .then(|| self.config.provisioning_vlan_ids.contains(&req.vlan));
        let batch = command::update_vlan_batch(&req.port, req.vlan, lldp_transmit);

        debug!(host = %self.connector.host(), port = %req.port, vlan = req.vlan, "updating access VLAN");
        self.submit("update_vlan", &batch, Encoding::Json).await
    }

    async fn update_mode(&self, req: UpdateModeRequest) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        validate::validate_mode_value(&req.mode, &self.config.allowed_modes)?;

        let batch = command::update_mode_batch(&req.port, &req.mode, self.config.clear_on_access)?;
        debug!(host = %self.connector.host(), port = %req.port, mode = %req.mode, "updating switchport mode");
        self.submit("update_mode", &batch, Encoding::Json).await
    }

    async fn update_description(&self, req: UpdateDescriptionRequest) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        let description = validate::validate_and_sanitize_description(&req.description)?;

        let batch = command::update_description_batch(&req.port, &description);
        self.submit("update_description", &batch, Encoding::Json)
            .await
    }

    async fn update_trunk_groups(
        &self,
        req: UpdateTrunkGroupsRequest,
    ) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        let mut groups: Vec<String> = req
            .trunk_groups
            .iter()
            .map(|g| g.trim().to_string())
            .collect();
        groups.sort();
        validate::validate_trunk_groups(&groups, &self.config.allowed_trunk_groups)?;

        let batch = command::update_trunk_groups_batch(&req.port, &groups);
        debug!(host = %self.connector.host(), port = %req.port, ?groups, "replacing trunk groups");
        self.submit("update_trunk_groups", &batch, Encoding::Json)
            .await
    }

    async fn update_native_vlan(&self, req: UpdateNativeVlanRequest) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        validate::validate_vlan_value(req.native_vlan, &self.config.allowed_native_vlan_ids)?;

        let batch = command::update_native_vlan_batch(&req.port, req.native_vlan);
        self.submit("update_native_vlan", &batch, Encoding::Json)
            .await
    }

    // ── BGP community policy ────────────────────────────────────────

    async fn update_bgp_community(
        &self,
        req: UpdateBgpCommunityRequest,
    ) -> Result<(), SwitchError> {
        validate::validate_bgp_community_value(req.community)?;
        validate::validate_bgp_community_group_name(&req.incoming_group_name)?;

        let batch = command::update_bgp_community_batch(req.community, &req.incoming_group_name);
        debug!(host = %self.connector.host(), community = req.community, group = %req.incoming_group_name, "updating BGP community");
        self.submit("update_bgp_community", &batch, Encoding::Json)
            .await
    }

    async fn get_bgp_community(&self, incoming_group_name: &str) -> Result<u32, SwitchError> {
        validate::validate_bgp_community_group_name(incoming_group_name)?;

        let results = self
            .run_json(&[Command::ShowIpCommunityList(incoming_group_name.to_string())])
            .await?;
        let doc: ShowIpCommunityList = decode(&results[0], "show ip community-list")?;
        response::community_value_for_group(&doc, incoming_group_name)
    }

    // ── Reads ───────────────────────────────────────────────────────

    async fn get_switch_ports(
        &self,
    ) -> Result<BTreeMap<String, SwitchPortStatus>, SwitchError> {
        let batch = [
            Command::ShowInterfacesStatus,
            Command::ShowInterfacesVlans,
            Command::ShowInterfacesSwitchport,
        ];
        let results = match self.run(&batch, Encoding::Json).await {
            Ok(results) => results,
            Err(err) if err.is_unconverted_command("show interfaces vlans") => {
                return self.switch_ports_via_text_vlans().await;
            }
            Err(err) => return Err(err.into()),
        };

        let status: ShowInterfacesStatus = decode(&results[0], "show interfaces status")?;
        let vlans: ShowInterfacesVlans = decode(&results[1], "show interfaces vlans")?;
        let switchports: ShowInterfacesSwitchport =
            decode(&results[2], "show interfaces switchport")?;

        let mut ports = response::build_switch_ports(&status, &vlans, &switchports);

        let mut ethernet_interfaces: Vec<String> = Vec::new();
        for name in ports.keys() {
            if !name.starts_with("Ethernet") {
                continue;
            }
            if validate::validate_port_value(name).is_err() {
                debug!(host = %self.connector.host(), port = %name, "ignoring interface with unexpected name");
                continue;
            }
            ethernet_interfaces.push(name.clone());
        }
        if ethernet_interfaces.is_empty() {
            return Ok(ports);
        }

        // Second, narrower batch for last-status-change timestamps.
        let range = validate::get_interface_range(&ethernet_interfaces)?;
        let detail_results = self
            .run_json(&[Command::ShowInterfacesRange(range.clone())])
            .await?;
        let detail: ShowInterfacesDetail =
            decode(&detail_results[0], "show interfaces detail")?;

        for name in &ethernet_interfaces {
            let entry = detail.interfaces.get(name).ok_or_else(|| {
                SwitchError::protocol(format!("no detailed response for interface {name}"))
            })?;
            if let Some(port) = ports.get_mut(name) {
                port.last_status_change_timestamp = entry.last_status_change_timestamp;
            }
        }
        Ok(ports)
    }

    async fn list_vlans(&self) -> Result<Vec<VlanWithTrunkGroups>, SwitchError> {
        let results = self
            .run_json(&[Command::ShowVlan, Command::ShowVlanTrunkGroup])
            .await?;
        let vlans: ShowVlan = decode(&results[0], "show vlan")?;
        let trunk_groups: ShowVlanTrunkGroup = decode(&results[1], "show vlan trunk group")?;
        response::build_vlans_with_trunk_groups(&vlans, &trunk_groups)
    }

    async fn get_mac_address_table(&self) -> Result<Vec<MacAddressTableEntry>, SwitchError> {
        let results = self
            .run_json(&[
                Command::Enable,
                Command::ShowMacAddressTableDynamic,
                Command::ShowPortChannelDense,
            ])
            .await?;
        let mac_table: ShowMacAddressTable = decode(&results[1], "show mac address-table")?;
        let port_channels: ShowPortChannelDense =
            decode(&results[2], "show port-channel dense")?;

        let model = self.model_name().await;
        response::build_mac_address_table(&mac_table, &port_channels, &model)
    }

    async fn get_ip_mac_info(&self) -> Result<Vec<IpMacInfo>, SwitchError> {
        // The physical port inventory decides the interface range for
        // the MAC-table query.
        let results = self
            .run_json(&[Command::Enable, Command::ShowInterfacesPhy])
            .await?;
        let phy: ShowInterfacesPhy = decode(&results[1], "show interfaces phy")?;

        let ethernet_interfaces: Vec<String> = phy
            .interface_phy_statuses
            .keys()
            .filter(|name| name.starts_with("Ethernet"))
            .cloned()
            .collect();
        if ethernet_interfaces.is_empty() {
            return Ok(Vec::new());
        }
        let range = validate::get_port_number_range(&ethernet_interfaces)?;

        let results = self
            .run_json(&[
                Command::Enable,
                Command::ShowIpArpVrfAll,
                Command::ShowMacAddressTableInterfaceRange(range),
                Command::ShowMacAddressTableDynamicPortChannels,
            ])
            .await?;
        let arp: ShowIpArp = decode(&results[1], "show ip arp vrf all")?;
        let ethernet_macs: ShowMacAddressTable =
            decode(&results[2], "show mac address-table interface")?;
        let channel_macs: ShowMacAddressTable =
            decode(&results[3], "show mac address-table dynamic interface")?;

        response::build_ip_mac_info(&arp, &ethernet_macs, &channel_macs)
    }

    async fn get_lldp_neighbors(&self) -> Result<Vec<LldpNeighbor>, SwitchError> {
        let results = self
            .run_json(&[Command::Enable, Command::ShowLldpNeighborsDetail])
            .await?;
        let doc: ShowLldpNeighbors = decode(&results[1], "show lldp neighbors")?;
        Ok(response::build_lldp_neighbors(&doc))
    }

    async fn get_lldp_port_neighbors(
        &self,
        port_number: &str,
    ) -> Result<Vec<LldpPortNeighbor>, SwitchError> {
        validate::validate_port_number(port_number)?;

        let results = self
            .run_json(&[
                Command::Enable,
                Command::ShowLldpPortNeighborsDetail(port_number.to_string()),
            ])
            .await?;
        let doc: ShowLldpNeighbors = decode(&results[1], "show lldp neighbors detail")?;
        Ok(response::build_lldp_port_neighbors(&doc))
    }

    async fn get_port_channels(&self) -> Result<BTreeMap<String, PortChannel>, SwitchError> {
        let results = self
            .run_json(&[Command::Enable, Command::ShowPortChannelDense])
            .await?;
        let doc: ShowPortChannelDense = decode(&results[1], "show port-channel dense")?;
        Ok(response::build_port_channels(&doc))
    }

    // ── Port-channel membership ─────────────────────────────────────

    async fn create_port_channel(&self, port_channel: u32) -> Result<(), SwitchError> {
        validate::validate_port_channel_number(port_channel)?;
        let batch = command::create_port_channel_batch(port_channel);
        self.submit("create_port_channel", &batch, Encoding::Json)
            .await
    }

    async fn delete_port_channel(&self, port_channel: u32) -> Result<(), SwitchError> {
        validate::validate_port_channel_number(port_channel)?;
        let batch = command::delete_port_channel_batch(port_channel);
        self.submit("delete_port_channel", &batch, Encoding::Json)
            .await
    }

    async fn assign_switch_port_to_port_channel(
        &self,
        req: AssignPortChannelRequest,
    ) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        validate::validate_port_channel_number(req.port_channel)?;

        let batch = command::assign_port_channel_batch(&req.port, req.port_channel);
        debug!(host = %self.connector.host(), port = %req.port, channel = req.port_channel, "assigning port to port-channel");
        self.submit("assign_switch_port_to_port_channel", &batch, Encoding::Json)
            .await
    }

    async fn remove_switch_port_from_port_channel(
        &self,
        port: &str,
    ) -> Result<(), SwitchError> {
        validate::validate_port_value(port)?;
        let batch = command::remove_port_channel_batch(port);
        self.submit("remove_switch_port_from_port_channel", &batch, Encoding::Json)
            .await
    }

    // ── Config lifecycle & maintenance ──────────────────────────────

    async fn get_running_config(&self) -> Result<String, SwitchError> {
        let results = self
            .run_text(&[Command::Enable, Command::ShowRunningConfig])
            .await?;
        text_output(&results[1], "show running-config")
    }

    async fn get_startup_config(&self) -> Result<String, SwitchError> {
        let results = self
            .run_text(&[Command::Enable, Command::ShowStartupConfig])
            .await?;
        text_output(&results[1], "show startup-config")
    }

    async fn get_port_running_config(&self, port: &str) -> Result<Vec<String>, SwitchError> {
        validate::validate_port_value(port)?;

        let results = self
            .run_text(&[
                Command::Enable,
                Command::ShowPortRunningConfig(port.to_string()),
            ])
            .await?;
        let stanza = text_output(&results[1], "show running-config interfaces")?;
        Ok(stanza
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn save_running_config_as_startup_config(&self) -> Result<(), SwitchError> {
        self.submit(
            "save_running_config_as_startup_config",
            &[Command::Enable, Command::SaveRunningConfig],
            Encoding::Text,
        )
        .await
    }

    async fn restore_running_config_from_startup_config(&self) -> Result<(), SwitchError> {
        self.submit(
            "restore_running_config_from_startup_config",
            &[Command::Enable, Command::RestoreStartupConfig],
            Encoding::Text,
        )
        .await
    }

    async fn reload(&self) -> Result<(), SwitchError> {
        self.submit(
            "reload",
            &[Command::Enable, Command::Reload],
            Encoding::Text,
        )
        .await
    }

    async fn clear_mac_address_table(&self) -> Result<(), SwitchError> {
        self.submit(
            "clear_mac_address_table",
            &[Command::Enable, Command::ClearMacAddressTableDynamic],
            Encoding::Text,
        )
        .await
    }
}
