// ── Simulation client ──
//
// In-memory stand-in for environments without hardware. Holds a
// per-interface map behind a mutex and sleeps a configurable latency
// per call to model device round-trip time. VLAN updates hold the lock
// across the latency window to model serialized device access; other
// operations sleep first and lock only for the state mutation.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::{
    AssignPortChannelRequest, SwitchClient, UpdateBgpCommunityRequest, UpdateDescriptionRequest,
    UpdateModeRequest, UpdateNativeVlanRequest, UpdateTrunkGroupsRequest, UpdateVlanRequest,
};
use crate::error::SwitchError;
use crate::model::{
    IpMacInfo, LldpNeighbor, LldpPortNeighbor, MacAddressTableEntry, PortChannel,
    SwitchPortStatus, VlanWithTrunkGroups,
};
use crate::validate;

const DEFAULT_LATENCY: Duration = Duration::from_millis(5);

#[derive(Debug, Clone)]
struct SimPort {
    vlan_id: u16,
    native_vlan: u16,
    mode: String,
    trunk_groups: Vec<String>,
    description: String,
}

impl Default for SimPort {
    fn default() -> Self {
        Self {
            vlan_id: 0,
            native_vlan: 0,
            mode: "access".to_string(),
            trunk_groups: Vec::new(),
            description: String::new(),
        }
    }
}

/// Deterministic in-memory implementation of [`SwitchClient`].
///
/// Port-channel, BGP-community, VLAN-table, MAC, and LLDP operations
/// are not modeled and return [`SwitchError::Unsupported`].
pub struct SimClient {
    host: String,
    latency: Duration,
    ports: Mutex<HashMap<String, SimPort>>,
}

impl SimClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            latency: DEFAULT_LATENCY,
            ports: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Pre-create interfaces so reads see them before any write.
    pub async fn seed_ports(&self, names: &[&str]) {
        let mut ports = self.ports.lock().await;
        for name in names {
            ports.entry((*name).to_string()).or_default();
        }
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(self.latency).await;
    }
}

fn unsupported(operation: &'static str) -> SwitchError {
    SwitchError::Unsupported { operation }
}

#[async_trait]
impl SwitchClient for SimClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn refresh_connection(&self) -> Result<(), SwitchError> {
        self.simulate_latency().await;
        Ok(())
    }

    // ── Port configuration ──────────────────────────────────────────

    async fn update_vlan(&self, req: UpdateVlanRequest) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;

        // Lock held across the latency window: VLAN moves on a real
        // device serialize on the config session.
        let mut ports = self.ports.lock().await;
        tokio::time::sleep(self.latency).await;
        let port = ports.entry(req.port.clone()).or_default();
        port.vlan_id = req.vlan;
        debug!(host = %self.host, port = %req.port, vlan = req.vlan, "sim: access VLAN set");
        Ok(())
    }

    async fn update_mode(&self, req: UpdateModeRequest) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        if req.mode != "access" && req.mode != "trunk" {
            return Err(SwitchError::validation(format!(
                "mode {} is not an allowed mode value",
                req.mode
            )));
        }
        self.simulate_latency().await;
        let mut ports = self.ports.lock().await;
        ports.entry(req.port).or_default().mode = req.mode;
        Ok(())
    }

    async fn update_description(&self, req: UpdateDescriptionRequest) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        let description = validate::validate_and_sanitize_description(&req.description)?;
        self.simulate_latency().await;
        let mut ports = self.ports.lock().await;
        ports.entry(req.port).or_default().description = description;
        Ok(())
    }

    async fn update_trunk_groups(
        &self,
        req: UpdateTrunkGroupsRequest,
    ) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        let mut groups = req.trunk_groups.clone();
        groups.sort();
        validate::validate_trunk_groups(&groups, &[])?;
        self.simulate_latency().await;
        let mut ports = self.ports.lock().await;
        ports.entry(req.port).or_default().trunk_groups = groups;
        Ok(())
    }

    async fn update_native_vlan(&self, req: UpdateNativeVlanRequest) -> Result<(), SwitchError> {
        validate::validate_port_value(&req.port)?;
        self.simulate_latency().await;
        let mut ports = self.ports.lock().await;
        ports.entry(req.port).or_default().native_vlan = req.native_vlan;
        Ok(())
    }

    // ── Operations not modeled by the simulation ────────────────────

    async fn update_bgp_community(
        &self,
        _req: UpdateBgpCommunityRequest,
    ) -> Result<(), SwitchError> {
        Err(unsupported("update_bgp_community: not implemented by sim client"))
    }

    async fn get_bgp_community(&self, _incoming_group_name: &str) -> Result<u32, SwitchError> {
        Err(unsupported("get_bgp_community: not implemented by sim client"))
    }

    async fn list_vlans(&self) -> Result<Vec<VlanWithTrunkGroups>, SwitchError> {
        Err(unsupported("list_vlans: not implemented by sim client"))
    }

    async fn get_mac_address_table(&self) -> Result<Vec<MacAddressTableEntry>, SwitchError> {
        Err(unsupported("get_mac_address_table: not implemented by sim client"))
    }

    async fn get_ip_mac_info(&self) -> Result<Vec<IpMacInfo>, SwitchError> {
        Err(unsupported("get_ip_mac_info: not implemented by sim client"))
    }

    async fn get_lldp_neighbors(&self) -> Result<Vec<LldpNeighbor>, SwitchError> {
        Err(unsupported("get_lldp_neighbors: not implemented by sim client"))
    }

    async fn get_lldp_port_neighbors(
        &self,
        _port_number: &str,
    ) -> Result<Vec<LldpPortNeighbor>, SwitchError> {
        Err(unsupported("get_lldp_port_neighbors: not implemented by sim client"))
    }

    async fn get_port_channels(&self) -> Result<BTreeMap<String, PortChannel>, SwitchError> {
        Err(unsupported("get_port_channels: not implemented by sim client"))
    }

    async fn create_port_channel(&self, _port_channel: u32) -> Result<(), SwitchError> {
        Err(unsupported("create_port_channel: not implemented by sim client"))
    }

    async fn delete_port_channel(&self, _port_channel: u32) -> Result<(), SwitchError> {
        Err(unsupported("delete_port_channel: not implemented by sim client"))
    }

    async fn assign_switch_port_to_port_channel(
        &self,
        _req: AssignPortChannelRequest,
    ) -> Result<(), SwitchError> {
        Err(unsupported(
            "assign_switch_port_to_port_channel: not implemented by sim client",
        ))
    }

    async fn remove_switch_port_from_port_channel(
        &self,
        _port: &str,
    ) -> Result<(), SwitchError> {
        Err(unsupported(
            "remove_switch_port_from_port_channel: not implemented by sim client",
        ))
    }

    // ── Reads over the simulated state ──────────────────────────────

    async fn get_switch_ports(
        &self,
    ) -> Result<BTreeMap<String, SwitchPortStatus>, SwitchError> {
        self.simulate_latency().await;
        let ports = self.ports.lock().await;

        let mut result = BTreeMap::new();
        for (name, port) in ports.iter() {
            let untagged_vlan = if port.mode == "trunk" {
                port.native_vlan
            } else {
                port.vlan_id
            };
            result.insert(
                name.clone(),
                SwitchPortStatus {
                    name: name.clone(),
                    vlan_id: port.vlan_id,
                    native_vlan: port.native_vlan,
                    untagged_vlan,
                    mode: port.mode.clone(),
                    trunk_groups: port.trunk_groups.clone(),
                    description: port.description.clone(),
                    link_status: "connected".to_string(),
                    line_protocol_status: "up".to_string(),
                    bandwidth: 25_000_000_000,
                    duplex: "duplexFull".to_string(),
                    interface_type: "25GBASE-CR".to_string(),
                    port_channel: 0,
                    last_status_change_timestamp: 0.0,
                },
            );
        }
        Ok(result)
    }

    async fn get_running_config(&self) -> Result<String, SwitchError> {
        self.simulate_latency().await;
        let ports = self.ports.lock().await;

        let mut names: Vec<&String> = ports.keys().collect();
        names.sort();

        let mut config = String::new();
        for name in names {
            let port = &ports[name];
            config.push_str(&format!("interface {name}\n"));
            if !port.description.is_empty() {
                config.push_str(&format!("   description {}\n", port.description));
            }
            config.push_str(&format!("   switchport mode {}\n", port.mode));
            if port.vlan_id != 0 {
                config.push_str(&format!("   switchport access vlan {}\n", port.vlan_id));
            }
            config.push_str("!\n");
        }
        Ok(config)
    }

    async fn get_startup_config(&self) -> Result<String, SwitchError> {
        self.get_running_config().await
    }

    async fn get_port_running_config(&self, port: &str) -> Result<Vec<String>, SwitchError> {
        validate::validate_port_value(port)?;
        self.simulate_latency().await;
        let ports = self.ports.lock().await;
        let entry = ports.get(port).ok_or_else(|| SwitchError::NotFound {
            message: format!("interface {port} not present in simulation"),
        })?;

        let mut lines = vec![format!("interface {port}")];
        if !entry.description.is_empty() {
            lines.push(format!("description {}", entry.description));
        }
        lines.push(format!("switchport mode {}", entry.mode));
        if entry.vlan_id != 0 {
            lines.push(format!("switchport access vlan {}", entry.vlan_id));
        }
        Ok(lines)
    }

    async fn save_running_config_as_startup_config(&self) -> Result<(), SwitchError> {
        self.simulate_latency().await;
        Ok(())
    }

    async fn restore_running_config_from_startup_config(&self) -> Result<(), SwitchError> {
        self.simulate_latency().await;
        Ok(())
    }

    async fn reload(&self) -> Result<(), SwitchError> {
        self.simulate_latency().await;
        Ok(())
    }

    async fn clear_mac_address_table(&self) -> Result<(), SwitchError> {
        self.simulate_latency().await;
        Ok(())
    }
}
