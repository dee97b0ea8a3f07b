// Integration tests for `AristaClient` against a wiremock eAPI endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use torc_eapi::{Connector, TransportConfig};
use torc_switch::{
    AristaClient, AristaConfig, SwitchClient, SwitchError, UpdateDescriptionRequest,
    UpdateVlanRequest,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn write_secrets(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("switch-secrets.yaml");
    std::fs::write(
        &path,
        "credentials:\n  username: admin\n  password: hunter2\n",
    )
    .unwrap();
    path
}

fn rpc_result(results: serde_json::Value) -> serde_json::Value {
    json!({ "jsonrpc": "2.0", "id": "torc-eapi-1", "result": results })
}

async fn mount_probe(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/command-api"))
        .and(body_partial_json(json!({ "params": { "cmds": ["show version"] } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            { "modelName": "DCS-7050CX3-32", "version": "4.28.1F" }
        ]))))
        .mount(server)
        .await;
}

async fn connect_client(
    server: &MockServer,
    config: AristaConfig,
) -> (AristaClient, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir);
    let uri = url::Url::parse(&server.uri()).unwrap();
    let connector = Connector::new(
        uri.host_str().unwrap(),
        uri.port().unwrap(),
        &secrets,
        TransportConfig::default(),
        Duration::from_secs(5),
    )
    .with_scheme("http");

    let client = AristaClient::connect(connector, config).await.unwrap();
    (client, dir)
}

fn status_result() -> serde_json::Value {
    json!({
        "interfaceStatuses": {
            "Ethernet1": {
                "bandwidth": 25_000_000_000u64,
                "interfaceType": "25GBASE-CR",
                "description": "host-1",
                "duplex": "duplexFull",
                "linkStatus": "connected",
                "lineProtocolStatus": "up",
                "vlanInformation": {
                    "interfaceMode": "bridged", "vlanId": 100, "vlanExplanation": ""
                }
            },
            "Ethernet2": {
                "bandwidth": 25_000_000_000u64,
                "linkStatus": "connected",
                "lineProtocolStatus": "up",
                "vlanInformation": {
                    "interfaceMode": "trunk", "vlanId": 0, "vlanExplanation": ""
                }
            }
        }
    })
}

fn switchports_result() -> serde_json::Value {
    json!({
        "switchports": {
            "Ethernet2": {
                "enabled": true,
                "switchportInfo": {
                    "mode": "trunk",
                    "accessVlanId": 1,
                    "trunkingNativeVlanId": 55,
                    "staticTrunkGroups": ["Tenant_Nets", "Provider_Nets"]
                }
            }
        }
    })
}

// ── get_switch_ports ────────────────────────────────────────────────

#[tokio::test]
async fn get_switch_ports_merges_documents_and_timestamps() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show interfaces status", "show interfaces vlans", "show interfaces switchport"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            status_result(),
            { "interfaces": { "Ethernet1": { "untaggedVlan": 100, "taggedVlans": [] } } },
            switchports_result()
        ]))))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show interfaces Ethernet1-Ethernet2"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            { "interfaces": {
                "Ethernet1": { "name": "Ethernet1", "lastStatusChangeTimestamp": 1723000000.5 },
                "Ethernet2": { "name": "Ethernet2", "lastStatusChangeTimestamp": 1723000001.0 }
            }}
        ]))))
        .mount(&server)
        .await;

    let (client, _dir) = connect_client(&server, AristaConfig::default()).await;
    let ports = client.get_switch_ports().await.unwrap();

    let eth1 = &ports["Ethernet1"];
    assert_eq!(eth1.mode, "access");
    assert_eq!(eth1.vlan_id, 100);
    assert_eq!(eth1.untagged_vlan, 100);
    assert_eq!(eth1.last_status_change_timestamp, 1723000000.5);

    let eth2 = &ports["Ethernet2"];
    assert_eq!(eth2.mode, "trunk");
    assert_eq!(eth2.native_vlan, 55);
    assert_eq!(
        eth2.trunk_groups,
        vec!["Provider_Nets".to_string(), "Tenant_Nets".to_string()]
    );
}

#[tokio::test]
async fn get_switch_ports_falls_back_to_text_vlans() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    // Structured three-query batch is rejected by old firmware.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show interfaces status", "show interfaces vlans", "show interfaces switchport"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "torc-eapi-1",
            "error": {
                "code": 1003,
                "message": "CLI command 2 of 3 'show interfaces vlans' failed: unconverted command"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show interfaces status", "show interfaces switchport"
        ], "format": "json" }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            status_result(),
            switchports_result()
        ]))))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show interfaces vlans"
        ], "format": "text" }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            { "output": "Port       Untagged Tagged\nEt1        100      -\nEt2        None     200-201,\n300\n" }
        ]))))
        .mount(&server)
        .await;

    let (client, _dir) = connect_client(&server, AristaConfig::default()).await;
    let ports = client.get_switch_ports().await.unwrap();

    assert_eq!(ports["Ethernet1"].untagged_vlan, 100);
    assert_eq!(ports["Ethernet2"].untagged_vlan, 0);
    // No timestamps on the fallback path.
    assert_eq!(ports["Ethernet1"].last_status_change_timestamp, 0.0);
}

// ── list_vlans ──────────────────────────────────────────────────────

#[tokio::test]
async fn list_vlans_joins_and_sorts() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show vlan", "show vlan trunk group"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            { "vlans": {
                "200": { "name": "tenant-b", "status": "active", "dynamic": false,
                         "interfaces": { "Ethernet2": {}, "Ethernet1": {} } },
                "100": { "name": "tenant-a", "status": "active", "dynamic": true,
                         "interfaces": {} }
            }},
            { "trunkGroups": { "200": { "names": ["z-group", "a-group"] } } }
        ]))))
        .mount(&server)
        .await;

    let (client, _dir) = connect_client(&server, AristaConfig::default()).await;
    let vlans = client.list_vlans().await.unwrap();

    assert_eq!(vlans.len(), 2);
    assert_eq!(vlans[0].vlan_id, 100);
    assert!(vlans[0].trunk_groups.is_empty());
    assert_eq!(vlans[1].vlan_id, 200);
    assert_eq!(vlans[1].interface_names, vec!["Ethernet1", "Ethernet2"]);
    assert_eq!(vlans[1].trunk_groups, vec!["a-group", "z-group"]);
}

// ── update_vlan ─────────────────────────────────────────────────────

fn vlan_table_with_100() -> serde_json::Value {
    rpc_result(json!([
        { "vlans": { "100": { "name": "tenant-a", "status": "active",
                              "dynamic": false, "interfaces": {} } } },
        { "trunkGroups": {} }
    ]))
}

#[tokio::test]
async fn update_vlan_sends_the_exact_command_sequence() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show vlan", "show vlan trunk group"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(vlan_table_with_100()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "enable",
            "configure",
            "interface Ethernet1",
            "switchport access vlan 100",
            "lldp transmit"
        ]}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(rpc_result(json!([{}, {}, {}, {}, {}]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = AristaConfig {
        allowed_vlan_ids: vec![100, 4008],
        provisioning_vlan_ids: vec![100],
        ..AristaConfig::default()
    };
    let (client, _dir) = connect_client(&server, config).await;

    client
        .update_vlan(UpdateVlanRequest {
            port: "Ethernet1".to_string(),
            vlan: 100,
            update_lldp: true,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn update_vlan_outside_allow_list_is_rejected_without_commands() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    let config = AristaConfig {
        allowed_vlan_ids: vec![100],
        ..AristaConfig::default()
    };
    let (client, _dir) = connect_client(&server, config).await;

    let err = client
        .update_vlan(UpdateVlanRequest {
            port: "Ethernet1".to_string(),
            vlan: 999,
            update_lldp: false,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SwitchError::Validation { .. }));
    // Only the connect probe reached the server.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_vlan_missing_from_device_table_is_not_found() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show vlan", "show vlan trunk group"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(vlan_table_with_100()))
        .mount(&server)
        .await;

    let config = AristaConfig {
        allowed_vlan_ids: vec![100, 4008],
        ..AristaConfig::default()
    };
    let (client, _dir) = connect_client(&server, config).await;

    let err = client
        .update_vlan(UpdateVlanRequest {
            port: "Ethernet1".to_string(),
            vlan: 4008,
            update_lldp: false,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SwitchError::NotFound { .. }));
}

#[tokio::test]
async fn read_only_builds_but_does_not_submit() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "show vlan", "show vlan trunk group"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(vlan_table_with_100()))
        .mount(&server)
        .await;

    let config = AristaConfig {
        read_only: true,
        allowed_vlan_ids: vec![100],
        ..AristaConfig::default()
    };
    let (client, _dir) = connect_client(&server, config).await;

    // No mock exists for the mutation batch; submission would fail.
    client
        .update_vlan(UpdateVlanRequest {
            port: "Ethernet1".to_string(),
            vlan: 100,
            update_lldp: false,
        })
        .await
        .unwrap();

    // probe + VLAN pre-check only
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

// ── MAC table ───────────────────────────────────────────────────────

#[tokio::test]
async fn mac_table_remaps_members_and_excludes_model_uplinks() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "enable", "show mac address-table dynamic", "show port-channel dense"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            {},
            { "unicastTable": { "tableEntries": [
                { "interface": "Ethernet4", "macAddress": "aabb.ccdd.eeff", "vlanId": 100 },
                { "interface": "Vxlan1", "macAddress": "1111.2222.3333", "vlanId": 100 },
                { "interface": "Port-Channel33", "macAddress": "4444.5555.6666", "vlanId": 200 }
            ]}},
            { "portChannels": {
                "Port-Channel24": { "lacpMode": "active", "protocol": "lacp", "linkState": "up",
                                    "ports": { "Ethernet4": { "intf": "Ethernet4" } } }
            }}
        ]))))
        .mount(&server)
        .await;

    let (client, _dir) = connect_client(&server, AristaConfig::default()).await;
    let entries = client.get_mac_address_table().await.unwrap();

    // The probe reported DCS-7050CX3-32, so Port-Channel33 is an uplink.
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].interface, "Port-Channel24");
    assert_eq!(entries[0].mac_address, "aa:bb:cc:dd:ee:ff");
}

// ── IP/MAC info ─────────────────────────────────────────────────────

#[tokio::test]
async fn ip_mac_info_joins_arp_and_mac_tables() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "enable", "show interfaces phy"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            {},
            { "interfacePhyStatuses": { "Ethernet1": {}, "Ethernet4": {} } }
        ]))))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "enable",
            "show ip arp vrf all",
            "show mac address-table interface ethernet 1-4",
            "show mac address-table dynamic interface port-Channel 1-281"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            {},
            { "vrfs": { "Tenants": { "ipV4Neighbors": [
                { "address": "10.1.0.5", "hwAddress": "aabb.ccdd.eeff",
                  "interface": "Vlan100, Ethernet4" }
            ]}}},
            { "unicastTable": { "tableEntries": [
                { "interface": "Ethernet4", "macAddress": "aabb.ccdd.eeff", "vlanId": 100 },
                { "interface": "Ethernet1", "macAddress": "7777.8888.9999", "vlanId": 300 }
            ]}},
            { "unicastTable": { "tableEntries": [] } }
        ]))))
        .mount(&server)
        .await;

    let (client, _dir) = connect_client(&server, AristaConfig::default()).await;
    let entries = client.get_ip_mac_info().await.unwrap();

    assert_eq!(entries.len(), 2);
    let resolved = entries
        .iter()
        .find(|e| e.mac_address == "aa:bb:cc:dd:ee:ff")
        .unwrap();
    assert_eq!(resolved.interface, "Ethernet4");
    assert_eq!(resolved.ip_address.as_deref(), Some("10.1.0.5"));
    let unresolved = entries
        .iter()
        .find(|e| e.mac_address == "77:77:88:88:99:99")
        .unwrap();
    assert_eq!(unresolved.ip_address, None);
}

// ── Device errors ───────────────────────────────────────────────────

#[tokio::test]
async fn probe_rejection_on_connect_is_a_connection_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "torc-eapi-1",
            "error": { "code": 1002,
                       "message": "CLI command 1 of 1 'show version' failed: invalid command" }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir);
    let uri = url::Url::parse(&server.uri()).unwrap();
    let connector = Connector::new(
        uri.host_str().unwrap(),
        uri.port().unwrap(),
        &secrets,
        TransportConfig::default(),
        Duration::from_secs(5),
    )
    .with_scheme("http");

    let err = AristaClient::connect(connector, AristaConfig::default())
        .await
        .unwrap_err();

    // A device that cannot answer the liveness probe is unreachable for
    // our purposes, not misbehaving mid-operation.
    match err {
        SwitchError::Connection { message } => assert!(message.contains("liveness probe")),
        other => panic!("expected connection error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_batch_surfaces_device_error() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "enable", "configure", "interface Ethernet1", "description bad port"
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "torc-eapi-1",
            "error": { "code": 1000,
                       "message": "CLI command 4 of 4 'description bad port' failed: could not run command" }
        })))
        .mount(&server)
        .await;

    let (client, _dir) = connect_client(&server, AristaConfig::default()).await;

    let err = client
        .update_description(UpdateDescriptionRequest {
            port: "Ethernet1".to_string(),
            description: "bad port".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        SwitchError::Device { message } => assert!(message.contains("could not run command")),
        other => panic!("expected device error, got {other:?}"),
    }
}

// ── Config reads (text encoding) ────────────────────────────────────

#[tokio::test]
async fn port_running_config_returns_trimmed_lines() {
    let server = MockServer::start().await;
    mount_probe(&server).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "cmds": [
            "enable", "show running-config interfaces Ethernet1"
        ], "format": "text" }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(json!([
            { "output": "" },
            { "output": "interface Ethernet1\n   description host-1\n   switchport access vlan 100\n\n" }
        ]))))
        .mount(&server)
        .await;

    let (client, _dir) = connect_client(&server, AristaConfig::default()).await;
    let lines = client.get_port_running_config("Ethernet1").await.unwrap();

    assert_eq!(
        lines,
        vec![
            "interface Ethernet1",
            "description host-1",
            "switchport access vlan 100",
        ]
    );
}
