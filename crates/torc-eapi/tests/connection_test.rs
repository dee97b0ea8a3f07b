// Integration tests for `Connector` and `EapiSession` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use torc_eapi::{Connector, Encoding, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn write_secrets(dir: &tempfile::TempDir, username: &str, password: &str) -> std::path::PathBuf {
    let path = dir.path().join("switch-secrets.yaml");
    std::fs::write(
        &path,
        format!("credentials:\n  username: {username}\n  password: {password}\n"),
    )
    .unwrap();
    path
}

fn connector_for(server: &MockServer, secrets: &std::path::Path, timeout: Duration) -> Connector {
    let uri = url::Url::parse(&server.uri()).unwrap();
    Connector::new(
        uri.host_str().unwrap(),
        uri.port().unwrap(),
        secrets,
        TransportConfig::default(),
        timeout,
    )
    .with_scheme("http")
}

fn show_version_body() -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": "torc-eapi-1",
        "result": [
            { "modelName": "DCS-7050CX3-32", "version": "4.28.1F" }
        ]
    })
}

// ── Connect & probe ─────────────────────────────────────────────────

#[tokio::test]
async fn connect_validates_session_and_captures_model() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir, "admin", "hunter2");

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .and(basic_auth("admin", "hunter2"))
        .and(body_partial_json(json!({
            "method": "runCmds",
            "params": { "cmds": ["show version"], "format": "json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(show_version_body()))
        .mount(&server)
        .await;

    let session = connector_for(&server, &secrets, Duration::from_secs(5))
        .connect()
        .await
        .unwrap();

    assert_eq!(session.model_name(), "DCS-7050CX3-32");
}

#[tokio::test]
async fn probe_failure_surfaces_rpc_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir, "admin", "hunter2");

    let body = json!({
        "jsonrpc": "2.0",
        "id": "torc-eapi-1",
        "error": { "code": 1002, "message": "CLI command 1 of 1 'show version' failed: invalid command" }
    });

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = connector_for(&server, &secrets, Duration::from_secs(5))
        .connect()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rpc { code: 1002, .. }));
}

#[tokio::test]
async fn rejected_credentials_surface_authentication_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir, "admin", "wrong");

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = connector_for(&server, &secrets, Duration::from_secs(5))
        .connect()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication { status: 401 }));
}

#[tokio::test]
async fn slow_device_loses_the_race_against_the_timer() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir, "admin", "hunter2");

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(show_version_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = connector_for(&server, &secrets, Duration::from_millis(50))
        .connect()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConnectTimeout { .. }));
}

#[tokio::test]
async fn refresh_picks_up_rotated_credentials() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir, "admin", "old-password");

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .and(basic_auth("admin", "old-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(show_version_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .and(basic_auth("admin", "new-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(show_version_body()))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector_for(&server, &secrets, Duration::from_secs(5));
    connector.connect().await.unwrap();

    // Rotate the secrets file in place; the next connect re-reads it.
    write_secrets(&dir, "admin", "new-password");
    connector.connect().await.unwrap();
}

#[tokio::test]
async fn multibyte_error_body_is_returned_not_panicked_on() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir, "admin", "hunter2");

    // An HTML error page whose 200th byte lands inside a multi-byte
    // character: 199 ASCII bytes followed by 'é' and more text.
    let body = format!("{}é gateway unavailable", "x".repeat(199));
    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    let err = connector_for(&server, &secrets, Duration::from_secs(5))
        .connect()
        .await
        .unwrap_err();

    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 500);
            assert!(body.ends_with('é'));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

// ── Batch execution ─────────────────────────────────────────────────

#[tokio::test]
async fn run_commands_returns_results_in_request_order() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let secrets = write_secrets(&dir, "admin", "hunter2");

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .and(body_partial_json(json!({
            "params": { "cmds": ["show version"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(show_version_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/command-api"))
        .and(body_partial_json(json!({
            "params": { "cmds": ["enable", "show running-config"], "format": "text" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "torc-eapi-1",
            "result": [
                { "output": "" },
                { "output": "hostname tor1\n!\nend\n" }
            ]
        })))
        .mount(&server)
        .await;

    let session = connector_for(&server, &secrets, Duration::from_secs(5))
        .connect()
        .await
        .unwrap();

    let results = session
        .run_commands(
            &["enable".to_string(), "show running-config".to_string()],
            Encoding::Text,
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["output"], "hostname tor1\n!\nend\n");
}
