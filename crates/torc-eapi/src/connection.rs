// Bounded-time connection establishment.
//
// State machine: Disconnected -> Connecting -> Connected (probe sent)
// -> Validated (probe succeeded). Any failure surfaces an error and the
// caller is back at Disconnected; there is no retry in this component.
//
// Connecting runs as a race: one spawned worker performs the full
// connect-and-probe sequence and reports through a oneshot channel,
// selected against a timer. If the timer wins, the worker is abandoned
// (not cancelled) and whatever it eventually produces is dropped with
// the channel.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::rpc::{EapiSession, Encoding};
use crate::secrets::EapiSecrets;
use crate::transport::TransportConfig;

/// Factory for validated [`EapiSession`]s against one device.
///
/// Credentials are re-read from the secrets file on every call, so a
/// rotated password takes effect on the next connect or refresh without
/// restarting the process.
#[derive(Debug, Clone)]
pub struct Connector {
    host: String,
    port: u16,
    scheme: String,
    secrets_path: PathBuf,
    transport: TransportConfig,
    connect_timeout: Duration,
}

impl Connector {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        secrets_path: impl Into<PathBuf>,
        transport: TransportConfig,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            scheme: "https".into(),
            secrets_path: secrets_path.into(),
            transport,
            connect_timeout,
        }
    }

    /// Override the transport scheme (plain `http` is only useful against
    /// lab simulators and test harnesses).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// The device this connector targets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Open and validate a session, bounded by the connect timeout.
    pub async fn connect(&self) -> Result<EapiSession, Error> {
        let (tx, rx) = oneshot::channel();
        let worker = self.clone();
        tokio::spawn(async move {
            let result = worker.connect_and_probe().await;
            // The receiver is gone if the timer already won; the late
            // result is simply dropped.
            let _ = tx.send(result);
        });

        tokio::select! {
            () = tokio::time::sleep(self.connect_timeout) => {
                warn!(host = %self.host, timeout_secs = self.connect_timeout.as_secs(), "eAPI connect timed out");
                Err(Error::ConnectTimeout {
                    timeout_secs: self.connect_timeout.as_secs(),
                })
            }
            result = rx => result.unwrap_or_else(|_| Err(Error::ConnectTimeout {
                timeout_secs: self.connect_timeout.as_secs(),
            })),
        }
    }

    /// The unraced connect path: load credentials, build the HTTP client,
    /// and validate the session with a liveness probe.
    async fn connect_and_probe(&self) -> Result<EapiSession, Error> {
        debug!(host = %self.host, port = self.port, "connecting to eAPI endpoint");

        let secrets = EapiSecrets::load(&self.secrets_path)?;
        let http = self.transport.build_client()?;
        let endpoint = url::Url::parse(&format!(
            "{}://{}:{}/command-api",
            self.scheme, self.host, self.port
        ))?;
        let mut session = EapiSession::new(
            http,
            endpoint,
            secrets.credentials.username,
            secrets.credentials.password,
        );

        // A successful POST alone is not proof of a working session: some
        // auth failures only show up when a command is actually executed.
        let results = session
            .run_commands(&["show version".to_string()], Encoding::Json)
            .await?;

        let model = results
            .first()
            .and_then(|v| v.get("modelName"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        session.set_model_name(model);

        info!(host = %self.host, model = session.model_name(), "eAPI session validated");
        Ok(session)
    }
}
