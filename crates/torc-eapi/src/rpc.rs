// eAPI wire protocol: JSON-RPC 2.0 `runCmds` over HTTPS.
//
// One POST per command batch. The device executes the batch atomically
// and returns one result per command in request order. Decoding of the
// per-command payloads into typed documents is the caller's business --
// this module only moves `serde_json::Value`s.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;

/// Result encoding requested from the device.
///
/// `Json` yields structured documents; `Text` yields the raw CLI output
/// wrapped as `{"output": "..."}` per command. Old firmware rejects some
/// queries under `Json` ("unconverted command"), which is the trigger for
/// the text fallback path upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Text,
}

impl Encoding {
    fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

/// Per-command payload under [`Encoding::Text`].
#[derive(Debug, Clone, Deserialize)]
pub struct TextOutput {
    pub output: String,
}

/// First 200 characters of a response body, for error context.
/// Character-based so a multi-byte body never splits mid-codepoint.
fn body_snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RpcParams<'a>,
    id: &'static str,
}

#[derive(Serialize)]
struct RpcParams<'a> {
    version: u32,
    cmds: &'a [String],
    format: &'static str,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Vec<Value>>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// A live session to one device's eAPI endpoint.
///
/// Owned exclusively by one device client; sessions are cheap to rebuild
/// and are replaced wholesale on refresh rather than repaired in place.
#[derive(Debug)]
pub struct EapiSession {
    http: reqwest::Client,
    endpoint: Url,
    username: String,
    password: SecretString,
    /// Hardware model reported by the liveness probe (`show version`),
    /// e.g. "DCS-7050CX3-32". Empty until the probe has run.
    model_name: String,
}

impl EapiSession {
    /// Create a session against `endpoint` (e.g. `https://tor1:443/command-api`).
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        username: String,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            endpoint,
            username,
            password,
            model_name: String::new(),
        }
    }

    /// The hardware model reported by the device during connect.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub(crate) fn set_model_name(&mut self, model: String) {
        self.model_name = model;
    }

    /// Execute one atomic command batch and return one decoded value per
    /// command, in request order.
    pub async fn run_commands(
        &self,
        cmds: &[String],
        encoding: Encoding,
    ) -> Result<Vec<Value>, Error> {
        debug!(endpoint = %self.endpoint, commands = cmds.len(), format = encoding.as_str(), "running eAPI batch");
        trace!(?cmds, "batch contents");

        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "runCmds",
            params: RpcParams {
                version: 1,
                cmds,
                format: encoding.as_str(),
            },
            id: "torc-eapi-1",
        };

        let resp = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }

        let body = resp.text().await?;
        let envelope: RpcResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body_snippet(&body),
            })?;

        if let Some(err) = envelope.error {
            return Err(Error::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let results = envelope.result.ok_or_else(|| Error::Deserialization {
            message: "response carried neither result nor error".into(),
            body: body_snippet(&body),
        })?;

        if results.len() < cmds.len() {
            return Err(Error::ShortResponse {
                expected: cmds.len(),
                got: results.len(),
            });
        }

        Ok(results)
    }
}
