use thiserror::Error;

/// Top-level error type for the `torc-eapi` crate.
///
/// Covers the transport-facing failure modes: credentials loading, HTTP
/// transport, the JSON-RPC envelope, and per-command device errors.
/// `torc-switch` maps these into its domain taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Credentials ─────────────────────────────────────────────────
    /// The secrets file could not be read or parsed.
    #[error("failed to load eAPI secrets from {path}: {message}")]
    Credentials { path: String, message: String },

    /// The device rejected the configured credentials.
    #[error("authentication rejected by device (HTTP {status})")]
    Authentication { status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid eAPI endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connection establishment lost the race against the timer.
    #[error("eAPI connection timeout after {timeout_secs}s")]
    ConnectTimeout { timeout_secs: u64 },

    /// Non-success HTTP status outside the JSON-RPC envelope.
    #[error("unexpected HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    // ── Protocol ────────────────────────────────────────────────────
    /// JSON-RPC error returned by the device for a command batch.
    ///
    /// The message names the failing command, e.g.
    /// `CLI command 2 of 3 'show interfaces vlans' failed: unconverted command`.
    #[error("eAPI error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The response body did not decode, with the raw body for debugging.
    #[error("eAPI response decode error: {message}")]
    Deserialization { message: String, body: String },

    /// The response carried fewer results than commands sent.
    #[error("eAPI returned {got} results for {expected} commands")]
    ShortResponse { expected: usize, got: usize },
}

impl Error {
    /// Returns `true` if the device rejected `command` as an
    /// "unconverted command", the signature of a query that this firmware
    /// only supports under text encoding.
    pub fn is_unconverted_command(&self, command: &str) -> bool {
        match self {
            Self::Rpc { message, .. } => {
                message.contains("unconverted command") && message.contains(command)
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a transient transport-level error where
    /// the caller may refresh the connection and retry the whole operation.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ConnectTimeout { .. } => true,
            _ => false,
        }
    }
}
