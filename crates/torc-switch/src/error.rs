// ── Domain error taxonomy ──
//
// Consumers (reconciliation controllers) never see HTTP or JSON-RPC
// details directly. The `From<torc_eapi::Error>` impl translates
// transport-layer errors into the domain taxonomy; validation and
// not-found errors are raised here, before anything touches the wire.

use thiserror::Error;

/// Unified error type for switch operations.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Bad caller input (port name, VLAN, mode, trunk group, description,
    /// BGP value). Raised before any network call; never worth retrying.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Transport failure or liveness-probe failure. The caller may call
    /// `refresh_connection` and retry the whole operation.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Connection establishment timed out.
    #[error("connection timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Malformed or missing fields in a decoded device response.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The requested entity does not exist on the device (e.g. a VLAN
    /// missing from the device's VLAN table).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The device rejected a command batch; the device's message text is
    /// attached verbatim.
    #[error("device error: {message}")]
    Device { message: String },

    /// Operation not implemented by this client variant.
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: &'static str },
}

impl SwitchError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

impl From<torc_eapi::Error> for SwitchError {
    fn from(err: torc_eapi::Error) -> Self {
        match err {
            torc_eapi::Error::ConnectTimeout { timeout_secs } => {
                SwitchError::Timeout { timeout_secs }
            }
            torc_eapi::Error::Credentials { .. }
            | torc_eapi::Error::Authentication { .. }
            | torc_eapi::Error::Transport(_)
            | torc_eapi::Error::InvalidUrl(_)
            | torc_eapi::Error::Http { .. } => SwitchError::Connection {
                message: err.to_string(),
            },
            torc_eapi::Error::Rpc { message, .. } => SwitchError::Device { message },
            torc_eapi::Error::Deserialization { message, .. } => {
                SwitchError::Protocol { message }
            }
            torc_eapi::Error::ShortResponse { .. } => SwitchError::Protocol {
                message: err.to_string(),
            },
        }
    }
}
