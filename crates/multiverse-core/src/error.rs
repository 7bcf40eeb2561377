use thiserror::Error;

/// Error taxonomy surfaced to the view layer.
///
/// Every variant is a failed fetch from the controller's point of view:
/// none is fatal, and all leave the list state resumable via a retry.
/// `Clone` so snapshots can carry the last error by value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Transport-level failure: connectivity, DNS, timeout.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The looked-up entity does not exist.
    #[error("not found")]
    NotFound,

    /// The backend answered with a body we could not interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Non-success status from the backend other than not-found.
    #[error("service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },
}

impl From<multiverse_api::Error> for CoreError {
    fn from(e: multiverse_api::Error) -> Self {
        if e.is_not_found() {
            return Self::NotFound;
        }
        match e {
            multiverse_api::Error::NotFound { .. } => Self::NotFound,
            multiverse_api::Error::Deserialization { message, .. } => {
                Self::MalformedResponse(message)
            }
            multiverse_api::Error::Api { status, message } => Self::Service { status, message },
            multiverse_api::Error::Transport(e) => Self::NetworkFailure(e.to_string()),
            multiverse_api::Error::InvalidUrl(e) => Self::MalformedResponse(e.to_string()),
        }
    }
}
