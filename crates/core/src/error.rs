use thiserror::Error;

pub type ZaptosResult<T> = Result<T, ZaptosError>;

#[derive(Error, Debug)]
pub enum ZaptosError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Recipient resolution error: {0}")]
    Resolution(String),

    #[error("{}", transport_message(*.status, .body))]
    Transport { status: Option<u16>, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Campaign store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn transport_message(status: Option<u16>, body: &str) -> String {
    match status {
        Some(status) => format!("Transport error: HTTP {status}: {body}"),
        None => format!("Transport error: {body}"),
    }
}

impl ZaptosError {
    /// Stable identifier used in the structured error document.
    pub fn kind(&self) -> &'static str {
        match self {
            ZaptosError::Configuration(_) => "configuration_error",
            ZaptosError::Resolution(_) => "resolution_error",
            ZaptosError::Transport { .. } => "transport_error",
            ZaptosError::NotFound(_) => "not_found_error",
            ZaptosError::Validation(_) => "validation_error",
            ZaptosError::InvalidState(_) => "invalid_state_error",
            ZaptosError::Store(_) => "store_error",
            ZaptosError::Serialization(_) => "serialization_error",
            ZaptosError::Io(_) => "io_error",
        }
    }

    /// HTTP status carried by a transport error, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ZaptosError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn transport(body: impl Into<String>) -> Self {
        ZaptosError::Transport {
            status: None,
            body: body.into(),
        }
    }
}
