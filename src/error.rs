use thiserror::Error;

#[derive(Debug, Error)]
pub enum Vb2Error {
    #[error("Buffer too small at {file}:{line}: need at least {expected} bytes, got {actual}")]
    TooShortBuffer {
        actual:   usize,
        expected: usize,
        file:     &'static str,
        line:     u32,
    },

    #[error(r#"Invalid file identifier: Expected "VB2", found {0:?}"#)]
    FileIdentifierError(String),

    #[error("Unsupported file version: Expected major version 1, found {0}")]
    FileVersioningError(u64),

    #[error("Invalid file handling")]
    IOError(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("Capacity exceeded: all {max_history} rows of the session are recorded")]
    CapacityExceeded { max_history: u64 },

    #[error("Invalid configuration")]
    ConfigError(#[from] serde_json::Error),
}
