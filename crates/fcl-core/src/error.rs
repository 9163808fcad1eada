use thiserror::Error;

pub type FclResult<T> = Result<T, FclError>;

#[derive(Debug, Error)]
pub enum FclError {
    /// The ledger file exists but cannot be read or does not hold a record sequence.
    #[error("corrupt ledger {location}: {reason}")]
    CorruptLedger { location: String, reason: String },

    /// Writing the ledger to durable storage failed.
    #[error("persisting ledger {location}: {source}")]
    Persistence {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FclError {
    pub fn corrupt(location: impl Into<String>, reason: impl Into<String>) -> Self {
        FclError::CorruptLedger {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn persistence(location: impl Into<String>, source: std::io::Error) -> Self {
        FclError::Persistence {
            location: location.into(),
            source,
        }
    }
}
