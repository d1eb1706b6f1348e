use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Fetch timed out after {timeout_ms}ms: {endpoint}")]
    FetchTimeout { endpoint: String, timeout_ms: u64 },

    #[error("Fetch failed for {endpoint}: {message}")]
    FetchTransportError { endpoint: String, message: String },

    #[error("Malformed processing input: expected an array, got {found}")]
    MalformedInput { found: String },

    #[error("Storage write failed: {message}")]
    StorageWriteError { message: String },

    #[error("Storage connection failed for {uri}: {message}")]
    StorageConnectionError { uri: String, message: String },

    #[error("{stage} stage terminated without reporting a result")]
    StageError { stage: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::MalformedInput { .. } => ErrorSeverity::Low,
            EtlError::FetchTimeout { .. } | EtlError::FetchTransportError { .. } => {
                ErrorSeverity::Medium
            }
            EtlError::StorageWriteError { .. }
            | EtlError::StorageConnectionError { .. } => ErrorSeverity::High,
            EtlError::StageError { .. }
            | EtlError::IoError(_)
            | EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::FetchTimeout { .. } => {
                "Check that the API endpoint is reachable or raise --fetch-timeout-ms"
            }
            EtlError::FetchTransportError { .. } => {
                "Verify the API endpoint URL and that it returns a JSON array"
            }
            EtlError::MalformedInput { .. } => "The source returned an unexpected payload shape",
            EtlError::StorageWriteError { .. } => {
                "Check the target collection and available disk space"
            }
            EtlError::StorageConnectionError { .. } => {
                "Verify --store-uri points at a writable sqlite:// location"
            }
            EtlError::StageError { .. } => "A worker stage panicked; rerun with --verbose",
            EtlError::IoError(_) => "Check file permissions and paths",
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the configuration and run again"
            }
        }
    }

    pub(crate) fn storage_write(err: impl std::fmt::Display) -> Self {
        EtlError::StorageWriteError {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
