use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Raised when chained steps have no common area of validity.
    #[error("Invalid operation: {0}")]
    EmptyIntersection(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Formatting error: {0}")]
    Formatting(#[from] FormattingError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl OperationError {
    /// Whether this error only signals that a candidate must be dropped.
    pub fn is_empty_intersection(&self) -> bool {
        matches!(self, OperationError::EmptyIntersection(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormattingError {
    #[error("{0}")]
    Unsupported(String),

    #[error("{0} can only be exported to WKT2")]
    Wkt1Unsupported(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("No object with code {auth}:{code}")]
    NoSuchCode { auth: String, code: String },

    #[error("Registry lookup failed: {0}")]
    Lookup(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
