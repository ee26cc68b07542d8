use std::{error::Error as StdError, fmt, io, path::PathBuf, result::Result as StdResult};

/// Problems with the layout configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A spacing unit is zero, negative or not finite.
    InvalidUnit { field: &'static str, value: f64 },
    /// A spread range has `min > max` or a non-finite bound.
    InvalidRange { field: &'static str, min: f64, max: f64 },
    /// A spread falloff is not strictly positive.
    InvalidFalloff { field: &'static str, value: f64 },
    /// The configuration file could not be parsed.
    Parse { path: PathBuf, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUnit { field, value } => {
                write!(f, "{field} must be a positive finite number, got {value}")
            }
            Self::InvalidRange { field, min, max } => {
                write!(f, "{field}: min ({min}) must not exceed max ({max})")
            }
            Self::InvalidFalloff { field, value } => {
                write!(f, "{field}.falloff must be greater than zero, got {value}")
            }
            Self::Parse { path, reason } => {
                writeln!(f, "Invalid layout configuration in {}", path.display())?;
                writeln!(f)?;
                write!(f, "Reason: {reason}")
            }
        }
    }
}

impl StdError for ConfigError {}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Json(serde_json::Error),
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

pub type Result<T> = StdResult<T, Error>;
