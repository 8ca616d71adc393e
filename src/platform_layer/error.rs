use std::io;

// Represents errors that can occur within the platform abstraction layer.
//
// This enum centralizes error handling for starting the application and for
// talking to the terminal the console surface runs on.
#[derive(Debug)]
pub enum PlatformError {
    /// Reading input or writing output failed.
    Io(io::Error),
    /// Failure during the initialization of the application or its components.
    InitializationFailed(String),
    /// A requested operation could not be completed.
    OperationFailed(String),
}

impl From<io::Error> for PlatformError {
    fn from(err: io::Error) -> Self {
        PlatformError::Io(err)
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Io(e) => write!(f, "Console I/O Error: {}", e),
            PlatformError::InitializationFailed(s) => write!(f, "Initialization Failed: {}", s),
            PlatformError::OperationFailed(s) => write!(f, "Operation Failed: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlatformError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// A specialized `Result` type for platform layer operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
