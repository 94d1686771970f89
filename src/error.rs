//! Error types for vmenter.

use thiserror::Error;

/// Result type alias using vmenter's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vmenter operations.
///
/// Every failure on the public surface maps to a single negative status
/// code via [`Error::status`], mirroring the C-style contract of the
/// launcher interface.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied value is malformed (zero resources, empty path,
    /// out-of-range log level).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The context handle is unknown or was already freed.
    #[error("invalid context handle: {0}")]
    InvalidHandle(u32),

    /// The context handle was already consumed by a launch.
    #[error("context {0} already consumed by launch")]
    AlreadyConsumed(u32),

    /// A required configuration field was never set.
    #[error("configuration incomplete: {field} not set")]
    ConfigIncomplete {
        /// Name of the missing field.
        field: &'static str,
    },

    /// No further contexts (or backend resources) can be allocated.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The hypervisor backend or console subsystem failed.
    #[error("backend failure: {0}")]
    Backend(String),

    /// IO error wrapper.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-argument error with a message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a resource-exhausted error with a message.
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Create a backend error with a message.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Map this error to the negative status code reported by the
    /// C-style launcher surface.
    ///
    /// Codes are negated errno values: `-EINVAL` for malformed or missing
    /// configuration, `-ENOENT` for unknown handles, `-EBUSY` for handles
    /// already consumed by a launch, `-ENOMEM` for exhaustion, `-EIO` for
    /// backend failures.
    pub fn status(&self) -> i32 {
        -(match self {
            Self::InvalidArgument(_) | Self::ConfigIncomplete { .. } => libc::EINVAL,
            Self::InvalidHandle(_) => libc::ENOENT,
            Self::AlreadyConsumed(_) => libc::EBUSY,
            Self::ResourceExhausted(_) => libc::ENOMEM,
            Self::Backend(_) => libc::EIO,
            Self::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
        })
    }
}
