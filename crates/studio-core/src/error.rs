//! Error types for the image studio
//!
//! Provides error handling for:
//! - Remote asset store calls (network failures, rejections, decoding)
//! - Generation and hosting requests
//! - Session collaborator failures
//! - File selection and configuration loading
//!
//! Lifecycle operations never propagate these to their callers: they are
//! turned into user notifications at the operation boundary.

use std::path::PathBuf;

/// Umbrella error for everything a lifecycle operation can hit
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Remote store call failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generation or hosting call failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Session collaborator failed
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl StudioError {
    /// Human-readable message carried into notifications
    #[inline]
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Store(e) => e.message(),
            Self::Generation(e) => e.to_string(),
            Self::Session(e) => e.to_string(),
        }
    }

    /// Check if the failure happened before reaching the remote side
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        match self {
            Self::Store(e) => e.is_network(),
            Self::Generation(GenerationError::Network(_)) => true,
            _ => false,
        }
    }
}

/// Remote asset store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Transport failure (connection refused, DNS, TLS, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Store answered with an error status
    #[error("store rejected request ({status}): {message}")]
    Rejected {
        /// HTTP-like status code
        status: u16,
        /// Message reported by the store
        message: String,
    },

    /// Response body could not be decoded
    #[error("invalid store response: {0}")]
    Decode(String),

    /// Insert returned no representation of the new row
    #[error("store returned no row for insert")]
    EmptyInsert,

    /// Adapter misconfigured
    #[error("store configuration error: {0}")]
    Config(String),

    /// Local snapshot could not be read or written
    #[error("store snapshot error: {0}")]
    Persist(String),
}

impl StoreError {
    /// Underlying message without the category prefix
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Network(m) | Self::Decode(m) | Self::Config(m) | Self::Persist(m) => {
                m.clone()
            }
            Self::Rejected { message, .. } => message.clone(),
            Self::EmptyInsert => self.to_string(),
        }
    }

    /// Check if the request never reached the store
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Generation requester and hosting errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Endpoint URL could not be built
    #[error("invalid generation endpoint: {0}")]
    InvalidEndpoint(String),

    /// Requested dimensions are unusable
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Hosting service refused the upload
    #[error("Failed to upload image: {0}")]
    UploadRejected(String),
}

/// Session collaborator errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Sign-out could not be completed
    #[error("sign out failed: {0}")]
    SignOutFailed(String),
}

/// Rejected file selections
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// File type is not an accepted image type
    #[error("unsupported file type: '{0}' (accepted: .jpeg, .jpg, .png, .webp)")]
    UnsupportedType(String),

    /// File has no content
    #[error("file '{0}' is empty")]
    Empty(String),

    /// File could not be read
    #[error("could not read {path}: {message}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying io message
        message: String,
    },
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but is unusable
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn studio_error_message_strips_prefix() {
        let err = StudioError::from(StoreError::Rejected {
            status: 409,
            message: "duplicate key value".to_string(),
        });
        assert_eq!(err.message(), "duplicate key value");
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn studio_error_is_network() {
        assert!(StudioError::from(StoreError::Network("refused".into())).is_network());
        assert!(StudioError::from(GenerationError::Network("dns".into())).is_network());
        assert!(!StudioError::from(StoreError::Decode("bad json".into())).is_network());
    }

    #[test]
    fn upload_rejected_display() {
        let err = GenerationError::UploadRejected("invalid key".to_string());
        assert_eq!(err.to_string(), "Failed to upload image: invalid key");
    }
}
