//! Error types used throughout the application

use thiserror::Error;

use crate::types::{CounterId, InstanceKey};

/// Main error type for vcmon
///
/// The variants carry the propagation policy of the whole engine:
/// - [`CheckError::Connectivity`] is fatal and aborts the check run.
/// - [`CheckError::MetadataNotFound`] and [`CheckError::CollectionFailed`]
///   are recoverable and handled at the smallest possible scope.
/// - [`CheckError::CacheNotInitialized`] signals caller misuse and
///   propagates unconditionally.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Topology or counter metadata could not be enumerated at all
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// A counter id has no metadata on this connection
    #[error("No metadata found for counter id {0}")]
    MetadataNotFound(CounterId),

    /// One resource's sample fetch failed; other resources are unaffected
    #[error("Collection failed for {mor}: {reason}")]
    CollectionFailed {
        /// Rendered reference of the failing resource
        mor: String,
        /// What went wrong
        reason: String,
    },

    /// Storage for an instance key was never initialized (caller bug)
    #[error("Counter store was never initialized for instance {0}")]
    CacheNotInitialized(InstanceKey),

    /// Configuration was rejected before the run started
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckError {
    /// Whether this error aborts the whole check run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::CacheNotInitialized(_))
    }
}

/// Result type alias for vcmon operations
pub type Result<T> = std::result::Result<T, CheckError>;
