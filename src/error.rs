//! Error types shared by the store, cursor, and container.

use thiserror::Error;

/// Errors raised by store, navigation, and dependency operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A read addressed a path or alias that does not resolve.
    #[error("no item found at '{path}'")]
    ItemNotFound { path: String },

    /// A write tried to descend through an existing leaf value.
    #[error("cannot nest under leaf '{segment}' in path '{path}'")]
    NestedUnderLeaf { path: String, segment: String },

    /// Construction or reset was handed something that is not a tree.
    #[error("initial items must be a mapping or null, got {found}")]
    InvalidTree { found: &'static str },

    /// An empty path string, or a path with an empty segment.
    #[error("invalid path '{raw}'")]
    InvalidPath { raw: String },

    /// A dependency descriptor that cannot produce an instance.
    #[error("invalid factory for alias '{alias}': {reason}")]
    InvalidFactory { alias: String, reason: String },

    /// A typed fetch asked for a different type than the instance holds.
    #[error("instance '{alias}' is not of type {expected}")]
    WrongInstanceType { alias: String, expected: &'static str },

    /// Fault raised inside a user-supplied factory or setup step.
    /// Passed through to the caller unmodified.
    #[error("{0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
