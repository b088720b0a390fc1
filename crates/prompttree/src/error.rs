use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

/// Failures reported by tree and navigator operations.
///
/// A failed operation never leaves partial changes behind: the tree and
/// the navigation state are exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The id does not resolve to any node in the tree.
    #[error("node not found: {0}")]
    NotFound(String),

    /// The operation is structurally disallowed (e.g. deleting the root).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An imported document violates the shape or id-uniqueness rules.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
}

impl TreeError {
    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }
}
