//! Collaborator error types

/// Failure reported by the authentication collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The collaborator refused the request; the text is shown to the user as-is
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("The sign-in popup was blocked by the browser")]
    PopupBlocked,

    #[error("The sign-in popup was closed before completing sign-in")]
    PopupClosed,

    #[error("{0} is not available here")]
    Unsupported(&'static str),
}

/// Failure reported by the document store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
