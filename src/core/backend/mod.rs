//! Collaborator contract
//!
//! Authentication, sessions and profile storage are delegated to an external
//! service. This module defines what the UI needs from it:
//! - [`AuthProvider`]: credential sign-in, account creation, OAuth popup,
//!   sign-out and the session stream
//! - [`DocumentStore`]: keyed document reads and full-overwrite writes
//!
//! [`BackendClient`] bundles both behind one explicitly constructed handle
//! that is handed to the components through context.

mod document;
mod error;
pub mod firebase;
mod memory;
mod session;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::BackendConfig;

pub use document::{
    Document, FieldValue, USERS_COLLECTION, VENDORS_COLLECTION, resolve_server_timestamps,
    server_timestamp,
};
pub use error::{AuthError, StoreError};
pub use firebase::FirebaseBackend;
pub use memory::{BackendCall, MemoryBackend};
pub use session::{
    Identity, OAuthSignIn, Session, SessionBroadcaster, SessionListener, Subscription,
};

/// OAuth identity providers offered in the modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    /// Provider id understood by the identity service
    pub fn provider_id(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google.com",
        }
    }

    /// Short tag stored on profiles created through this provider
    pub fn tag(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

/// Authentication half of the collaborator
#[async_trait(?Send)]
pub trait AuthProvider: Send + Sync {
    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Create an account; the new account is signed in
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Run the provider's popup flow and sign in with the result
    async fn sign_in_with_popup(
        &self,
        provider: OAuthProvider,
    ) -> Result<OAuthSignIn, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Observe session transitions; see [`SessionBroadcaster::subscribe`]
    fn subscribe(&self, listener: SessionListener) -> Subscription;
}

/// Document half of the collaborator
#[async_trait(?Send)]
pub trait DocumentStore: Send + Sync {
    /// `Ok(None)` when the document does not exist
    async fn get_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Create or fully overwrite a document
    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> Result<(), StoreError>;
}

/// Handle to the external collaborator
#[derive(Clone)]
pub struct BackendClient {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
}

impl BackendClient {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self { auth, store }
    }

    /// Use one service for both halves of the contract
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AuthProvider + DocumentStore + 'static,
    {
        Self {
            auth: backend.clone(),
            store: backend,
        }
    }

    /// Firebase when fully configured, otherwise an in-process backend
    pub fn from_config(config: &BackendConfig) -> Self {
        match config.firebase() {
            Some(settings) => Self::from_backend(Arc::new(FirebaseBackend::new(settings))),
            None => {
                leptos::logging::warn!(
                    "Firebase is not configured (api_key={}, project_id={}); accounts are kept in memory",
                    config.has_api_key(),
                    config.has_project_id()
                );
                Self::from_backend(Arc::new(MemoryBackend::new()))
            }
        }
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}
