//! Firebase collaborator over the public REST APIs
//!
//! - Identity Toolkit for password sign-in, sign-up and Google id token exchange
//! - Secure Token for refreshing expired id tokens
//! - Firestore for profile documents
//!
//! The signed-in session is persisted to localStorage in the browser and
//! restored when the backend is constructed.

mod http;
pub mod popup;
pub mod wire;

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use self::http::HttpClient;
use self::popup::request_google_id_token;
use self::wire::{
    IDENTITY_TOOLKIT_URL, IdentityResponse, IdpRequest, PasswordRequest, RefreshRequest,
    RefreshResponse, SECURE_TOKEN_URL, StoredSession, auth_rejection, commit_request, commit_url,
    decode_document, document_url, store_rejection,
};
use super::{
    AuthError, AuthProvider, Document, DocumentStore, Identity, OAuthProvider, OAuthSignIn,
    Session, SessionBroadcaster, SessionListener, StoreError, Subscription,
};
use crate::core::config::FirebaseSettings;

/// Refresh the id token when it expires within this many seconds
const REFRESH_MARGIN_SECS: i64 = 60;

#[allow(dead_code)]
const STORAGE_KEY_SESSION: &str = "solelink_session";

/// Collaborator backed by a Firebase project
pub struct FirebaseBackend {
    settings: FirebaseSettings,
    http: HttpClient,
    stored: Mutex<Option<StoredSession>>,
    sessions: SessionBroadcaster,
}

impl FirebaseBackend {
    pub fn new(settings: FirebaseSettings) -> Self {
        let stored = load_from_storage();
        let sessions = SessionBroadcaster::with_session(stored.as_ref().map(StoredSession::session));

        Self {
            settings,
            http: HttpClient::new(),
            stored: Mutex::new(stored),
            sessions,
        }
    }

    fn stored(&self) -> MutexGuard<'_, Option<StoredSession>> {
        self.stored.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn identity_url(&self, method: &str) -> String {
        format!(
            "{IDENTITY_TOOLKIT_URL}/accounts:{method}?key={}",
            self.settings.api_key
        )
    }

    /// Call an Identity Toolkit method and make the result the current session
    async fn identity_call<T: serde::Serialize + ?Sized>(
        &self,
        method: &str,
        body: &T,
    ) -> Result<StoredSession, AuthError> {
        let response = self
            .http
            .post_json(&self.identity_url(method), None, body)
            .await
            .map_err(AuthError::Network)?;

        if !response.ok() {
            return Err(auth_rejection(response.status, &response.body));
        }

        let identity: IdentityResponse = serde_json::from_value(response.body)
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let stored = StoredSession::from_identity(identity, Utc::now().timestamp());
        self.replace_session(Some(stored.clone()));
        Ok(stored)
    }

    fn replace_session(&self, stored: Option<StoredSession>) {
        match &stored {
            Some(session) => save_to_storage(session),
            None => clear_storage(),
        }
        let session = stored.as_ref().map(StoredSession::session);
        *self.stored() = stored;
        self.sessions.publish(session);
    }

    /// Id token for Firestore calls, refreshed when close to expiry
    async fn bearer_token(&self) -> Result<String, StoreError> {
        let current = self.stored().clone().ok_or(StoreError::Unauthenticated)?;
        let now = Utc::now().timestamp();
        if !current.needs_refresh(now, REFRESH_MARGIN_SECS) {
            return Ok(current.id_token);
        }

        let url = format!("{SECURE_TOKEN_URL}?key={}", self.settings.api_key);
        let response = self
            .http
            .post_json(&url, None, &RefreshRequest::new(&current.refresh_token))
            .await
            .map_err(StoreError::Network)?;

        if !response.ok() {
            // Refresh token revoked or expired: the session is gone
            self.replace_session(None);
            return Err(StoreError::Auth(auth_rejection(
                response.status,
                &response.body,
            )));
        }

        let refreshed: RefreshResponse = serde_json::from_value(response.body)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let mut updated = current;
        updated.apply_refresh(refreshed, now);
        let token = updated.id_token.clone();

        save_to_storage(&updated);
        *self.stored() = Some(updated);
        Ok(token)
    }
}

#[async_trait(?Send)]
impl AuthProvider for FirebaseBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let stored = self.identity_call("signInWithPassword", &request).await?;
        Ok(stored.session())
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let stored = self.identity_call("signUp", &request).await?;
        Ok(Identity { uid: stored.uid })
    }

    async fn sign_in_with_popup(
        &self,
        provider: OAuthProvider,
    ) -> Result<OAuthSignIn, AuthError> {
        let client_id = self
            .settings
            .google_client_id
            .as_deref()
            .ok_or(AuthError::Unsupported("Google sign-in"))?;

        let token = match provider {
            OAuthProvider::Google => request_google_id_token(client_id).await?,
        };

        let request = IdpRequest::new(&token.id_token, provider.provider_id(), &token.origin);
        let stored = self.identity_call("signInWithIdp", &request).await?;

        Ok(OAuthSignIn {
            identity: Identity { uid: stored.uid },
            email: stored.email,
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Id tokens are stateless; signing out only forgets them locally
        self.replace_session(None);
        Ok(())
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.sessions.subscribe(listener)
    }
}

#[async_trait(?Send)]
impl DocumentStore for FirebaseBackend {
    async fn get_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        let token = self.bearer_token().await?;
        let url = document_url(&self.settings.project_id, collection, key);
        let response = self
            .http
            .get_json(&url, Some(&token))
            .await
            .map_err(StoreError::Network)?;

        match response.status {
            404 => Ok(None),
            _ if response.ok() => decode_document(&response.body).map(Some),
            status => Err(store_rejection(status, &response.body)),
        }
    }

    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        let body = commit_request(&self.settings.project_id, collection, key, &fields);
        let response = self
            .http
            .post_json(&commit_url(&self.settings.project_id), Some(&token), &body)
            .await
            .map_err(StoreError::Network)?;

        if response.ok() {
            Ok(())
        } else {
            Err(store_rejection(response.status, &response.body))
        }
    }
}

/// Restore the persisted session from localStorage
#[cfg(not(feature = "ssr"))]
fn load_from_storage() -> Option<StoredSession> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let json = storage.get_item(STORAGE_KEY_SESSION).ok()??;
    serde_json::from_str(&json).ok()
}

/// Save the session to localStorage
#[cfg(not(feature = "ssr"))]
fn save_to_storage(stored: &StoredSession) {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            if let Ok(json) = serde_json::to_string(stored) {
                let _ = storage.set_item(STORAGE_KEY_SESSION, &json);
            }
        }
    }
}

/// Clear the session from localStorage
#[cfg(not(feature = "ssr"))]
fn clear_storage() {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.remove_item(STORAGE_KEY_SESSION);
        }
    }
}

#[cfg(feature = "ssr")]
fn load_from_storage() -> Option<StoredSession> {
    None
}

#[cfg(feature = "ssr")]
fn save_to_storage(_stored: &StoredSession) {}

#[cfg(feature = "ssr")]
fn clear_storage() {}
