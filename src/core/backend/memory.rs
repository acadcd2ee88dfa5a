//! In-process collaborator
//!
//! Keeps accounts, documents and the session in memory. Used when no remote
//! backend is configured and as the test double for the sign-in flow: every
//! call is recorded, and writes or sign-out can be made to fail on demand.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    AuthError, AuthProvider, Document, DocumentStore, Identity, OAuthProvider, OAuthSignIn,
    Session, SessionBroadcaster, SessionListener, StoreError, Subscription,
    resolve_server_timestamps,
};

/// Minimum password length, matching the hosted identity service
const MIN_PASSWORD_LEN: usize = 6;

/// A call made against the backend, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SignIn { email: String },
    CreateAccount { email: String },
    OAuthPopup { provider: OAuthProvider },
    SignOut,
    GetDocument { collection: String, key: String },
    SetDocument { collection: String, key: String },
}

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    documents: BTreeMap<(String, String), Document>,
    calls: Vec<BackendCall>,
    oauth_account: Option<OAuthSignIn>,
    failing_collections: HashMap<String, String>,
    sign_out_failure: Option<String>,
}

/// Collaborator that lives entirely in process memory
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    sessions: SessionBroadcaster,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pre-register an email/password account
    pub fn with_account(self, email: &str, password: &str) -> Self {
        let uid = Uuid::new_v4().to_string();
        self.state().accounts.insert(
            email.to_string(),
            Account {
                uid,
                password: password.to_string(),
            },
        );
        self
    }

    /// Identity returned by every subsequent popup sign-in
    pub fn set_oauth_account(&self, uid: &str, email: Option<&str>) {
        self.state().oauth_account = Some(OAuthSignIn {
            identity: Identity {
                uid: uid.to_string(),
            },
            email: email.map(str::to_string),
        });
    }

    /// Make writes to `collection` fail with `message`
    pub fn fail_writes_to(&self, collection: &str, message: &str) {
        self.state()
            .failing_collections
            .insert(collection.to_string(), message.to_string());
    }

    /// Make sign-out fail with `message`
    pub fn fail_sign_out(&self, message: &str) {
        self.state().sign_out_failure = Some(message.to_string());
    }

    /// Stored document, with server timestamps already resolved
    pub fn document(&self, collection: &str, key: &str) -> Option<Document> {
        self.state()
            .documents
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    /// Uid of a registered account
    pub fn uid_for(&self, email: &str) -> Option<String> {
        self.state().accounts.get(email).map(|a| a.uid.clone())
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    /// Number of writes made to `collection`
    pub fn writes_to(&self, collection: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| {
                matches!(call, BackendCall::SetDocument { collection: c, .. } if c == collection)
            })
            .count()
    }

    /// Number of documents stored in `collection`
    pub fn document_count(&self, collection: &str) -> usize {
        self.state()
            .documents
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.sessions.current()
    }

    fn record(&self, call: BackendCall) {
        self.state().calls.push(call);
    }
}

#[async_trait(?Send)]
impl AuthProvider for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let uid = {
            let mut state = self.state();
            state.calls.push(BackendCall::SignIn {
                email: email.to_string(),
            });
            match state.accounts.get(email) {
                Some(account) if account.password == password => account.uid.clone(),
                _ => {
                    return Err(AuthError::Rejected(
                        "INVALID_LOGIN_CREDENTIALS".to_string(),
                    ));
                }
            }
        };

        let session = Session {
            uid,
            email: Some(email.to_string()),
        };
        self.sessions.publish(Some(session.clone()));
        Ok(session)
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let uid = {
            let mut state = self.state();
            state.calls.push(BackendCall::CreateAccount {
                email: email.to_string(),
            });

            if !email.contains('@') {
                return Err(AuthError::Rejected("INVALID_EMAIL".to_string()));
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AuthError::Rejected(format!(
                    "WEAK_PASSWORD : Password should be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            if state.accounts.contains_key(email) {
                return Err(AuthError::Rejected("EMAIL_EXISTS".to_string()));
            }

            let uid = Uuid::new_v4().to_string();
            state.accounts.insert(
                email.to_string(),
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                },
            );
            uid
        };

        self.sessions.publish(Some(Session {
            uid: uid.clone(),
            email: Some(email.to_string()),
        }));
        Ok(Identity { uid })
    }

    async fn sign_in_with_popup(
        &self,
        provider: OAuthProvider,
    ) -> Result<OAuthSignIn, AuthError> {
        let sign_in = {
            let mut state = self.state();
            state.calls.push(BackendCall::OAuthPopup { provider });
            state.oauth_account.clone().ok_or_else(|| {
                AuthError::Rejected("OPERATION_NOT_ALLOWED".to_string())
            })?
        };

        self.sessions.publish(Some(Session::from(&sign_in)));
        Ok(sign_in)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.record(BackendCall::SignOut);
        if let Some(message) = self.state().sign_out_failure.clone() {
            return Err(AuthError::Rejected(message));
        }

        self.sessions.publish(None);
        Ok(())
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.sessions.subscribe(listener)
    }
}

#[async_trait(?Send)]
impl DocumentStore for MemoryBackend {
    async fn get_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        let mut state = self.state();
        state.calls.push(BackendCall::GetDocument {
            collection: collection.to_string(),
            key: key.to_string(),
        });
        Ok(state
            .documents
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        mut fields: Document,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.push(BackendCall::SetDocument {
            collection: collection.to_string(),
            key: key.to_string(),
        });

        if let Some(message) = state.failing_collections.get(collection) {
            return Err(StoreError::Rejected(message.clone()));
        }

        resolve_server_timestamps(&mut fields, Utc::now());
        state
            .documents
            .insert((collection.to_string(), key.to_string()), fields);
        Ok(())
    }
}
