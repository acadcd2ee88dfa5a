//! Backend client and session state for the component tree
//!
//! The [`BackendClient`] is built once in `App` and provided through context.
//! Components read the current session through [`use_session`], which keeps a
//! signal in sync with the collaborator's session stream.

use std::sync::Arc;

use leptos::prelude::*;

use crate::core::{BackendClient, Session};

/// Provide the backend client to the component tree
pub fn provide_backend_client(client: BackendClient) -> BackendClient {
    provide_context(client.clone());
    client
}

/// Provide the client already in context (the server builds one at startup),
/// or build one with `build` when there is none
pub fn provide_backend_client_or_else(build: impl FnOnce() -> BackendClient) -> BackendClient {
    let client = use_context::<BackendClient>().unwrap_or_else(build);
    provide_backend_client(client)
}

/// Get the backend client from the component tree
pub fn use_backend_client() -> BackendClient {
    expect_context::<BackendClient>()
}

/// Current session, updated on every transition of the session stream.
///
/// Starts as `None` on both server and client to avoid a hydration mismatch;
/// the subscription is made after hydration and released when the owning
/// component is torn down.
pub fn use_session() -> ReadSignal<Option<Session>> {
    let client = use_backend_client();
    let session = RwSignal::new(None::<Session>);

    Effect::new(move |_| {
        let subscription = client.auth().subscribe(Arc::new(move |next: Option<Session>| {
            session.try_set(next);
        }));
        on_cleanup(move || subscription.unsubscribe());
    });

    session.read_only()
}

/// Sign out; failures are logged and never shown to the user
pub async fn logout(client: &BackendClient) {
    if let Err(err) = client.auth().sign_out().await {
        leptos::logging::error!("Sign-out failed: {}", err);
    }
}
