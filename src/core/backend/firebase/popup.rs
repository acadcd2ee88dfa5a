//! Google sign-in popup (browser only)
//!
//! Opens Google's authorization endpoint in a popup with
//! `response_type=id_token`. Google redirects the popup to `/auth/callback`,
//! which posts its URL fragment back to this window and closes itself.

use crate::core::backend::AuthError;

/// Path served by the app that relays the OAuth fragment to the opener
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Google id token and the origin it was issued for
#[derive(Debug)]
pub struct GoogleToken {
    pub id_token: String,
    pub origin: String,
}

#[cfg(not(feature = "ssr"))]
pub async fn request_google_id_token(client_id: &str) -> Result<GoogleToken, AuthError> {
    use std::sync::{Arc, Mutex, PoisonError};

    use gloo_timers::future::TimeoutFuture;
    use leptos::prelude::window_event_listener_untyped;
    use wasm_bindgen::JsCast;
    use uuid::Uuid;

    use super::wire::parse_callback_fragment;

    const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
    const POLL_MS: u32 = 300;

    let window = web_sys::window().ok_or(AuthError::Unsupported("Popup sign-in"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| AuthError::Network(format!("{:?}", e)))?;

    let state = Uuid::new_v4().simple().to_string();
    let nonce = Uuid::new_v4().simple().to_string();
    let redirect_uri = format!("{origin}{CALLBACK_PATH}");
    let encode = |value: &str| String::from(js_sys::encode_uri_component(value));
    let url = format!(
        "{AUTHORIZE_URL}?client_id={}&redirect_uri={}&response_type=id_token&scope={}&state={state}&nonce={nonce}&prompt=select_account",
        encode(client_id),
        encode(&redirect_uri),
        encode("openid email profile"),
    );

    let popup = window
        .open_with_url_and_target_and_features(&url, "solelink-google", "width=500,height=640")
        .map_err(|_| AuthError::PopupBlocked)?
        .ok_or(AuthError::PopupBlocked)?;

    let fragment = Arc::new(Mutex::new(None::<String>));
    let listener = {
        let fragment = Arc::clone(&fragment);
        let origin = origin.clone();
        window_event_listener_untyped("message", move |ev| {
            let Some(message) = ev.dyn_ref::<web_sys::MessageEvent>() else {
                return;
            };
            if message.origin() != origin {
                return;
            }
            if let Some(data) = message.data().as_string() {
                *fragment.lock().unwrap_or_else(PoisonError::into_inner) = Some(data);
            }
        })
    };

    let result = loop {
        TimeoutFuture::new(POLL_MS).await;

        let received = fragment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(received) = received {
            let _ = popup.close();
            break parse_callback_fragment(&received, &state);
        }
        if popup.closed().unwrap_or(true) {
            break Err(AuthError::PopupClosed);
        }
    };
    listener.remove();

    Ok(GoogleToken {
        id_token: result?,
        origin,
    })
}

#[cfg(feature = "ssr")]
pub async fn request_google_id_token(_client_id: &str) -> Result<GoogleToken, AuthError> {
    Err(AuthError::Unsupported("Popup sign-in"))
}
