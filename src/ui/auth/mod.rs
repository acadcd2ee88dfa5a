//! Authentication UI module
//!
//! Components and context for signing in, registering and signing out.

mod auth_modal;
mod context;

pub use auth_modal::AuthModal;
pub use context::{
    logout, provide_backend_client, provide_backend_client_or_else, use_backend_client,
    use_session,
};
