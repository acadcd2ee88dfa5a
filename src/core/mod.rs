//! Core domain logic: collaborator contract, profile documents and the
//! sign-in/registration flow. No components live here.

pub mod auth_flow;
pub mod backend;
pub mod config;
#[cfg(feature = "ssr")]
pub mod oauth_callback;
pub mod profile;
#[cfg(test)]
mod tests;

pub use auth_flow::{
    AuthFlow, AuthMessage, AuthMode, CLOSE_DELAY, CredentialsForm, MessageKind, ModalState,
};
pub use backend::{BackendClient, Session};
pub use profile::{Role, UserProfile, VendorDetails, VendorProfile};
