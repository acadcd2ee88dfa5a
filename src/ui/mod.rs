pub mod auth;
pub mod common;
pub mod icon;
pub mod navbar;
pub mod pages;

pub use auth::{AuthModal, provide_backend_client, provide_backend_client_or_else};
pub use icon::{Icon, icons};
pub use navbar::Navbar;
pub use pages::{HomePage, NotFoundPage};
