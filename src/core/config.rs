//! Backend configuration from environment variables.
//!
//! On the server, load with `BackendConfig::from_env()` after calling
//! `dotenvy::dotenv()`. The WASM bundle has no process environment, so each
//! value falls back to the same variable captured when the bundle was built.

/// Firebase web API key (public, identifies the project to the REST APIs)
pub const API_KEY_VAR: &str = "SOLELINK_FIREBASE_API_KEY";
/// Firebase / Firestore project id
pub const PROJECT_ID_VAR: &str = "SOLELINK_FIREBASE_PROJECT_ID";
/// OAuth client id used for the Google sign-in popup
pub const GOOGLE_CLIENT_ID_VAR: &str = "SOLELINK_GOOGLE_CLIENT_ID";

/// Collaborator configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub google_client_id: Option<String>,
}

/// Complete settings for the Firebase collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub project_id: String,
    /// Without it the Google popup reports itself as unavailable
    pub google_client_id: Option<String>,
}

impl BackendConfig {
    /// Load configuration from environment variables, falling back to
    /// build-time values.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve each variable through `lookup`, then the build-time value
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str, compiled: Option<&'static str>| {
            lookup(name)
                .or_else(|| compiled.map(str::to_string))
                .filter(|value| !value.trim().is_empty())
        };

        Self {
            api_key: read(API_KEY_VAR, option_env!("SOLELINK_FIREBASE_API_KEY")),
            project_id: read(PROJECT_ID_VAR, option_env!("SOLELINK_FIREBASE_PROJECT_ID")),
            google_client_id: read(
                GOOGLE_CLIENT_ID_VAR,
                option_env!("SOLELINK_GOOGLE_CLIENT_ID"),
            ),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_project_id(&self) -> bool {
        self.project_id.is_some()
    }

    pub fn has_google_client_id(&self) -> bool {
        self.google_client_id.is_some()
    }

    /// Firebase settings, only when both the API key and project id are present
    pub fn firebase(&self) -> Option<FirebaseSettings> {
        Some(FirebaseSettings {
            api_key: self.api_key.clone()?,
            project_id: self.project_id.clone()?,
            google_client_id: self.google_client_id.clone(),
        })
    }
}
