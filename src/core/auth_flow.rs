//! Sign-in and registration flow
//!
//! Decides which collaborator calls to make for the modal's login/register
//! toggle and client/vendor toggle, and turns the outcome into the message
//! shown to the user. Kept free of UI types so it can be driven from tests.

use std::time::Duration;

use crate::core::backend::{
    AuthError, BackendClient, OAuthProvider, StoreError, USERS_COLLECTION, VENDORS_COLLECTION,
};
use crate::core::profile::{Role, UserProfile, VendorDetails, VendorProfile};

/// How long a success message stays up before the modal closes
pub const CLOSE_DELAY: Duration = Duration::from_millis(800);

pub const LOGIN_SUCCESSFUL: &str = "Login successful";
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful";
pub const GOOGLE_ACCOUNT_CREATED: &str = "Account created with Google";
pub const GOOGLE_LOGIN_SUCCESSFUL: &str = "Login successful with Google";
pub const VENDOR_DETAILS_REQUIRED: &str = "Please fill in all vendor details.";

/// Which tab of the modal is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Everything the modal's form collects
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub vendor: VendorDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Failure,
}

/// Message shown in the modal, tagged with its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl AuthMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Failure,
            text: text.into(),
        }
    }

    /// Successful outcomes close the modal after [`CLOSE_DELAY`]
    pub fn is_success(&self) -> bool {
        self.kind == MessageKind::Success
    }
}

impl CredentialsForm {
    /// Email and password are both filled in; the inputs are `required`,
    /// so the browser normally blocks the submit before this is checked
    pub fn has_credentials(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

/// Everything the modal shows between submissions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalState {
    pub mode: AuthMode,
    pub form: CredentialsForm,
    pub message: Option<AuthMessage>,
}

impl ModalState {
    /// Switching tabs drops the previous outcome but keeps the fields
    pub fn switch_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.message = None;
    }

    /// Show an outcome. Returns true when the modal should close after
    /// [`CLOSE_DELAY`]; on failure the fields are kept for a retry.
    pub fn show_outcome(&mut self, outcome: AuthMessage) -> bool {
        let close = outcome.is_success();
        self.message = Some(outcome);
        close
    }

    /// Clear the form and message once the modal has closed; the tab is kept
    pub fn reset_after_close(&mut self) {
        self.form = CredentialsForm::default();
        self.message = None;
    }
}

/// Why an attempt ended without success
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Please fill in all vendor details.")]
    IncompleteVendorDetails,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs modal submissions against the collaborator
#[derive(Clone)]
pub struct AuthFlow {
    client: BackendClient,
}

impl AuthFlow {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Email/password submission for either tab
    pub async fn submit_credentials(&self, mode: AuthMode, form: &CredentialsForm) -> AuthMessage {
        let result = match mode {
            AuthMode::Login => self.login(form).await,
            AuthMode::Register => self.register(form).await,
        };
        Self::into_message(result)
    }

    /// Google popup sign-in, creating a client profile on first use
    pub async fn sign_in_with_google(&self) -> AuthMessage {
        Self::into_message(self.social_sign_in(OAuthProvider::Google).await)
    }

    async fn login(&self, form: &CredentialsForm) -> Result<AuthMessage, FlowError> {
        self.client.auth().sign_in(&form.email, &form.password).await?;
        Ok(AuthMessage::success(LOGIN_SUCCESSFUL))
    }

    async fn register(&self, form: &CredentialsForm) -> Result<AuthMessage, FlowError> {
        if form.role == Role::Vendor && !form.vendor.is_complete() {
            return Err(FlowError::IncompleteVendorDetails);
        }

        let identity = self
            .client
            .auth()
            .create_account(&form.email, &form.password)
            .await?;

        let profile = UserProfile::registered(&form.email, form.role, &form.vendor);
        self.client
            .store()
            .set_document(USERS_COLLECTION, &identity.uid, profile.to_document())
            .await?;

        // Second write is not atomic with the first: a failure here leaves
        // the user profile without its vendor record
        if form.role == Role::Vendor {
            let vendor = VendorProfile {
                user_id: identity.uid.clone(),
                email: form.email.clone(),
                details: form.vendor.clone(),
            };
            self.client
                .store()
                .set_document(VENDORS_COLLECTION, &identity.uid, vendor.to_document())
                .await?;
        }

        Ok(AuthMessage::success(REGISTRATION_SUCCESSFUL))
    }

    async fn social_sign_in(&self, provider: OAuthProvider) -> Result<AuthMessage, FlowError> {
        let sign_in = self.client.auth().sign_in_with_popup(provider).await?;
        let uid = &sign_in.identity.uid;

        let existing = self
            .client
            .store()
            .get_document(USERS_COLLECTION, uid)
            .await?;
        if existing.is_some() {
            return Ok(AuthMessage::success(GOOGLE_LOGIN_SUCCESSFUL));
        }

        let profile = UserProfile::social(sign_in.email.as_deref(), provider.tag());
        self.client
            .store()
            .set_document(USERS_COLLECTION, uid, profile.to_document())
            .await?;

        Ok(AuthMessage::success(GOOGLE_ACCOUNT_CREATED))
    }

    fn into_message(result: Result<AuthMessage, FlowError>) -> AuthMessage {
        result.unwrap_or_else(|err| {
            leptos::logging::error!("Authentication failed: {:?}", err);
            AuthMessage::failure(err.to_string())
        })
    }
}
