#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::core::backend::{
        AuthError, BackendCall, BackendClient, FieldValue, MemoryBackend, OAuthProvider, Session,
        USERS_COLLECTION, VENDORS_COLLECTION,
    };
    use crate::core::{
        AuthFlow, AuthMessage, AuthMode, CredentialsForm, MessageKind, Role, UserProfile,
        VendorDetails,
    };

    fn setup(backend: MemoryBackend) -> (Arc<MemoryBackend>, AuthFlow) {
        let backend = Arc::new(backend);
        let flow = AuthFlow::new(BackendClient::from_backend(Arc::clone(&backend)));
        (backend, flow)
    }

    fn form(email: &str, password: &str, role: Role) -> CredentialsForm {
        CredentialsForm {
            email: email.to_string(),
            password: password.to_string(),
            role,
            vendor: VendorDetails::default(),
        }
    }

    // ========================================================================
    // Vendor validation
    // ========================================================================

    #[tokio::test]
    async fn test_vendor_without_business_details_makes_no_calls() {
        let (backend, flow) = setup(MemoryBackend::new());
        let mut form = form("v@d.com", "secret1", Role::Vendor);
        form.vendor.city = "NYC".to_string();
        form.vendor.zip_code = "10001".to_string();

        let message = flow.submit_credentials(AuthMode::Register, &form).await;

        assert_eq!(message.kind, MessageKind::Failure);
        assert_eq!(message.text, "Please fill in all vendor details.");
        assert!(backend.calls().is_empty());
        assert!(backend.uid_for("v@d.com").is_none());
    }

    #[tokio::test]
    async fn test_client_registration_ignores_blank_vendor_fields() {
        let (backend, flow) = setup(MemoryBackend::new());

        let message = flow
            .submit_credentials(AuthMode::Register, &form("c@d.com", "secret1", Role::Client))
            .await;

        assert_eq!(message, AuthMessage::success("Registration successful"));
        assert_eq!(backend.writes_to(USERS_COLLECTION), 1);
        assert_eq!(backend.writes_to(VENDORS_COLLECTION), 0);

        let uid = backend.uid_for("c@d.com").unwrap();
        let stored = backend.document(USERS_COLLECTION, &uid).unwrap();
        assert_eq!(
            stored.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["createdAt", "email", "role"]
        );
        assert!(matches!(stored["createdAt"], FieldValue::Timestamp(_)));
    }

    // ========================================================================
    // Login
    // ========================================================================

    #[tokio::test]
    async fn test_login_with_valid_credentials() {
        let (backend, flow) = setup(MemoryBackend::new().with_account("a@b.com", "x"));

        let message = flow
            .submit_credentials(AuthMode::Login, &form("a@b.com", "x", Role::Client))
            .await;

        assert_eq!(message, AuthMessage::success("Login successful"));
        assert!(message.is_success());
        assert_eq!(
            backend.current_session().and_then(|s| s.email),
            Some("a@b.com".to_string())
        );
        assert_eq!(
            backend.calls(),
            vec![BackendCall::SignIn {
                email: "a@b.com".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_collaborator_error_text_is_shown_verbatim() {
        let (_backend, flow) = setup(MemoryBackend::new());

        let message = flow
            .submit_credentials(AuthMode::Register, &form("c@d.com", "y", Role::Client))
            .await;

        assert_eq!(
            message,
            AuthMessage::failure("WEAK_PASSWORD : Password should be at least 6 characters")
        );
    }

    // ========================================================================
    // Google sign-in
    // ========================================================================

    #[tokio::test]
    async fn test_google_sign_in_is_idempotent() {
        let (backend, flow) = setup(MemoryBackend::new());
        backend.set_oauth_account("g-uid", Some("g@b.com"));

        let first = flow.sign_in_with_google().await;
        let created = backend.document(USERS_COLLECTION, "g-uid").unwrap();
        let second = flow.sign_in_with_google().await;

        assert_eq!(first, AuthMessage::success("Account created with Google"));
        assert_eq!(second, AuthMessage::success("Login successful with Google"));
        assert_eq!(backend.writes_to(USERS_COLLECTION), 1);
        assert_eq!(backend.document_count(USERS_COLLECTION), 1);
        assert_eq!(backend.document(USERS_COLLECTION, "g-uid"), Some(created));

        let profile =
            UserProfile::from_document(&backend.document(USERS_COLLECTION, "g-uid").unwrap())
                .unwrap();
        assert_eq!(profile.email, "g@b.com");
        assert_eq!(profile.role, Role::Client);
        assert_eq!(profile.provider.as_deref(), Some("google"));
    }

    #[tokio::test]
    async fn test_google_sign_in_reads_before_writing() {
        let (backend, flow) = setup(MemoryBackend::new());
        backend.set_oauth_account("g-uid", None);

        flow.sign_in_with_google().await;

        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::OAuthPopup {
                    provider: OAuthProvider::Google
                },
                BackendCall::GetDocument {
                    collection: USERS_COLLECTION.to_string(),
                    key: "g-uid".to_string(),
                },
                BackendCall::SetDocument {
                    collection: USERS_COLLECTION.to_string(),
                    key: "g-uid".to_string(),
                },
            ]
        );
    }

    // ========================================================================
    // Partial registration
    // ========================================================================

    #[tokio::test]
    async fn test_vendor_record_failure_keeps_orphaned_profile() {
        let (backend, flow) = setup(MemoryBackend::new());
        backend.fail_writes_to(VENDORS_COLLECTION, "PERMISSION_DENIED: Missing permissions");
        let form = CredentialsForm {
            vendor: VendorDetails {
                business_name: "Sneaker Hub".to_string(),
                city: "NYC".to_string(),
                zip_code: "10001".to_string(),
            },
            ..form("v@d.com", "secret1", Role::Vendor)
        };

        let message = flow.submit_credentials(AuthMode::Register, &form).await;

        assert_eq!(
            message,
            AuthMessage::failure("PERMISSION_DENIED: Missing permissions")
        );
        let uid = backend.uid_for("v@d.com").unwrap();
        let profile =
            UserProfile::from_document(&backend.document(USERS_COLLECTION, &uid).unwrap())
                .unwrap();
        assert_eq!(profile.role, Role::Vendor);
        assert_eq!(backend.document_count(VENDORS_COLLECTION), 0);
        // The account stays signed in
        assert_eq!(backend.current_session().map(|s| s.uid), Some(uid));
    }

    // ========================================================================
    // Session stream
    // ========================================================================

    #[tokio::test]
    async fn test_session_stream_follows_sign_in_and_sign_out() {
        let (backend, flow) = setup(MemoryBackend::new().with_account("a@b.com", "x"));
        let client = BackendClient::from_backend(Arc::clone(&backend));
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let subscription = client.auth().subscribe(Arc::new(move |session: Option<Session>| {
            sink.lock().unwrap().push(session.and_then(|s| s.email));
        }));

        flow.submit_credentials(AuthMode::Login, &form("a@b.com", "x", Role::Client))
            .await;
        client.auth().sign_out().await.unwrap();
        subscription.unsubscribe();
        flow.submit_credentials(AuthMode::Login, &form("a@b.com", "x", Role::Client))
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("a@b.com".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_failed_sign_out_is_reported() {
        let (backend, _flow) = setup(MemoryBackend::new());
        backend.fail_sign_out("NETWORK_REQUEST_FAILED");
        let client = BackendClient::from_backend(Arc::clone(&backend));

        let err = client.auth().sign_out().await.unwrap_err();

        assert_eq!(err, AuthError::Rejected("NETWORK_REQUEST_FAILED".to_string()));
    }
}
