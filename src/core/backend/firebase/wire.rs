//! Request/response shapes for the Identity Toolkit, Secure Token and
//! Firestore REST APIs, plus Firestore value encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::core::backend::{AuthError, Document, FieldValue, Session, StoreError};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Email/password body for `accounts:signInWithPassword` and `accounts:signUp`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Body for `accounts:signInWithIdp`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpRequest {
    pub post_body: String,
    pub request_uri: String,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

impl IdpRequest {
    pub fn new(id_token: &str, provider_id: &str, request_uri: &str) -> Self {
        Self {
            post_body: format!("id_token={id_token}&providerId={provider_id}"),
            request_uri: request_uri.to_string(),
            return_secure_token: true,
            return_idp_credential: true,
        }
    }
}

/// Successful Identity Toolkit sign-in/sign-up response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    /// Seconds, sent as a string
    pub expires_in: String,
}

/// Body for the Secure Token refresh endpoint
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub grant_type: &'static str,
    pub refresh_token: &'a str,
}

impl<'a> RefreshRequest<'a> {
    pub fn new(refresh_token: &'a str) -> Self {
        Self {
            grant_type: "refresh_token",
            refresh_token,
        }
    }
}

/// Secure Token refresh response
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

/// Signed-in state persisted between page loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub uid: String,
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
}

impl StoredSession {
    pub fn from_identity(response: IdentityResponse, now: i64) -> Self {
        let expires_at = now + parse_expires_in(&response.expires_in);
        Self {
            uid: response.local_id,
            email: response.email,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at,
        }
    }

    pub fn session(&self) -> Session {
        Session {
            uid: self.uid.clone(),
            email: self.email.clone(),
        }
    }

    /// Whether the id token expires within `margin` seconds of `now`
    pub fn needs_refresh(&self, now: i64, margin: i64) -> bool {
        self.expires_at <= now + margin
    }

    pub fn apply_refresh(&mut self, response: RefreshResponse, now: i64) {
        self.expires_at = now + parse_expires_in(&response.expires_in);
        self.id_token = response.id_token;
        self.refresh_token = response.refresh_token;
    }
}

fn parse_expires_in(raw: &str) -> i64 {
    // Identity Toolkit tokens last an hour
    raw.trim().parse().unwrap_or(3600)
}

/// Text of a Google REST error envelope (`{"error": {"message": ...}}`)
pub fn rejection_message(status: u16, body: &Value) -> String {
    body.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

pub fn auth_rejection(status: u16, body: &Value) -> AuthError {
    AuthError::Rejected(rejection_message(status, body))
}

pub fn store_rejection(status: u16, body: &Value) -> StoreError {
    StoreError::Rejected(rejection_message(status, body))
}

/// Resource name of a document inside the default database
pub fn document_name(project_id: &str, collection: &str, key: &str) -> String {
    format!("projects/{project_id}/databases/(default)/documents/{collection}/{key}")
}

pub fn document_url(project_id: &str, collection: &str, key: &str) -> String {
    format!(
        "{FIRESTORE_URL}/{}",
        document_name(project_id, collection, key)
    )
}

pub fn commit_url(project_id: &str) -> String {
    format!("{FIRESTORE_URL}/projects/{project_id}/databases/(default)/documents:commit")
}

/// Build a `documents:commit` body that fully overwrites one document.
/// Server timestamps become `REQUEST_TIME` field transforms.
pub fn commit_request(project_id: &str, collection: &str, key: &str, document: &Document) -> Value {
    let mut fields = Map::new();
    let mut transforms = Vec::new();

    for (name, value) in document {
        match value {
            FieldValue::String(text) => {
                fields.insert(name.clone(), json!({ "stringValue": text }));
            }
            FieldValue::Timestamp(at) => {
                fields.insert(name.clone(), json!({ "timestampValue": at.to_rfc3339() }));
            }
            FieldValue::ServerTimestamp => {
                transforms.push(json!({
                    "fieldPath": name,
                    "setToServerValue": "REQUEST_TIME",
                }));
            }
        }
    }

    let mut write = json!({
        "update": {
            "name": document_name(project_id, collection, key),
            "fields": fields,
        }
    });
    if !transforms.is_empty() {
        write["updateTransforms"] = Value::Array(transforms);
    }

    json!({ "writes": [write] })
}

/// Decode the `fields` of a Firestore document resource.
/// Value types this app never writes are skipped.
pub fn decode_document(body: &Value) -> Result<Document, StoreError> {
    let Some(fields) = body.get("fields") else {
        return Ok(Document::new());
    };
    let fields = fields
        .as_object()
        .ok_or_else(|| StoreError::Malformed("`fields` is not an object".to_string()))?;

    let mut document = Document::new();
    for (name, value) in fields {
        if let Some(text) = value.get("stringValue").and_then(Value::as_str) {
            document.insert(name.clone(), FieldValue::String(text.to_string()));
        } else if let Some(raw) = value.get("timestampValue").and_then(Value::as_str) {
            let at = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| StoreError::Malformed(format!("{name}: {e}")))?
                .with_timezone(&Utc);
            document.insert(name.clone(), FieldValue::Timestamp(at));
        }
    }

    Ok(document)
}

/// Pull the id token out of an OAuth redirect fragment
/// (`#id_token=...&state=...` or `#error=access_denied&state=...`).
/// The `state` must echo the value sent with the authorization request.
pub fn parse_callback_fragment(fragment: &str, expected_state: &str) -> Result<String, AuthError> {
    let mut id_token = None;
    let mut error = None;
    let mut state = None;

    for pair in fragment.trim_start_matches('#').split('&') {
        match pair.split_once('=') {
            Some(("id_token", value)) if !value.is_empty() => id_token = Some(value),
            Some(("error", value)) => error = Some(value),
            Some(("state", value)) => state = Some(value),
            _ => {}
        }
    }

    if state != Some(expected_state) {
        return Err(AuthError::Rejected("INVALID_OAUTH_STATE".to_string()));
    }

    match (id_token, error) {
        (Some(token), _) => Ok(token.to_string()),
        (None, Some(error)) => Err(AuthError::Rejected(error.to_string())),
        (None, None) => Err(AuthError::Rejected("MISSING_ID_TOKEN".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::server_timestamp;

    // ========================================================================
    // Identity Toolkit
    // ========================================================================

    #[test]
    fn test_password_request_uses_camel_case() {
        let body = serde_json::to_value(PasswordRequest {
            email: "a@b.com",
            password: "x",
            return_secure_token: true,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({ "email": "a@b.com", "password": "x", "returnSecureToken": true })
        );
    }

    #[test]
    fn test_idp_request_post_body() {
        let request = IdpRequest::new("tok.en", "google.com", "http://localhost:3000");
        assert_eq!(request.post_body, "id_token=tok.en&providerId=google.com");
        assert_eq!(request.request_uri, "http://localhost:3000");
    }

    #[test]
    fn test_identity_response_to_stored_session() {
        let response: IdentityResponse = serde_json::from_value(json!({
            "localId": "uid-1",
            "email": "a@b.com",
            "idToken": "id",
            "refreshToken": "refresh",
            "expiresIn": "3600",
            "registered": true
        }))
        .unwrap();

        let stored = StoredSession::from_identity(response, 1_000);

        assert_eq!(stored.expires_at, 4_600);
        assert_eq!(
            stored.session(),
            Session {
                uid: "uid-1".to_string(),
                email: Some("a@b.com".to_string()),
            }
        );
    }

    #[test]
    fn test_identity_response_without_email() {
        let response: IdentityResponse = serde_json::from_value(json!({
            "localId": "uid-2",
            "idToken": "id",
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }))
        .unwrap();

        assert!(response.email.is_none());
    }

    #[test]
    fn test_refresh_window() {
        let mut stored = StoredSession {
            uid: "u".to_string(),
            email: None,
            id_token: "old".to_string(),
            refresh_token: "r1".to_string(),
            expires_at: 1_050,
        };

        assert!(stored.needs_refresh(1_000, 60));
        assert!(!stored.needs_refresh(900, 60));

        stored.apply_refresh(
            RefreshResponse {
                id_token: "new".to_string(),
                refresh_token: "r2".to_string(),
                expires_in: "3600".to_string(),
            },
            1_000,
        );
        assert_eq!(stored.id_token, "new");
        assert_eq!(stored.refresh_token, "r2");
        assert_eq!(stored.expires_at, 4_600);
    }

    #[test]
    fn test_rejection_message_from_envelope() {
        let body = json!({ "error": { "code": 400, "message": "EMAIL_EXISTS" } });
        assert_eq!(rejection_message(400, &body), "EMAIL_EXISTS");
        assert_eq!(
            rejection_message(502, &Value::Null),
            "Request failed with status 502"
        );
    }

    // ========================================================================
    // Firestore
    // ========================================================================

    #[test]
    fn test_document_url() {
        assert_eq!(
            document_url("solelink", "Users", "uid-1"),
            "https://firestore.googleapis.com/v1/projects/solelink/databases/(default)/documents/Users/uid-1"
        );
    }

    #[test]
    fn test_commit_request_turns_server_timestamp_into_transform() {
        let mut document = Document::new();
        document.insert("email".to_string(), "a@b.com".into());
        document.insert("role".to_string(), "client".into());
        document.insert("createdAt".to_string(), server_timestamp());

        let body = commit_request("solelink", "Users", "uid-1", &document);

        let write = &body["writes"][0];
        assert_eq!(
            write["update"]["name"],
            "projects/solelink/databases/(default)/documents/Users/uid-1"
        );
        assert_eq!(write["update"]["fields"]["email"]["stringValue"], "a@b.com");
        assert_eq!(write["update"]["fields"]["role"]["stringValue"], "client");
        assert!(write["update"]["fields"].get("createdAt").is_none());
        assert_eq!(
            write["updateTransforms"],
            json!([{ "fieldPath": "createdAt", "setToServerValue": "REQUEST_TIME" }])
        );
    }

    #[test]
    fn test_commit_request_without_transforms() {
        let mut document = Document::new();
        document.insert("city".to_string(), "NYC".into());

        let body = commit_request("solelink", "Vendors", "uid-1", &document);

        assert!(body["writes"][0].get("updateTransforms").is_none());
    }

    #[test]
    fn test_decode_document() {
        let body = json!({
            "name": "projects/solelink/databases/(default)/documents/Users/uid-1",
            "fields": {
                "email": { "stringValue": "a@b.com" },
                "createdAt": { "timestampValue": "2025-01-02T03:04:05.678Z" },
                "visits": { "integerValue": "3" }
            }
        });

        let document = decode_document(&body).unwrap();

        assert_eq!(document["email"].as_str(), Some("a@b.com"));
        assert!(document["createdAt"].as_timestamp().is_some());
        assert!(!document.contains_key("visits"));
    }

    #[test]
    fn test_decode_document_rejects_bad_timestamp() {
        let body = json!({ "fields": { "createdAt": { "timestampValue": "yesterday" } } });
        assert!(matches!(
            decode_document(&body),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_empty_document() {
        let body = json!({ "name": "projects/p/databases/(default)/documents/Users/u" });
        assert!(decode_document(&body).unwrap().is_empty());
    }

    // ========================================================================
    // OAuth callback
    // ========================================================================

    #[test]
    fn test_parse_callback_fragment() {
        assert_eq!(
            parse_callback_fragment("#state=abc&id_token=eyJ.payload.sig&authuser=0", "abc")
                .unwrap(),
            "eyJ.payload.sig"
        );
        assert_eq!(
            parse_callback_fragment("#error=access_denied&state=abc", "abc").unwrap_err(),
            AuthError::Rejected("access_denied".to_string())
        );
        assert_eq!(
            parse_callback_fragment("#state=abc", "abc").unwrap_err(),
            AuthError::Rejected("MISSING_ID_TOKEN".to_string())
        );
    }

    #[test]
    fn test_parse_callback_fragment_checks_state() {
        assert_eq!(
            parse_callback_fragment("#state=forged&id_token=eyJ.payload.sig", "abc").unwrap_err(),
            AuthError::Rejected("INVALID_OAUTH_STATE".to_string())
        );
        assert_eq!(
            parse_callback_fragment("", "abc").unwrap_err(),
            AuthError::Rejected("INVALID_OAUTH_STATE".to_string())
        );
    }
}
