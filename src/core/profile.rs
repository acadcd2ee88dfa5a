//! User and vendor profile documents

use std::fmt;
use std::str::FromStr;

use crate::core::backend::{Document, FieldValue, server_timestamp};

/// Account role chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Client,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Vendor => "vendor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "client" => Ok(Role::Client),
            "vendor" => Ok(Role::Vendor),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// Business details collected from vendors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorDetails {
    pub business_name: String,
    pub city: String,
    pub zip_code: String,
}

impl VendorDetails {
    /// All three fields filled in
    pub fn is_complete(&self) -> bool {
        !self.business_name.is_empty() && !self.city.is_empty() && !self.zip_code.is_empty()
    }

    fn write_into(&self, document: &mut Document) {
        document.insert("businessName".into(), self.business_name.clone().into());
        document.insert("city".into(), self.city.clone().into());
        document.insert("zipCode".into(), self.zip_code.clone().into());
    }
}

/// Document stored in `Users/{uid}`
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub role: Role,
    /// Set when the account came from a social sign-in
    pub provider: Option<String>,
    /// Present only for vendors
    pub vendor: Option<VendorDetails>,
}

impl UserProfile {
    /// Profile created through the registration form
    pub fn registered(email: &str, role: Role, details: &VendorDetails) -> Self {
        Self {
            email: email.to_string(),
            role,
            provider: None,
            vendor: (role == Role::Vendor).then(|| details.clone()),
        }
    }

    /// Profile created on a first social sign-in; always a client
    pub fn social(email: Option<&str>, provider: &str) -> Self {
        Self {
            email: email.unwrap_or_default().to_string(),
            role: Role::Client,
            provider: Some(provider.to_string()),
            vendor: None,
        }
    }

    /// Fields to write, with `createdAt` left to the store
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("email".into(), self.email.clone().into());
        document.insert("role".into(), self.role.as_str().into());
        document.insert("createdAt".into(), server_timestamp());
        if let Some(provider) = &self.provider {
            document.insert("provider".into(), provider.clone().into());
        }
        if let Some(details) = &self.vendor {
            details.write_into(&mut document);
        }
        document
    }

    /// Read back a stored profile; `None` when `email` or `role` is missing
    pub fn from_document(document: &Document) -> Option<Self> {
        let text = |name: &str| document.get(name).and_then(FieldValue::as_str);

        let role: Role = text("role")?.parse().ok()?;
        let vendor = match role {
            Role::Vendor => Some(VendorDetails {
                business_name: text("businessName").unwrap_or_default().to_string(),
                city: text("city").unwrap_or_default().to_string(),
                zip_code: text("zipCode").unwrap_or_default().to_string(),
            }),
            Role::Client => None,
        };

        Some(Self {
            email: text("email")?.to_string(),
            role,
            provider: text("provider").map(str::to_string),
            vendor,
        })
    }
}

/// Document stored in `Vendors/{uid}`
#[derive(Debug, Clone, PartialEq)]
pub struct VendorProfile {
    pub user_id: String,
    pub email: String,
    pub details: VendorDetails,
}

impl VendorProfile {
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("userId".into(), self.user_id.clone().into());
        document.insert("email".into(), self.email.clone().into());
        self.details.write_into(&mut document);
        document.insert("createdAt".into(), server_timestamp());
        document
    }
}
