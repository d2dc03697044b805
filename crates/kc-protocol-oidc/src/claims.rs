//! Token claim sets that protocol mappers operate on.
//!
//! Only `sub`, `email` and the registered timing claims are fields; every
//! mapper-written claim lives in the flattened `additional` map so it
//! serializes at the top level of the token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Access token claims.
///
/// `UserInfo` responses are built on the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer.
    pub iss: String,

    /// Subject; rewritten by the pairwise subject mappers.
    pub sub: String,

    /// Audience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Authorized party.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    /// Preferred username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// Email address; rewritten by the pairwise email mapper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Mapper-written claims.
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

impl AccessTokenClaims {
    /// Creates claims issued now.
    #[must_use]
    pub fn new(issuer: String, subject: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            iss: issuer,
            sub: subject,
            aud: None,
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
            azp: None,
            preferred_username: None,
            email: None,
            additional: HashMap::new(),
        }
    }

    /// Sets the audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<Audience>) -> Self {
        self.aud = Some(audience.into());
        self
    }

    /// Sets the authorized party.
    #[must_use]
    pub fn with_azp(mut self, client_id: impl Into<String>) -> Self {
        self.azp = Some(client_id.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Adds a non-standard claim.
    #[must_use]
    pub fn with_claim(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.additional.insert(key.into(), value);
        self
    }
}

/// ID token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer.
    pub iss: String,

    /// Subject.
    pub sub: String,

    /// Audience, the client the token was issued to.
    pub aud: Audience,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Nonce echoed from the authentication request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Authorized party.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Mapper-written claims.
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

impl IdTokenClaims {
    /// Creates claims issued now.
    #[must_use]
    pub fn new(
        issuer: String,
        subject: String,
        audience: impl Into<Audience>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            iss: issuer,
            sub: subject,
            aud: audience.into(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
            nonce: None,
            azp: None,
            email: None,
            additional: HashMap::new(),
        }
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// The claim surface that protocol mappers rewrite.
///
/// A mapper written against this trait applies unchanged to access tokens,
/// ID tokens and `UserInfo` responses.
pub trait ClaimSet {
    /// Returns the subject claim.
    fn subject(&self) -> &str;

    /// Replaces the subject claim.
    fn set_subject(&mut self, subject: String);

    /// Returns the email claim.
    fn email(&self) -> Option<&str>;

    /// Replaces the email claim.
    fn set_email(&mut self, email: String);

    /// Returns the non-standard claims.
    fn other_claims(&self) -> &HashMap<String, serde_json::Value>;

    /// Returns the non-standard claims for modification.
    fn other_claims_mut(&mut self) -> &mut HashMap<String, serde_json::Value>;
}

macro_rules! claim_set {
    ($claims:ty) => {
        impl ClaimSet for $claims {
            fn subject(&self) -> &str {
                &self.sub
            }

            fn set_subject(&mut self, subject: String) {
                self.sub = subject;
            }

            fn email(&self) -> Option<&str> {
                self.email.as_deref()
            }

            fn set_email(&mut self, email: String) {
                self.email = Some(email);
            }

            fn other_claims(&self) -> &HashMap<String, serde_json::Value> {
                &self.additional
            }

            fn other_claims_mut(&mut self) -> &mut HashMap<String, serde_json::Value> {
                &mut self.additional
            }
        }
    };
}

claim_set!(AccessTokenClaims);
claim_set!(IdTokenClaims);

/// `aud` claim: one client or several.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience.
    Single(String),
    /// Multiple audiences.
    Multiple(Vec<String>),
}

impl Audience {
    /// Checks whether `value` is among the audiences.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::Single(s) => s == value,
            Self::Multiple(v) => v.iter().any(|s| s == value),
        }
    }
}

impl From<String> for Audience {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<&str> for Audience {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}
