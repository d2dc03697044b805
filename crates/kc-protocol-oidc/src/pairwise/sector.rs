//! Sector identifier resolution.
//!
//! A sector identifier groups the clients that must see the same pseudonym
//! for a user. It comes in two modes:
//!
//! - [`SectorMode::StaticUri`]: an absolute URI with scheme and host, e.g.
//!   `https://rp.example.org/sector_identifiers.json`.
//! - [`SectorMode::Simple`]: any non-blank string.
//!
//! In both modes the configured string itself is the HMAC input. URI mode
//! validates the shape and then passes the value through unchanged; it
//! does not reduce it to the host.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{PairwiseError, PairwiseResult};

/// How a configured sector identifier is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorMode {
    /// Absolute URI with scheme and host.
    StaticUri,
    /// Opaque non-blank string.
    Simple,
}

/// A validated sector identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectorIdentifier {
    value: String,
    mode: SectorMode,
}

impl SectorIdentifier {
    /// Resolves a configured value in the given mode.
    ///
    /// ## Errors
    ///
    /// - [`PairwiseError::MissingSectorIdentifier`] if `raw` is absent or blank.
    /// - [`PairwiseError::MalformedSectorIdentifier`] in URI mode if `raw` is
    ///   not an absolute URI with a scheme and a host.
    pub fn resolve(raw: Option<&str>, mode: SectorMode) -> PairwiseResult<Self> {
        let value = raw
            .filter(|v| !v.trim().is_empty())
            .ok_or(PairwiseError::MissingSectorIdentifier)?;

        if mode == SectorMode::StaticUri && !is_absolute_uri_with_host(value) {
            return Err(PairwiseError::MalformedSectorIdentifier(value.to_string()));
        }

        Ok(Self {
            value: value.to_string(),
            mode,
        })
    }

    /// Returns the identifier as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the bytes fed to the keyed hash.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.value.as_bytes()
    }

    /// Returns the resolution mode.
    #[must_use]
    pub const fn mode(&self) -> SectorMode {
        self.mode
    }
}

impl fmt::Display for SectorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Checks RFC 3986 shape: only legal URI characters, an explicit
/// `scheme://` authority, and a non-empty host.
///
/// The WHATWG parser in `url` silently percent-encodes characters such as
/// `^` or spaces, so the character check runs on the raw text first.
fn is_absolute_uri_with_host(value: &str) -> bool {
    if !value.chars().all(is_uri_char) {
        return false;
    }

    let Ok(url) = Url::parse(value) else {
        return false;
    };

    let has_authority = value
        .get(url.scheme().len()..)
        .is_some_and(|rest| rest.starts_with("://"));

    has_authority && url.host_str().is_some_and(|host| !host.is_empty())
}

const fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            // unreserved
            '-' | '.' | '_' | '~'
            // gen-delims
            | ':' | '/' | '?' | '#' | '[' | ']' | '@'
            // sub-delims
            | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
            // pct-encoded
            | '%'
        )
}
