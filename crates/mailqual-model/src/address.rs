//! The [`Address`] newtype: the primary key of the system.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MailqualError, Result};

/// A normalized email address.
///
/// Invariants (checked by [`Address::parse`], never re-derived downstream):
/// lower-cased, ASCII, `local "@" domain`, local part at most 64 characters,
/// domain contains at least one dot, no doubled dots anywhere, no leading or
/// trailing dot in the local part.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse an already-normalized string into an [`Address`], checking the
    /// §3 invariants. Callers that need to normalize raw input first should
    /// use `mailqual-validate`'s normalizer, which produces strings this
    /// constructor accepts.
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        validate_shape(&s)?;
        Ok(Self(s))
    }

    /// The full address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before `@`.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// The part after `@`.
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }

    /// The domain's top-level label, e.g. `com` for `example.com`.
    pub fn tld(&self) -> &str {
        self.domain().rsplit('.').next().unwrap_or("")
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn validate_shape(s: &str) -> Result<()> {
    let reason = |reason: &str| MailqualError::InvalidAddress {
        reason: reason.to_string(),
    };

    if !s.is_ascii() {
        return Err(reason("address must be ASCII"));
    }
    if s.to_ascii_lowercase() != s {
        return Err(reason("address must be lower-cased"));
    }
    if s.contains("..") {
        return Err(reason("address contains consecutive dots"));
    }

    let mut parts = s.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return Err(reason("address is missing '@'")),
    };

    if local.is_empty() {
        return Err(reason("local part is empty"));
    }
    if local.len() > 64 {
        return Err(reason("local part exceeds 64 characters"));
    }
    if local.starts_with('.') || local.ends_with('.') {
        return Err(reason("local part has a leading or trailing dot"));
    }
    if domain.is_empty() {
        return Err(reason("domain is empty"));
    }
    if !domain.contains('.') {
        return Err(reason("domain has no dot"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_address() {
        let a = Address::parse("alice@example.com").unwrap();
        assert_eq!(a.local_part(), "alice");
        assert_eq!(a.domain(), "example.com");
        assert_eq!(a.tld(), "com");
    }

    #[test]
    fn rejects_missing_at() {
        assert!(Address::parse("not-an-email").is_err());
    }

    #[test]
    fn rejects_consecutive_dots() {
        assert!(Address::parse("a..b@example.com").is_err());
    }

    #[test]
    fn local_part_boundary_64_accepted_65_rejected() {
        let local64 = "a".repeat(64);
        let local65 = "a".repeat(65);
        assert!(Address::parse(format!("{local64}@example.com")).is_ok());
        assert!(Address::parse(format!("{local65}@example.com")).is_err());
    }

    #[test]
    fn rejects_domain_without_dot() {
        assert!(Address::parse("alice@localhost").is_err());
    }

    #[test]
    fn rejects_uppercase() {
        assert!(Address::parse("Alice@example.com").is_err());
    }
}
