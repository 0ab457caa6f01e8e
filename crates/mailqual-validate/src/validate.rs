//! Address validation: the rejection rules layered on top of [`crate::normalize`]
//! and [`mailqual_model::Address`]'s structural invariants.

use mailqual_model::Address;

use crate::error::{Result, ValidateError};
use crate::reference::{is_hex_digest, is_telemetry_domain, is_uuid_shape};

/// Normalize then validate a raw address token, applying every §4.A rule.
///
/// Returns the parsed [`Address`] on success, or a [`ValidateError`]
/// classifying why the token is *invalid*.
pub fn validate(raw: &str) -> Result<Address> {
    let normalized = crate::normalize::normalize(raw);

    let address = Address::parse(&normalized).map_err(|e| ValidateError::InvalidAddress {
        reason: e.to_string(),
    })?;

    if is_hex_digest(address.local_part()) {
        return Err(ValidateError::InvalidAddress {
            reason: "local part is a bare hex digest".to_string(),
        });
    }
    if is_uuid_shape(address.local_part()) {
        return Err(ValidateError::InvalidAddress {
            reason: "local part is a UUID".to_string(),
        });
    }
    if is_telemetry_domain(address.domain()) {
        return Err(ValidateError::InvalidAddress {
            reason: "domain is a telemetry/crash-reporting host".to_string(),
        });
    }

    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_clean_address() {
        assert!(validate("alice@example.com").is_ok());
    }

    #[test]
    fn rejects_hex_digest_local_part() {
        let err = validate("d41d8cd98f00b204e9800998ecf8427e@sentry.io");
        assert!(err.is_err());
    }

    #[test]
    fn rejects_uuid_local_part() {
        assert!(validate("d41d8cd9-8f00-b204-e980-0998ecf8427e@example.com").is_err());
    }

    #[test]
    fn rejects_telemetry_domain() {
        assert!(validate("ops@ingest.sentry.io").is_err());
    }

    #[test]
    fn normalizes_before_validating() {
        let a = validate("//CAROL@Example.com").unwrap();
        assert_eq!(a.as_str(), "carol@example.com");
    }

    #[test]
    fn rejects_plain_garbage() {
        assert!(validate("not-an-email").is_err());
    }
}
