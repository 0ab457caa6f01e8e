//! Reference tables for hard-coded technical-token rejection (§4.A).

/// Crash-reporting / telemetry vendors whose domains never carry a human
/// recipient. Matched case-insensitively as a substring of the registrable
/// domain part, since these vendors route through many subdomains
/// (`o123456.ingest.sentry.io`, `events.newrelic.com`, ...).
pub const TELEMETRY_HOSTS: [&str; 5] = ["sentry", "bugsnag", "newrelic", "rollbar", "datadog"];

/// Accepted lengths for a hex-digest local part: MD5 (32), SHA1 (40),
/// SHA256 (64). These show up in scraped address lists where a tracking
/// pixel or webhook address leaked a content hash as the "local part".
pub const HEX_DIGEST_LENGTHS: [usize; 3] = [32, 40, 64];

pub fn is_telemetry_domain(domain: &str) -> bool {
    let lower = domain.to_ascii_lowercase();
    TELEMETRY_HOSTS.iter().any(|host| lower.contains(host))
}

pub fn is_hex_digest(local: &str) -> bool {
    HEX_DIGEST_LENGTHS.contains(&local.len()) && local.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `8-4-4-4-12` hex shape, case-insensitive, no braces.
pub fn is_uuid_shape(local: &str) -> bool {
    let parts: Vec<&str> = local.split('-').collect();
    let expected_lengths = [8, 4, 4, 4, 12];
    if parts.len() != expected_lengths.len() {
        return false;
    }
    parts
        .iter()
        .zip(expected_lengths)
        .all(|(part, len)| part.len() == len && part.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_telemetry_subdomains() {
        assert!(is_telemetry_domain("o123456.ingest.sentry.io"));
        assert!(is_telemetry_domain("events.newrelic.com"));
        assert!(!is_telemetry_domain("example.com"));
    }

    #[test]
    fn detects_hex_digest_lengths() {
        assert!(is_hex_digest(&"a".repeat(32)));
        assert!(is_hex_digest(&"a".repeat(40)));
        assert!(is_hex_digest(&"a".repeat(64)));
        assert!(!is_hex_digest(&"a".repeat(33)));
        assert!(!is_hex_digest("not-hex-at-all-but-32-characters"));
    }

    #[test]
    fn detects_uuid_shape() {
        assert!(is_uuid_shape("d41d8cd9-8f00-b204-e980-0998ecf8427e"));
        assert!(!is_uuid_shape("not-a-uuid"));
    }
}
