//! The immutable blocklist snapshot swapped in under [`crate::service::BlocklistService`].
//!
//! Grounded on the domain/URL blocklist shape used for subdomain-suffix
//! matching: a blocked domain blocks every subdomain under it, so lookups
//! walk the label chain rather than doing an exact set membership check.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct BlocklistSnapshot {
    pub emails: BTreeSet<String>,
    pub domains: BTreeSet<String>,
}

impl BlocklistSnapshot {
    pub fn contains_email(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    /// A domain is blocked if it, or any parent domain of it, is in the
    /// blocklist: blocking `example.com` also blocks `mail.example.com`.
    pub fn contains_domain(&self, domain: &str) -> bool {
        for suffix in suffixes(domain) {
            if self.domains.contains(suffix) {
                return true;
            }
        }
        false
    }

    pub fn problematic_domains(&self, threshold: usize) -> BTreeSet<String> {
        let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
        for email in &self.emails {
            if let Some((_, domain)) = email.split_once('@') {
                *counts.entry(domain).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(domain, _)| domain.to_string())
            .collect()
    }
}

/// Yield `domain`, then each parent suffix obtained by dropping the
/// left-most label: `a.b.example.com` -> `a.b.example.com`, `b.example.com`,
/// `example.com`, `com`.
fn suffixes(domain: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(domain);
    std::iter::from_fn(move || {
        let current = rest?;
        rest = current.split_once('.').map(|(_, tail)| tail);
        Some(current)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(domains: &[&str]) -> BlocklistSnapshot {
        BlocklistSnapshot {
            emails: BTreeSet::new(),
            domains: domains.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn exact_domain_match() {
        let s = snapshot(&["example.com"]);
        assert!(s.contains_domain("example.com"));
    }

    #[test]
    fn subdomain_matches_parent_block() {
        let s = snapshot(&["example.com"]);
        assert!(s.contains_domain("mail.example.com"));
    }

    #[test]
    fn unrelated_domain_does_not_match() {
        let s = snapshot(&["example.com"]);
        assert!(!s.contains_domain("example.org"));
    }

    #[test]
    fn problematic_domains_at_threshold() {
        let mut s = BlocklistSnapshot::default();
        for i in 0..6 {
            s.emails.insert(format!("user{i}@gmail.com"));
        }
        s.emails.insert("user@yahoo.com".to_string());
        let problematic = s.problematic_domains(5);
        assert!(problematic.contains("gmail.com"));
        assert!(!problematic.contains("yahoo.com"));
    }
}
