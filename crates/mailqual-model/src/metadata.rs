//! Open-field metadata map, per SPEC_FULL.md §3/§9.
//!
//! Recognized fields are a typed sub-record; anything else lands in
//! `extras`, preserved verbatim so round-tripping never drops vendor data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata attached to a [`crate::Record`], merged across formats/runs by
/// the metadata store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_date: Option<String>,

    /// Extra columns captured from a plain-text record's trailing fields,
    /// or unrecognized elements from a structured record. Opaque to the
    /// pipeline, carried through verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

/// Per-field provenance: which source file produced the value and when it
/// was observed, tracked by the metadata store for merge-by-recency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub source_file_id: String,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

impl Metadata {
    /// True if every field (known and extras) is empty.
    pub fn is_empty(&self) -> bool {
        self.source_url.is_none()
            && self.page_title.is_none()
            && self.company_name.is_none()
            && self.phone.is_none()
            && self.country.is_none()
            && self.city.is_none()
            && self.address_line.is_none()
            && self.meta_description.is_none()
            && self.meta_keywords.is_none()
            && self.category.is_none()
            && self.validation_status.is_none()
            && self.validation_log.is_none()
            && self.validation_date.is_none()
            && self.extras.is_empty()
    }

    /// Iterate over known-field (name, value) pairs that are set, for
    /// keyword scanning and CSV sidecar emission.
    pub fn known_fields(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        macro_rules! push {
            ($name:literal, $field:expr) => {
                if let Some(v) = $field.as_deref() {
                    out.push(($name, v));
                }
            };
        }
        push!("source_url", self.source_url);
        push!("page_title", self.page_title);
        push!("company_name", self.company_name);
        push!("phone", self.phone);
        push!("country", self.country);
        push!("city", self.city);
        push!("address_line", self.address_line);
        push!("meta_description", self.meta_description);
        push!("meta_keywords", self.meta_keywords);
        push!("category", self.category);
        push!("validation_status", self.validation_status);
        push!("validation_log", self.validation_log);
        push!("validation_date", self.validation_date);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(Metadata::default().is_empty());
    }

    #[test]
    fn extras_round_trip_through_json() {
        let mut m = Metadata::default();
        m.extras.insert("vendor_id".to_string(), "42".to_string());
        let json = serde_json::to_string(&m).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extras.get("vendor_id"), Some(&"42".to_string()));
    }
}
