//! Four-component weighted scoring (§4.G), grounded in the teacher's
//! explainable-scoring idiom (`ScoringEngine` holding config, producing a
//! breakdown of named [`ScoreComponent`]s plus a final multiplier).

use mailqual_model::{Address, FilterConfig, Metadata, ScoreBreakdown, ScoreComponent};

/// Built-in catalogue of free personal-email providers (distinct from the
/// config's `personal_domains`, which is a hard exclusion list an operator
/// curates per deployment).
const PERSONAL_EMAIL_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "protonmail.com",
    "mail.com",
    "gmx.com",
    "yandex.com",
    "live.com",
    "msn.com",
    "zoho.com",
];

const GENERIC_TLDS: &[&str] = &["com", "net", "org", "info", "biz"];

/// `validation_status` values treated as a soft delivery failure for the
/// engagement component.
const SOFT_FAILURE_STATUSES: &[&str] =
    &["soft_bounce", "unknown", "risky", "catch_all", "unverified"];

pub struct ScoringEngine<'a> {
    config: &'a FilterConfig,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self { config }
    }

    /// Score a single non-excluded address. `metadata` is whatever the
    /// Metadata Store has on record for it, if anything.
    pub fn score(&self, address: &Address, metadata: Option<&Metadata>) -> ScoreBreakdown {
        let email_quality = self.email_quality(address);
        let company_relevance = self.company_relevance(address, metadata);
        let geographic_priority = self.geographic_priority(address, metadata);
        let engagement = self.engagement(metadata);

        ScoreBreakdown {
            email_quality,
            company_relevance,
            geographic_priority,
            engagement,
            applied_bonuses: Vec::new(),
            bonus_product: 1.0,
        }
    }

    pub fn raw_score(&self, breakdown: &ScoreBreakdown) -> f64 {
        let w = &self.config.weights;
        w.email_quality * breakdown.email_quality
            + w.company_relevance * breakdown.company_relevance
            + w.geographic_priority * breakdown.geographic_priority
            + w.engagement * breakdown.engagement
    }

    fn email_quality(&self, address: &Address) -> f64 {
        let mut score = 0.0;
        let domain = address.domain().to_ascii_lowercase();
        let local = address.local_part().to_ascii_lowercase();

        if !PERSONAL_EMAIL_PROVIDERS.iter().any(|p| *p == domain) {
            score += 40.0;
        }
        if self.config.role_prefixes.iter().any(|r| r.eq_ignore_ascii_case(&local)) {
            score += 20.0;
        }
        if local.len() >= 3 {
            score += 20.0;
        }
        let tld = address.tld().to_ascii_lowercase();
        let matches_target_country = self
            .config
            .target_country
            .as_deref()
            .is_some_and(|target| target.eq_ignore_ascii_case(&tld));
        if !GENERIC_TLDS.contains(&tld.as_str()) && matches_target_country {
            score += 10.0;
        }
        if !local.is_empty() && local.bytes().all(|b| b.is_ascii_digit()) {
            score -= 10.0;
        }
        score.clamp(0.0, 100.0)
    }

    fn company_relevance(&self, address: &Address, metadata: Option<&Metadata>) -> f64 {
        let tokens = relevance_tokens(address, metadata);
        let keywords = &self.config.industry_keywords;
        let mut score = 0.0;
        for token in &tokens {
            if keywords.primary.contains(token) {
                score += 10.0;
            }
            if keywords.secondary.contains(token) {
                score += 5.0;
            }
            if keywords.processes.contains(token) || keywords.materials.contains(token) {
                score += 3.0;
            }
            if keywords.negative.contains(token) {
                score -= 15.0;
            }
        }
        score.clamp(0.0, 100.0)
    }

    fn geographic_priority(&self, address: &Address, metadata: Option<&Metadata>) -> f64 {
        let domain = address.domain().to_ascii_lowercase();
        let tld = address.tld().to_ascii_lowercase();
        let country = metadata.and_then(|m| m.country.as_deref()).unwrap_or("").to_ascii_lowercase();
        let city = metadata.and_then(|m| m.city.as_deref()).unwrap_or("").to_ascii_lowercase();

        let matches = |terms: &std::collections::BTreeSet<String>| {
            terms.iter().any(|term| {
                let term = term.to_ascii_lowercase();
                domain.contains(&term) || tld == term || country == term || city == term
            })
        };

        let priorities = &self.config.geographic_priorities;
        if matches(&priorities.high) {
            80.0
        } else if matches(&priorities.medium) {
            40.0
        } else if matches(&priorities.low) {
            10.0
        } else {
            0.0
        }
    }

    fn engagement(&self, metadata: Option<&Metadata>) -> f64 {
        let mut score = 60.0;
        if let Some(metadata) = metadata {
            if metadata.meta_description.as_deref().is_some_and(|s| !s.is_empty()) {
                score += 20.0;
            }
            if metadata.company_name.as_deref().is_some_and(|s| !s.is_empty()) {
                score += 20.0;
            }
            if metadata
                .validation_status
                .as_deref()
                .is_some_and(|s| SOFT_FAILURE_STATUSES.iter().any(|soft| soft.eq_ignore_ascii_case(s)))
            {
                score -= 20.0;
            }
        }
        score.clamp(0.0, 100.0)
    }

    /// Applicable bonus multipliers for this address: a bonus applies when
    /// its `name` appears as a case-folded substring anywhere across the
    /// domain and the metadata text fields used for relevance scoring.
    /// `§3`'s `BonusMultiplier` carries only `(name, multiplier)`, so `name`
    /// doubles as the match token.
    pub fn applied_bonuses(&self, address: &Address, metadata: Option<&Metadata>) -> Vec<ScoreComponent> {
        let haystack = relevance_haystack(address, metadata);
        self.config
            .bonus_multipliers
            .iter()
            .filter(|b| haystack.contains(&b.name.to_ascii_lowercase()))
            .map(|b| ScoreComponent {
                name: "bonus",
                value: b.multiplier,
                description: format!("'{}' matched, x{}", b.name, b.multiplier),
            })
            .collect()
    }

    pub fn bonus_product(&self, bonuses: &[ScoreComponent]) -> f64 {
        let product: f64 = bonuses.iter().map(|b| b.value).product();
        let product = if bonuses.is_empty() { 1.0 } else { product };
        product.min(self.config.bonus_cap)
    }
}

fn relevance_haystack(address: &Address, metadata: Option<&Metadata>) -> String {
    let mut haystack = address.domain().to_ascii_lowercase();
    if let Some(metadata) = metadata {
        for field in [&metadata.company_name, &metadata.meta_description, &metadata.meta_keywords] {
            if let Some(value) = field {
                haystack.push(' ');
                haystack.push_str(&value.to_ascii_lowercase());
            }
        }
    }
    haystack
}

fn relevance_tokens(address: &Address, metadata: Option<&Metadata>) -> Vec<String> {
    relevance_haystack(address, metadata)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
