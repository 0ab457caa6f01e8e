//! Writing the four priority-tier files and the CSV exclusion/score report
//! (§4.G, §4.H): one address per line in each tier file, sorted by
//! `final_score` descending then address ascending; the report carries the
//! full per-address breakdown.

use std::path::{Path, PathBuf};

use mailqual_model::{Priority, ScoreResult};
use mailqual_output::AtomicFileWriter;

use crate::error::Result;

pub struct FilterOutputPaths {
    pub high: PathBuf,
    pub medium: PathBuf,
    pub low: PathBuf,
    pub excluded: PathBuf,
    pub report: PathBuf,
}

/// `results` need not be pre-sorted; this function sorts per tier.
pub fn write_all(dir: &Path, run_tag: &str, results: &[ScoreResult]) -> Result<FilterOutputPaths> {
    Ok(FilterOutputPaths {
        high: write_tier(dir, run_tag, Priority::High, results)?,
        medium: write_tier(dir, run_tag, Priority::Medium, results)?,
        low: write_tier(dir, run_tag, Priority::Low, results)?,
        excluded: write_tier(dir, run_tag, Priority::Excluded, results)?,
        report: write_report(dir, run_tag, results)?,
    })
}

fn write_tier(dir: &Path, run_tag: &str, priority: Priority, results: &[ScoreResult]) -> Result<PathBuf> {
    let mut tier: Vec<&ScoreResult> = results.iter().filter(|r| r.priority == priority).collect();
    tier.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.address.cmp(&b.address))
    });

    let filename = format!("{priority}_{run_tag}.txt");
    let addresses: Vec<&str> = tier.iter().map(|r| r.address.as_str()).collect();
    Ok(AtomicFileWriter::write_lines(dir, &filename, addresses.into_iter())?)
}

fn write_report(dir: &Path, run_tag: &str, results: &[ScoreResult]) -> Result<PathBuf> {
    let mut sorted: Vec<&ScoreResult> = results.iter().collect();
    sorted.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.address.cmp(&b.address))
    });

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record([
        "address",
        "final_score",
        "priority",
        "raw_score",
        "component_email",
        "component_company",
        "component_geo",
        "component_engagement",
        "bonus_product",
        "exclusion_reasons",
    ])?;
    for result in sorted {
        writer.write_record([
            result.address.as_str().to_string(),
            format!("{:.4}", result.final_score),
            result.priority.to_string(),
            format!("{:.4}", result.raw_score),
            format!("{:.4}", result.breakdown.email_quality),
            format!("{:.4}", result.breakdown.company_relevance),
            format!("{:.4}", result.breakdown.geographic_priority),
            format!("{:.4}", result.breakdown.engagement),
            format!("{:.4}", result.breakdown.bonus_product),
            result.exclusion_reasons.join("|"),
        ])?;
    }
    let bytes = writer.into_inner().expect("in-memory writer never fails to flush");
    let filename = format!("exclusion_report_{run_tag}.csv");
    Ok(AtomicFileWriter::write_bytes(dir, &filename, &bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailqual_model::{Address, ScoreBreakdown};

    fn result(address: &str, final_score: f64, priority: Priority) -> ScoreResult {
        ScoreResult {
            address: Address::parse(address).unwrap(),
            raw_score: final_score,
            final_score,
            priority,
            breakdown: ScoreBreakdown::default(),
            exclusion_reasons: Vec::new(),
        }
    }

    #[test]
    fn tier_file_is_score_descending_then_address_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            result("b@example.com", 50.0, Priority::High),
            result("a@example.com", 50.0, Priority::High),
            result("c@example.com", 90.0, Priority::High),
        ];
        let paths = write_all(dir.path(), "20260101_000000", &results).unwrap();
        let contents = std::fs::read_to_string(&paths.high).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["c@example.com", "a@example.com", "b@example.com"]);
    }

    #[test]
    fn report_bonus_product_column_reflects_capped_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut breakdown = ScoreBreakdown::default();
        breakdown.bonus_product = 3.0; // capped value, even though applied_bonuses' raw product is higher
        breakdown.applied_bonuses = vec![
            mailqual_model::ScoreComponent { name: "bonus", value: 2.0, description: String::new() },
            mailqual_model::ScoreComponent { name: "bonus", value: 5.0, description: String::new() },
        ];
        let result = ScoreResult {
            address: Address::parse("a@example.com").unwrap(),
            raw_score: 50.0,
            final_score: 150.0,
            priority: Priority::High,
            breakdown,
            exclusion_reasons: Vec::new(),
        };
        let paths = write_all(dir.path(), "tag", &[result]).unwrap();
        let contents = std::fs::read_to_string(&paths.report).unwrap();
        assert!(contents.contains("3.0000"));
        assert!(!contents.contains("10.0000"));
    }

    #[test]
    fn report_contains_every_result_regardless_of_tier() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            result("a@example.com", 90.0, Priority::High),
            result("b@example.com", 5.0, Priority::Excluded),
        ];
        let paths = write_all(dir.path(), "tag", &results).unwrap();
        let contents = std::fs::read_to_string(&paths.report).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }
}
