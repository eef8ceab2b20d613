use chrono::Utc;
use lazy_static::lazy_static;
use prettytable::{Cell, Row, Table};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entity::types::{CanonicalEntity, EntityType, ExclusionRecord};

/// Upper bound on each human-audit sample list.
pub const SAMPLE_LIMIT: usize = 25;

lazy_static! {
    // One or two letters, a digit, an optional letter or digit, an optional
    // space, then a digit and two letters.
    static ref UK_POSTCODE: Regex =
        Regex::new(r"^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$").unwrap();
}

/// Postcode shape check, applied after upper-casing and trimming.
pub fn is_valid_uk_postcode(raw: &str) -> bool {
    UK_POSTCODE.is_match(raw.trim().to_uppercase().as_str())
}

/// Address-quality counters computed over kept courses only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFlags {
    pub kept_bad_postcode_count: usize,
    pub kept_missing_city_count: usize,
}

/// Size-bounded samples for human audit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSample {
    pub excluded_first_25: Vec<ExclusionRecord>,
    pub manual_first_25: Vec<ExclusionRecord>,
}

/// Summary of one audit pass over the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurityReport {
    pub generated_at: String,
    pub summary: BTreeMap<String, usize>,
    pub quality_flags: QualityFlags,
    pub breakdown: BTreeMap<String, usize>,
    pub sample: ReportSample,
}

/// Aggregate cascade outcomes into a purity report. Pure aggregation over
/// already-audited entities; contains no classification logic.
pub fn aggregate(audited: &[CanonicalEntity]) -> PurityReport {
    let mut summary: BTreeMap<String, usize> = BTreeMap::new();
    let mut breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut quality_flags = QualityFlags::default();
    let mut sample = ReportSample::default();

    summary.insert("total".to_string(), audited.len());

    for entity in audited {
        let entity_type = entity.entity_type.unwrap_or(EntityType::Unknown);
        *summary.entry(entity_type.to_string()).or_insert(0) += 1;

        if let Some(reason) = entity.purity_reason.as_deref() {
            *breakdown.entry(reason.to_string()).or_insert(0) += 1;
        }

        let flagged = entity.needs_manual_review.unwrap_or(false);
        if flagged {
            *summary.entry("manual_review".to_string()).or_insert(0) += 1;
            if sample.manual_first_25.len() < SAMPLE_LIMIT {
                sample.manual_first_25.push(stub(entity));
            }
        }

        if entity_type == EntityType::Course {
            match entity.address.postcode.as_deref() {
                Some(postcode) if !is_valid_uk_postcode(postcode) => {
                    quality_flags.kept_bad_postcode_count += 1;
                }
                _ => {}
            }
            if entity.address.city.is_none() {
                quality_flags.kept_missing_city_count += 1;
            }
        } else if sample.excluded_first_25.len() < SAMPLE_LIMIT {
            sample.excluded_first_25.push(stub(entity));
        }
    }

    PurityReport {
        generated_at: Utc::now().to_rfc3339(),
        summary,
        quality_flags,
        breakdown,
        sample,
    }
}

fn stub(entity: &CanonicalEntity) -> ExclusionRecord {
    ExclusionRecord {
        id: entity.id.clone(),
        name: entity.name.clone(),
        entity_type: entity.entity_type,
        reason: entity.purity_reason.clone().unwrap_or_default(),
    }
}

/// Render the report as terminal tables.
pub fn render(report: &PurityReport) -> String {
    let mut out = String::new();

    let mut summary = Table::new();
    summary.add_row(Row::new(vec![Cell::new("Outcome"), Cell::new("Count")]));
    for (outcome, count) in &report.summary {
        summary.add_row(Row::new(vec![
            Cell::new(outcome),
            Cell::new(&count.to_string()),
        ]));
    }
    out.push_str(&summary.to_string());

    let mut breakdown = Table::new();
    breakdown.add_row(Row::new(vec![Cell::new("Reason"), Cell::new("Count")]));
    for (reason, count) in &report.breakdown {
        breakdown.add_row(Row::new(vec![
            Cell::new(reason),
            Cell::new(&count.to_string()),
        ]));
    }
    out.push_str(&breakdown.to_string());

    let mut quality = Table::new();
    quality.add_row(Row::new(vec![
        Cell::new("Kept with bad postcode"),
        Cell::new(&report.quality_flags.kept_bad_postcode_count.to_string()),
    ]));
    quality.add_row(Row::new(vec![
        Cell::new("Kept with missing city"),
        Cell::new(&report.quality_flags.kept_missing_city_count.to_string()),
    ]));
    out.push_str(&quality.to_string());

    out
}
