use tracing::info;

use crate::classify::{AttributeClassifier, BuildClassifier, PurityClassifier};
use crate::dedup::DedupClusterer;
use crate::entity::builder::EntityBuilder;
use crate::entity::types::{CandidateRecord, CanonicalEntity, EntityKind, EntityType, ExclusionRecord};
use crate::report::{self, PurityReport};
use crate::TARGET_PIPELINE;

/// Result of the audit pass: the curated set plus its audit artifacts.
pub struct AuditOutcome {
    pub kept: Vec<CanonicalEntity>,
    pub excluded: Vec<ExclusionRecord>,
    pub manual_review: Vec<ExclusionRecord>,
    pub report: PurityReport,
}

/// Build stage: dedupe raw candidates and construct draft canonical
/// entities. Candidates the build classifier leaves unknown are dropped
/// and never persisted.
pub fn run_build(candidates: Vec<CandidateRecord>) -> Vec<CanonicalEntity> {
    let clusterer = DedupClusterer::new();
    let classifier = BuildClassifier::new();
    let attributes = AttributeClassifier::new();
    let builder = EntityBuilder::new();

    let candidates_in = candidates.len();
    let deduped = clusterer.dedupe(candidates);
    let duplicates_removed = candidates_in - deduped.len();

    let mut entities = Vec::new();
    let mut unknown_dropped = 0usize;
    for candidate in &deduped {
        let kind = classifier.classify(candidate);
        if kind == EntityKind::Unknown {
            unknown_dropped += 1;
            continue;
        }

        let mut entity = builder.build(candidate, kind);
        if kind == EntityKind::Course {
            attributes.apply(&mut entity, candidate);
        }
        entities.push(entity);
    }

    info!(
        target: TARGET_PIPELINE,
        "Build: {} candidates in, {} duplicates removed, {} unknown dropped, {} entities out",
        candidates_in, duplicates_removed, unknown_dropped, entities.len()
    );

    entities
}

/// Audit stage: purity-classify each persisted entity, partition the
/// curated set from the exclusions, and aggregate the purity report.
/// Only audit fields are written; identity, geo and address pass through.
pub fn run_audit(entities: Vec<CanonicalEntity>) -> AuditOutcome {
    let purity = PurityClassifier::new();

    let mut audited = Vec::with_capacity(entities.len());
    for mut entity in entities {
        purity.apply(&mut entity);
        audited.push(entity);
    }

    let report = report::aggregate(&audited);

    let mut kept = Vec::new();
    let mut excluded = Vec::new();
    let mut manual_review = Vec::new();
    for entity in audited {
        let entity_type = entity.entity_type.unwrap_or(EntityType::Unknown);
        let stub = ExclusionRecord {
            id: entity.id.clone(),
            name: entity.name.clone(),
            entity_type: entity.entity_type,
            reason: entity.purity_reason.clone().unwrap_or_default(),
        };

        if entity_type == EntityType::Course {
            if entity.needs_manual_review.unwrap_or(false) {
                manual_review.push(stub);
            }
            kept.push(entity);
        } else {
            excluded.push(stub);
        }
    }

    info!(
        target: TARGET_PIPELINE,
        "Audit: {} kept, {} excluded, {} flagged for manual review",
        kept.len(), excluded.len(), manual_review.len()
    );

    AuditOutcome {
        kept,
        excluded,
        manual_review,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::types::{EntityType, GeometryKind};
    use crate::geo::GeoPoint;

    fn candidate(name: &str, lat: f64, lng: f64) -> CandidateRecord {
        CandidateRecord::new(name, GeoPoint::new(lat, lng), GeometryKind::Area)
            .with_tag("leisure", "golf_course")
    }

    #[test]
    fn test_build_dedupes_and_drops_unknown() {
        let entities = run_build(vec![
            candidate("Heath Golf Club", 51.0, -1.0),
            // Duplicate pin for the same venue, 0.2 km away.
            CandidateRecord::new(
                "Heath Golf Club",
                GeoPoint::new(51.0018, -1.0),
                GeometryKind::Point,
            ),
            // No tags, no course-shaped name: dropped.
            CandidateRecord::new(
                "Riverside Leisure Centre",
                GeoPoint::new(52.0, -2.0),
                GeometryKind::Point,
            ),
        ]);

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Heath Golf Club");
        assert_eq!(entities[0].kind, EntityKind::Course);
        // Course attributes are populated with their defaults at minimum.
        assert!(!entities[0].course_type.is_empty());
    }

    #[test]
    fn test_audit_partitions_and_keeps_only_courses() {
        let entities = run_build(vec![
            candidate("Heath Golf Club", 51.0, -1.0),
            candidate("Topgolf Manchester", 53.5, -2.3),
            candidate("Borough Golf Club (closed 2021)", 52.5, -1.9),
            candidate("Sunny Golf", 50.8, -0.5),
        ]);
        let outcome = run_audit(entities);

        assert!(outcome
            .kept
            .iter()
            .all(|e| e.entity_type == Some(EntityType::Course)));
        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.excluded.len(), 2);
        assert_eq!(outcome.manual_review.len(), 1);
        assert_eq!(outcome.manual_review[0].name, "Sunny Golf");

        // Excluded records stay traceable.
        for stub in &outcome.excluded {
            assert!(!stub.id.is_empty());
            assert!(!stub.reason.is_empty());
        }

        assert_eq!(outcome.report.summary["total"], 4);
        assert_eq!(outcome.report.summary["course"], 2);
    }

    #[test]
    fn test_audit_is_idempotent_for_confident_entities() {
        let entities = run_build(vec![candidate("Heath Golf Club", 51.0, -1.0)]);
        let first = run_audit(entities);
        let again = run_audit(first.kept.clone());

        assert_eq!(again.kept.len(), 1);
        assert_eq!(
            again.kept[0].purity_reason,
            Some("strong_name_marker".to_string())
        );
        assert_eq!(again.kept[0].entity_type, Some(EntityType::Course));
    }
}
