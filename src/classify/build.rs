use tracing::debug;

use super::TARGET_CLASSIFY;
use crate::entity::normalizer::NameNormalizer;
use crate::entity::types::{CandidateRecord, EntityKind};

// Values of the golf=* tag that mark a non-standard golf subtype
const EXCLUDED_GOLF_SUBTYPES: &[&str] = &[
    "miniature",
    "adventure",
    "disc",
    "disc_golf",
    "footgolf",
    "foot_golf",
    "pitch_and_putt",
];

// leisure=*/sport=* values that mark a non-standard subtype outright
const EXCLUDED_LEISURE_VALUES: &[&str] = &["miniature_golf", "adventure_golf", "disc_golf_course"];
const EXCLUDED_SPORT_VALUES: &[&str] = &["miniature_golf", "disc_golf", "footgolf"];

// Tag values that mark a practice facility rather than a course
const RANGE_GOLF_VALUES: &[&str] = &["driving_range", "range", "practice"];

// leisure=* values that, combined with sport=golf, mark a playable course
const COURSE_LAND_VALUES: &[&str] = &["pitch", "recreation_ground"];

type BuildRule = fn(&BuildClassifier, &CandidateRecord) -> Option<EntityKind>;

/// Build-stage classifier: assigns the coarse kind from source tags and the
/// candidate name. An ordered cascade where the first matching rule wins;
/// candidates left `unknown` are dropped by the pipeline, not persisted.
pub struct BuildClassifier {
    normalizer: NameNormalizer,
}

impl Default for BuildClassifier {
    fn default() -> Self {
        Self {
            normalizer: NameNormalizer::new(),
        }
    }
}

impl BuildClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, candidate: &CandidateRecord) -> EntityKind {
        let rules: &[(&str, BuildRule)] = &[
            ("excluded_subtype", Self::rule_excluded_subtype),
            ("driving_range", Self::rule_driving_range),
            ("course_tags", Self::rule_course_tags),
            ("name_fallback", Self::rule_name_fallback),
        ];

        for (label, rule) in rules {
            if let Some(kind) = rule(self, candidate) {
                debug!(
                    target: TARGET_CLASSIFY,
                    "'{}' classified {} by build rule {}", candidate.name, kind, label
                );
                return kind;
            }
        }

        EntityKind::Unknown
    }

    /// Rule 1: explicit non-standard golf subtypes are excluded outright.
    fn rule_excluded_subtype(&self, candidate: &CandidateRecord) -> Option<EntityKind> {
        let golf = candidate.tag("golf").unwrap_or_default();
        let leisure = candidate.tag("leisure").unwrap_or_default();
        let sport = candidate.tag("sport").unwrap_or_default();

        if EXCLUDED_GOLF_SUBTYPES.contains(&golf)
            || EXCLUDED_LEISURE_VALUES.contains(&leisure)
            || EXCLUDED_SPORT_VALUES.contains(&sport)
        {
            return Some(EntityKind::Exclude);
        }
        None
    }

    /// Rule 2: driving ranges and practice facilities.
    fn rule_driving_range(&self, candidate: &CandidateRecord) -> Option<EntityKind> {
        let golf = candidate.tag("golf").unwrap_or_default();
        let leisure = candidate.tag("leisure").unwrap_or_default();

        if RANGE_GOLF_VALUES.contains(&golf) || leisure == "driving_range" {
            return Some(EntityKind::DrivingRange);
        }
        None
    }

    /// Rule 3: recognized full-course tags, or sport=golf on pitch or
    /// recreation-ground land.
    fn rule_course_tags(&self, candidate: &CandidateRecord) -> Option<EntityKind> {
        let golf = candidate.tag("golf").unwrap_or_default();
        let leisure = candidate.tag("leisure").unwrap_or_default();
        let sport = candidate.tag("sport").unwrap_or_default();

        if leisure == "golf_course" || golf == "course" {
            return Some(EntityKind::Course);
        }
        if sport == "golf" && COURSE_LAND_VALUES.contains(&leisure) {
            return Some(EntityKind::Course);
        }
        None
    }

    /// Rule 4: untagged but unambiguously named venues.
    fn rule_name_fallback(&self, candidate: &CandidateRecord) -> Option<EntityKind> {
        let name = self.normalizer.normalize(&candidate.name);
        if name.contains("golf") && (name.contains("club") || name.contains("course")) {
            return Some(EntityKind::Course);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::types::GeometryKind;
    use crate::geo::GeoPoint;

    fn candidate(name: &str) -> CandidateRecord {
        CandidateRecord::new(name, GeoPoint::new(51.0, -1.0), GeometryKind::Area)
    }

    #[test]
    fn test_excluded_subtypes() {
        let classifier = BuildClassifier::new();
        for tags in [
            ("golf", "miniature"),
            ("golf", "adventure"),
            ("golf", "footgolf"),
            ("golf", "pitch_and_putt"),
            ("leisure", "miniature_golf"),
            ("sport", "disc_golf"),
        ] {
            let c = candidate("Island Adventure").with_tag(tags.0, tags.1);
            assert_eq!(classifier.classify(&c), EntityKind::Exclude, "{:?}", tags);
        }
    }

    #[test]
    fn test_driving_range_tags() {
        let classifier = BuildClassifier::new();
        let c = candidate("The Range").with_tag("golf", "driving_range");
        assert_eq!(classifier.classify(&c), EntityKind::DrivingRange);
        let c = candidate("The Range").with_tag("leisure", "driving_range");
        assert_eq!(classifier.classify(&c), EntityKind::DrivingRange);
        let c = candidate("Practice Ground").with_tag("golf", "practice");
        assert_eq!(classifier.classify(&c), EntityKind::DrivingRange);
    }

    #[test]
    fn test_course_tags() {
        let classifier = BuildClassifier::new();
        let c = candidate("Woodhall Spa").with_tag("leisure", "golf_course");
        assert_eq!(classifier.classify(&c), EntityKind::Course);
        let c = candidate("Woodhall Spa")
            .with_tag("sport", "golf")
            .with_tag("leisure", "recreation_ground");
        assert_eq!(classifier.classify(&c), EntityKind::Course);
        // sport=golf alone is not enough.
        let c = candidate("Woodhall Spa").with_tag("sport", "golf");
        assert_eq!(classifier.classify(&c), EntityKind::Unknown);
    }

    #[test]
    fn test_name_fallback() {
        let classifier = BuildClassifier::new();
        assert_eq!(
            classifier.classify(&candidate("Brampton Golf Club")),
            EntityKind::Course
        );
        assert_eq!(
            classifier.classify(&candidate("Brampton Golf Course")),
            EntityKind::Course
        );
        // "golf" without club or course stays unknown.
        assert_eq!(
            classifier.classify(&candidate("Brampton Golf")),
            EntityKind::Unknown
        );
        assert_eq!(
            classifier.classify(&candidate("Village Green")),
            EntityKind::Unknown
        );
    }

    #[test]
    fn test_first_match_wins() {
        let classifier = BuildClassifier::new();
        // Subtype exclusion outranks the course-shaped name.
        let c = candidate("Pirate Cove Golf Club").with_tag("golf", "adventure");
        assert_eq!(classifier.classify(&c), EntityKind::Exclude);
        // Range tag outranks course land classification.
        let c = candidate("Heath Range")
            .with_tag("golf", "driving_range")
            .with_tag("leisure", "golf_course");
        assert_eq!(classifier.classify(&c), EntityKind::DrivingRange);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = BuildClassifier::new();
        let c = candidate("Brampton Golf Club").with_tag("leisure", "golf_course");
        assert_eq!(classifier.classify(&c), classifier.classify(&c));
    }
}
