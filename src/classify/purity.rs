use tracing::debug;

use super::TARGET_CLASSIFY;
use crate::entity::types::{CanonicalEntity, EntityType, Verdict};

// Reason codes, fixed per cascade branch
pub const REASON_MISSING_OR_BAD_GEO: &str = "missing_or_bad_geo";
pub const REASON_NAME_INDICATES_CLOSED: &str = "name_indicates_closed";
pub const REASON_HARD_EXCLUDE_PREFIX: &str = "hard_exclude_token";
pub const REASON_NON_VENUE_PREFIX: &str = "non_venue_token";
pub const REASON_STRONG_NAME_MARKER: &str = "strong_name_marker";
pub const REASON_HAS_COURSE_FACTS: &str = "has_course_facts";
pub const REASON_GENERIC_COURSE_NAME: &str = "generic_course_name";
pub const REASON_GOLF_WORD: &str = "golf_word_without_strong_marker";
pub const REASON_NO_GOLF_SIGNAL: &str = "no_golf_signal";

// Default vocabularies. Ordered where order decides the reported token.
const CLOSED_MARKERS: &[&str] = &["permanently closed", "(closed", "closed"];

const HARD_EXCLUDE_TOKENS: &[&str] = &[
    "driving range",
    "topgolf",
    "golf simulator",
    "simulator",
    "indoor golf",
    "indoor",
    "golf studio",
    "swing studio",
    "studio",
    "mini golf",
    "minigolf",
    "miniature golf",
    "adventure golf",
    "crazy golf",
    "disc golf",
    "footgolf",
    "foot golf",
];

const INSTITUTION_TOKENS: &[&str] = &["school", "college", "university"];

const STRONG_MARKERS: &[&str] = &[
    "golf club",
    "golf course",
    "golf links",
    "country club",
    "golf resort",
];

const GENERIC_COURSE_SEGMENTS: &[&str] = &[
    "main course",
    "short course",
    "academy course",
    "practice course",
    "pitch and putt",
    "par 3",
    "par3",
];

const DEPRECATED_EXTRAS: &[&str] = &["drinking_unknown", "smoking_unknown"];

type PurityRule = fn(&PurityClassifier, &CanonicalEntity, &str) -> Option<Verdict>;

/// Audit-stage classifier over already-built entities.
///
/// An ordered decision table, first match wins; every branch carries a
/// fixed reason code. Pure over the entity's fields: `apply` annotates the
/// audit fields and strips deprecated extras tokens, and never touches
/// identity, geo or address. Vocabularies are injectable so tests can run
/// with narrower lists.
pub struct PurityClassifier {
    closed_markers: Vec<String>,
    hard_exclude_tokens: Vec<String>,
    institution_tokens: Vec<String>,
    strong_markers: Vec<String>,
    generic_segments: Vec<String>,
    deprecated_extras: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for PurityClassifier {
    fn default() -> Self {
        Self {
            closed_markers: owned(CLOSED_MARKERS),
            hard_exclude_tokens: owned(HARD_EXCLUDE_TOKENS),
            institution_tokens: owned(INSTITUTION_TOKENS),
            strong_markers: owned(STRONG_MARKERS),
            generic_segments: owned(GENERIC_COURSE_SEGMENTS),
            deprecated_extras: owned(DEPRECATED_EXTRAS),
        }
    }
}

impl PurityClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closed_markers(mut self, markers: &[&str]) -> Self {
        self.closed_markers = owned(markers);
        self
    }

    pub fn with_hard_exclude_tokens(mut self, tokens: &[&str]) -> Self {
        self.hard_exclude_tokens = owned(tokens);
        self
    }

    pub fn with_institution_tokens(mut self, tokens: &[&str]) -> Self {
        self.institution_tokens = owned(tokens);
        self
    }

    pub fn with_strong_markers(mut self, markers: &[&str]) -> Self {
        self.strong_markers = owned(markers);
        self
    }

    pub fn with_generic_segments(mut self, segments: &[&str]) -> Self {
        self.generic_segments = owned(segments);
        self
    }

    pub fn with_deprecated_extras(mut self, extras: &[&str]) -> Self {
        self.deprecated_extras = owned(extras);
        self
    }

    /// Classify an entity without mutating it.
    pub fn classify(&self, entity: &CanonicalEntity) -> Verdict {
        let name = entity.name.to_lowercase();

        let rules: &[(&str, PurityRule)] = &[
            ("bad_geo", Self::rule_bad_geo),
            ("closed_name", Self::rule_closed_name),
            ("hard_exclude", Self::rule_hard_exclude),
            ("institution", Self::rule_institution),
            ("strong_marker", Self::rule_strong_marker),
            ("course_facts", Self::rule_course_facts),
            ("generic_course_name", Self::rule_generic_course_name),
            ("golf_word", Self::rule_golf_word),
        ];

        for (label, rule) in rules {
            if let Some(verdict) = rule(self, entity, &name) {
                debug!(
                    target: TARGET_CLASSIFY,
                    "'{}' -> {} ({}) by purity rule {}",
                    entity.name,
                    verdict.entity_type,
                    verdict.reason,
                    label
                );
                return verdict;
            }
        }

        Verdict::new(EntityType::NotCourse, false, REASON_NO_GOLF_SIGNAL)
    }

    /// Classify and annotate: write the audit fields and strip deprecated
    /// extras tokens. Identity, geo and address are left untouched.
    pub fn apply(&self, entity: &mut CanonicalEntity) -> Verdict {
        let verdict = self.classify(entity);

        entity.entity_type = Some(verdict.entity_type);
        entity.needs_manual_review = Some(verdict.needs_manual_review);
        entity.purity_reason = Some(verdict.reason.clone());
        entity
            .extras
            .retain(|token| !self.deprecated_extras.contains(token));

        verdict
    }

    /// Rule 1: unusable geography disqualifies outright.
    fn rule_bad_geo(&self, entity: &CanonicalEntity, _name: &str) -> Option<Verdict> {
        if !entity.point.is_valid() {
            return Some(Verdict::new(
                EntityType::NotCourse,
                false,
                REASON_MISSING_OR_BAD_GEO,
            ));
        }
        None
    }

    /// Rule 2: the name itself records a closure.
    fn rule_closed_name(&self, _entity: &CanonicalEntity, name: &str) -> Option<Verdict> {
        if self.closed_markers.iter().any(|m| name.contains(m.as_str())) {
            return Some(Verdict::new(
                EntityType::ClosedCourse,
                false,
                REASON_NAME_INDICATES_CLOSED,
            ));
        }
        None
    }

    /// Rule 3: a hard-exclude token anywhere in the name.
    fn rule_hard_exclude(&self, _entity: &CanonicalEntity, name: &str) -> Option<Verdict> {
        let token = self
            .hard_exclude_tokens
            .iter()
            .find(|t| name.contains(t.as_str()))?;
        Some(Verdict::new(
            EntityType::NotCourse,
            false,
            &format!("{}:{}", REASON_HARD_EXCLUDE_PREFIX, token),
        ))
    }

    /// Rule 4: institutional names without a strong venue marker.
    fn rule_institution(&self, _entity: &CanonicalEntity, name: &str) -> Option<Verdict> {
        if self.has_strong_marker(name) {
            return None;
        }
        let words: Vec<&str> = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let token = self
            .institution_tokens
            .iter()
            .find(|t| words.contains(&t.as_str()))?;
        Some(Verdict::new(
            EntityType::NotCourse,
            false,
            &format!("{}:{}", REASON_NON_VENUE_PREFIX, token),
        ))
    }

    /// Rule 5: a strong venue marker is a confident keep.
    fn rule_strong_marker(&self, _entity: &CanonicalEntity, name: &str) -> Option<Verdict> {
        if self.has_strong_marker(name) {
            return Some(Verdict::new(
                EntityType::Course,
                false,
                REASON_STRONG_NAME_MARKER,
            ));
        }
        None
    }

    /// Rule 6: structured course facts are a confident keep.
    fn rule_course_facts(&self, entity: &CanonicalEntity, _name: &str) -> Option<Verdict> {
        if !entity.holes.is_empty() || entity.has_par_digits() {
            return Some(Verdict::new(
                EntityType::Course,
                false,
                REASON_HAS_COURSE_FACTS,
            ));
        }
        None
    }

    /// Rule 7: generic course wording keeps the record but flags it.
    fn rule_generic_course_name(&self, _entity: &CanonicalEntity, name: &str) -> Option<Verdict> {
        if self.generic_segments.iter().any(|s| name.contains(s.as_str())) {
            return Some(Verdict::new(
                EntityType::Course,
                true,
                REASON_GENERIC_COURSE_NAME,
            ));
        }
        None
    }

    /// Rule 8: a bare "golf" keeps the record but flags it.
    fn rule_golf_word(&self, _entity: &CanonicalEntity, name: &str) -> Option<Verdict> {
        if name.contains("golf") {
            return Some(Verdict::new(EntityType::Course, true, REASON_GOLF_WORD));
        }
        None
    }

    fn has_strong_marker(&self, name: &str) -> bool {
        self.strong_markers.iter().any(|m| name.contains(m.as_str()))
    }
}
