use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::entity::types::{CandidateRecord, CanonicalEntity};

// Free-text tag fields folded into the match haystack
const DESCRIPTIVE_TAGS: &[&str] = &[
    "description",
    "note",
    "notes",
    "fee",
    "charge",
    "access",
    "dress_code",
    "handicap",
];

// Course terrain keywords, matched verbatim against the haystack
const COURSE_TYPE_KEYWORDS: &[&str] = &[
    "links",
    "heathland",
    "parkland",
    "moorland",
    "downland",
    "resort",
];

// Price-band thresholds in currency units
const PRICE_VALUE_MAX: f64 = 25.0;
const PRICE_MID_MAX: f64 = 50.0;
const PRICE_PREMIUM_MAX: f64 = 90.0;

// Handicap-limit thresholds
const HANDICAP_HARD_MAX: u32 = 18;
const HANDICAP_MEDIUM_MAX: u32 = 28;

// Hole count that suggests a longer, tougher venue
const LARGE_HOLE_COUNT: u32 = 27;

lazy_static! {
    static ref CURRENCY_AMOUNT: Regex =
        Regex::new(r"[£$€]\s*([0-9]+(?:\.[0-9]+)?)").unwrap();
    static ref HANDICAP_LIMIT: Regex =
        Regex::new(r"handicap[^0-9]{0,24}([0-9]{1,2})").unwrap();
}

fn set_of(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

/// Independent heuristic taggers for course attributes. Each runs over a
/// normalized haystack of tag fields and free text, returns one or more
/// tags from a fixed vocabulary, and has an explicit default when nothing
/// matches. Run only for entities of kind course.
#[derive(Default)]
pub struct AttributeClassifier {}

impl AttributeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the attribute tag sets of a freshly built course entity.
    pub fn apply(&self, entity: &mut CanonicalEntity, candidate: &CandidateRecord) {
        let hay = self.haystack(candidate);
        entity.course_type = self.course_type(&hay);
        entity.access = self.access(candidate, &hay);
        entity.dress_code = self.dress_code(&hay);
        entity.price_band = self.price_band(&hay);
        entity.difficulty = self.difficulty(candidate, &hay);
        entity.facilities = self.facilities(candidate);
    }

    /// Lowercased concatenation of the name and descriptive tag fields.
    /// Keys are kept next to their values so that bare tags like
    /// handicap=24 still parse.
    pub fn haystack(&self, candidate: &CandidateRecord) -> String {
        let mut parts = vec![candidate.name.clone()];
        for key in DESCRIPTIVE_TAGS {
            if let Some(value) = candidate.tag(key) {
                parts.push(format!("{} {}", key, value));
            }
        }
        parts.join(" ").to_lowercase()
    }

    pub fn course_type(&self, hay: &str) -> BTreeSet<String> {
        let matched: BTreeSet<String> = COURSE_TYPE_KEYWORDS
            .iter()
            .filter(|kw| hay.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();

        if matched.is_empty() {
            set_of(&["standard"])
        } else {
            matched
        }
    }

    pub fn access(&self, candidate: &CandidateRecord, hay: &str) -> BTreeSet<String> {
        let mut matched = BTreeSet::new();

        match candidate.tag("access") {
            Some("private") | Some("members") => {
                matched.insert("members_only".to_string());
            }
            Some("yes") | Some("public") | Some("customers") => {
                matched.insert("visitors_welcome".to_string());
            }
            _ => {}
        }
        if hay.contains("members only") {
            matched.insert("members_only".to_string());
        }
        if hay.contains("visitors welcome") || hay.contains("pay and play") {
            matched.insert("visitors_welcome".to_string());
        }

        if matched.is_empty() {
            set_of(&["unknown"])
        } else {
            matched
        }
    }

    pub fn dress_code(&self, hay: &str) -> BTreeSet<String> {
        if hay.contains("strict") {
            set_of(&["strict_golf_attire"])
        } else if hay.contains("smart casual") {
            set_of(&["smart_casual"])
        } else if hay.contains("smart") {
            set_of(&["smart_golf_attire"])
        } else if hay.contains("casual") || hay.contains("relaxed") {
            set_of(&["casual"])
        } else {
            set_of(&["smart_casual"])
        }
    }

    pub fn price_band(&self, hay: &str) -> BTreeSet<String> {
        if let Some(amount) = self.parse_currency_amount(hay) {
            return if amount <= PRICE_VALUE_MAX {
                set_of(&["value"])
            } else if amount <= PRICE_MID_MAX {
                set_of(&["mid"])
            } else if amount <= PRICE_PREMIUM_MAX {
                set_of(&["premium"])
            } else {
                set_of(&["luxury"])
            };
        }

        if hay.contains("affordable") || hay.contains("municipal") || hay.contains("public") {
            return set_of(&["value", "mid"]);
        }
        if hay.contains("resort") || hay.contains("championship") {
            return set_of(&["premium", "luxury"]);
        }

        set_of(&["unknown"])
    }

    pub fn difficulty(&self, candidate: &CandidateRecord, hay: &str) -> BTreeSet<String> {
        if let Some(limit) = self.parse_handicap_limit(hay) {
            return if limit <= HANDICAP_HARD_MAX {
                set_of(&["hard", "low_handicap_friendly"])
            } else if limit <= HANDICAP_MEDIUM_MAX {
                set_of(&["medium", "intermediate_friendly"])
            } else {
                set_of(&["easy", "beginner_friendly"])
            };
        }

        if hay.contains("championship") {
            return set_of(&["hard"]);
        }
        if candidate.hole_count().unwrap_or(0) >= LARGE_HOLE_COUNT {
            return set_of(&["medium", "hard"]);
        }

        set_of(&["medium"])
    }

    /// Facilities come from tag presence alone. No match yields an empty
    /// set, never an unknown marker.
    pub fn facilities(&self, candidate: &CandidateRecord) -> BTreeSet<String> {
        let mut matched = BTreeSet::new();

        if candidate.tag("shop") == Some("golf") {
            matched.insert("pro_shop".to_string());
        }
        let amenity = candidate.tag("amenity").unwrap_or_default();
        for value in amenity.split(';').map(str::trim) {
            match value {
                "restaurant" => {
                    matched.insert("restaurant".to_string());
                }
                "bar" | "pub" => {
                    matched.insert("bar".to_string());
                }
                "cafe" => {
                    matched.insert("cafe".to_string());
                }
                _ => {}
            }
        }
        if matches!(candidate.tag("buggy"), Some("yes") | Some("rental")) {
            matched.insert("buggy_hire".to_string());
        }
        if matches!(candidate.tag("trolley"), Some("yes") | Some("rental")) {
            matched.insert("trolley_hire".to_string());
        }
        if candidate.tag("club_hire") == Some("yes") {
            matched.insert("club_hire".to_string());
        }
        if candidate.tag("practice") == Some("yes") {
            matched.insert("practice_area".to_string());
        }

        matched
    }

    fn parse_currency_amount(&self, hay: &str) -> Option<f64> {
        CURRENCY_AMOUNT
            .captures(hay)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    fn parse_handicap_limit(&self, hay: &str) -> Option<u32> {
        HANDICAP_LIMIT
            .captures(hay)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
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

    fn classifier() -> AttributeClassifier {
        AttributeClassifier::new()
    }

    #[test]
    fn test_course_type_keywords_and_default() {
        let c = classifier();
        assert_eq!(c.course_type("a classic links layout"), set_of(&["links"]));
        assert_eq!(
            c.course_type("heathland turning to moorland"),
            set_of(&["heathland", "moorland"])
        );
        assert_eq!(c.course_type("pleasant enough"), set_of(&["standard"]));
    }

    #[test]
    fn test_access_from_tag_and_text() {
        let c = classifier();
        let private = candidate("Heath").with_tag("access", "private");
        assert_eq!(c.access(&private, ""), set_of(&["members_only"]));

        let open = candidate("Heath").with_tag("access", "customers");
        assert_eq!(c.access(&open, ""), set_of(&["visitors_welcome"]));

        assert_eq!(
            c.access(&candidate("Heath"), "visitors welcome all week"),
            set_of(&["visitors_welcome"])
        );
        assert_eq!(c.access(&candidate("Heath"), ""), set_of(&["unknown"]));
    }

    #[test]
    fn test_dress_code_cascade() {
        let c = classifier();
        assert_eq!(
            c.dress_code("strict dress policy"),
            set_of(&["strict_golf_attire"])
        );
        assert_eq!(c.dress_code("smart casual welcome"), set_of(&["smart_casual"]));
        assert_eq!(c.dress_code("smart attire"), set_of(&["smart_golf_attire"]));
        assert_eq!(c.dress_code("relaxed clubhouse"), set_of(&["casual"]));
        assert_eq!(c.dress_code(""), set_of(&["smart_casual"]));
    }

    #[test]
    fn test_price_band_buckets() {
        let c = classifier();
        assert_eq!(c.price_band("green fee £18"), set_of(&["value"]));
        assert_eq!(c.price_band("green fee £25"), set_of(&["value"]));
        assert_eq!(c.price_band("green fee £42.50"), set_of(&["mid"]));
        assert_eq!(c.price_band("green fee £75"), set_of(&["premium"]));
        assert_eq!(c.price_band("green fee £150"), set_of(&["luxury"]));
    }

    #[test]
    fn test_price_band_keyword_fallback() {
        let c = classifier();
        assert_eq!(
            c.price_band("municipal course open to all"),
            set_of(&["value", "mid"])
        );
        assert_eq!(
            c.price_band("championship venue"),
            set_of(&["premium", "luxury"])
        );
        assert_eq!(c.price_band("a golf course"), set_of(&["unknown"]));
    }

    #[test]
    fn test_difficulty_from_handicap_limit() {
        let c = classifier();
        let plain = candidate("Heath");
        assert_eq!(
            c.difficulty(&plain, "handicap limit 18 required"),
            set_of(&["hard", "low_handicap_friendly"])
        );
        assert_eq!(
            c.difficulty(&plain, "maximum handicap of 24"),
            set_of(&["medium", "intermediate_friendly"])
        );
        assert_eq!(
            c.difficulty(&plain, "handicap up to 36 welcome"),
            set_of(&["easy", "beginner_friendly"])
        );
    }

    #[test]
    fn test_difficulty_fallbacks() {
        let c = classifier();
        assert_eq!(
            c.difficulty(&candidate("Championship Course"), "championship course"),
            set_of(&["hard"])
        );
        let big = candidate("Heath").with_holes(27);
        assert_eq!(c.difficulty(&big, ""), set_of(&["medium", "hard"]));
        assert_eq!(c.difficulty(&candidate("Heath"), ""), set_of(&["medium"]));
    }

    #[test]
    fn test_facilities_from_tags() {
        let c = classifier();
        let stocked = candidate("Heath")
            .with_tag("shop", "golf")
            .with_tag("amenity", "restaurant; bar")
            .with_tag("buggy", "rental")
            .with_tag("practice", "yes");
        assert_eq!(
            c.facilities(&stocked),
            set_of(&["pro_shop", "restaurant", "bar", "buggy_hire", "practice_area"])
        );
        // No facility tags yields an empty set, not an unknown marker.
        assert!(c.facilities(&candidate("Heath")).is_empty());
    }

    #[test]
    fn test_apply_fills_all_sets() {
        let c = classifier();
        let cand = candidate("Heath Golf Club")
            .with_tag("description", "parkland, visitors welcome, green fee £30")
            .with_tag("shop", "golf");
        let mut entity = crate::entity::builder::EntityBuilder::new()
            .build(&cand, crate::entity::types::EntityKind::Course);
        c.apply(&mut entity, &cand);

        assert_eq!(entity.course_type, set_of(&["parkland"]));
        assert_eq!(entity.access, set_of(&["visitors_welcome"]));
        assert_eq!(entity.price_band, set_of(&["mid"]));
        assert_eq!(entity.difficulty, set_of(&["medium"]));
        assert_eq!(entity.facilities, set_of(&["pro_shop"]));
        assert_eq!(entity.dress_code, set_of(&["smart_casual"]));
    }

    #[test]
    fn test_classifiers_are_deterministic() {
        let c = classifier();
        let cand = candidate("Heath Golf Club").with_tag("description", "links, £60");
        let hay = c.haystack(&cand);
        assert_eq!(c.course_type(&hay), c.course_type(&hay));
        assert_eq!(c.price_band(&hay), c.price_band(&hay));
    }
}
