use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::geo::GeoPoint;

/// Source geometry backing a candidate record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Point,
    Line,
    Area,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "point"),
            GeometryKind::Line => write!(f, "line"),
            GeometryKind::Area => write!(f, "area"),
        }
    }
}

impl From<&str> for GeometryKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "area" | "polygon" | "relation" => GeometryKind::Area,
            "line" | "way" | "linestring" => GeometryKind::Line,
            _ => GeometryKind::Point,
        }
    }
}

/// Coarse kind assigned by the build-stage classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Course,
    DrivingRange,
    Exclude,
    Unknown,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Course => write!(f, "course"),
            EntityKind::DrivingRange => write!(f, "driving_range"),
            EntityKind::Exclude => write!(f, "exclude"),
            EntityKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Final type assigned by the audit-stage classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Course,
    NotCourse,
    ClosedCourse,
    DrivingRange,
    Exclude,
    Unknown,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Course => write!(f, "course"),
            EntityType::NotCourse => write!(f, "not_course"),
            EntityType::ClosedCourse => write!(f, "closed_course"),
            EntityType::DrivingRange => write!(f, "driving_range"),
            EntityType::Exclude => write!(f, "exclude"),
            EntityType::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "course" => EntityType::Course,
            "not_course" => EntityType::NotCourse,
            "closed_course" => EntityType::ClosedCourse,
            "driving_range" => EntityType::DrivingRange,
            "exclude" => EntityType::Exclude,
            _ => EntityType::Unknown,
        }
    }
}

/// A single unresolved venue observation from the ingestion source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub point: GeoPoint,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub geometry: GeometryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub par: Option<String>,
    #[serde(default)]
    pub source: String,
}

impl CandidateRecord {
    pub fn new(name: &str, point: GeoPoint, geometry: GeometryKind) -> Self {
        Self {
            name: name.to_string(),
            point,
            tags: HashMap::new(),
            geometry,
            holes: None,
            par: None,
            source: String::new(),
        }
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_holes(mut self, holes: u32) -> Self {
        self.holes = Some(holes);
        self
    }

    pub fn with_par(mut self, par: &str) -> Self {
        self.par = Some(par.to_string());
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Hole count from the structured field, falling back to the raw tag.
    pub fn hole_count(&self) -> Option<u32> {
        self.holes
            .or_else(|| self.tag("holes").and_then(|v| v.parse().ok()))
    }

    /// Par from the structured field, falling back to the raw tag.
    pub fn par_value(&self) -> Option<&str> {
        self.par.as_deref().or_else(|| self.tag("par"))
    }
}

/// Postal address resolved for a venue. Fields left unset when upstream
/// geocoding could not resolve them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// One playable loop at a venue, e.g. an 18-hole main round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleSet {
    pub count: u32,
    pub label: String,
}

/// The single representative record retained for one physical venue.
///
/// The identifier is assigned once at build time and never regenerated;
/// the audit pass only writes the `entity_type`, `needs_manual_review` and
/// `purity_reason` fields and may strip deprecated extras tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nation: Option<String>,
    pub address: Address,
    pub point: GeoPoint,
    #[serde(default)]
    pub holes: Vec<HoleSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub par: Option<String>,
    #[serde(default)]
    pub course_type: BTreeSet<String>,
    #[serde(default)]
    pub access: BTreeSet<String>,
    #[serde(default)]
    pub dress_code: BTreeSet<String>,
    #[serde(default)]
    pub difficulty: BTreeSet<String>,
    #[serde(default)]
    pub facilities: BTreeSet<String>,
    #[serde(default)]
    pub price_band: BTreeSet<String>,
    #[serde(default)]
    pub vibe: BTreeSet<String>,
    #[serde(default)]
    pub extras: BTreeSet<String>,
    #[serde(default)]
    pub source: String,

    // Audit fields, absent until the purity pass has run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_manual_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purity_reason: Option<String>,
}

impl CanonicalEntity {
    /// True when a par value with at least one digit is recorded.
    pub fn has_par_digits(&self) -> bool {
        self.par
            .as_deref()
            .map(|p| p.chars().any(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    }
}

/// Outcome of one audit-stage classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub entity_type: EntityType,
    pub needs_manual_review: bool,
    pub reason: String,
}

impl Verdict {
    pub fn new(entity_type: EntityType, needs_manual_review: bool, reason: &str) -> Self {
        Self {
            entity_type,
            needs_manual_review,
            reason: reason.to_string(),
        }
    }
}

/// Traceability stub kept for every excluded or review-flagged record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_kind_from_source_strings() {
        assert_eq!(GeometryKind::from("relation"), GeometryKind::Area);
        assert_eq!(GeometryKind::from("polygon"), GeometryKind::Area);
        assert_eq!(GeometryKind::from("way"), GeometryKind::Line);
        assert_eq!(GeometryKind::from("node"), GeometryKind::Point);
    }

    #[test]
    fn test_entity_type_round_trip() {
        for et in [
            EntityType::Course,
            EntityType::NotCourse,
            EntityType::ClosedCourse,
            EntityType::DrivingRange,
            EntityType::Exclude,
        ] {
            assert_eq!(EntityType::from(et.to_string().as_str()), et);
        }
    }

    #[test]
    fn test_hole_count_prefers_structured_field() {
        let c = CandidateRecord::new(
            "Test",
            crate::geo::GeoPoint::new(51.0, -1.0),
            GeometryKind::Point,
        )
        .with_holes(18)
        .with_tag("holes", "9");
        assert_eq!(c.hole_count(), Some(18));

        let c = CandidateRecord::new(
            "Test",
            crate::geo::GeoPoint::new(51.0, -1.0),
            GeometryKind::Point,
        )
        .with_tag("holes", "9");
        assert_eq!(c.hole_count(), Some(9));
    }

    #[test]
    fn test_par_digit_detection() {
        let mut e = test_entity();
        assert!(!e.has_par_digits());
        e.par = Some("unknown".to_string());
        assert!(!e.has_par_digits());
        e.par = Some("72".to_string());
        assert!(e.has_par_digits());
    }

    pub(crate) fn test_entity() -> CanonicalEntity {
        CanonicalEntity {
            id: "test-venue".to_string(),
            name: "Test Venue".to_string(),
            kind: EntityKind::Course,
            nation: None,
            address: Address::default(),
            point: crate::geo::GeoPoint::new(51.0, -1.0),
            holes: Vec::new(),
            par: None,
            course_type: BTreeSet::new(),
            access: BTreeSet::new(),
            dress_code: BTreeSet::new(),
            difficulty: BTreeSet::new(),
            facilities: BTreeSet::new(),
            price_band: BTreeSet::new(),
            vibe: BTreeSet::new(),
            extras: BTreeSet::new(),
            source: String::new(),
            entity_type: None,
            needs_manual_review: None,
            purity_reason: None,
        }
    }
}
