use crate::entity::types::{CandidateRecord, GeometryKind};

// Tag keys that count as a contact URL or phone number
const WEBSITE_TAGS: &[&str] = &["website", "contact:website", "url"];
const PHONE_TAGS: &[&str] = &["phone", "contact:phone"];

/// Weights behind the preference score. The base values keep the required
/// ordering area > line > point; polygon outlines are higher fidelity than
/// point pins.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub area_base: i32,
    pub line_base: i32,
    pub point_base: i32,
    pub holes_bonus: i32,
    pub par_bonus: i32,
    pub website_bonus: i32,
    pub phone_bonus: i32,
    pub city_bonus: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            area_base: 50,
            line_base: 30,
            point_base: 10,
            holes_bonus: 15,
            par_bonus: 10,
            website_bonus: 8,
            phone_bonus: 5,
            city_bonus: 5,
        }
    }
}

/// Ranks duplicate candidates so the clusterer can keep the best
/// representative. Deterministic: equal inputs produce equal scores.
pub struct PreferenceScorer {
    weights: ScoreWeights,
}

impl Default for PreferenceScorer {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
        }
    }
}

impl PreferenceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn score(&self, candidate: &CandidateRecord) -> i32 {
        let mut score = match candidate.geometry {
            GeometryKind::Area => self.weights.area_base,
            GeometryKind::Line => self.weights.line_base,
            GeometryKind::Point => self.weights.point_base,
        };

        if candidate.hole_count().is_some() {
            score += self.weights.holes_bonus;
        }
        if candidate.par_value().is_some() {
            score += self.weights.par_bonus;
        }
        if WEBSITE_TAGS.iter().any(|t| candidate.tag(t).is_some()) {
            score += self.weights.website_bonus;
        }
        if PHONE_TAGS.iter().any(|t| candidate.tag(t).is_some()) {
            score += self.weights.phone_bonus;
        }
        if candidate.tag("addr:city").is_some() {
            score += self.weights.city_bonus;
        }

        score
    }
}
