use tracing::debug;

use super::normalizer::NameNormalizer;
use super::types::{Address, CandidateRecord, CanonicalEntity, EntityKind, HoleSet};
use super::TARGET_ENTITY;

/// Label given to the only hole set when a candidate carries a bare count.
const DEFAULT_HOLES_LABEL: &str = "main";

/// Builds a draft `CanonicalEntity` from the winning candidate of a
/// dedup cluster. Assigns the stable identifier; attribute tag sets are
/// filled afterwards by the attribute classifiers.
pub struct EntityBuilder {
    normalizer: NameNormalizer,
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self {
            normalizer: NameNormalizer::new(),
        }
    }
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalizer(mut self, normalizer: NameNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn build(&self, candidate: &CandidateRecord, kind: EntityKind) -> CanonicalEntity {
        let address = self.address_from_tags(candidate);

        let id = self.normalizer.slugify(
            &candidate.name,
            address.city.as_deref(),
            address.county.as_deref(),
        );

        debug!(
            target: TARGET_ENTITY,
            "Built entity '{}' (kind {}) from {} candidate", id, kind, candidate.geometry
        );

        CanonicalEntity {
            id,
            name: candidate.name.clone(),
            kind,
            nation: candidate
                .tag("nation")
                .or_else(|| candidate.tag("addr:country"))
                .map(str::to_string),
            address,
            point: candidate.point,
            holes: self.holes_from_candidate(candidate),
            par: candidate.par_value().map(str::to_string),
            course_type: Default::default(),
            access: Default::default(),
            dress_code: Default::default(),
            difficulty: Default::default(),
            facilities: Default::default(),
            price_band: Default::default(),
            vibe: Default::default(),
            extras: Default::default(),
            source: candidate.source.clone(),
            entity_type: None,
            needs_manual_review: None,
            purity_reason: None,
        }
    }

    fn address_from_tags(&self, candidate: &CandidateRecord) -> Address {
        Address {
            street: candidate.tag("addr:street").map(str::to_string),
            city: candidate.tag("addr:city").map(str::to_string),
            county: candidate.tag("addr:county").map(str::to_string),
            postcode: candidate.tag("addr:postcode").map(str::to_string),
            country: candidate.tag("addr:country").map(str::to_string),
        }
    }

    fn holes_from_candidate(&self, candidate: &CandidateRecord) -> Vec<HoleSet> {
        match candidate.hole_count() {
            Some(count) => vec![HoleSet {
                count,
                label: DEFAULT_HOLES_LABEL.to_string(),
            }],
            None => Vec::new(),
        }
    }
}
