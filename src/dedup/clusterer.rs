use std::collections::BTreeMap;
use tracing::debug;

use super::scoring::PreferenceScorer;
use super::{CLUSTER_RADIUS_KM, SCORE_REPLACE_MARGIN, TARGET_DEDUP};
use crate::entity::normalizer::NameNormalizer;
use crate::entity::types::CandidateRecord;
use crate::geo::haversine_km;

/// Clusterer thresholds. Both defaults are unvalidated tunables.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub cluster_radius_km: f64,
    pub score_replace_margin: i32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            cluster_radius_km: CLUSTER_RADIUS_KM,
            score_replace_margin: SCORE_REPLACE_MARGIN,
        }
    }
}

/// Per-group reducer state: one kept representative and its score.
struct Representative {
    candidate: CandidateRecord,
    score: i32,
}

/// Collapses duplicate candidate records into one representative per
/// physical venue.
///
/// Candidates are grouped by exact normalized cluster key (no cross-name
/// fuzzy matching), then reduced within each group in descending score
/// order. A candidate joins the group's kept set when no representative
/// lies within the cluster radius; otherwise it either displaces the
/// nearest representative (score lead above the margin) or is discarded.
/// Quadratic in group size, which stays small in practice.
pub struct DedupClusterer {
    config: DedupConfig,
    normalizer: NameNormalizer,
    scorer: PreferenceScorer,
}

impl Default for DedupClusterer {
    fn default() -> Self {
        Self {
            config: DedupConfig::default(),
            normalizer: NameNormalizer::new(),
            scorer: PreferenceScorer::new(),
        }
    }
}

impl DedupClusterer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: DedupConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_normalizer(mut self, normalizer: NameNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_scorer(mut self, scorer: PreferenceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Reduce a batch of candidates to deduplicated representatives.
    /// Groups are keyed and processed in sorted key order so identical
    /// input always yields identically ordered output.
    pub fn dedupe(&self, candidates: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
        let total = candidates.len();

        let mut groups: BTreeMap<String, Vec<CandidateRecord>> = BTreeMap::new();
        for candidate in candidates {
            groups
                .entry(self.normalizer.cluster_key(&candidate.name))
                .or_default()
                .push(candidate);
        }

        let mut kept = Vec::new();
        for (key, group) in groups {
            let group_size = group.len();
            let survivors = self.reduce_group(group);
            if group_size > survivors.len() {
                debug!(
                    target: TARGET_DEDUP,
                    "Group '{}': {} candidates collapsed to {}", key, group_size, survivors.len()
                );
            }
            kept.extend(survivors);
        }

        debug!(
            target: TARGET_DEDUP,
            "Deduplicated {} candidates to {} representatives", total, kept.len()
        );
        kept
    }

    fn reduce_group(&self, group: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
        let mut scored: Vec<(i32, CandidateRecord)> = group
            .into_iter()
            .map(|c| (self.scorer.score(&c), c))
            .collect();
        // Stable sort keeps input order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut reps: Vec<Representative> = Vec::new();
        for (score, candidate) in scored {
            self.absorb(&mut reps, candidate, score);
        }

        reps.into_iter().map(|r| r.candidate).collect()
    }

    /// One reducer step: place a candidate against the kept set.
    fn absorb(&self, reps: &mut Vec<Representative>, candidate: CandidateRecord, score: i32) {
        match self.nearest_within_radius(reps, &candidate) {
            None => reps.push(Representative { candidate, score }),
            Some((idx, distance_km)) => {
                if score > reps[idx].score + self.config.score_replace_margin {
                    debug!(
                        target: TARGET_DEDUP,
                        "'{}' (score {}) displaces representative (score {}) at {:.3} km",
                        candidate.name, score, reps[idx].score, distance_km
                    );
                    reps[idx] = Representative { candidate, score };
                } else {
                    debug!(
                        target: TARGET_DEDUP,
                        "'{}' (score {}) discarded as duplicate at {:.3} km",
                        candidate.name, score, distance_km
                    );
                }
            }
        }
    }

    /// Nearest kept representative within the cluster radius. Distance ties
    /// resolve to the first-encountered representative.
    fn nearest_within_radius(
        &self,
        reps: &[Representative],
        candidate: &CandidateRecord,
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, rep) in reps.iter().enumerate() {
            let distance_km = haversine_km(rep.candidate.point, candidate.point);
            if distance_km > self.config.cluster_radius_km {
                continue;
            }
            match best {
                Some((_, best_km)) if distance_km >= best_km => {}
                _ => best = Some((idx, distance_km)),
            }
        }
        best
    }
}
