use lazy_static::lazy_static;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

// Generic venue words removed when building clustering keys, so that
// "Sandford Springs Golf Club" and "Sandford Springs" key together.
const GENERIC_VENUE_WORDS: &[&str] = &["golf", "club", "course", "links", "park", "the"];

lazy_static! {
    static ref DEFAULT_GENERIC_WORDS: HashSet<String> = GENERIC_VENUE_WORDS
        .iter()
        .map(|w| w.to_string())
        .collect();
}

/// Text normalization for name keying, cluster keys and slug derivation.
///
/// Every method is pure, idempotent and total.
pub struct NameNormalizer {
    generic_words: HashSet<String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self {
            generic_words: DEFAULT_GENERIC_WORDS.clone(),
        }
    }
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generic_words(mut self, words: &[&str]) -> Self {
        self.generic_words = words.iter().map(|w| w.to_string()).collect();
        self
    }

    /// Apply basic normalization: Unicode fold, lowercase, "&" to "and",
    /// punctuation stripped, whitespace collapsed.
    pub fn normalize(&self, name: &str) -> String {
        name.replace('&', " and ")
            .nfkd()
            .collect::<String>()
            .to_lowercase()
            .replace(|c: char| !c.is_alphanumeric() && c != ' ', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalized name with generic venue words removed, used as the exact
    /// grouping key for deduplication. Falls back to the plain normalized
    /// name when stripping would leave nothing.
    pub fn cluster_key(&self, name: &str) -> String {
        let normalized = self.normalize(name);
        let key = normalized
            .split_whitespace()
            .filter(|word| !self.generic_words.contains(*word))
            .collect::<Vec<_>>()
            .join(" ");

        if key.is_empty() {
            normalized
        } else {
            key
        }
    }

    /// Deterministic identifier from the name and resolved locality parts.
    /// Assigned once at entity build time and never regenerated.
    pub fn slugify(&self, name: &str, city: Option<&str>, county: Option<&str>) -> String {
        let mut parts = vec![name];
        if let Some(city) = city {
            parts.push(city);
        }
        if let Some(county) = county {
            parts.push(county);
        }

        self.normalize(&parts.join(" ")).replace(' ', "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_normalization() {
        let normalizer = NameNormalizer::new();
        assert_eq!(normalizer.normalize("Sunningdale Golf Club"), "sunningdale golf club");
        assert_eq!(normalizer.normalize("Royal & Ancient"), "royal and ancient");
        assert_eq!(normalizer.normalize("St. Andrews (Old)"), "st andrews old");
        assert_eq!(normalizer.normalize("  WOBURN   GOLF  "), "woburn golf");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = NameNormalizer::new();
        let once = normalizer.normalize("Hankley Common Golf Club & Spa");
        assert_eq!(normalizer.normalize(&once), once);

        let key = normalizer.cluster_key("Hankley Common Golf Club & Spa");
        assert_eq!(normalizer.cluster_key(&key), key);
    }

    #[test]
    fn test_cluster_key_strips_generic_words() {
        let normalizer = NameNormalizer::new();
        assert_eq!(normalizer.cluster_key("Sandford Springs Golf Club"), "sandford springs");
        assert_eq!(normalizer.cluster_key("Sandford Springs"), "sandford springs");
        assert_eq!(
            normalizer.cluster_key("The Belfry Golf Course"),
            normalizer.cluster_key("Belfry")
        );
    }

    #[test]
    fn test_cluster_key_falls_back_when_all_generic() {
        let normalizer = NameNormalizer::new();
        // A name made entirely of generic words must still key to something.
        assert_eq!(normalizer.cluster_key("The Golf Club"), "the golf club");
    }

    #[test]
    fn test_cluster_key_custom_vocabulary() {
        let normalizer = NameNormalizer::new().with_generic_words(&["range"]);
        assert_eq!(normalizer.cluster_key("Eagle Range Golf"), "eagle golf");
    }

    #[test]
    fn test_slugify() {
        let normalizer = NameNormalizer::new();
        assert_eq!(
            normalizer.slugify("Sandford Springs Golf Club", Some("Kingsclere"), Some("Hampshire")),
            "sandford-springs-golf-club-kingsclere-hampshire"
        );
        assert_eq!(
            normalizer.slugify("St. Enodoc", None, Some("Cornwall")),
            "st-enodoc-cornwall"
        );
        assert_eq!(normalizer.slugify("Topgolf", None, None), "topgolf");
    }
}
