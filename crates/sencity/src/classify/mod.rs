//! Query classification.
//!
//! Decides which remote service a trimmed search string is routed to. The dispatcher only
//! depends on the [`Classifier`] trait, so the fixed species list can be replaced by a remote
//! or learned classifier.
use ahash::AHashSet;

/// Species known to the animal knowledge service.
pub const DEFAULT_SPECIES: [&str; 11] = [
    "고라니",
    "멧돼지",
    "청설모",
    "다람쥐",
    "너구리",
    "반달가슴곰",
    "노루",
    "멧토끼",
    "족제비",
    "왜가리",
    "중대백로",
];

/// The two disjoint query domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryDomain {
    /// Wildlife species lookup.
    Species,
    /// Geographic place lookup.
    Place,
}

pub trait Classifier {
    /// Classify a non-empty, trimmed input. Must be total: every input maps to one domain.
    fn classify(&self, input: &str) -> QueryDomain;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> QueryDomain,
{
    fn classify(&self, input: &str) -> QueryDomain {
        self(input)
    }
}

/// Exact, case-sensitive membership test against a fixed set of species names.
///
/// Anything not in the set is a place. No prefix or fuzzy matching.
#[derive(Debug, Clone)]
pub struct SpeciesClassifier {
    species: AHashSet<String>,
}

impl SpeciesClassifier {
    pub fn new<I, S>(species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            species: species.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.species.contains(name)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl Default for SpeciesClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SPECIES)
    }
}

impl Classifier for SpeciesClassifier {
    fn classify(&self, input: &str) -> QueryDomain {
        if self.contains(input) {
            QueryDomain::Species
        } else {
            QueryDomain::Place
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_species() {
        let classifier = SpeciesClassifier::default();
        for name in DEFAULT_SPECIES {
            assert_eq!(classifier.classify(name), QueryDomain::Species, "{name}");
        }
        assert_eq!(classifier.len(), 11);
    }

    #[test]
    fn test_everything_else_is_a_place() {
        let classifier = SpeciesClassifier::default();
        assert_eq!(classifier.classify("서울역"), QueryDomain::Place);
        assert_eq!(classifier.classify("남산"), QueryDomain::Place);
        assert_eq!(classifier.classify("water deer"), QueryDomain::Place);
    }

    #[test]
    fn test_no_prefix_or_substring_matching() {
        let classifier = SpeciesClassifier::default();
        assert_eq!(classifier.classify("고라"), QueryDomain::Place);
        assert_eq!(classifier.classify("고라니 서식지"), QueryDomain::Place);
        assert_eq!(classifier.classify("반달"), QueryDomain::Place);
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let classifier = SpeciesClassifier::new(["Raccoon Dog"]);
        assert_eq!(classifier.classify("Raccoon Dog"), QueryDomain::Species);
        assert_eq!(classifier.classify("raccoon dog"), QueryDomain::Place);
        assert_eq!(classifier.classify("RACCOON DOG"), QueryDomain::Place);
    }

    #[test]
    fn test_empty_species_set_routes_everything_to_places() {
        let classifier = SpeciesClassifier::new(Vec::<String>::new());
        assert!(classifier.is_empty());
        assert_eq!(classifier.classify("고라니"), QueryDomain::Place);
    }

    #[test]
    fn test_closures_are_classifiers() {
        let always_species = |_: &str| QueryDomain::Species;
        assert_eq!(always_species.classify("서울역"), QueryDomain::Species);
    }
}
