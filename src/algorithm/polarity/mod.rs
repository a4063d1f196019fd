//! Rule-based polarity classification of extracted terms
//!
//! Decides from a term's child concepts and nested children whether the
//! letter asserts an abnormal finding (positive) or a normal/denied one
//! (negative). Phrase matching is case-insensitive substring containment.
//! An abnormality phrase always beats a denial phrase on the same term.

pub mod rules;

pub use rules::{ABNORMALITY_PHRASES, DENIAL_PHRASES, Descriptors, Polarity, PolarityRule};

/// Classifier holding the denial and abnormality vocabularies
#[derive(Debug, Clone)]
pub struct PolarityClassifier {
    denial: Vec<String>,
    abnormality: Vec<String>,
}

impl Default for PolarityClassifier {
    fn default() -> Self {
        Self::with_vocabularies(DENIAL_PHRASES, ABNORMALITY_PHRASES)
    }
}

impl PolarityClassifier {
    /// Create a classifier with the standard vocabularies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom vocabularies
    #[must_use]
    pub fn with_vocabularies<S: AsRef<str>>(denial: &[S], abnormality: &[S]) -> Self {
        let lower = |phrases: &[S]| {
            phrases
                .iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect::<Vec<_>>()
        };
        Self {
            denial: lower(denial),
            abnormality: lower(abnormality),
        }
    }

    /// Classify a term from its descriptors
    #[must_use]
    pub fn classify(&self, child_concepts: &[String], nested_children: &[String]) -> Polarity {
        self.classify_detailed(child_concepts, nested_children).0
    }

    /// Classify a term and report the rule that decided it
    ///
    /// Rules are applied in [`PolarityRule::ORDER`]; the last one that fires
    /// wins. When none fires the term is negative and the rule is `None`.
    #[must_use]
    pub fn classify_detailed(
        &self,
        child_concepts: &[String],
        nested_children: &[String],
    ) -> (Polarity, Option<PolarityRule>) {
        let descriptors = Descriptors::new(child_concepts, nested_children);

        PolarityRule::ORDER
            .into_iter()
            .filter(|rule| self.fires(*rule, &descriptors))
            .last()
            .map_or((Polarity::Negative, None), |rule| {
                (rule.outcome(), Some(rule))
            })
    }

    /// Whether a single rule fires for the given descriptors
    #[must_use]
    pub fn fires(&self, rule: PolarityRule, descriptors: &Descriptors<'_>) -> bool {
        let has_concepts = !descriptors.child_concepts.is_empty();
        let has_nested = !descriptors.nested_children.is_empty();

        match rule {
            PolarityRule::NoDescriptors => !has_concepts && !has_nested,
            PolarityRule::Denial => has_concepts && descriptors.any_concept_contains(&self.denial),
            PolarityRule::Abnormality => {
                has_concepts && descriptors.any_concept_contains(&self.abnormality)
            }
            PolarityRule::NestedOnly => !has_concepts && has_nested,
        }
    }
}
