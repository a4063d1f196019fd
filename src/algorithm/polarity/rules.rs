//! Polarity decision table
//!
//! The rules are evaluated top to bottom and every rule that fires overwrites
//! the outcome of the rules above it, so a later row takes precedence.

use std::fmt;

/// Phrases in a child concept that deny or normalize a finding
pub const DENIAL_PHRASES: &[&str] = &["known absent", "not present", "not current", "normal"];

/// Phrases in a child concept that assert an abnormal finding
pub const ABNORMALITY_PHRASES: &[&str] = &[
    "known possible",
    "low",
    "moderate",
    "small",
    "increase",
    "recent",
    "multiple",
    "current",
    "abnormal",
    "slow",
    "left",
    "right",
    "in progress",
    "suspected",
];

/// Binary classification of a term occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Polarity {
    /// Normal, absent or denied finding
    Negative = 0,
    /// Present or abnormal finding
    Positive = 1,
}

impl Polarity {
    /// Numeric value stored in the matrix
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Rows of the decision table, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolarityRule {
    /// No child concepts and no nested children: the bare term implies a problem
    NoDescriptors,
    /// A child concept contains a denial phrase
    Denial,
    /// A child concept contains an abnormality phrase
    Abnormality,
    /// No child concepts but at least one nested child
    NestedOnly,
}

impl PolarityRule {
    /// All rules in evaluation order
    pub const ORDER: [Self; 4] = [
        Self::NoDescriptors,
        Self::Denial,
        Self::Abnormality,
        Self::NestedOnly,
    ];

    /// Outcome when the rule fires
    #[must_use]
    pub const fn outcome(self) -> Polarity {
        match self {
            Self::Denial => Polarity::Negative,
            Self::NoDescriptors | Self::Abnormality | Self::NestedOnly => Polarity::Positive,
        }
    }

    /// Short name used in logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoDescriptors => "no-descriptors",
            Self::Denial => "denial",
            Self::Abnormality => "abnormality",
            Self::NestedOnly => "nested-only",
        }
    }
}

impl fmt::Display for PolarityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptors of one term, with child concepts lowercased once
#[derive(Debug)]
pub struct Descriptors<'a> {
    pub(crate) child_concepts: Vec<String>,
    pub(crate) nested_children: &'a [String],
}

impl<'a> Descriptors<'a> {
    /// Prepare descriptors for rule evaluation
    #[must_use]
    pub fn new(child_concepts: &[String], nested_children: &'a [String]) -> Self {
        Self {
            child_concepts: child_concepts.iter().map(|c| c.to_lowercase()).collect(),
            nested_children,
        }
    }

    /// Whether any child concept contains any of the (lowercase) phrases
    pub(crate) fn any_concept_contains(&self, phrases: &[String]) -> bool {
        self.child_concepts
            .iter()
            .any(|concept| phrases.iter().any(|p| concept.contains(p.as_str())))
    }
}
