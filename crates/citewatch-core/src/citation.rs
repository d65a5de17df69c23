use serde::{Deserialize, Serialize};

/// Contextual flag classifying how a brand mention appears in its
/// surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Comparison,
    Recommendation,
    Negative,
    Question,
}

impl MentionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MentionKind::Comparison => "comparison",
            MentionKind::Recommendation => "recommendation",
            MentionKind::Negative => "negative",
            MentionKind::Question => "question",
        }
    }
}

/// A structured record of whether and how one brand was mentioned in one
/// platform response.
///
/// One citation is emitted per (brand, occurrence); a brand with zero
/// occurrences still yields exactly one citation with `mentioned = false`
/// so downstream consumers can account for every requested brand.
///
/// Invariant: `position`, `sentiment_score` and `prominence_score` are
/// `Some` iff `mentioned` is true. `position` is the byte offset of the
/// match in the response text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Canonical name of the brand this citation accounts for. Always a
    /// member of the owning session's brands or competitors.
    pub brand: String,
    pub mentioned: bool,
    pub position: Option<usize>,
    /// Containing sentence plus immediate neighbors.
    pub context: String,
    /// The sentence containing the match.
    pub sentence: String,
    #[serde(default)]
    pub mention_kinds: Vec<MentionKind>,
    /// In `[-1.0, 1.0]` when mentioned.
    pub sentiment_score: Option<f64>,
    /// In `[0.0, 10.0]` when mentioned; earlier and more frequent mentions
    /// score at least as high.
    pub prominence_score: Option<f64>,
    /// In `[0.0, 1.0]`; 1.0 only for an exact canonical match.
    pub confidence_score: f64,
}

impl Citation {
    /// The single citation emitted for a brand with no textual match.
    #[must_use]
    pub fn not_mentioned(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            mentioned: false,
            position: None,
            context: String::new(),
            sentence: String::new(),
            mention_kinds: Vec::new(),
            sentiment_score: None,
            prominence_score: None,
            confidence_score: 0.0,
        }
    }
}
