//! Pluggable sentiment scoring.
//!
//! The extractor depends only on [`SentimentScorer`]; implementations must
//! be deterministic for identical input and return values in `[-1.0, 1.0]`.
//! [`LexiconScorer`] is the default rule-based implementation; heavier
//! model-backed scorers can be swapped in without touching the extraction
//! contract.

/// Capability interface for sentiment scoring over a context window.
pub trait SentimentScorer: Send + Sync {
    /// Score `text` in `[-1.0, 1.0]`; deterministic for identical input.
    fn score(&self, text: &str) -> f64;
}

/// Word weights for brand-mention contexts.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("excellent", 0.5),
    ("outstanding", 0.5),
    ("great", 0.4),
    ("good", 0.3),
    ("amazing", 0.5),
    ("fantastic", 0.5),
    ("impressive", 0.4),
    ("reliable", 0.4),
    ("efficient", 0.3),
    ("helpful", 0.3),
    ("intuitive", 0.3),
    ("powerful", 0.4),
    ("robust", 0.4),
    ("solid", 0.3),
    ("recommend", 0.4),
    ("recommended", 0.4),
    ("love", 0.5),
    ("prefer", 0.3),
    ("best", 0.5),
    ("top", 0.3),
    ("leading", 0.3),
    ("superior", 0.4),
    ("innovative", 0.3),
    ("seamless", 0.4),
    ("smooth", 0.3),
    // Negative signals
    ("terrible", -0.6),
    ("awful", -0.6),
    ("bad", -0.4),
    ("poor", -0.4),
    ("horrible", -0.6),
    ("disappointing", -0.5),
    ("frustrating", -0.5),
    ("confusing", -0.4),
    ("slow", -0.3),
    ("unreliable", -0.5),
    ("buggy", -0.5),
    ("broken", -0.5),
    ("expensive", -0.3),
    ("costly", -0.3),
    ("hate", -0.5),
    ("avoid", -0.5),
    ("worst", -0.6),
    ("lacking", -0.4),
    ("limited", -0.3),
    ("problematic", -0.4),
    ("issues", -0.3),
    ("problems", -0.3),
    ("complaints", -0.4),
];

/// Rule-based scorer backed by the word-weight lexicon above.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let mut score = 0.0_f64;
        for word in text.split_whitespace() {
            let w = word
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            for &(lex_word, weight) in LEXICON {
                if w == lex_word {
                    score += weight;
                    break;
                }
            }
        }
        score.clamp(-1.0, 1.0)
    }
}
