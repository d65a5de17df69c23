//! Brand citation extraction over a single platform response.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use citewatch_core::{BrandSpec, Citation, MentionKind};

use crate::error::ExtractError;
use crate::matcher::BrandMatcher;
use crate::scorer::{LexiconScorer, SentimentScorer};
use crate::segment::{split_sentences, Sentence};

static COMPARISON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:vs\.?|versus|compared\s+(?:to|with)|better\s+than|worse\s+than|alternative\s+to)\b")
        .expect("comparison pattern")
});

static RECOMMEND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:recommend(?:ed|s)?|suggest(?:ed|s)?|best|top\s+(?:choice|pick)|go\s+with|check\s+out|worth\s+trying)\b")
        .expect("recommendation pattern")
});

static NEGATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:avoid|worst|terrible|awful|poor|disappointing|unreliable|buggy|problems?|issues?|complaints?)\b")
        .expect("negative pattern")
});

/// Extracts structured citations from raw response text.
///
/// Holds only the sentiment scorer; matching patterns are compiled per
/// call from the session's brand list, which differs between sessions.
pub struct CitationExtractor {
    scorer: Arc<dyn SentimentScorer>,
}

impl CitationExtractor {
    #[must_use]
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    /// Extractor with the rule-based [`LexiconScorer`].
    #[must_use]
    pub fn with_default_scorer() -> Self {
        Self::new(Arc::new(LexiconScorer))
    }

    /// Extract one citation per (brand, occurrence) from `response_text`,
    /// plus one `mentioned = false` citation per brand with no occurrence.
    ///
    /// Citations are ordered by the input brand order, then by position.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MalformedInput`] for non-text input
    /// (embedded NUL bytes). Well-formed text never fails.
    pub fn extract(
        &self,
        response_text: &str,
        query_text: &str,
        brands: &[BrandSpec],
    ) -> Result<Vec<Citation>, ExtractError> {
        if response_text.contains('\u{0}') {
            return Err(ExtractError::MalformedInput(
                "response contains NUL bytes".to_string(),
            ));
        }

        let sentences = split_sentences(response_text);
        let mut citations = Vec::new();

        for brand in brands {
            let matcher = BrandMatcher::compile(brand)?;
            let matches = matcher.find_matches(response_text);

            if matches.is_empty() {
                citations.push(Citation::not_mentioned(&brand.canonical_name));
                continue;
            }

            let occurrence_count = matches.len();
            for m in &matches {
                citations.push(self.build_citation(
                    response_text,
                    &sentences,
                    brand,
                    m.start,
                    m.kind.confidence(),
                    occurrence_count,
                ));
            }
        }

        let mentioned = citations.iter().filter(|c| c.mentioned).count();
        tracing::debug!(
            query = query_text,
            brands = brands.len(),
            mentions = mentioned,
            "citation extraction finished"
        );

        Ok(citations)
    }

    fn build_citation(
        &self,
        text: &str,
        sentences: &[Sentence],
        brand: &BrandSpec,
        offset: usize,
        confidence: f64,
        occurrence_count: usize,
    ) -> Citation {
        let idx = sentences.iter().position(|s| s.contains(offset));
        let sentence = idx
            .map(|i| &text[sentences[i].start..sentences[i].end])
            .unwrap_or_default();
        let context = idx.map_or_else(
            || sentence.to_string(),
            |i| context_window(text, sentences, i),
        );

        let sentiment = self.scorer.score(&context).clamp(-1.0, 1.0);
        let mention_kinds = classify_mention(&context, sentence);
        let prominence = prominence_score(
            offset,
            text.len(),
            sentences.first().is_some_and(|s| s.contains(offset)),
            occurrence_count,
        );

        Citation {
            brand: brand.canonical_name.clone(),
            mentioned: true,
            position: Some(offset),
            context,
            sentence: sentence.to_string(),
            mention_kinds,
            sentiment_score: Some(sentiment),
            prominence_score: Some(prominence),
            confidence_score: confidence,
        }
    }
}

/// The containing sentence plus its immediate neighbors, as one slice of
/// the original text.
fn context_window(text: &str, sentences: &[Sentence], idx: usize) -> String {
    let start = sentences[idx.saturating_sub(1)].start;
    let end = sentences[(idx + 1).min(sentences.len() - 1)].end;
    text[start..end].to_string()
}

/// Prominence in `[0, 10]`: positional weight (earlier is higher) plus an
/// opening-sentence bonus plus a frequency term. Monotonic: an earlier
/// offset never scores lower, and more total occurrences never score lower,
/// all else equal.
fn prominence_score(
    offset: usize,
    text_len: usize,
    in_opening_sentence: bool,
    occurrence_count: usize,
) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let positional = if text_len == 0 {
        0.0
    } else {
        6.0 * (1.0 - offset as f64 / text_len as f64)
    };
    let salience = if in_opening_sentence { 1.5 } else { 0.0 };
    #[allow(clippy::cast_precision_loss)]
    let frequency = (0.5 * (occurrence_count.saturating_sub(1)) as f64).min(2.5);
    (positional + salience + frequency).clamp(0.0, 10.0)
}

/// Contextual flags for a mention: comparison, recommendation, negative,
/// question. Classified over the context window; the question flag looks at
/// the containing sentence only.
fn classify_mention(context: &str, sentence: &str) -> Vec<MentionKind> {
    let mut kinds = Vec::new();
    if COMPARISON_RE.is_match(context) {
        kinds.push(MentionKind::Comparison);
    }
    if RECOMMEND_RE.is_match(context) {
        kinds.push(MentionKind::Recommendation);
    }
    if NEGATIVE_RE.is_match(context) {
        kinds.push(MentionKind::Negative);
    }
    if sentence.trim_end().ends_with('?') {
        kinds.push(MentionKind::Question);
    }
    kinds
}
