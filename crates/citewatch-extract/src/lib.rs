//! Citation extraction engine for CiteWatch.
//!
//! Takes a raw platform response, the query that produced it, and the set of
//! brands a session tracks, and produces one [`citewatch_core::Citation`]
//! per (brand, occurrence) — with byte position, surrounding context,
//! sentiment, prominence, and match confidence. Brands with no textual
//! match get exactly one `mentioned = false` citation.

pub mod error;
pub mod extractor;
pub mod scorer;

mod matcher;
mod segment;

pub use error::ExtractError;
pub use extractor::CitationExtractor;
pub use scorer::{LexiconScorer, SentimentScorer};
