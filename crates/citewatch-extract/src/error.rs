use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed response text: {0}")]
    MalformedInput(String),

    #[error("brand pattern error for '{brand}': {source}")]
    Pattern {
        brand: String,
        source: regex::Error,
    },
}
