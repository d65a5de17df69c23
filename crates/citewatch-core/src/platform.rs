use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One external source a monitoring session can query: an AI chat platform
/// or a secondary source reachable through the same query capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformId {
    #[serde(rename = "chatgpt")]
    ChatGpt,
    Claude,
    Gemini,
    Reddit,
    ReviewSites,
}

impl PlatformId {
    /// All known platforms, in canonical order.
    pub const ALL: [PlatformId; 5] = [
        PlatformId::ChatGpt,
        PlatformId::Claude,
        PlatformId::Gemini,
        PlatformId::Reddit,
        PlatformId::ReviewSites,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformId::ChatGpt => "chatgpt",
            PlatformId::Claude => "claude",
            PlatformId::Gemini => "gemini",
            PlatformId::Reddit => "reddit",
            PlatformId::ReviewSites => "review_sites",
        }
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlatformId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chatgpt" => Ok(PlatformId::ChatGpt),
            "claude" => Ok(PlatformId::Claude),
            "gemini" => Ok(PlatformId::Gemini),
            "reddit" => Ok(PlatformId::Reddit),
            "review_sites" => Ok(PlatformId::ReviewSites),
            other => Err(format!("unknown platform: '{other}'")),
        }
    }
}

/// Look-back window for sources that support one (forums, review sites).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    #[default]
    Week,
    Month,
}

/// Category of a provider-side failure, carried as data inside a failed
/// [`PlatformQueryResult`] rather than raised as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorKind {
    /// Provider returned 429 or an equivalent quota signal.
    RateLimited,
    /// The request did not complete within the caller-supplied timeout.
    Timeout,
    /// Network failure, non-2xx status, or a provider-level error body.
    Provider,
    /// The response arrived but could not be decoded into text.
    Malformed,
}

impl QueryErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QueryErrorKind::RateLimited => "rate_limited",
            QueryErrorKind::Timeout => "timeout",
            QueryErrorKind::Provider => "provider",
            QueryErrorKind::Malformed => "malformed",
        }
    }
}

/// Outcome of one query against one platform.
///
/// Created exactly once per (platform, query) pair and never mutated.
/// Provider failures are represented with `succeeded = false` and a
/// categorized [`QueryErrorKind`]; the type has no failing constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformQueryResult {
    pub platform: PlatformId,
    pub query_text: String,
    pub response_text: String,
    pub issued_at: DateTime<Utc>,
    pub latency_ms: u64,
    pub succeeded: bool,
    pub error: Option<QueryErrorKind>,
    pub error_message: Option<String>,
}

impl PlatformQueryResult {
    /// Build a successful result carrying the raw response text.
    #[must_use]
    pub fn success(
        platform: PlatformId,
        query_text: impl Into<String>,
        response_text: impl Into<String>,
        issued_at: DateTime<Utc>,
        latency_ms: u64,
    ) -> Self {
        Self {
            platform,
            query_text: query_text.into(),
            response_text: response_text.into(),
            issued_at,
            latency_ms,
            succeeded: true,
            error: None,
            error_message: None,
        }
    }

    /// Build a failed result with a categorized error and human-readable
    /// message. `response_text` is empty; downstream extraction never runs
    /// on failed results.
    #[must_use]
    pub fn failure(
        platform: PlatformId,
        query_text: impl Into<String>,
        issued_at: DateTime<Utc>,
        latency_ms: u64,
        kind: QueryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            query_text: query_text.into(),
            response_text: String::new(),
            issued_at,
            latency_ms,
            succeeded: false,
            error: Some(kind),
            error_message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_through_str() {
        for platform in PlatformId::ALL {
            let parsed: PlatformId = platform.as_str().parse().expect("parse");
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let result = "perplexity".parse::<PlatformId>();
        assert!(result.is_err());
    }

    #[test]
    fn platform_serde_uses_snake_case() {
        let json = serde_json::to_string(&PlatformId::ReviewSites).expect("serialize");
        assert_eq!(json, "\"review_sites\"");
    }

    #[test]
    fn failure_result_has_no_response_text() {
        let result = PlatformQueryResult::failure(
            PlatformId::Claude,
            "best crm tools?",
            Utc::now(),
            1200,
            QueryErrorKind::Timeout,
            "request timed out after 30s",
        );
        assert!(!result.succeeded);
        assert!(result.response_text.is_empty());
        assert_eq!(result.error, Some(QueryErrorKind::Timeout));
    }

    #[test]
    fn success_result_has_no_error() {
        let result = PlatformQueryResult::success(
            PlatformId::ChatGpt,
            "best crm tools?",
            "Acme is a popular choice.",
            Utc::now(),
            840,
        );
        assert!(result.succeeded);
        assert!(result.error.is_none());
        assert!(result.error_message.is_none());
    }
}
