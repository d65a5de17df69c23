//! Cross-platform aggregation of a finished session's citations.
//!
//! [`aggregate`] is a pure function of its inputs: deterministic iteration
//! (ordered maps, fixed insight rules) makes repeated calls over the same
//! session byte-identical when serialized.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use citewatch_core::{BrandSpec, Citation, PlatformId};

use crate::session::PlatformOutcome;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_mentions: usize,
    pub brands_tracked: usize,
    pub brands_with_mentions: usize,
    pub platforms_requested: usize,
    pub platforms_succeeded: usize,
    pub platforms_failed: usize,
    pub platforms_skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandAnalytics {
    pub mentions_by_platform: BTreeMap<String, usize>,
    pub combined_mentions: usize,
    /// Mean sentiment over mentioned citations only; `None` without any.
    pub average_sentiment: Option<f64>,
    pub average_prominence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformAnalytics {
    pub succeeded: bool,
    pub mentions: usize,
    pub average_sentiment: Option<f64>,
    pub error: Option<String>,
}

/// Derived, read-only projection over a completed session. Never persisted
/// as the source of truth — the session's raw citations are canonical.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedAnalytics {
    pub session_id: Uuid,
    pub summary: AnalyticsSummary,
    pub brand_breakdown: BTreeMap<String, BrandAnalytics>,
    pub platform_breakdown: BTreeMap<String, PlatformAnalytics>,
    pub insights: Vec<String>,
}

/// Merge per-platform citation batches into combined analytics.
///
/// Idempotent and side-effect free; mean sentiment and prominence ignore
/// `mentioned = false` entries.
#[must_use]
pub fn aggregate(
    session_id: Uuid,
    brands: &[BrandSpec],
    outcomes: &BTreeMap<PlatformId, PlatformOutcome>,
    citations: &BTreeMap<PlatformId, Vec<Citation>>,
) -> CombinedAnalytics {
    let mut brand_breakdown: BTreeMap<String, BrandAnalytics> = brands
        .iter()
        .map(|b| {
            (
                b.canonical_name.clone(),
                BrandAnalytics {
                    mentions_by_platform: BTreeMap::new(),
                    combined_mentions: 0,
                    average_sentiment: None,
                    average_prominence: None,
                },
            )
        })
        .collect();

    let mut sentiment_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut prominence_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut platform_breakdown: BTreeMap<String, PlatformAnalytics> = BTreeMap::new();
    let mut platform_sentiments: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut total_mentions = 0usize;

    for (platform, outcome) in outcomes {
        let key = platform.to_string();
        let (succeeded, error) = match outcome {
            PlatformOutcome::Succeeded { .. } => (true, None),
            PlatformOutcome::Failed { message, .. } => (false, Some(message.clone())),
            PlatformOutcome::Skipped => (false, Some("skipped".to_string())),
        };
        platform_breakdown.insert(
            key,
            PlatformAnalytics {
                succeeded,
                mentions: 0,
                average_sentiment: None,
                error,
            },
        );
    }

    for (platform, batch) in citations {
        let platform_key = platform.to_string();
        for citation in batch {
            if !citation.mentioned {
                continue;
            }
            total_mentions += 1;

            if let Some(brand) = brand_breakdown.get_mut(&citation.brand) {
                *brand
                    .mentions_by_platform
                    .entry(platform_key.clone())
                    .or_insert(0) += 1;
                brand.combined_mentions += 1;
            }
            if let Some(score) = citation.sentiment_score {
                let entry = sentiment_sums.entry(citation.brand.clone()).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
                let p = platform_sentiments.entry(platform_key.clone()).or_insert((0.0, 0));
                p.0 += score;
                p.1 += 1;
            }
            if let Some(score) = citation.prominence_score {
                let entry = prominence_sums.entry(citation.brand.clone()).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
            if let Some(platform) = platform_breakdown.get_mut(&platform_key) {
                platform.mentions += 1;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    for (name, brand) in &mut brand_breakdown {
        if let Some((sum, count)) = sentiment_sums.get(name) {
            brand.average_sentiment = Some(sum / *count as f64);
        }
        if let Some((sum, count)) = prominence_sums.get(name) {
            brand.average_prominence = Some(sum / *count as f64);
        }
    }
    #[allow(clippy::cast_precision_loss)]
    for (name, platform) in &mut platform_breakdown {
        if let Some((sum, count)) = platform_sentiments.get(name) {
            platform.average_sentiment = Some(sum / *count as f64);
        }
    }

    let summary = AnalyticsSummary {
        total_mentions,
        brands_tracked: brand_breakdown.len(),
        brands_with_mentions: brand_breakdown
            .values()
            .filter(|b| b.combined_mentions > 0)
            .count(),
        platforms_requested: outcomes.len(),
        platforms_succeeded: outcomes
            .values()
            .filter(|o| matches!(o, PlatformOutcome::Succeeded { .. }))
            .count(),
        platforms_failed: outcomes
            .values()
            .filter(|o| matches!(o, PlatformOutcome::Failed { .. }))
            .count(),
        platforms_skipped: outcomes
            .values()
            .filter(|o| matches!(o, PlatformOutcome::Skipped))
            .count(),
    };

    let insights = build_insights(&summary, &brand_breakdown, &platform_breakdown);

    CombinedAnalytics {
        session_id,
        summary,
        brand_breakdown,
        platform_breakdown,
        insights,
    }
}

/// Fixed, auditable insight rules. Iteration over ordered maps keeps the
/// output order stable across calls.
fn build_insights(
    summary: &AnalyticsSummary,
    brands: &BTreeMap<String, BrandAnalytics>,
    platforms: &BTreeMap<String, PlatformAnalytics>,
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some((name, top)) = platforms
        .iter()
        .filter(|(_, p)| p.mentions > 0)
        .max_by(|a, b| a.1.mentions.cmp(&b.1.mentions).then(b.0.cmp(a.0)))
    {
        insights.push(format!(
            "highest mention count of {} on {name}",
            top.mentions
        ));
    }

    for (name, brand) in brands {
        if brand.combined_mentions == 0 {
            insights.push(format!("{name} has no visibility on any requested platform"));
        }
    }

    if summary.total_mentions == 0 {
        insights.push(format!(
            "no brand mentions found across {} platforms",
            summary.platforms_requested
        ));
    } else {
        insights.push(format!(
            "{} total mentions across {} platforms",
            summary.total_mentions, summary.platforms_succeeded
        ));
    }

    if summary.platforms_failed > 0 {
        insights.push(format!(
            "{} of {} platforms failed; their contribution is absent",
            summary.platforms_failed, summary.platforms_requested
        ));
    }

    insights
}
