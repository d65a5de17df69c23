//! ROI derivation for tracked marketing investments.
//!
//! ROI is always derived from an investment plus its ordered performance
//! metrics, never stored as a mutable field. Absence of data is a normal,
//! representable state: an investment with zero metrics yields a report
//! with null derived fields, not an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked marketing spend on one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiInvestment {
    pub investment_id: Uuid,
    /// Platform slug the spend targets (`chatgpt`, `review_sites`, ...).
    pub platform: String,
    pub amount: Decimal,
    pub currency: String,
    pub investment_date: NaiveDate,
    pub expected_roi: Option<Decimal>,
}

/// One time-stamped observation appended over an investment's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiMetric {
    pub metric_date: NaiveDate,
    pub mentions_generated: i64,
    pub estimated_traffic_value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrend {
    Improving,
    Flat,
    Declining,
    InsufficientData,
}

/// Derived effectiveness metrics for one investment.
///
/// `roi_percentage` is `None` — undefined, not zero — when
/// `amount <= 0`. `payback_period_days` is `None` when cumulative traffic
/// value never reaches the invested amount within the available metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    pub investment_id: Uuid,
    pub total_value: Option<Decimal>,
    pub roi_percentage: Option<Decimal>,
    pub roi_absolute: Option<Decimal>,
    pub payback_period_days: Option<i64>,
    pub break_even_date: Option<NaiveDate>,
    pub performance_trend: PerformanceTrend,
    pub metric_count: usize,
}

/// Number of trailing metrics the trend classifier looks at.
const TREND_WINDOW: usize = 5;

/// Relative tolerance inside which a slope counts as flat.
const FLAT_TOLERANCE: f64 = 0.01;

/// Derive the ROI report for `investment` from its metrics.
///
/// Metrics are evaluated in `metric_date` order regardless of input order.
#[must_use]
pub fn calculate(investment: &RoiInvestment, metrics: &[RoiMetric]) -> RoiReport {
    if metrics.is_empty() {
        return RoiReport {
            investment_id: investment.investment_id,
            total_value: None,
            roi_percentage: None,
            roi_absolute: None,
            payback_period_days: None,
            break_even_date: None,
            performance_trend: PerformanceTrend::InsufficientData,
            metric_count: 0,
        };
    }

    let mut ordered: Vec<&RoiMetric> = metrics.iter().collect();
    ordered.sort_by_key(|m| m.metric_date);

    let total_value: Decimal = ordered
        .iter()
        .map(|m| m.estimated_traffic_value)
        .sum::<Decimal>()
        .normalize();
    let amount = investment.amount;

    let roi_absolute = (total_value - amount).normalize();
    let roi_percentage = if amount > Decimal::ZERO {
        Some((roi_absolute / amount * Decimal::from(100)).normalize())
    } else {
        None
    };

    let (payback_period_days, break_even_date) = if amount > Decimal::ZERO {
        payback(&ordered, amount, investment.investment_date)
    } else {
        (None, None)
    };

    RoiReport {
        investment_id: investment.investment_id,
        total_value: Some(total_value),
        roi_percentage,
        roi_absolute: Some(roi_absolute),
        payback_period_days,
        break_even_date,
        performance_trend: classify_trend(&ordered),
        metric_count: ordered.len(),
    }
}

/// First metric date at which cumulative traffic value covers the invested
/// amount, as days since the investment date.
fn payback(
    ordered: &[&RoiMetric],
    amount: Decimal,
    investment_date: NaiveDate,
) -> (Option<i64>, Option<NaiveDate>) {
    let mut cumulative = Decimal::ZERO;
    for metric in ordered {
        cumulative += metric.estimated_traffic_value;
        if cumulative >= amount {
            let days = (metric.metric_date - investment_date).num_days();
            return (Some(days), Some(metric.metric_date));
        }
    }
    (None, None)
}

/// Classify the sign of the least-squares slope of traffic value over the
/// last [`TREND_WINDOW`] metrics. Requires at least 2 metrics.
fn classify_trend(ordered: &[&RoiMetric]) -> PerformanceTrend {
    if ordered.len() < 2 {
        return PerformanceTrend::InsufficientData;
    }

    let window = &ordered[ordered.len().saturating_sub(TREND_WINDOW)..];
    let values: Vec<f64> = window
        .iter()
        .map(|m| {
            use rust_decimal::prelude::ToPrimitive;
            m.estimated_traffic_value.to_f64().unwrap_or(0.0)
        })
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y: f64 = values.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    let slope = if den == 0.0 { 0.0 } else { num / den };

    let tolerance = mean_y.abs() * FLAT_TOLERANCE;
    if slope.abs() <= tolerance {
        PerformanceTrend::Flat
    } else if slope > 0.0 {
        PerformanceTrend::Improving
    } else {
        PerformanceTrend::Declining
    }
}
