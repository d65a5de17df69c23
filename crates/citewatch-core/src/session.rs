use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brands::BrandSpec;
use crate::platform::{PlatformId, TimeRange};

/// Lifecycle of a monitoring session. The only legal transitions are
/// `Pending → Running → {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    /// True once the session can no longer change.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "running" => Ok(SessionStatus::Running),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(format!("unknown session status: '{other}'")),
        }
    }
}

/// What a monitoring session should do: which brands (and competitor
/// brands) to look for, across which platforms, over which window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSpec {
    pub brands: Vec<BrandSpec>,
    #[serde(default)]
    pub competitors: Vec<BrandSpec>,
    pub category: String,
    pub platforms: BTreeSet<PlatformId>,
    #[serde(default)]
    pub time_range: TimeRange,
}

impl SessionSpec {
    /// Validate the spec before any work is scheduled.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the brand list or platform set
    /// is empty, or when two tracked brands share a canonical name
    /// (case-insensitively) across `brands ∪ competitors`.
    pub fn validate(&self) -> Result<(), String> {
        if self.brands.is_empty() {
            return Err("at least one brand is required".to_string());
        }
        if self.platforms.is_empty() {
            return Err("at least one platform is required".to_string());
        }

        let mut seen = HashSet::new();
        for brand in self.tracked_brands() {
            if brand.canonical_name.trim().is_empty() {
                return Err("brand names must be non-empty".to_string());
            }
            if !seen.insert(brand.canonical_name.to_lowercase()) {
                return Err(format!(
                    "duplicate brand name: '{}'",
                    brand.canonical_name
                ));
            }
        }
        Ok(())
    }

    /// All brands the session accounts for: tracked brands then competitors.
    pub fn tracked_brands(&self) -> impl Iterator<Item = &BrandSpec> {
        self.brands.iter().chain(self.competitors.iter())
    }
}

/// Point-in-time view of a session, safe to read while platform units are
/// still running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub progress_percentage: f64,
    pub current_task: String,
    pub error_message: Option<String>,
}
