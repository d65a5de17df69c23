//! Shared domain types and configuration for CiteWatch.
//!
//! Defines the vocabulary the rest of the workspace speaks: brands and their
//! aliases, platform identifiers, raw query results, extracted citations,
//! monitoring session specs and snapshots, plus the env-driven application
//! config and the platform-limits file.

mod app_config;
mod brands;
mod citation;
mod config;
mod error;
mod limits;
mod platform;
mod session;

pub use app_config::{AppConfig, Environment};
pub use brands::BrandSpec;
pub use citation::{Citation, MentionKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use limits::{load_platform_limits, PlatformEndpoint, PlatformLimit, PlatformLimitsFile};
pub use platform::{PlatformId, PlatformQueryResult, QueryErrorKind, TimeRange};
pub use session::{SessionSnapshot, SessionSpec, SessionStatus};
