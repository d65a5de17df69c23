//! Platform query capability for CiteWatch.
//!
//! [`PlatformClient`] is the uniform seam the orchestrator fans out
//! through: one natural-language query in, raw text plus latency metadata
//! out. Provider failures (HTTP errors, malformed bodies, timeouts) are
//! categorized data inside the returned [`citewatch_core::PlatformQueryResult`],
//! never `Err` — the orchestrator treats them as a degraded contribution,
//! not a control-flow interrupt.

pub mod client;
pub mod http;
pub mod queries;

mod retry;

pub use client::PlatformClient;
pub use http::{HttpChatClient, HttpClientConfig};
pub use queries::monitoring_query;
