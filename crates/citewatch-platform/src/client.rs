use std::time::Duration;

use async_trait::async_trait;

use citewatch_core::{PlatformId, PlatformQueryResult};

/// Capability for issuing one natural-language query to one platform.
///
/// Implementations must never return an error for ordinary provider
/// failures; those come back as a result with `succeeded = false` and a
/// categorized [`citewatch_core::QueryErrorKind`]. The only panics
/// permitted are violations of the calling contract (a client constructed
/// for the wrong platform), which are programming errors.
///
/// Side effects are limited to network I/O; implementations hold no shared
/// mutable state.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Which platform this client speaks to.
    fn platform(&self) -> PlatformId;

    /// Issue `query_text` and wait at most `timeout` for the raw response.
    async fn query(&self, query_text: &str, timeout: Duration) -> PlatformQueryResult;
}
