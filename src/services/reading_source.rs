//! Trait for retrieving raw station readings.

use anyhow::Result;

use crate::readings::{RawReadingSet, TimeRange};

/// Abstraction over a provider of raw station readings (e.g. the RealmFive API).
///
/// Implementations return readings as received: not deduplicated, not sorted.
/// An empty set is a valid answer; transport or decode failures are errors.
#[async_trait::async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch(&self, device_id: &str, range: TimeRange) -> Result<RawReadingSet>;
}
