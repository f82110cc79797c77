use async_trait::async_trait;
use crate::{FinancialSnapshot, ValuationError};

/// Trait for sources that resolve a ticker or company name to the latest
/// annual snapshot
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn fetch_snapshot(&self, identifier: &str) -> Result<FinancialSnapshot, ValuationError>;
}
