pub mod aggregator;
pub mod metrics;


pub use aggregator::{aggregate, VerdictWeights};
pub use metrics::{derive_metrics, Bands, Direction, MetricDefinition, METRICS};

use tracing::info;
use valuation_core::{FinancialSnapshot, SnapshotProvider, ValuationError, ValuationReport};

/// Scores one snapshot at a time; holds no state between calls.
pub struct ValuationEngine;

impl ValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Derive every applicable ratio and fold them into an overall verdict.
    /// Never fails: a snapshot with no usable figures yields
    /// `insufficient_data`.
    pub fn evaluate(&self, snapshot: &FinancialSnapshot) -> ValuationReport {
        let metrics = derive_metrics(snapshot);
        let overall = aggregate(&metrics);
        let recommendation = overall.recommendation();

        ValuationReport {
            ticker: snapshot.ticker.clone(),
            company_name: snapshot.company_name.clone(),
            sector: snapshot.sector.clone(),
            raw_data: snapshot.clone(),
            metrics,
            overall,
            recommendation,
        }
    }

    /// Like [`evaluate`](Self::evaluate), but a report with no metrics is an
    /// error since there is nothing meaningful to show the caller.
    /// `fallback_label` names the company when the snapshot carries no ticker.
    pub fn evaluate_scored(
        &self,
        snapshot: &FinancialSnapshot,
        fallback_label: &str,
    ) -> Result<ValuationReport, ValuationError> {
        let report = self.evaluate(snapshot);

        if report.metrics.is_empty() {
            let label = report
                .ticker
                .clone()
                .or_else(|| report.company_name.clone())
                .unwrap_or_else(|| fallback_label.to_string());
            return Err(ValuationError::NoMetrics(label));
        }

        info!(
            ticker = report.ticker.as_deref(),
            metrics = report.metrics.len(),
            verdict = %report.overall.verdict,
            confidence = report.overall.confidence,
            "valuation complete"
        );

        Ok(report)
    }

    /// Resolve `identifier` through `provider` and score the result.
    pub async fn value_company(
        &self,
        provider: &dyn SnapshotProvider,
        identifier: &str,
    ) -> Result<ValuationReport, ValuationError> {
        let snapshot = provider.fetch_snapshot(identifier).await?;
        self.evaluate_scored(&snapshot, &identifier.trim().to_uppercase())
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}
