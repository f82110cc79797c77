use thiserror::Error;

/// Failures surfaced while turning an identifier into a scored report.
///
/// Scoring itself never fails; every variant here belongs to data resolution
/// or to the hosting layer's "nothing to score" check.
#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("No company found matching '{0}'")]
    UnresolvedIdentifier(String),

    #[error("'{query}' matches multiple companies: {}", .candidates.join(", "))]
    AmbiguousIdentifier {
        query: String,
        candidates: Vec<String>,
    },

    #[error("Financial data provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Incomplete financial data: missing {0}")]
    IncompleteData(String),

    #[error("No valuation metrics could be computed for {0}")]
    NoMetrics(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
