use tracing::debug;
use valuation_core::{Assessment, MetricResult, OverallVerdict, Verdict};

pub const INSUFFICIENT_DATA_REASONING: &str = "Not enough data to determine valuation";
pub const MIXED_REASONING: &str =
    "Valuation metrics are mixed, suggesting the stock is fairly valued";

/// Summed metric weight behind each verdict
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerdictWeights {
    pub undervalued: f64,
    pub overvalued: f64,
    pub fairly_valued: f64,
}

impl VerdictWeights {
    pub fn tally(metrics: &[MetricResult]) -> Self {
        metrics.iter().fold(Self::default(), |mut acc, metric| {
            match metric.verdict {
                Verdict::Undervalued => acc.undervalued += metric.weight,
                Verdict::Overvalued => acc.overvalued += metric.weight,
                Verdict::FairlyValued => acc.fairly_valued += metric.weight,
            }
            acc
        })
    }

    pub fn total(&self) -> f64 {
        self.undervalued + self.overvalued + self.fairly_valued
    }
}

/// Combine per-metric verdicts into one weighted verdict.
///
/// A side wins only with a strict majority (> 50%) of the total weight;
/// undervalued is checked first, then overvalued, and everything else,
/// including an exact 50/50 split, resolves to fairly valued.
///
/// Every metric must carry a positive weight.
pub fn aggregate(metrics: &[MetricResult]) -> OverallVerdict {
    debug_assert!(
        metrics.iter().all(|m| m.weight > 0.0),
        "metric weights must be positive"
    );
    let weights = VerdictWeights::tally(metrics);
    let total = weights.total();

    if metrics.is_empty() {
        return OverallVerdict {
            verdict: Assessment::InsufficientData,
            confidence: 0,
            reasoning: INSUFFICIENT_DATA_REASONING.to_string(),
        };
    }

    let undervalued = weights.undervalued / total;
    let overvalued = weights.overvalued / total;
    let fairly_valued = weights.fairly_valued / total;

    let overall = if undervalued > 0.5 {
        majority(Verdict::Undervalued, undervalued)
    } else if overvalued > 0.5 {
        majority(Verdict::Overvalued, overvalued)
    } else {
        OverallVerdict {
            verdict: Assessment::FairlyValued,
            confidence: to_percent(fairly_valued),
            reasoning: MIXED_REASONING.to_string(),
        }
    };

    debug!(
        metrics = metrics.len(),
        undervalued,
        overvalued,
        fairly_valued,
        verdict = %overall.verdict,
        confidence = overall.confidence,
        "valuation aggregated"
    );

    overall
}

fn majority(verdict: Verdict, share: f64) -> OverallVerdict {
    let confidence = to_percent(share);
    OverallVerdict {
        verdict: verdict.into(),
        confidence,
        reasoning: format!(
            "{}% of valuation metrics suggest the stock is {}",
            confidence, verdict
        ),
    }
}

fn to_percent(share: f64) -> u8 {
    (share * 100.0).round().clamp(0.0, 100.0) as u8
}
