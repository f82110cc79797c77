//! Valuation ratio table and the derivation pass over it.
//!
//! Each ratio is a row in [`METRICS`]: how to compute it from a snapshot, the
//! band that separates cheap from expensive, which side of the band is cheap,
//! and how much it counts in the overall verdict. A ratio whose inputs are
//! missing or meaningless is left out of the result entirely.

use tracing::debug;
use valuation_core::{FinancialSnapshot, MetricResult, MetricUnit, Verdict};

/// Which side of the band reads as cheap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Multiples such as P/E: a low value is undervalued
    LowerIsCheaper,
    /// Yields: a high value is undervalued
    HigherIsCheaper,
}

/// Fair-value band. Values strictly outside it get an extreme verdict;
/// values on either edge are fairly valued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub lower: f64,
    pub upper: f64,
}

pub struct MetricDefinition {
    pub name: &'static str,
    pub unit: MetricUnit,
    /// Returns `None` when the ratio is not defined for the snapshot.
    pub formula: fn(&FinancialSnapshot) -> Option<f64>,
    pub bands: Bands,
    pub direction: Direction,
    pub weight: f64,
}

impl MetricDefinition {
    pub fn classify(&self, value: f64) -> Verdict {
        let Bands { lower, upper } = self.bands;
        match self.direction {
            Direction::LowerIsCheaper if value < lower => Verdict::Undervalued,
            Direction::LowerIsCheaper if value > upper => Verdict::Overvalued,
            Direction::HigherIsCheaper if value > upper => Verdict::Undervalued,
            Direction::HigherIsCheaper if value < lower => Verdict::Overvalued,
            _ => Verdict::FairlyValued,
        }
    }

    pub fn evaluate(&self, snapshot: &FinancialSnapshot) -> Option<MetricResult> {
        let raw_value = (self.formula)(snapshot).filter(|v| v.is_finite())?;

        Some(MetricResult {
            name: self.name.to_string(),
            raw_value,
            display_value: round_to_cents(raw_value),
            unit: self.unit,
            verdict: self.classify(raw_value),
            weight: self.weight,
        })
    }
}

/// Evaluation order is the output order.
pub const METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        name: "EV/EBITDA",
        unit: MetricUnit::Ratio,
        formula: ev_to_ebitda,
        bands: Bands { lower: 15.0, upper: 25.0 },
        direction: Direction::LowerIsCheaper,
        weight: 1.0,
    },
    MetricDefinition {
        name: "P/E Ratio",
        unit: MetricUnit::Ratio,
        formula: price_to_earnings,
        bands: Bands { lower: 15.0, upper: 25.0 },
        direction: Direction::LowerIsCheaper,
        weight: 1.0,
    },
    MetricDefinition {
        name: "P/B Ratio",
        unit: MetricUnit::Ratio,
        formula: price_to_book,
        bands: Bands { lower: 1.5, upper: 3.0 },
        direction: Direction::LowerIsCheaper,
        weight: 0.8,
    },
    MetricDefinition {
        name: "EV/Revenue",
        unit: MetricUnit::Ratio,
        formula: ev_to_revenue,
        bands: Bands { lower: 2.0, upper: 5.0 },
        direction: Direction::LowerIsCheaper,
        weight: 0.8,
    },
    MetricDefinition {
        name: "FCF Yield",
        unit: MetricUnit::Percent,
        formula: fcf_yield,
        bands: Bands { lower: 2.0, upper: 5.0 },
        direction: Direction::HigherIsCheaper,
        weight: 1.0,
    },
    MetricDefinition {
        name: "Debt/Equity",
        unit: MetricUnit::Ratio,
        formula: debt_to_equity,
        bands: Bands { lower: 1.0, upper: 2.0 },
        direction: Direction::LowerIsCheaper,
        weight: 0.6,
    },
];

/// Evaluate every metric in [`METRICS`] whose inputs are usable.
pub fn derive_metrics(snapshot: &FinancialSnapshot) -> Vec<MetricResult> {
    METRICS
        .iter()
        .filter_map(|definition| match definition.evaluate(snapshot) {
            Some(result) => {
                debug!(
                    metric = definition.name,
                    value = result.raw_value,
                    verdict = %result.verdict,
                    "metric evaluated"
                );
                Some(result)
            }
            None => {
                debug!(metric = definition.name, "metric skipped: inputs missing or undefined");
                None
            }
        })
        .collect()
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A figure that was actually reported: present, finite and non-zero.
fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Total assets minus total liabilities, only when both were reported and
/// the result is positive.
fn book_value(snapshot: &FinancialSnapshot) -> Option<f64> {
    let assets = reported(snapshot.total_assets)?;
    let liabilities = reported(snapshot.total_liabilities)?;
    Some(assets - liabilities).filter(|bv| *bv > 0.0)
}

fn ev_to_ebitda(snapshot: &FinancialSnapshot) -> Option<f64> {
    Some(reported(snapshot.enterprise_value)? / positive(snapshot.ebitda)?)
}

// Market cap over net income stands in for price over EPS.
fn price_to_earnings(snapshot: &FinancialSnapshot) -> Option<f64> {
    Some(positive(snapshot.market_cap)? / positive(snapshot.net_income)?)
}

fn price_to_book(snapshot: &FinancialSnapshot) -> Option<f64> {
    Some(positive(snapshot.market_cap)? / book_value(snapshot)?)
}

fn ev_to_revenue(snapshot: &FinancialSnapshot) -> Option<f64> {
    Some(reported(snapshot.enterprise_value)? / positive(snapshot.total_revenue)?)
}

fn fcf_yield(snapshot: &FinancialSnapshot) -> Option<f64> {
    Some(positive(snapshot.operating_cash_flow)? / positive(snapshot.market_cap)? * 100.0)
}

fn debt_to_equity(snapshot: &FinancialSnapshot) -> Option<f64> {
    Some(reported(snapshot.total_liabilities)? / book_value(snapshot)?)
}
