use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latest annual figures for one company, as supplied by a data provider.
///
/// Every numeric field is optional. A zero is treated the same as a missing
/// value by the scoring engine since providers report gaps as zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialSnapshot {
    pub ticker: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub fiscal_date_ending: Option<NaiveDate>,
    pub enterprise_value: Option<f64>,
    pub ebitda: Option<f64>,
    pub net_income: Option<f64>,
    pub total_revenue: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
}

/// Per-metric verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Undervalued,
    Overvalued,
    FairlyValued,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Undervalued => "undervalued",
            Verdict::Overvalued => "overvalued",
            Verdict::FairlyValued => "fairly valued",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall verdict; adds `InsufficientData` for the case where no metric
/// could be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    Undervalued,
    Overvalued,
    FairlyValued,
    InsufficientData,
}

impl Assessment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Assessment::Undervalued => "undervalued",
            Assessment::Overvalued => "overvalued",
            Assessment::FairlyValued => "fairly valued",
            Assessment::InsufficientData => "insufficient data",
        }
    }

    /// Buy/hold/sell label for the assessment
    pub fn to_label(&self) -> &'static str {
        match self {
            Assessment::Undervalued => "Buy",
            Assessment::FairlyValued => "Hold",
            Assessment::Overvalued => "Sell",
            Assessment::InsufficientData => "No Call",
        }
    }
}

impl From<Verdict> for Assessment {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Undervalued => Assessment::Undervalued,
            Verdict::Overvalued => Assessment::Overvalued,
            Verdict::FairlyValued => Assessment::FairlyValued,
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a metric's value is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Ratio,
    Percent,
}

/// One evaluated valuation ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResult {
    pub name: String,
    /// Unrounded value; all threshold comparisons use this.
    pub raw_value: f64,
    /// `raw_value` rounded to two decimals.
    pub display_value: f64,
    pub unit: MetricUnit,
    pub verdict: Verdict,
    pub weight: f64,
}

impl MetricResult {
    /// Display string, e.g. `"14.00"` or `"8.57%"`.
    pub fn formatted_value(&self) -> String {
        match self.unit {
            MetricUnit::Ratio => format!("{:.2}", self.display_value),
            MetricUnit::Percent => format!("{:.2}%", self.display_value),
        }
    }
}

/// Weighted synthesis of all evaluated metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallVerdict {
    pub verdict: Assessment,
    pub confidence: u8, // 0 to 100
    pub reasoning: String,
}

impl OverallVerdict {
    /// Recommendation line such as `"Buy (confidence: high - 85%)"`.
    pub fn recommendation(&self) -> String {
        if self.verdict == Assessment::InsufficientData {
            return self.verdict.to_label().to_string();
        }

        let confidence_desc = if self.confidence > 80 {
            "high"
        } else if self.confidence > 60 {
            "moderate"
        } else if self.confidence > 40 {
            "low"
        } else {
            "very low"
        };

        format!(
            "{} (confidence: {} - {}%)",
            self.verdict.to_label(),
            confidence_desc,
            self.confidence
        )
    }
}

/// Complete output for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationReport {
    pub ticker: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub raw_data: FinancialSnapshot,
    pub metrics: Vec<MetricResult>,
    pub overall: OverallVerdict,
    pub recommendation: String,
}
