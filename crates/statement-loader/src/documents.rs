//! Provider-shaped statement documents.
//!
//! Statements follow Alpha Vantage's `INCOME_STATEMENT`, `BALANCE_SHEET`,
//! `CASH_FLOW` and `GLOBAL_QUOTE` payloads; the company profile follows
//! Finnhub's `stock/profile2`. Alpha Vantage reports amounts as strings and
//! uses `"None"` for gaps, so amounts are read leniently.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Everything needed to build one snapshot, as stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementBundle {
    pub income_statement: Option<StatementDocument<IncomeReport>>,
    pub balance_sheet: Option<StatementDocument<BalanceReport>>,
    pub cash_flow: Option<StatementDocument<CashFlowReport>>,
    pub quote: Option<QuoteDocument>,
    pub profile: Option<CompanyProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementDocument<R> {
    pub symbol: Option<String>,
    #[serde(rename = "annualReports", default = "Vec::new")]
    pub annual_reports: Vec<R>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

impl<R> StatementDocument<R> {
    /// Most recent annual report; providers list newest first.
    pub fn latest(&self) -> Option<&R> {
        self.annual_reports.first()
    }

    /// Provider-side failure carried inside an otherwise valid payload.
    pub fn provider_failure(&self) -> Option<String> {
        provider_failure(
            self.error_message.as_deref(),
            self.note.as_deref(),
            self.information.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeReport {
    pub fiscal_date_ending: Option<String>,
    pub reported_currency: Option<String>,
    #[serde(deserialize_with = "amount")]
    pub total_revenue: Option<f64>,
    #[serde(deserialize_with = "amount")]
    pub net_income: Option<f64>,
    #[serde(deserialize_with = "amount")]
    pub ebitda: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceReport {
    pub fiscal_date_ending: Option<String>,
    #[serde(deserialize_with = "amount")]
    pub total_assets: Option<f64>,
    #[serde(deserialize_with = "amount")]
    pub total_liabilities: Option<f64>,
    #[serde(deserialize_with = "amount")]
    pub total_current_liabilities: Option<f64>,
    #[serde(deserialize_with = "amount")]
    pub long_term_debt: Option<f64>,
    #[serde(deserialize_with = "amount")]
    pub cash_and_cash_equivalents_at_carrying_value: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CashFlowReport {
    pub fiscal_date_ending: Option<String>,
    // Alpha Vantage spells this "operatingCashflow"
    #[serde(alias = "operatingCashflow", deserialize_with = "amount")]
    pub operating_cash_flow: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteDocument {
    #[serde(rename = "Global Quote", default)]
    pub global_quote: HashMap<String, String>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

impl QuoteDocument {
    /// Provider-side failure carried instead of a quote.
    pub fn provider_failure(&self) -> Option<String> {
        provider_failure(
            self.error_message.as_deref(),
            self.note.as_deref(),
            self.information.as_deref(),
        )
    }

    pub fn price(&self) -> Option<f64> {
        self.global_quote
            .get("05. price")
            .and_then(|p| p.trim().parse::<f64>().ok())
    }
}

/// Finnhub company profile. `market_capitalization` is in millions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub finnhub_industry: Option<String>,
    pub market_capitalization: Option<f64>,
    pub currency: Option<String>,
}

impl CompanyProfile {
    /// Finnhub answers unknown symbols with `{}`.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.market_capitalization.is_none()
    }
}

/// Alpha Vantage reports bad calls under "Error Message" and throttling under
/// "Note" (per-minute) or "Information" (daily).
fn provider_failure(
    error_message: Option<&str>,
    note: Option<&str>,
    information: Option<&str>,
) -> Option<String> {
    if let Some(error) = error_message {
        return Some(format!("Alpha Vantage error: {}", error));
    }
    note.or(information)
        .map(|note| format!("Alpha Vantage rate limit: {}", note))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    let value = match raw {
        Some(RawAmount::Number(n)) => Some(n),
        Some(RawAmount::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}
