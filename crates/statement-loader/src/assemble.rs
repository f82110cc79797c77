use chrono::NaiveDate;
use tracing::debug;
use valuation_core::{FinancialSnapshot, ValuationError};

use crate::documents::{StatementBundle, StatementDocument};

/// Finnhub quotes market capitalization in millions.
const MARKET_CAP_UNIT: f64 = 1_000_000.0;

/// Build a snapshot from the latest annual statements plus the company
/// profile.
///
/// Enterprise value is market cap plus total debt minus cash, where total debt
/// is approximated as non-current liabilities plus long-term debt. Enterprise
/// value is left absent when market cap or any debt component is unknown, so
/// EV-based metrics are skipped rather than scored on a partial figure.
pub fn assemble_snapshot(
    ticker: &str,
    bundle: &StatementBundle,
) -> Result<FinancialSnapshot, ValuationError> {
    let income = latest_report(bundle.income_statement.as_ref(), "income statement")?;
    let balance = latest_report(bundle.balance_sheet.as_ref(), "balance sheet")?;
    let cash_flow = latest_report(bundle.cash_flow.as_ref(), "cash flow statement")?;

    let quote = bundle
        .quote
        .as_ref()
        .ok_or_else(|| ValuationError::IncompleteData("quote".to_string()))?;
    if let Some(failure) = quote.provider_failure() {
        return Err(ValuationError::UpstreamUnavailable(failure));
    }
    if quote.global_quote.is_empty() {
        return Err(ValuationError::IncompleteData("quote".to_string()));
    }

    let profile = bundle
        .profile
        .as_ref()
        .ok_or_else(|| ValuationError::IncompleteData("company profile".to_string()))?;
    if profile.is_empty() {
        return Err(ValuationError::UnresolvedIdentifier(ticker.to_string()));
    }

    let market_cap = profile
        .market_capitalization
        .map(|millions| millions * MARKET_CAP_UNIT);

    let total_debt = match (
        balance.total_liabilities,
        balance.total_current_liabilities,
        balance.long_term_debt,
    ) {
        (Some(total), Some(current), Some(long_term)) => Some(total - current + long_term),
        _ => None,
    };
    let cash = balance
        .cash_and_cash_equivalents_at_carrying_value
        .unwrap_or(0.0);

    let enterprise_value = match (market_cap, total_debt) {
        (Some(cap), Some(debt)) => Some(cap + debt - cash),
        _ => None,
    };

    let fiscal_date_ending = income
        .fiscal_date_ending
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

    debug!(
        ticker,
        price = quote.price(),
        currency = income.reported_currency.as_deref(),
        ?market_cap,
        ?enterprise_value,
        "assembled snapshot"
    );

    Ok(FinancialSnapshot {
        ticker: Some(ticker.to_uppercase()),
        company_name: profile.name.clone(),
        sector: profile.finnhub_industry.clone(),
        fiscal_date_ending,
        enterprise_value,
        ebitda: income.ebitda,
        net_income: income.net_income,
        total_revenue: income.total_revenue,
        operating_cash_flow: cash_flow.operating_cash_flow,
        market_cap,
        total_assets: balance.total_assets,
        total_liabilities: balance.total_liabilities,
    })
}

fn latest_report<'a, R>(
    document: Option<&'a StatementDocument<R>>,
    section: &str,
) -> Result<&'a R, ValuationError> {
    let document = document.ok_or_else(|| ValuationError::IncompleteData(section.to_string()))?;
    if let Some(failure) = document.provider_failure() {
        return Err(ValuationError::UpstreamUnavailable(failure));
    }
    document
        .latest()
        .ok_or_else(|| ValuationError::IncompleteData(section.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sample_bundle() -> Value {
        json!({
            "incomeStatement": {
                "symbol": "ACME",
                "annualReports": [
                    {
                        "fiscalDateEnding": "2023-12-31",
                        "reportedCurrency": "USD",
                        "totalRevenue": "1000000000",
                        "netIncome": "150000000",
                        "ebitda": "200000000"
                    },
                    {
                        "fiscalDateEnding": "2022-12-31",
                        "totalRevenue": "900000000",
                        "netIncome": "100000000",
                        "ebitda": "150000000"
                    }
                ]
            },
            "balanceSheet": {
                "annualReports": [{
                    "fiscalDateEnding": "2023-12-31",
                    "totalAssets": "3000000000",
                    "totalLiabilities": "1200000000",
                    "totalCurrentLiabilities": "400000000",
                    "longTermDebt": "500000000",
                    "cashAndCashEquivalentsAtCarryingValue": "300000000"
                }]
            },
            "cashFlow": {
                "annualReports": [{ "operatingCashflow": "180000000" }]
            },
            "quote": {
                "Global Quote": { "01. symbol": "ACME", "05. price": "42.00" }
            },
            "profile": {
                "name": "Acme Corp",
                "finnhubIndustry": "Industrials",
                "marketCapitalization": 2100.0
            }
        })
    }

    fn bundle(value: Value) -> StatementBundle {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_assembles_latest_annual_figures() {
        let snapshot = assemble_snapshot("acme", &bundle(sample_bundle())).unwrap();

        assert_eq!(snapshot.ticker.as_deref(), Some("ACME"));
        assert_eq!(snapshot.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(snapshot.sector.as_deref(), Some("Industrials"));
        assert_eq!(snapshot.fiscal_date_ending, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(snapshot.ebitda, Some(200_000_000.0));
        assert_eq!(snapshot.net_income, Some(150_000_000.0));
        assert_eq!(snapshot.total_revenue, Some(1_000_000_000.0));
        assert_eq!(snapshot.operating_cash_flow, Some(180_000_000.0));
        assert_eq!(snapshot.market_cap, Some(2_100_000_000.0));
        assert_eq!(snapshot.total_assets, Some(3_000_000_000.0));
        assert_eq!(snapshot.total_liabilities, Some(1_200_000_000.0));
    }

    #[test]
    fn test_enterprise_value_from_debt_and_cash() {
        // debt = 1.2B - 0.4B + 0.5B = 1.3B; EV = 2.1B + 1.3B - 0.3B
        let snapshot = assemble_snapshot("ACME", &bundle(sample_bundle())).unwrap();
        assert_eq!(snapshot.enterprise_value, Some(3_100_000_000.0));
    }

    #[test]
    fn test_missing_cash_counts_as_zero() {
        let mut value = sample_bundle();
        value["balanceSheet"]["annualReports"][0]["cashAndCashEquivalentsAtCarryingValue"] =
            json!("None");
        let snapshot = assemble_snapshot("ACME", &bundle(value)).unwrap();
        assert_eq!(snapshot.enterprise_value, Some(3_400_000_000.0));
    }

    #[test]
    fn test_unknown_debt_leaves_enterprise_value_absent() {
        let mut value = sample_bundle();
        value["balanceSheet"]["annualReports"][0]["longTermDebt"] = json!("None");
        let snapshot = assemble_snapshot("ACME", &bundle(value)).unwrap();
        assert_eq!(snapshot.enterprise_value, None);
        assert_eq!(snapshot.market_cap, Some(2_100_000_000.0));
    }

    #[test]
    fn test_missing_sections_are_named() {
        for (key, section) in [
            ("incomeStatement", "income statement"),
            ("balanceSheet", "balance sheet"),
            ("cashFlow", "cash flow statement"),
            ("quote", "quote"),
            ("profile", "company profile"),
        ] {
            let mut value = sample_bundle();
            value.as_object_mut().unwrap().remove(key);
            let err = assemble_snapshot("ACME", &bundle(value)).unwrap_err();
            assert!(
                matches!(err, ValuationError::IncompleteData(ref s) if s == section),
                "{}: {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_empty_annual_reports_are_incomplete() {
        let mut value = sample_bundle();
        value["cashFlow"] = json!({ "symbol": "ACME", "annualReports": [] });
        let err = assemble_snapshot("ACME", &bundle(value)).unwrap_err();
        assert!(matches!(err, ValuationError::IncompleteData(ref s) if s == "cash flow statement"));
    }

    #[test]
    fn test_empty_quote_is_incomplete() {
        let mut value = sample_bundle();
        value["quote"] = json!({ "Global Quote": {} });
        let err = assemble_snapshot("ACME", &bundle(value)).unwrap_err();
        assert!(matches!(err, ValuationError::IncompleteData(ref s) if s == "quote"));
    }

    #[test]
    fn test_rate_limit_note_is_upstream_failure() {
        let mut value = sample_bundle();
        value["balanceSheet"] = json!({ "Note": "Thank you for using Alpha Vantage!" });
        let err = assemble_snapshot("ACME", &bundle(value)).unwrap_err();
        assert!(matches!(err, ValuationError::UpstreamUnavailable(_)));
        assert!(err.to_string().contains("rate limit"));
    }

    #[test]
    fn test_daily_quote_limit_is_upstream_failure() {
        let mut value = sample_bundle();
        value["quote"] = json!({
            "Information": "Our standard API rate limit is 25 requests per day."
        });
        let err = assemble_snapshot("ACME", &bundle(value)).unwrap_err();
        assert!(matches!(err, ValuationError::UpstreamUnavailable(_)), "{:?}", err);
        assert!(err.to_string().contains("25 requests per day"));
    }

    #[test]
    fn test_quote_error_message_is_upstream_failure() {
        let mut value = sample_bundle();
        value["quote"] = json!({ "Error Message": "Invalid API call." });
        let err = assemble_snapshot("ACME", &bundle(value)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Financial data provider unavailable: Alpha Vantage error: Invalid API call."
        );
    }

    #[test]
    fn test_empty_profile_is_unresolved() {
        let mut value = sample_bundle();
        value["profile"] = json!({});
        let err = assemble_snapshot("ZZZZ", &bundle(value)).unwrap_err();
        assert!(matches!(err, ValuationError::UnresolvedIdentifier(ref t) if t == "ZZZZ"));
    }
}
