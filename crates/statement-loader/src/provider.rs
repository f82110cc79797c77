use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use valuation_core::{FinancialSnapshot, SnapshotProvider, ValuationError};

use crate::assemble::assemble_snapshot;
use crate::documents::StatementBundle;

/// Serves snapshots from a directory of statement bundles, one
/// `<TICKER>.json` file per company.
///
/// An identifier is first tried as a ticker, matching the file name without
/// regard to case. Failing that, it is matched case-insensitively against each
/// bundle's company name; an exact name match wins over partial ones.
#[derive(Debug, Clone)]
pub struct DirectorySnapshotProvider {
    root: PathBuf,
}

impl DirectorySnapshotProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn load_bundle(&self, path: &Path) -> Result<Option<StatementBundle>, ValuationError> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents).map_err(|e| {
                ValuationError::InvalidData(format!("{}: {}", path.display(), e))
            })?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(path, e)),
        }
    }

    /// Bundle file whose stem equals `ticker` ignoring case, for directories
    /// not named in uppercase.
    async fn find_ticker_file(&self, ticker: &str) -> Result<Option<PathBuf>, ValuationError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| unavailable(&self.root, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable(&self.root, e))?
        {
            let path = entry.path();
            let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
            let stem_matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| stem.eq_ignore_ascii_case(ticker));
            if is_json && stem_matches {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Ticker and bundle for every company whose name contains `query`.
    async fn search_by_name(
        &self,
        query: &str,
    ) -> Result<Vec<(String, String, StatementBundle)>, ValuationError> {
        let needle = query.to_lowercase();
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| unavailable(&self.root, e))?;

        let mut matches = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable(&self.root, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(ticker) = path.file_stem().and_then(|s| s.to_str()).map(str::to_uppercase)
            else {
                continue;
            };

            let bundle = match self.load_bundle(&path).await {
                Ok(Some(bundle)) => bundle,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping unreadable bundle {}: {}", path.display(), e);
                    continue;
                }
            };

            let name = bundle.profile.as_ref().and_then(|p| p.name.clone());
            if let Some(name) = name {
                if name.to_lowercase().contains(&needle) {
                    matches.push((ticker, name, bundle));
                }
            }
        }

        matches.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(matches)
    }
}

#[async_trait]
impl SnapshotProvider for DirectorySnapshotProvider {
    async fn fetch_snapshot(&self, identifier: &str) -> Result<FinancialSnapshot, ValuationError> {
        let query = identifier.trim();
        if query.is_empty() {
            return Err(ValuationError::InvalidData(
                "ticker or company name is required".to_string(),
            ));
        }

        if is_ticker_like(query) {
            let ticker = query.to_uppercase();
            let path = self.root.join(format!("{}.json", ticker));
            let mut bundle = self.load_bundle(&path).await?;
            if bundle.is_none() {
                if let Some(path) = self.find_ticker_file(&ticker).await? {
                    bundle = self.load_bundle(&path).await?;
                }
            }
            if let Some(bundle) = bundle {
                info!("Resolved {} by ticker", ticker);
                return assemble_snapshot(&ticker, &bundle);
            }
        }

        let mut matches = self.search_by_name(query).await?;
        if matches.len() > 1 {
            let lowered = query.to_lowercase();
            let exact: Vec<_> = matches
                .iter()
                .filter(|(_, name, _)| name.to_lowercase() == lowered)
                .map(|(ticker, _, _)| ticker.clone())
                .collect();
            if let [only] = exact.as_slice() {
                matches.retain(|(ticker, _, _)| ticker == only);
            }
        }

        match matches.len() {
            0 => {
                warn!("No company found for '{}'", query);
                Err(ValuationError::UnresolvedIdentifier(query.to_string()))
            }
            1 => {
                let (ticker, name, bundle) = matches.remove(0);
                info!("Resolved '{}' to {} ({})", query, ticker, name);
                assemble_snapshot(&ticker, &bundle)
            }
            _ => {
                let candidates = matches
                    .iter()
                    .map(|(ticker, name, _)| format!("{} ({})", ticker, name))
                    .collect::<Vec<_>>();
                warn!("'{}' is ambiguous: {} candidates", query, candidates.len());
                Err(ValuationError::AmbiguousIdentifier {
                    query: query.to_string(),
                    candidates,
                })
            }
        }
    }
}

/// Read a raw snapshot JSON file (camelCase keys).
pub async fn read_snapshot_file(path: &Path) -> Result<FinancialSnapshot, ValuationError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| unavailable(path, e))?;
    serde_json::from_str(&contents)
        .map_err(|e| ValuationError::InvalidData(format!("{}: {}", path.display(), e)))
}

/// Tickers are short and limited to letters, digits, '.' and '-'; anything
/// else goes straight to name search and never touches the filesystem path.
fn is_ticker_like(query: &str) -> bool {
    query.len() <= 10
        && !query.starts_with('.')
        && query
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

fn unavailable(path: &Path, err: std::io::Error) -> ValuationError {
    ValuationError::UpstreamUnavailable(format!("cannot read {}: {}", path.display(), err))
}
