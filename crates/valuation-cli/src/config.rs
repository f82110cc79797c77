use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown log format '{}' (expected 'text' or 'json')", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,     // VALUATION_DATA_DIR, default "data"
    pub log_format: LogFormat, // LOG_FORMAT
    pub pretty: bool,          // VALUATION_PRETTY
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            data_dir: lookup("VALUATION_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .parse::<LogFormat>()
                .context("invalid LOG_FORMAT")?,
            pretty: lookup("VALUATION_PRETTY")
                .unwrap_or_else(|| "false".to_string())
                .parse::<bool>()
                .context("VALUATION_PRETTY must be 'true' or 'false'")?,
        };

        Ok(config)
    }
}
