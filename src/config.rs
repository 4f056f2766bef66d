//! Run configuration, optionally loaded from a TOML file.
//!
//! Command line flags are applied on top by the binary.

use crate::calculator::CalculatorSettings;
use crate::classify::ScheduleBasis;
use crate::error::{PortfolioError, PortfolioResult};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Project register CSV
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory that receives the CSV reports and `summary.json`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Rows shown in each console preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Reference date for date-derived time completion; today when unset
    #[serde(default)]
    pub as_of: Option<NaiveDate>,

    #[serde(default)]
    pub schedule_basis: ScheduleBasis,
}

fn default_input() -> PathBuf {
    PathBuf::from("projects.csv")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_preview_rows() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            preview_rows: default_preview_rows(),
            as_of: None,
            schedule_basis: ScheduleBasis::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from(path: &Path) -> PortfolioResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| match e {
            PortfolioError::ConfigParse { message, .. } => PortfolioError::ConfigParse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml(text: &str) -> PortfolioResult<Self> {
        let config: AppConfig = toml::from_str(text).map_err(|e| PortfolioError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PortfolioResult<()> {
        if self.preview_rows == 0 {
            return Err(PortfolioError::InvalidConfig {
                message: "preview_rows must be at least 1".to_string(),
            });
        }
        if self.input.as_os_str().is_empty() {
            return Err(PortfolioError::InvalidConfig {
                message: "input path is empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn calculator_settings(&self) -> CalculatorSettings {
        CalculatorSettings {
            as_of: self.as_of.unwrap_or_else(|| Local::now().date_naive()),
            schedule_basis: self.schedule_basis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            input = "data/register.csv"
            output_dir = "out"
            preview_rows = 3
            as_of = "2024-03-31"
            schedule_basis = "progress"
            "#,
        )
        .unwrap();
        assert_eq!(config.input, PathBuf::from("data/register.csv"));
        assert_eq!(config.preview_rows, 3);
        assert_eq!(config.schedule_basis, ScheduleBasis::Progress);
        assert_eq!(
            config.calculator_settings().as_of,
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
    }

    #[test]
    fn zero_preview_rows_rejected() {
        let err = AppConfig::from_toml("preview_rows = 0").unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidConfig { .. }));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.toml");
        std::fs::write(&path, "schedule_basis = \"earned_value\"").unwrap();
        match AppConfig::load_from(&path) {
            Err(PortfolioError::ConfigParse { path: p, .. }) => {
                assert!(p.ends_with("portfolio.toml"))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
