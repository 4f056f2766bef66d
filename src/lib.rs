//! Portfolio metrics for a project-portfolio dashboard.
//!
//! Project records are loaded from a spreadsheet CSV export (or supplied in
//! memory), classified by budget variance and schedule performance, and
//! reduced into portfolio KPIs, per-division rows and chart counts.
pub mod calculator;
pub mod classify;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use calculator::{summarize, CalculatorSettings, PortfolioCalculator};
pub use classify::ScheduleBasis;
pub use config::AppConfig;
pub use error::{PortfolioError, PortfolioResult};
pub use loader::{CsvSource, InMemorySource, LoadReport, ProjectSource};
pub use types::{
    BudgetCategory, EvaluatedProject, PortfolioSummary, ProjectRecord, ProjectStatus,
    ScheduleCategory,
};
