use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

/// One row of the project register as exported from the spreadsheet.
///
/// Every field is read as optional text; the loader owns coercion.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "ProjectID")]
    pub project_id: Option<String>,
    #[serde(rename = "ProjectName")]
    pub project_name: Option<String>,
    #[serde(rename = "Division")]
    pub division: Option<String>,
    #[serde(rename = "BudgetAmount")]
    pub budget_amount: Option<String>,
    #[serde(rename = "TotalAmountSpent")]
    pub total_amount_spent: Option<String>,
    #[serde(rename = "TotalAmountReceived")]
    pub total_amount_received: Option<String>,
    #[serde(rename = "PercentageComplete")]
    pub percentage_complete: Option<String>,
    #[serde(rename = "TimeCompletion")]
    pub time_completion: Option<String>,
    #[serde(rename = "StartDate")]
    pub start_date: Option<String>,
    #[serde(rename = "FinishDate")]
    pub finish_date: Option<String>,
    #[serde(rename = "ProjectedGrossMargin")]
    pub projected_gross_margin: Option<String>,
    #[serde(rename = "ActualGrossMargin")]
    pub actual_gross_margin: Option<String>,
    #[serde(rename = "RiskCount")]
    pub risk_count: Option<String>,
}

/// Strictly typed project record handed to the calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub project_id: String,
    pub project_name: String,
    pub division: String,
    pub budget_amount: f64,
    pub total_amount_spent: f64,
    pub total_amount_received: f64,
    /// Fraction, normally 0..=1.
    pub percentage_complete: f64,
    /// Percentage of planned duration elapsed.
    pub time_completion: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub projected_gross_margin: Option<f64>,
    pub actual_gross_margin: Option<f64>,
    pub risk_count: u32,
}

impl ProjectRecord {
    /// Record with the given amounts and every other field empty.
    pub fn new(project_id: impl Into<String>, budget_amount: f64, total_amount_spent: f64) -> Self {
        Self {
            project_id: project_id.into(),
            project_name: "Unknown".to_string(),
            division: "Unknown".to_string(),
            budget_amount,
            total_amount_spent,
            total_amount_received: 0.0,
            percentage_complete: 0.0,
            time_completion: None,
            start_date: None,
            finish_date: None,
            projected_gross_margin: None,
            actual_gross_margin: None,
            risk_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BudgetCategory {
    #[serde(rename = "Under Budget")]
    UnderBudget,
    #[serde(rename = "Within Budget")]
    WithinBudget,
    #[serde(rename = "Over Budget")]
    OverBudget,
    #[serde(rename = "Critically Over Budget")]
    CriticallyOverBudget,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 5] = [
        BudgetCategory::UnderBudget,
        BudgetCategory::WithinBudget,
        BudgetCategory::OverBudget,
        BudgetCategory::CriticallyOverBudget,
        BudgetCategory::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BudgetCategory::UnderBudget => "Under Budget",
            BudgetCategory::WithinBudget => "Within Budget",
            BudgetCategory::OverBudget => "Over Budget",
            BudgetCategory::CriticallyOverBudget => "Critically Over Budget",
            BudgetCategory::Unknown => "Unknown",
        }
    }

    pub fn is_overspent(self) -> bool {
        matches!(
            self,
            BudgetCategory::OverBudget | BudgetCategory::CriticallyOverBudget
        )
    }
}

impl fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScheduleCategory {
    #[serde(rename = "Ahead of Schedule")]
    AheadOfSchedule,
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Slightly Behind")]
    SlightlyBehind,
    #[serde(rename = "Critical Delay")]
    CriticalDelay,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl ScheduleCategory {
    pub const ALL: [ScheduleCategory; 5] = [
        ScheduleCategory::AheadOfSchedule,
        ScheduleCategory::OnTrack,
        ScheduleCategory::SlightlyBehind,
        ScheduleCategory::CriticalDelay,
        ScheduleCategory::NotAvailable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScheduleCategory::AheadOfSchedule => "Ahead of Schedule",
            ScheduleCategory::OnTrack => "On Track",
            ScheduleCategory::SlightlyBehind => "Slightly Behind",
            ScheduleCategory::CriticalDelay => "Critical Delay",
            ScheduleCategory::NotAvailable => "N/A",
        }
    }

    pub fn is_behind(self) -> bool {
        matches!(
            self,
            ScheduleCategory::SlightlyBehind | ScheduleCategory::CriticalDelay
        )
    }
}

impl fmt::Display for ScheduleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectStatus {
    Completed,
    Active,
    Delayed,
}

/// Fields derived for a single project by the calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMetrics {
    pub variance: Option<f64>,
    pub budget_category: BudgetCategory,
    pub time_completion: Option<f64>,
    pub performance_index: Option<f64>,
    pub schedule_category: ScheduleCategory,
    pub margin_deviation: Option<f64>,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone)]
pub struct EvaluatedProject {
    pub record: ProjectRecord,
    pub metrics: ProjectMetrics,
}

/// Portfolio-wide KPIs; this is what `summary.json` contains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_received: f64,
    pub total_risks: u64,
    pub completed: usize,
    pub active: usize,
    pub delayed: usize,
    pub avg_margin_deviation: f64,
    pub budget_categories: BTreeMap<BudgetCategory, usize>,
    pub schedule_categories: BTreeMap<ScheduleCategory, usize>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectStatusRow {
    #[serde(rename = "ProjectID")]
    #[tabled(rename = "ProjectID")]
    pub project_id: String,
    #[serde(rename = "ProjectName")]
    #[tabled(rename = "ProjectName")]
    pub project_name: String,
    #[serde(rename = "Division")]
    #[tabled(rename = "Division")]
    pub division: String,
    #[serde(rename = "Budget")]
    #[tabled(rename = "Budget")]
    pub budget: String,
    #[serde(rename = "Spent")]
    #[tabled(rename = "Spent")]
    pub spent: String,
    #[serde(rename = "Variance")]
    #[tabled(rename = "Variance")]
    pub variance: String,
    #[serde(rename = "BudgetStatus")]
    #[tabled(rename = "BudgetStatus")]
    pub budget_status: String,
    #[serde(rename = "TimeCompletion")]
    #[tabled(rename = "TimeCompletion")]
    pub time_completion: String,
    #[serde(rename = "PerformanceIndex")]
    #[tabled(rename = "PerformanceIndex")]
    pub performance_index: String,
    #[serde(rename = "Schedule")]
    #[tabled(rename = "Schedule")]
    pub schedule: String,
    #[serde(rename = "MarginDeviation")]
    #[tabled(rename = "MarginDeviation")]
    pub margin_deviation: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DivisionSummaryRow {
    #[serde(rename = "Division")]
    #[tabled(rename = "Division")]
    pub division: String,
    #[serde(rename = "Projects")]
    #[tabled(rename = "Projects")]
    pub projects: usize,
    #[serde(rename = "TotalBudget")]
    #[tabled(rename = "TotalBudget")]
    pub total_budget: String,
    #[serde(rename = "TotalSpent")]
    #[tabled(rename = "TotalSpent")]
    pub total_spent: String,
    #[serde(rename = "OverBudget")]
    #[tabled(rename = "OverBudget")]
    pub over_budget: usize,
    #[serde(rename = "Delayed")]
    #[tabled(rename = "Delayed")]
    pub delayed: usize,
    #[serde(rename = "Risks")]
    #[tabled(rename = "Risks")]
    pub risks: u64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryCountRow {
    #[serde(rename = "Classifier")]
    #[tabled(rename = "Classifier")]
    pub classifier: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}
