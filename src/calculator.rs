//! Portfolio metrics calculator.
//!
//! `PortfolioCalculator` is built once per invocation from explicit settings
//! and handed a `ProjectSource`. It keeps no state between calls.

use crate::classify::{
    budget_variance, classify_performance, classify_variance, margin_deviation,
    performance_index, project_status, time_completion_from_dates, ScheduleBasis,
};
use crate::error::PortfolioResult;
use crate::loader::ProjectSource;
use crate::types::{
    BudgetCategory, EvaluatedProject, PortfolioSummary, ProjectMetrics, ProjectRecord,
    ProjectStatus, ScheduleCategory,
};
use crate::util::{average, stable_sum};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorSettings {
    /// Reference date for deriving time completion from start/finish dates.
    pub as_of: NaiveDate,
    pub schedule_basis: ScheduleBasis,
}

#[derive(Debug, Clone)]
pub struct PortfolioCalculator {
    settings: CalculatorSettings,
}

impl PortfolioCalculator {
    pub fn new(settings: CalculatorSettings) -> Self {
        Self { settings }
    }

    pub fn evaluate(&self, record: &ProjectRecord) -> ProjectMetrics {
        let variance = budget_variance(record.budget_amount, record.total_amount_spent);
        let time_completion = record.time_completion.or_else(|| {
            match (record.start_date, record.finish_date) {
                (Some(start), Some(finish)) => {
                    time_completion_from_dates(start, finish, self.settings.as_of)
                }
                _ => None,
            }
        });
        let performance_index = performance_index(
            self.settings.schedule_basis,
            time_completion,
            record.percentage_complete,
        );
        let schedule_category = classify_performance(performance_index);
        ProjectMetrics {
            variance,
            budget_category: classify_variance(variance),
            time_completion,
            performance_index,
            schedule_category,
            margin_deviation: margin_deviation(
                record.projected_gross_margin,
                record.actual_gross_margin,
            ),
            status: project_status(record.percentage_complete, schedule_category),
        }
    }

    pub fn evaluate_all(&self, records: Vec<ProjectRecord>) -> Vec<EvaluatedProject> {
        records
            .into_iter()
            .map(|record| {
                let metrics = self.evaluate(&record);
                EvaluatedProject { record, metrics }
            })
            .collect()
    }

    /// Pull the current project list from `source` and evaluate every record.
    pub fn evaluate_source(
        &self,
        source: &dyn ProjectSource,
    ) -> PortfolioResult<Vec<EvaluatedProject>> {
        let projects = source.projects()?;
        debug!(count = projects.len(), "evaluating projects");
        Ok(self.evaluate_all(projects))
    }

    pub fn summarize_source(
        &self,
        source: &dyn ProjectSource,
    ) -> PortfolioResult<PortfolioSummary> {
        Ok(summarize(&self.evaluate_source(source)?))
    }
}

/// Reduce evaluated projects into portfolio totals and category counts.
///
/// The result does not depend on the order of `projects`.
pub fn summarize(projects: &[EvaluatedProject]) -> PortfolioSummary {
    let mut budget_categories: BTreeMap<BudgetCategory, usize> =
        BudgetCategory::ALL.iter().map(|c| (*c, 0)).collect();
    let mut schedule_categories: BTreeMap<ScheduleCategory, usize> =
        ScheduleCategory::ALL.iter().map(|c| (*c, 0)).collect();
    let (mut completed, mut active, mut delayed) = (0usize, 0usize, 0usize);
    let mut total_risks = 0u64;

    for p in projects {
        *budget_categories.entry(p.metrics.budget_category).or_default() += 1;
        *schedule_categories.entry(p.metrics.schedule_category).or_default() += 1;
        match p.metrics.status {
            ProjectStatus::Completed => completed += 1,
            ProjectStatus::Active => active += 1,
            ProjectStatus::Delayed => delayed += 1,
        }
        total_risks += u64::from(p.record.risk_count);
    }

    let deviations: Vec<f64> = projects
        .iter()
        .filter_map(|p| p.metrics.margin_deviation)
        .collect();

    PortfolioSummary {
        total_projects: projects.len(),
        total_budget: finite_sum(projects.iter().map(|p| p.record.budget_amount)),
        total_spent: finite_sum(projects.iter().map(|p| p.record.total_amount_spent)),
        total_received: finite_sum(projects.iter().map(|p| p.record.total_amount_received)),
        total_risks,
        completed,
        active,
        delayed,
        avg_margin_deviation: average(&deviations),
        budget_categories,
        schedule_categories,
    }
}

/// Records are coerced at load time, but hand-built ones may still carry
/// NaN; those contribute nothing to the totals.
fn finite_sum<I: Iterator<Item = f64>>(values: I) -> f64 {
    stable_sum(values.filter(|v| v.is_finite()))
}
