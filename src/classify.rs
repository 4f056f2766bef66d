//! Per-project classification: budget variance, schedule performance,
//! profit margin deviation and lifecycle status.
//!
//! All functions are total. Inputs that would divide by zero, or that are not
//! finite, map to the `Unknown` / `N/A` categories instead of NaN.

use crate::types::{BudgetCategory, ProjectStatus, ScheduleCategory};
use crate::util::days_diff;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lower bound of "Within Budget".
pub const WITHIN_BUDGET_MIN: f64 = 0.9;
/// Lower bound of "Over Budget".
pub const OVER_BUDGET_MIN: f64 = 1.1;
/// Lower bound of "Critically Over Budget".
pub const CRITICAL_OVERSPEND_MIN: f64 = 1.5;

pub const AHEAD_OF_SCHEDULE_MIN: f64 = 1.10;
pub const ON_TRACK_MIN: f64 = 0.90;
pub const SLIGHTLY_BEHIND_MIN: f64 = 0.75;

/// How the performance index is derived from a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleBasis {
    /// `PI = 100 / time_completion`
    #[default]
    TimeCompletion,
    /// `PI = percentage_complete / (time_completion / 100)`
    Progress,
}

/// `spent / budget`, or `None` when the budget cannot be divided into.
pub fn budget_variance(budget_amount: f64, total_amount_spent: f64) -> Option<f64> {
    if !budget_amount.is_finite() || budget_amount <= 0.0 || !total_amount_spent.is_finite() {
        return None;
    }
    Some(total_amount_spent / budget_amount)
}

pub fn classify_variance(variance: Option<f64>) -> BudgetCategory {
    match variance {
        Some(v) if v < WITHIN_BUDGET_MIN => BudgetCategory::UnderBudget,
        Some(v) if v < OVER_BUDGET_MIN => BudgetCategory::WithinBudget,
        Some(v) if v < CRITICAL_OVERSPEND_MIN => BudgetCategory::OverBudget,
        Some(_) => BudgetCategory::CriticallyOverBudget,
        None => BudgetCategory::Unknown,
    }
}

pub fn classify_budget(budget_amount: f64, total_amount_spent: f64) -> BudgetCategory {
    classify_variance(budget_variance(budget_amount, total_amount_spent))
}

/// Percentage of the planned duration elapsed at `as_of`.
///
/// Returns `None` when the planned duration is not positive. Before the start
/// date the result is clamped to `0`.
pub fn time_completion_from_dates(
    start: NaiveDate,
    finish: NaiveDate,
    as_of: NaiveDate,
) -> Option<f64> {
    let planned = days_diff(start, finish);
    if planned <= 0.0 {
        return None;
    }
    let elapsed = days_diff(start, as_of).max(0.0);
    Some(elapsed / planned * 100.0)
}

/// Schedule performance index. This is a progress proxy, not earned-value SPI.
pub fn performance_index(
    basis: ScheduleBasis,
    time_completion: Option<f64>,
    percentage_complete: f64,
) -> Option<f64> {
    let tc = time_completion.filter(|t| t.is_finite() && *t > 0.0)?;
    let pi = match basis {
        ScheduleBasis::TimeCompletion => 100.0 / tc,
        ScheduleBasis::Progress => {
            if !percentage_complete.is_finite() {
                return None;
            }
            percentage_complete / (tc / 100.0)
        }
    };
    pi.is_finite().then_some(pi)
}

pub fn classify_performance(pi: Option<f64>) -> ScheduleCategory {
    match pi {
        Some(p) if p >= AHEAD_OF_SCHEDULE_MIN => ScheduleCategory::AheadOfSchedule,
        Some(p) if p >= ON_TRACK_MIN => ScheduleCategory::OnTrack,
        Some(p) if p >= SLIGHTLY_BEHIND_MIN => ScheduleCategory::SlightlyBehind,
        Some(_) => ScheduleCategory::CriticalDelay,
        None => ScheduleCategory::NotAvailable,
    }
}

/// `actual - projected` gross margin, when both are known.
pub fn margin_deviation(projected: Option<f64>, actual: Option<f64>) -> Option<f64> {
    let (p, a) = (projected?, actual?);
    let d = a - p;
    d.is_finite().then_some(d)
}

pub fn project_status(percentage_complete: f64, schedule: ScheduleCategory) -> ProjectStatus {
    if percentage_complete >= 1.0 {
        ProjectStatus::Completed
    } else if schedule.is_behind() {
        ProjectStatus::Delayed
    } else {
        ProjectStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn budget_buckets() {
        assert_eq!(classify_budget(100.0, 80.0), BudgetCategory::UnderBudget);
        assert_eq!(classify_budget(100.0, 105.0), BudgetCategory::WithinBudget);
        assert_eq!(classify_budget(100.0, 120.0), BudgetCategory::OverBudget);
        assert_eq!(
            classify_budget(100.0, 160.0),
            BudgetCategory::CriticallyOverBudget
        );
        assert_eq!(classify_budget(100.0, 0.0), BudgetCategory::UnderBudget);
    }

    #[test]
    fn budget_boundaries_are_closed_open() {
        assert_eq!(classify_variance(Some(0.9)), BudgetCategory::WithinBudget);
        assert_eq!(
            classify_variance(Some(0.899_999)),
            BudgetCategory::UnderBudget
        );
        assert_eq!(classify_variance(Some(1.1)), BudgetCategory::OverBudget);
        assert_eq!(
            classify_variance(Some(1.099_999)),
            BudgetCategory::WithinBudget
        );
        assert_eq!(
            classify_variance(Some(1.5)),
            BudgetCategory::CriticallyOverBudget
        );
    }

    #[test]
    fn zero_or_negative_budget_is_unknown() {
        assert_eq!(budget_variance(0.0, 50.0), None);
        assert_eq!(classify_budget(0.0, 50.0), BudgetCategory::Unknown);
        assert_eq!(classify_budget(-10.0, 5.0), BudgetCategory::Unknown);
        assert_eq!(classify_budget(f64::NAN, 5.0), BudgetCategory::Unknown);
        assert_eq!(classify_budget(100.0, f64::INFINITY), BudgetCategory::Unknown);
    }

    #[test]
    fn performance_index_from_time_completion() {
        let pi = performance_index(ScheduleBasis::TimeCompletion, Some(50.0), 0.0);
        assert_eq!(pi, Some(2.0));
        assert_eq!(classify_performance(pi), ScheduleCategory::AheadOfSchedule);

        let pi = performance_index(ScheduleBasis::TimeCompletion, Some(125.0), 0.0);
        assert_eq!(pi, Some(0.8));
        assert_eq!(classify_performance(pi), ScheduleCategory::SlightlyBehind);

        let pi = performance_index(ScheduleBasis::TimeCompletion, Some(200.0), 0.0);
        assert_eq!(classify_performance(pi), ScheduleCategory::CriticalDelay);
    }

    #[test]
    fn performance_index_from_progress() {
        let pi = performance_index(ScheduleBasis::Progress, Some(50.0), 0.5);
        assert_eq!(pi, Some(1.0));
        assert_eq!(classify_performance(pi), ScheduleCategory::OnTrack);

        let pi = performance_index(ScheduleBasis::Progress, Some(80.0), 0.4);
        assert_eq!(classify_performance(pi), ScheduleCategory::CriticalDelay);
    }

    #[test]
    fn performance_boundaries_fall_upward() {
        assert_eq!(
            classify_performance(Some(1.10)),
            ScheduleCategory::AheadOfSchedule
        );
        assert_eq!(classify_performance(Some(0.90)), ScheduleCategory::OnTrack);
        assert_eq!(
            classify_performance(Some(0.75)),
            ScheduleCategory::SlightlyBehind
        );
        assert_eq!(
            classify_performance(Some(0.749)),
            ScheduleCategory::CriticalDelay
        );
    }

    #[test]
    fn zero_time_completion_is_not_available() {
        for basis in [ScheduleBasis::TimeCompletion, ScheduleBasis::Progress] {
            assert_eq!(performance_index(basis, Some(0.0), 0.5), None);
            assert_eq!(performance_index(basis, None, 0.5), None);
            assert_eq!(performance_index(basis, Some(f64::NAN), 0.5), None);
        }
        assert_eq!(classify_performance(None), ScheduleCategory::NotAvailable);
    }

    #[test]
    fn time_completion_derived_from_dates() {
        let tc = time_completion_from_dates(d(2024, 1, 1), d(2024, 1, 11), d(2024, 1, 6));
        assert_eq!(tc, Some(50.0));
        let overdue = time_completion_from_dates(d(2024, 1, 1), d(2024, 1, 11), d(2024, 1, 21));
        assert_eq!(overdue, Some(200.0));
        let not_started =
            time_completion_from_dates(d(2024, 1, 1), d(2024, 1, 11), d(2023, 12, 1));
        assert_eq!(not_started, Some(0.0));
        assert_eq!(
            time_completion_from_dates(d(2024, 1, 11), d(2024, 1, 1), d(2024, 1, 6)),
            None
        );
    }

    #[test]
    fn margin_deviation_needs_both_sides() {
        let dev = margin_deviation(Some(0.25), Some(0.20)).unwrap();
        assert!((dev - -0.05).abs() < 1e-12);
        assert_eq!(margin_deviation(None, Some(0.2)), None);
        assert_eq!(margin_deviation(Some(0.2), None), None);
    }

    #[test]
    fn status_rules() {
        assert_eq!(
            project_status(1.0, ScheduleCategory::CriticalDelay),
            ProjectStatus::Completed
        );
        assert_eq!(
            project_status(0.4, ScheduleCategory::SlightlyBehind),
            ProjectStatus::Delayed
        );
        assert_eq!(
            project_status(0.4, ScheduleCategory::NotAvailable),
            ProjectStatus::Active
        );
    }
}
