use crate::types::{
    BudgetCategory, CategoryCountRow, DivisionSummaryRow, EvaluatedProject, PortfolioSummary,
    ProjectStatus, ProjectStatusRow, ScheduleCategory,
};
use crate::util::{cmp_desc_none_last, format_number, format_optional, stable_sum};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Project table: one row per project, worst variance first.
pub fn project_status_rows(projects: &[EvaluatedProject]) -> Vec<ProjectStatusRow> {
    let mut sorted: Vec<&EvaluatedProject> = projects.iter().collect();
    sorted.sort_by(|a, b| {
        cmp_desc_none_last(a.metrics.variance, b.metrics.variance)
            .then_with(|| a.record.project_id.cmp(&b.record.project_id))
    });
    sorted
        .into_iter()
        .map(|p| ProjectStatusRow {
            project_id: p.record.project_id.clone(),
            project_name: p.record.project_name.clone(),
            division: p.record.division.clone(),
            budget: format_number(p.record.budget_amount, 2),
            spent: format_number(p.record.total_amount_spent, 2),
            variance: format_optional(p.metrics.variance, 2),
            budget_status: p.metrics.budget_category.to_string(),
            time_completion: format_optional(p.metrics.time_completion, 2),
            performance_index: format_optional(p.metrics.performance_index, 2),
            schedule: p.metrics.schedule_category.to_string(),
            margin_deviation: format_optional(p.metrics.margin_deviation, 4),
        })
        .collect()
}

/// Per-division breakdown, largest total budget first.
pub fn division_summary(projects: &[EvaluatedProject]) -> Vec<DivisionSummaryRow> {
    #[derive(Default)]
    struct Acc {
        projects: usize,
        budgets: Vec<f64>,
        spent: Vec<f64>,
        over_budget: usize,
        delayed: usize,
        risks: u64,
    }
    let mut map: HashMap<String, Acc> = HashMap::new();
    for p in projects {
        let e = map.entry(p.record.division.clone()).or_default();
        e.projects += 1;
        e.budgets.push(p.record.budget_amount);
        e.spent.push(p.record.total_amount_spent);
        if p.metrics.budget_category.is_overspent() {
            e.over_budget += 1;
        }
        if p.metrics.status == ProjectStatus::Delayed {
            e.delayed += 1;
        }
        e.risks += u64::from(p.record.risk_count);
    }

    let mut tmp: Vec<(f64, String, Acc)> = map
        .into_iter()
        .map(|(division, acc)| {
            let total = stable_sum(acc.budgets.iter().copied().filter(|v| v.is_finite()));
            (total, division, acc)
        })
        .collect();
    tmp.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });

    tmp.into_iter()
        .map(|(total_budget, division, acc)| DivisionSummaryRow {
            division,
            projects: acc.projects,
            total_budget: format_number(total_budget, 2),
            total_spent: format_number(
                stable_sum(acc.spent.into_iter().filter(|v| v.is_finite())),
                2,
            ),
            over_budget: acc.over_budget,
            delayed: acc.delayed,
            risks: acc.risks,
        })
        .collect()
}

/// Chart feed: every category of both classifiers with its count.
pub fn category_count_rows(summary: &PortfolioSummary) -> Vec<CategoryCountRow> {
    let budget = BudgetCategory::ALL.iter().map(|c| CategoryCountRow {
        classifier: "Budget".to_string(),
        category: c.to_string(),
        count: summary.budget_categories.get(c).copied().unwrap_or(0),
    });
    let schedule = ScheduleCategory::ALL.iter().map(|c| CategoryCountRow {
        classifier: "Schedule".to_string(),
        category: c.to_string(),
        count: summary.schedule_categories.get(c).copied().unwrap_or(0),
    });
    budget.chain(schedule).collect()
}
