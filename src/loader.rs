use crate::error::PortfolioResult;
use crate::types::{ProjectRecord, RawRow};
use crate::util::{
    parse_date_safe, parse_f64_safe, parse_fraction_safe, parse_percent_safe, parse_u32_safe,
};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows the CSV reader could not deserialize at all.
    pub parse_errors: usize,
    /// Individual fields that were missing or malformed and got a default.
    pub coerced_fields: usize,
}

/// Anything that can hand the calculator the current project list.
pub trait ProjectSource {
    fn projects(&self) -> PortfolioResult<Vec<ProjectRecord>>;
}

/// Project register exported from the spreadsheet as CSV.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> PortfolioResult<(Vec<ProjectRecord>, LoadReport)> {
        load_and_clean(&self.path)
    }
}

impl ProjectSource for CsvSource {
    fn projects(&self) -> PortfolioResult<Vec<ProjectRecord>> {
        Ok(self.load()?.0)
    }
}

/// Fixed project list, used for sample data and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<ProjectRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<ProjectRecord>) -> Self {
        Self { records }
    }
}

impl ProjectSource for InMemorySource {
    fn projects(&self) -> PortfolioResult<Vec<ProjectRecord>> {
        Ok(self.records.clone())
    }
}

pub fn load_and_clean(path: &Path) -> PortfolioResult<(Vec<ProjectRecord>, LoadReport)> {
    info!(path = %path.display(), "loading project register");
    let file = std::fs::File::open(path)?;
    load_from_reader(file)
}

pub fn load_from_reader<R: Read>(reader: R) -> PortfolioResult<(Vec<ProjectRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = LoadReport::default();
    let mut records: Vec<ProjectRecord> = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = idx + 1, error = %e, "skipping unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };
        records.push(clean_row(row, &mut report.coerced_fields));
    }

    report.loaded_rows = records.len();
    info!(
        total = report.total_rows,
        loaded = report.loaded_rows,
        parse_errors = report.parse_errors,
        coerced = report.coerced_fields,
        "project register loaded"
    );
    Ok((records, report))
}

/// Coerce one raw row into a strict record. Never fails; every fallback is
/// counted in `coerced`.
fn clean_row(row: RawRow, coerced: &mut usize) -> ProjectRecord {
    let mut amount = |raw: Option<&str>| match parse_f64_safe(raw) {
        Some(v) if v >= 0.0 => v,
        _ => {
            *coerced += 1;
            0.0
        }
    };
    let budget_amount = amount(row.budget_amount.as_deref());
    let total_amount_spent = amount(row.total_amount_spent.as_deref());
    let total_amount_received = amount(row.total_amount_received.as_deref());

    let percentage_complete = parse_fraction_safe(row.percentage_complete.as_deref())
        .unwrap_or_else(|| {
            *coerced += 1;
            0.0
        });
    let risk_count = parse_u32_safe(row.risk_count.as_deref()).unwrap_or_else(|| {
        *coerced += 1;
        0
    });

    // Optional fields: only count a fallback when something was written there.
    let mut optional = |raw: Option<&str>, parsed: Option<f64>| {
        if parsed.is_none() && raw.is_some_and(|s| !s.trim().is_empty()) {
            *coerced += 1;
        }
        parsed
    };
    let time_completion = optional(
        row.time_completion.as_deref(),
        parse_percent_safe(row.time_completion.as_deref()),
    );
    let projected_gross_margin = optional(
        row.projected_gross_margin.as_deref(),
        parse_fraction_safe(row.projected_gross_margin.as_deref()),
    );
    let actual_gross_margin = optional(
        row.actual_gross_margin.as_deref(),
        parse_fraction_safe(row.actual_gross_margin.as_deref()),
    );

    let mut date = |raw: Option<&str>| {
        let parsed = parse_date_safe(raw);
        if parsed.is_none() && raw.is_some_and(|s| !s.trim().is_empty()) {
            *coerced += 1;
        }
        parsed
    };
    let start_date = date(row.start_date.as_deref());
    let finish_date = date(row.finish_date.as_deref());

    let text = |raw: Option<String>| {
        raw.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    ProjectRecord {
        project_id: text(row.project_id),
        project_name: text(row.project_name),
        division: text(row.division),
        budget_amount,
        total_amount_spent,
        total_amount_received,
        percentage_complete,
        time_completion,
        start_date,
        finish_date,
        projected_gross_margin,
        actual_gross_margin,
        risk_count,
    }
}
