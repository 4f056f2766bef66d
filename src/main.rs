// Entry point and high-level CLI flow.
//
// - `check` loads and cleans the project register, printing diagnostics.
// - `report` generates the project, division and category reports plus a
//   JSON summary, previewing each table on the console.
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use portfolio_metrics::{
    output, reports, summarize, util, AppConfig, CsvSource, PortfolioCalculator, PortfolioResult,
    ScheduleBasis,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Portfolio KPIs from a project register export
#[derive(Parser)]
#[command(name = "portfolio_metrics", version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the register and report what was read
    Check(SourceArgs),
    /// Generate all reports and the JSON summary
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory for reports
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Rows shown in each console preview
        #[arg(long)]
        preview_rows: Option<usize>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Project register CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD) for date-derived time completion
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Performance index basis
    #[arg(long, value_enum)]
    basis: Option<ScheduleBasis>,
}

impl SourceArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(as_of) = self.as_of {
            config.as_of = Some(as_of);
        }
        if let Some(basis) = self.basis {
            config.schedule_basis = basis;
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// `check`: load and clean the register, printing a short summary of what
/// happened.
fn handle_check(config: &AppConfig) -> PortfolioResult<()> {
    let source = CsvSource::new(&config.input);
    let (data, load_report) = source.load()?;
    println!(
        "Processing register... ({} rows read, {} projects loaded)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.loaded_rows)
    );
    println!(
        "Note: {} rows skipped due to parse errors.",
        util::format_int(load_report.parse_errors)
    );
    if load_report.coerced_fields > 0 {
        println!(
            "Info: {} missing or malformed fields defaulted.",
            util::format_int(load_report.coerced_fields)
        );
    }
    let undated = data
        .iter()
        .filter(|r| {
            r.time_completion.is_none() && (r.start_date.is_none() || r.finish_date.is_none())
        })
        .count();
    if undated > 0 {
        println!(
            "Info: {} projects have no time completion or schedule dates.",
            util::format_int(undated)
        );
    }
    Ok(())
}

/// `report`: writes three CSV files and a JSON summary, and prints Markdown
/// previews of each report to the console.
fn handle_report(config: &AppConfig) -> PortfolioResult<()> {
    let settings = config.calculator_settings();
    info!(as_of = %settings.as_of, basis = ?settings.schedule_basis, "generating reports");
    let calculator = PortfolioCalculator::new(settings);
    let source = CsvSource::new(&config.input);
    let evaluated = calculator.evaluate_source(&source)?;
    let summary = summarize(&evaluated);

    std::fs::create_dir_all(&config.output_dir)?;
    let out = |name: &str| config.output_dir.join(name);

    println!("Generating reports...");
    println!("Outputs saved to {}\n", config.output_dir.display());

    let r1 = reports::project_status_rows(&evaluated);
    let file1 = out("project_status.csv");
    output::write_csv(&file1, &r1)?;
    println!("Report 1: Project Budget and Schedule Status");
    println!("(Sorted by spend variance, highest first)\n");
    output::preview_table_rows(&r1, config.preview_rows);
    println!("(Full table exported to {})\n", file1.display());

    let r2 = reports::division_summary(&evaluated);
    let file2 = out("division_summary.csv");
    output::write_csv(&file2, &r2)?;
    println!("Report 2: Division Summary");
    println!("(Ranked by total budget)\n");
    output::preview_table_rows(&r2, config.preview_rows);
    println!("(Full table exported to {})\n", file2.display());

    let r3 = reports::category_count_rows(&summary);
    let file3 = out("category_counts.csv");
    output::write_csv(&file3, &r3)?;
    println!("Report 3: Budget and Schedule Category Counts\n");
    output::preview_table_rows(&r3, r3.len());
    println!("(Full table exported to {})\n", file3.display());

    let summary_file = out("summary.json");
    output::write_json(&summary_file, &summary)?;
    println!("Summary Stats ({}):", summary_file.display());
    println!(
        "{{\"total_projects\": {}, \"total_budget\": {}, \"total_spent\": {}, \"delayed\": {}}}\n",
        util::format_int(summary.total_projects),
        util::format_number(summary.total_budget, 2),
        util::format_number(summary.total_spent, 2),
        util::format_int(summary.delayed)
    );
    Ok(())
}

/// Apply command line flags on top of `config` and validate the result.
fn resolve_config(mut config: AppConfig, command: &Commands) -> PortfolioResult<AppConfig> {
    match command {
        Commands::Check(source) => source.apply(&mut config),
        Commands::Report {
            source,
            out_dir,
            preview_rows,
        } => {
            source.apply(&mut config);
            if let Some(dir) = out_dir {
                config.output_dir = dir.clone();
            }
            if let Some(rows) = preview_rows {
                config.preview_rows = *rows;
            }
        }
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> PortfolioResult<()> {
    let file_config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::default(),
    };
    let config = resolve_config(file_config, &cli.command)?;
    match cli.command {
        Commands::Check(_) => handle_check(&config),
        Commands::Report { .. } => handle_report(&config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
