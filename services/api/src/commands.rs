use crate::infra::load_source;
use chrono::NaiveDate;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_analytics::config::AppConfig;
use strata_analytics::error::AppError;
use strata_analytics::export::{export_csv, export_file_name};
use strata_analytics::report::{
    ComprehensiveReport, FinancialReport, MaintenanceReport, OccupancyReport,
};
use strata_analytics::telemetry;
use strata_analytics::{Report, ReportKind, ReportRequest, ReportService};

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Report to build: maintenance, financial, occupancy or comprehensive
    #[arg(long)]
    pub(crate) kind: ReportKind,
    /// First day of the reporting window (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Last day of the reporting window (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) to: Option<NaiveDate>,
    /// JSON snapshot or CSV directory; overrides APP_DATA_PATH
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) report: ReportArgs,
    /// Destination file, or `-` for stdout. Defaults to a dated name in the
    /// working directory.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let report = generate(args).await?;
    render_report(&report);
    Ok(())
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs { report, output } = args;
    let report = generate(report).await?;

    let csv = export_csv(&report);
    if output.as_deref() == Some(Path::new("-")) {
        println!("{csv}");
        return Ok(());
    }

    let output = output.unwrap_or_else(|| PathBuf::from(export_file_name(&report)));
    std::fs::write(&output, &csv)?;

    println!(
        "Exported {} report ({} data rows) to {}",
        report.kind().label(),
        csv.lines().count().saturating_sub(1),
        output.display()
    );
    Ok(())
}

async fn generate(args: ReportArgs) -> Result<Report, AppError> {
    let ReportArgs {
        kind,
        from,
        to,
        data,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let data = data.or(config.analytics.data_path);
    let service = ReportService::with_deadline(
        Arc::new(load_source(data.as_deref())?),
        config.analytics.fetch_timeout,
    );

    Ok(service.generate(&ReportRequest::new(kind).between(from, to)).await?)
}

fn render_report(report: &Report) {
    println!(
        "{} report | {} | generated {}",
        report.kind().label(),
        report.period(),
        report.generated_at().format("%Y-%m-%d %H:%M UTC")
    );

    match report {
        Report::Maintenance(report) => render_maintenance(report),
        Report::Financial(report) => render_financial(report),
        Report::Occupancy(report) => render_occupancy(report),
        Report::Comprehensive(report) => render_comprehensive(report),
    }
}

fn render_maintenance(report: &MaintenanceReport) {
    let metrics = &report.metrics;
    println!("\nMaintenance");
    println!(
        "- {} requests | {} open | {} emergency | {:.1}% completed",
        metrics.total_requests,
        metrics.open_requests,
        metrics.emergency_requests,
        metrics.completion_rate
    );
    let times = &metrics.response_times;
    if times.total > 0 {
        println!(
            "- Response: {:.1}h avg | {}h median | {}h fastest | {}h slowest ({} completed)",
            times.average, times.median, times.fastest, times.slowest, times.total
        );
    }
    println!(
        "- Estimated cost ${:.2} across {} costed requests (emergency ${:.2})",
        metrics.costs.total_estimated,
        metrics.costs.costed_requests,
        metrics.costs.emergency_total
    );
    if !metrics.top_units.is_empty() {
        println!("Busiest units:");
        for unit in metrics.top_units.iter().take(5) {
            println!("  - {}: {} requests", unit.unit_number, unit.requests);
        }
    }
}

fn render_financial(report: &FinancialReport) {
    let metrics = &report.metrics;
    println!("\nLevies");
    println!(
        "- ${:.2} levied | ${:.2} collected | ${:.2} outstanding | {:.1}% collection rate",
        metrics.total_levied,
        metrics.total_collected,
        metrics.total_outstanding,
        metrics.collection_rate
    );
    println!(
        "- {} overdue totalling ${:.2} | {:.1} days overdue on average",
        metrics.overdue.count, metrics.overdue.amount, metrics.overdue.average_days_overdue
    );
    if metrics.total_late_fees > 0.0 {
        println!("- ${:.2} in late fees", metrics.total_late_fees);
    }
    for (quarter, totals) in &metrics.by_quarter {
        println!(
            "  - {quarter}: ${:.2} levied, ${:.2} collected",
            totals.levied, totals.collected
        );
    }
}

fn render_occupancy(report: &OccupancyReport) {
    let metrics = &report.metrics;
    println!("\nOccupancy");
    println!(
        "- {} of {} units occupied ({:.1}%) | {} vacant",
        metrics.occupied_units, metrics.total_units, metrics.occupancy_rate, metrics.vacant_units
    );
    if let (Some(min), Some(max)) = (metrics.size_distribution.min, metrics.size_distribution.max)
    {
        println!(
            "- Sizes {min}-{max} sqm, {:.1} sqm average",
            metrics.size_distribution.average
        );
    }
    for (unit_type, count) in &metrics.by_unit_type {
        println!("  - {unit_type}: {count}");
    }
}

fn render_comprehensive(report: &ComprehensiveReport) {
    render_maintenance(&report.maintenance);
    render_financial(&report.financial);
    render_occupancy(&report.occupancy);

    let health = &report.financial_health;
    println!(
        "\nFinancial health: {:.0}/100 ({} risk) | net position ${:.2}",
        health.score, health.risk_level_label, health.net_position
    );

    if !report.risk_assessment.is_empty() {
        println!("Risks:");
        for finding in &report.risk_assessment {
            println!(
                "  - [{}] {}: {}",
                finding.severity_label, finding.category_label, finding.description
            );
        }
    }

    println!("Highlights:");
    for highlight in &report.executive_summary.highlights {
        println!("  - {highlight}");
    }
    if !report.executive_summary.recommendations.is_empty() {
        println!("Recommendations:");
        for recommendation in &report.executive_summary.recommendations {
            println!("  - {recommendation}");
        }
    }
}
