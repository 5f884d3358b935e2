use crate::commands::{run_export, run_report, ExportArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strata_analytics::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Strata Analytics",
    about = "Serve, print and export strata property reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Build a report and print a readable summary
    Report(ReportArgs),
    /// Build a report and write it as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON snapshot or CSV directory to serve; overrides APP_DATA_PATH
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Export(args) => run_export(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_analytics::ReportKind;

    #[test]
    fn export_accepts_window_and_output() {
        let cli = Cli::try_parse_from([
            "strata-analytics-api",
            "export",
            "--kind",
            "financial",
            "--from",
            "2026-01-01",
            "--output",
            "-",
        ])
        .expect("arguments parse");

        let Some(Command::Export(args)) = cli.command else {
            panic!("expected the export command");
        };
        assert_eq!(args.report.kind, ReportKind::Financial);
        assert!(args.report.from.is_some());
        assert!(args.report.to.is_none());
        assert_eq!(args.output, Some(PathBuf::from("-")));
    }

    #[test]
    fn bad_dates_and_kinds_are_rejected() {
        assert!(Cli::try_parse_from(["api", "report", "--kind", "weekly"]).is_err());
        assert!(Cli::try_parse_from([
            "api",
            "report",
            "--kind",
            "occupancy",
            "--to",
            "15/05/2026"
        ])
        .is_err());
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
