mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use strata_analytics::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
