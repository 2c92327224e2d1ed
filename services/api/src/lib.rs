mod cli;
mod demo;
mod infra;
mod replay;
mod routes;
mod server;

use lead_enrich::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
