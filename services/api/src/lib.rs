mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use investor_routiner::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
