mod cli;
mod commands;
mod form;
mod infra;
mod routes;
mod server;
mod views;

use attrition::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
