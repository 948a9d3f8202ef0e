mod batch;
mod cli;
mod estimate;
mod health;
mod render;

use tasador::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
