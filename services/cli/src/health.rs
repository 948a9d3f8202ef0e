use tasador::error::AppError;
use tasador::workflows::valuation::HttpPredictionClient;

pub(crate) async fn run_health(client: &HttpPredictionClient) -> Result<(), AppError> {
    let health = client.health().await?;
    println!("Endpoint: {}", client.health_url());
    println!("Status: {}", health.status);
    println!(
        "Model loaded: {}",
        if health.model_loaded { "yes" } else { "no" }
    );
    Ok(())
}
