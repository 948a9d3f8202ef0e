use clap::Args;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tasador::error::AppError;
use tasador::workflows::valuation::{BatchEstimator, HttpPredictionClient};

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV with columns l2,bedrooms,bathrooms,surface_total,surface_covered
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the results (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) async fn run_batch(
    client: Arc<HttpPredictionClient>,
    args: BatchArgs,
) -> Result<(), AppError> {
    let input = BufReader::new(File::open(&args.input)?);
    let estimator = BatchEstimator::new(client);

    let summary = match args.output {
        Some(path) => {
            let output = BufWriter::new(File::create(path)?);
            estimator.run(input, output).await?
        }
        None => estimator.run(input, io::stdout().lock()).await?,
    };

    eprintln!(
        "{} rows estimated, {} failed",
        summary.succeeded, summary.failed
    );
    Ok(())
}
