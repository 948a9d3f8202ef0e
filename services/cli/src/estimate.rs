use crate::render::{render_estimate, render_issues};
use clap::Args;
use std::sync::Arc;
use tasador::error::AppError;
use tasador::workflows::valuation::{
    ErrorInfo, FormField, HttpPredictionClient, RequestStatus, ValuationForm,
};

#[derive(Args, Debug, Default)]
pub(crate) struct EstimateArgs {
    /// Location, exactly as printed by `tasador locations`
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Number of bedrooms
    #[arg(long)]
    pub(crate) bedrooms: Option<String>,
    /// Number of bathrooms
    #[arg(long)]
    pub(crate) bathrooms: Option<String>,
    /// Total surface in square meters
    #[arg(long)]
    pub(crate) surface_total: Option<String>,
    /// Covered surface in square meters
    #[arg(long)]
    pub(crate) surface_covered: Option<String>,
    /// Print the estimate as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl EstimateArgs {
    fn edits(&self) -> impl Iterator<Item = (FormField, &str)> {
        [
            (FormField::Location, self.location.as_deref()),
            (FormField::Bedrooms, self.bedrooms.as_deref()),
            (FormField::Bathrooms, self.bathrooms.as_deref()),
            (FormField::SurfaceTotal, self.surface_total.as_deref()),
            (FormField::SurfaceCovered, self.surface_covered.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, raw)| raw.map(|raw| (field, raw)))
    }
}

pub(crate) async fn run_estimate(
    client: Arc<HttpPredictionClient>,
    args: EstimateArgs,
) -> Result<(), AppError> {
    let form = ValuationForm::new(client);
    for (field, raw) in args.edits() {
        form.set_field(field, raw)?;
    }

    if let Err(issues) = form.validate() {
        eprint!("{}", render_issues(&issues));
    }

    let status = form
        .submit()
        .await
        .map_err(|_| AppError::Estimate(ErrorInfo::generic()))?;

    match status {
        RequestStatus::Succeeded(result) => {
            if args.json {
                let body = serde_json::to_string_pretty(&result)
                    .map_err(|err| AppError::Io(err.into()))?;
                println!("{body}");
            } else {
                print!("{}", render_estimate(&result, form.last_submitted_at()));
            }
            Ok(())
        }
        RequestStatus::Failed(info) => Err(AppError::Estimate(info)),
        RequestStatus::Idle | RequestStatus::InFlight => {
            Err(AppError::Estimate(ErrorInfo::generic()))
        }
    }
}
