use std::io::{Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::client::PredictionClient;
use super::domain::{ErrorInfo, FieldError, FormField, RequestStatus};
use super::form::ValuationForm;

/// Input row; every column stays raw text so it goes through the same
/// field edits a user would make.
#[derive(Debug, Clone, Deserialize)]
struct BatchRow {
    l2: String,
    bedrooms: String,
    bathrooms: String,
    surface_total: String,
    surface_covered: String,
}

impl BatchRow {
    fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Location => &self.l2,
            FormField::Bedrooms => &self.bedrooms,
            FormField::Bathrooms => &self.bathrooms,
            FormField::SurfaceTotal => &self.surface_total,
            FormField::SurfaceCovered => &self.surface_covered,
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchOutputRow {
    l2: String,
    bedrooms: String,
    bathrooms: String,
    surface_total: String,
    surface_covered: String,
    status: &'static str,
    precio_predicho: Option<f64>,
    moneda: Option<String>,
    propiedad: Option<String>,
    evaluated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("invalid batch CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write batch output: {0}")]
    Io(#[from] std::io::Error),
}

/// Estimates a CSV of properties one row at a time.
pub struct BatchEstimator<C> {
    client: Arc<C>,
}

impl<C> BatchEstimator<C>
where
    C: PredictionClient,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub async fn run<R, W>(&self, input: R, output: W) -> Result<BatchSummary, BatchError>
    where
        R: Read,
        W: Write,
    {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
        let mut writer = csv::Writer::from_writer(output);
        let mut summary = BatchSummary::default();

        for (index, record) in reader.deserialize::<BatchRow>().enumerate() {
            let row = record?;
            let line = index + 1;
            let form = ValuationForm::new(self.client.clone());

            let status = match apply_row(&form, &row) {
                Ok(()) => form
                    .submit()
                    .await
                    .unwrap_or_else(|_| form.current_status()),
                Err(error) => {
                    warn!(line, %error, "batch row rejected");
                    RequestStatus::Failed(ErrorInfo::generic())
                }
            };

            let evaluated_at = form.last_submitted_at().map(|at| at.to_rfc3339());
            let output = match status {
                RequestStatus::Succeeded(result) => {
                    summary.succeeded += 1;
                    BatchOutputRow::from_row(row, "succeeded", evaluated_at).with_result(
                        result.estimated_price,
                        result.currency,
                        result.property_label,
                    )
                }
                other => {
                    summary.failed += 1;
                    BatchOutputRow::from_row(row, other.label(), evaluated_at)
                }
            };
            writer.serialize(output)?;
        }

        writer.flush()?;
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch estimation finished"
        );
        Ok(summary)
    }
}

fn apply_row<C>(form: &ValuationForm<C>, row: &BatchRow) -> Result<(), FieldError>
where
    C: PredictionClient,
{
    FormField::ordered()
        .into_iter()
        .try_for_each(|field| form.set_field(field, row.value(field)))
}

impl BatchOutputRow {
    fn from_row(row: BatchRow, status: &'static str, evaluated_at: Option<String>) -> Self {
        Self {
            l2: row.l2,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            surface_total: row.surface_total,
            surface_covered: row.surface_covered,
            status,
            precio_predicho: None,
            moneda: None,
            propiedad: None,
            evaluated_at,
        }
    }

    fn with_result(mut self, price: f64, currency: String, label: Option<String>) -> Self {
        self.precio_predicho = Some(price);
        self.moneda = Some(currency);
        self.propiedad = label;
        self
    }
}
