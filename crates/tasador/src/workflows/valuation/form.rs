use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::client::{PredictionClient, PredictionError};
use super::domain::{
    ErrorInfo, FieldError, FormField, FormInput, PredictionResult, PropertyPayload,
    RequestStatus, ValidationIssue,
};

/// Owns the form contents and request status; the only place either changes.
pub struct ValuationForm<C> {
    client: Arc<C>,
    state: Mutex<FormState>,
}

#[derive(Debug, Default)]
struct FormState {
    input: FormInput,
    status: RequestStatus,
    last_submitted_at: Option<DateTime<Utc>>,
}

/// Refused submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a prediction request is already in flight")]
    AlreadyInFlight,
}

impl<C> ValuationForm<C>
where
    C: PredictionClient,
{
    pub fn new(client: Arc<C>) -> Self {
        Self::with_input(client, FormInput::default())
    }

    pub fn with_input(client: Arc<C>, input: FormInput) -> Self {
        Self {
            client,
            state: Mutex::new(FormState {
                input,
                ..FormState::default()
            }),
        }
    }

    /// Apply a raw edit. Allowed while a request is in flight; the outstanding
    /// request keeps the snapshot it was started with.
    pub fn set_field(&self, field: FormField, raw: &str) -> Result<(), FieldError> {
        self.state().input.apply(field, raw)
    }

    pub fn input(&self) -> FormInput {
        self.state().input.clone()
    }

    pub fn current_status(&self) -> RequestStatus {
        self.state().status.clone()
    }

    pub fn last_submitted_at(&self) -> Option<DateTime<Utc>> {
        self.state().last_submitted_at
    }

    pub fn validate(&self) -> Result<PropertyPayload, Vec<ValidationIssue>> {
        self.state().input.validate()
    }

    /// Snapshot the form and run one prediction exchange.
    ///
    /// Invalid input never reaches the network: the status goes straight to
    /// `Failed`. Every failure collapses into the generic [`ErrorInfo`]; the
    /// concrete cause is only logged.
    pub async fn submit(&self) -> Result<RequestStatus, SubmitError> {
        let payload = match self.begin()? {
            Ok(payload) => payload,
            Err(status) => return Ok(status),
        };

        let mut pending = PendingRequest { form: self, armed: true };
        debug!(?payload, "dispatching prediction request");
        let outcome = self.client.predict(&payload).await;
        pending.armed = false;

        Ok(self.complete(outcome))
    }

    fn begin(&self) -> Result<Result<PropertyPayload, RequestStatus>, SubmitError> {
        let mut state = self.state();
        if state.status.is_in_flight() {
            debug!("submission refused while a request is in flight");
            return Err(SubmitError::AlreadyInFlight);
        }

        match state.input.validate() {
            Ok(payload) => {
                info!(location = %payload.location(), "submitting property for estimate");
                state.last_submitted_at = Some(Utc::now());
                state.status = RequestStatus::InFlight;
                Ok(Ok(payload))
            }
            Err(issues) => {
                let detail = issues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!(%detail, "submission blocked by invalid form input");
                state.status = RequestStatus::Failed(ErrorInfo::generic());
                Ok(Err(state.status.clone()))
            }
        }
    }

    fn complete(&self, outcome: Result<PredictionResult, PredictionError>) -> RequestStatus {
        let status = match outcome {
            Ok(result) => {
                info!(
                    estimated_price = result.estimated_price,
                    currency = %result.currency,
                    "estimate received"
                );
                RequestStatus::Succeeded(result)
            }
            Err(error) => {
                warn!(%error, "prediction request failed");
                RequestStatus::Failed(ErrorInfo::generic())
            }
        };

        let mut state = self.state();
        state.status = status.clone();
        status
    }
}

impl<C> ValuationForm<C> {
    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().expect("form state mutex poisoned")
    }
}

/// Moves the form to `Failed` if a submit future is dropped before the
/// response arrives, so the form never stays `InFlight` forever.
struct PendingRequest<'a, C> {
    form: &'a ValuationForm<C>,
    armed: bool,
}

impl<C> Drop for PendingRequest<'_, C> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.form.state();
            if state.status.is_in_flight() {
                state.status = RequestStatus::Failed(ErrorInfo::generic());
            }
        }
    }
}
