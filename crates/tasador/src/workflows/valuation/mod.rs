//! Property valuation: form state, payload validation, and the remote
//! prediction exchange.

pub mod batch;
pub mod client;
pub mod domain;
mod form;

pub use batch::{BatchError, BatchEstimator, BatchSummary};
pub use client::{HttpPredictionClient, PredictionClient, PredictionError, ServiceHealth};
pub use domain::{
    ErrorInfo, FieldError, FormField, FormInput, Location, NumericInput, PredictionResult,
    PropertyPayload, RequestStatus, ValidationIssue,
};
pub use form::{SubmitError, ValuationForm};
