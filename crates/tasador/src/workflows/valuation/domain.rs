use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regions the prediction model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "Capital Federal")]
    CapitalFederal,
    #[serde(rename = "Buenos Aires Interior")]
    BuenosAiresInterior,
    #[serde(rename = "Bs.As. G.B.A. Zona Norte")]
    GbaZonaNorte,
    #[serde(rename = "Bs.As. G.B.A. Zona Sur")]
    GbaZonaSur,
    #[serde(rename = "Bs.As. G.B.A. Zona Oeste")]
    GbaZonaOeste,
    #[serde(rename = "Córdoba")]
    Cordoba,
    #[serde(rename = "Santa Fe")]
    SantaFe,
}

impl Location {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::CapitalFederal,
            Self::BuenosAiresInterior,
            Self::GbaZonaNorte,
            Self::GbaZonaSur,
            Self::GbaZonaOeste,
            Self::Cordoba,
            Self::SantaFe,
        ]
    }

    /// Exact `l2` value expected by the prediction endpoint.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CapitalFederal => "Capital Federal",
            Self::BuenosAiresInterior => "Buenos Aires Interior",
            Self::GbaZonaNorte => "Bs.As. G.B.A. Zona Norte",
            Self::GbaZonaSur => "Bs.As. G.B.A. Zona Sur",
            Self::GbaZonaOeste => "Bs.As. G.B.A. Zona Oeste",
            Self::Cordoba => "Córdoba",
            Self::SantaFe => "Santa Fe",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Location {
    type Err = FieldError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|location| location.label() == trimmed)
            .ok_or_else(|| FieldError::UnknownLocation(raw.to_string()))
    }
}

/// Identifies one editable field of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Location,
    Bedrooms,
    Bathrooms,
    SurfaceTotal,
    SurfaceCovered,
}

impl FormField {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Location,
            Self::Bedrooms,
            Self::Bathrooms,
            Self::SurfaceTotal,
            Self::SurfaceCovered,
        ]
    }

    /// Field name used in the request body.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Location => "l2",
            Self::Bedrooms => "bedrooms",
            Self::Bathrooms => "bathrooms",
            Self::SurfaceTotal => "surface_total",
            Self::SurfaceCovered => "surface_covered",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for FormField {
    type Err = FieldError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "l2" | "location" => Ok(Self::Location),
            "bedrooms" => Ok(Self::Bedrooms),
            "bathrooms" => Ok(Self::Bathrooms),
            "surface_total" | "surfaceTotal" => Ok(Self::SurfaceTotal),
            "surface_covered" | "surfaceCovered" => Ok(Self::SurfaceCovered),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

/// Numeric form value as typed by the user.
///
/// Text that does not parse to a finite number is kept verbatim instead of
/// being coerced, so submission can refuse it.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericInput {
    Value(f64),
    Invalid(String),
}

impl NumericInput {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Value(value),
            _ => Self::Invalid(raw.to_string()),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(*value),
            Self::Invalid(_) => None,
        }
    }
}

/// Mutable form contents owned by the form state manager.
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub location: Location,
    pub bedrooms: NumericInput,
    pub bathrooms: NumericInput,
    pub surface_total: NumericInput,
    pub surface_covered: NumericInput,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            location: Location::CapitalFederal,
            bedrooms: NumericInput::Value(2.0),
            bathrooms: NumericInput::Value(1.0),
            surface_total: NumericInput::Value(80.0),
            surface_covered: NumericInput::Value(70.0),
        }
    }
}

impl FormInput {
    /// Apply one raw edit. Numeric fields never fail here; bad text is
    /// recorded and surfaces during validation.
    pub fn apply(&mut self, field: FormField, raw: &str) -> Result<(), FieldError> {
        match field {
            FormField::Location => self.location = raw.parse()?,
            FormField::Bedrooms => self.bedrooms = NumericInput::parse(raw),
            FormField::Bathrooms => self.bathrooms = NumericInput::parse(raw),
            FormField::SurfaceTotal => self.surface_total = NumericInput::parse(raw),
            FormField::SurfaceCovered => self.surface_covered = NumericInput::parse(raw),
        }
        Ok(())
    }

    /// Freeze the current values into a request payload, collecting every
    /// problem rather than stopping at the first.
    pub fn validate(&self) -> Result<PropertyPayload, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        let bedrooms = count(FormField::Bedrooms, &self.bedrooms, 0, &mut issues);
        let bathrooms = count(FormField::Bathrooms, &self.bathrooms, 1, &mut issues);
        let surface_total = area(FormField::SurfaceTotal, &self.surface_total, &mut issues);
        let surface_covered = area(FormField::SurfaceCovered, &self.surface_covered, &mut issues);

        if let (Some(total), Some(covered)) = (surface_total, surface_covered) {
            if covered > total {
                issues.push(ValidationIssue::CoveredExceedsTotal { covered, total });
            }
        }

        match (bedrooms, bathrooms, surface_total, surface_covered) {
            (Some(bedrooms), Some(bathrooms), Some(surface_total), Some(surface_covered))
                if issues.is_empty() =>
            {
                Ok(PropertyPayload {
                    l2: self.location,
                    bedrooms,
                    bathrooms,
                    surface_total,
                    surface_covered,
                })
            }
            _ => Err(issues),
        }
    }
}

fn count(
    field: FormField,
    input: &NumericInput,
    minimum: u32,
    issues: &mut Vec<ValidationIssue>,
) -> Option<u32> {
    let value = numeric(field, input, issues)?;
    if value.fract() != 0.0 || value < f64::from(minimum) || value > f64::from(u32::MAX) {
        issues.push(ValidationIssue::OutOfRange {
            field,
            value,
            rule: if minimum == 0 {
                "a whole number of at least 0"
            } else {
                "a whole number of at least 1"
            },
        });
        return None;
    }
    Some(value as u32)
}

fn area(field: FormField, input: &NumericInput, issues: &mut Vec<ValidationIssue>) -> Option<f64> {
    let value = numeric(field, input, issues)?;
    if value <= 0.0 {
        issues.push(ValidationIssue::OutOfRange {
            field,
            value,
            rule: "greater than 0 square meters",
        });
        return None;
    }
    Some(value)
}

fn numeric(
    field: FormField,
    input: &NumericInput,
    issues: &mut Vec<ValidationIssue>,
) -> Option<f64> {
    match input {
        NumericInput::Value(value) => Some(*value),
        NumericInput::Invalid(raw) => {
            issues.push(ValidationIssue::Unparsed {
                field,
                raw: raw.clone(),
            });
            None
        }
    }
}

/// Immutable request body. Only obtainable through [`FormInput::validate`],
/// so every number in it is finite and in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyPayload {
    l2: Location,
    bedrooms: u32,
    bathrooms: u32,
    surface_total: f64,
    surface_covered: f64,
}

impl PropertyPayload {
    pub fn location(&self) -> Location {
        self.l2
    }

    pub fn bedrooms(&self) -> u32 {
        self.bedrooms
    }

    pub fn bathrooms(&self) -> u32 {
        self.bathrooms
    }

    pub fn surface_total(&self) -> f64 {
        self.surface_total
    }

    pub fn surface_covered(&self) -> f64 {
        self.surface_covered
    }
}

/// Estimate returned by the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "precio_predicho")]
    pub estimated_price: f64,
    #[serde(
        rename = "propiedad",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub property_label: Option<String>,
    #[serde(
        rename = "moneda",
        default = "default_currency",
        deserialize_with = "currency_or_default"
    )]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

// Only `precio_predicho` decides whether a body is usable; a null or
// non-string label or currency is treated as absent.
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

fn currency_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_else(default_currency))
}

/// The one notification shown for any failed estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub message: &'static str,
}

impl ErrorInfo {
    pub const GENERIC_MESSAGE: &'static str =
        "Could not obtain a price estimate from the prediction service.";

    pub const fn generic() -> Self {
        Self {
            message: Self::GENERIC_MESSAGE,
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded(PredictionResult),
    Failed(ErrorInfo),
}

impl RequestStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InFlight => "in_flight",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }
}

/// Rejected field edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("unknown form field '{0}'")]
    UnknownField(String),
    #[error("'{0}' is not one of the supported locations")]
    UnknownLocation(String),
}

/// Reason a form snapshot cannot become a payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("{field}: '{raw}' is not a number")]
    Unparsed { field: FormField, raw: String },
    #[error("{field}: {value} must be {rule}")]
    OutOfRange {
        field: FormField,
        value: f64,
        rule: &'static str,
    },
    #[error("surface_covered ({covered}) exceeds surface_total ({total})")]
    CoveredExceedsTotal { covered: f64, total: f64 },
}
