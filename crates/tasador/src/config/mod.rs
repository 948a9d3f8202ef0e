use reqwest::Url;
use std::env;
use std::fmt;

/// Endpoint used by the published front end when nothing else is configured.
pub const DEFAULT_PREDICT_URL: &str =
    "https://qgzm7dy75b.execute-api.us-east-1.amazonaws.com/prod/predict";

/// Distinguishes runtime behavior for different stages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub prediction: PredictionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let endpoint =
            env::var("APP_PREDICT_URL").unwrap_or_else(|_| DEFAULT_PREDICT_URL.to_string());
        let prediction = PredictionConfig::parse(&endpoint, environment)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            prediction,
            telemetry: TelemetryConfig { log_level },
        })
    }

    /// Replace the configured endpoint, applying the same checks as `load`.
    pub fn override_endpoint(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.prediction = PredictionConfig::parse(raw, self.environment)?;
        Ok(())
    }
}

/// Location of the remote prediction endpoint.
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    pub endpoint: Url,
}

impl PredictionConfig {
    pub fn parse(raw: &str, environment: AppEnvironment) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            reason: err.to_string(),
        })?;

        match endpoint.scheme() {
            "https" => {}
            "http" if environment != AppEnvironment::Production => {}
            scheme => {
                return Err(ConfigError::InsecureEndpoint {
                    scheme: scheme.to_string(),
                })
            }
        }

        Ok(Self { endpoint })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidEndpoint { value: String, reason: String },
    InsecureEndpoint { scheme: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidEndpoint { value, reason } => {
                write!(f, "APP_PREDICT_URL '{}' is not a valid URL ({})", value, reason)
            }
            ConfigError::InsecureEndpoint { scheme } => write!(
                f,
                "APP_PREDICT_URL must use https in production (got '{}')",
                scheme
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
