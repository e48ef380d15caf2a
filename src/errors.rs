use thiserror::Error;

#[derive(Debug, Error)]
pub enum GhlError {
    #[error("Weather input was rejected: {0}")]
    Input(#[from] InputError),
    #[error("Configuration was rejected: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Problems with the hourly weather series. Any of these abort a run before the first hour is
/// processed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Weather series has {actual} hours but the simulation needs {required}")]
    SeriesTooShort { required: usize, actual: usize },
    #[error("Missing value in weather row {row}, column {column}")]
    MissingValue { row: usize, column: usize },
    #[error("Could not parse '{value}' as a number in weather row {row}, column {column}")]
    NonNumeric {
        row: usize,
        column: usize,
        value: String,
    },
    #[error("Wind speed at hour {hour} is negative ({value} m/s)")]
    NegativeWindSpeed { hour: usize, value: f64 },
    #[error("Solar irradiance at hour {hour} is negative ({value} W/m2)")]
    NegativeIrradiance { hour: usize, value: f64 },
    #[error("Outdoor temperature at hour {hour} is below absolute zero ({value} K)")]
    BelowAbsoluteZero { hour: usize, value: f64 },
    #[error("{quantity} at hour {hour} is not a finite number")]
    NonFinite { hour: usize, quantity: &'static str },
    #[error("Weather series columns have different lengths")]
    MismatchedColumns,
    #[error("Could not read weather data: {0}")]
    Unreadable(String),
}

impl From<csv::Error> for InputError {
    fn from(error: csv::Error) -> Self {
        Self::Unreadable(error.to_string())
    }
}

/// Problems with the building and model configuration, detected while setting up a run.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Heating setpoint ({heating} K) must be below cooling setpoint ({cooling} K)")]
    SetpointOrder { heating: f64, cooling: f64 },
    #[error("{name} must be greater than zero, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be between 0 and 1 inclusive, got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },
    #[error("Simulation end ({end}) must be after simulation start ({start})")]
    EmptySimulation { start: f64, end: f64 },
    #[error("Time step of {step} h is shorter than the minimum of {minimum} h")]
    StepTooShort { step: f64, minimum: f64 },
    #[error("Input failed validation: {0}")]
    Invalid(String),
}

impl From<serde_valid::validation::Errors> for ConfigurationError {
    fn from(errors: serde_valid::validation::Errors) -> Self {
        Self::Invalid(errors.to_string())
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64, ConfigurationError> {
    if value > 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigurationError::NonPositive { name, value })
    }
}

pub(crate) fn ensure_non_negative(
    name: &'static str,
    value: f64,
) -> Result<f64, ConfigurationError> {
    if value >= 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigurationError::Negative { name, value })
    }
}

pub(crate) fn ensure_fraction(name: &'static str, value: f64) -> Result<f64, ConfigurationError> {
    if (0. ..=1.).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigurationError::FractionOutOfRange { name, value })
    }
}
