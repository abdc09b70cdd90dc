use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum EntryError {
    #[error("Severity {0} is outside the 1-10 scale")]
    SeverityOutOfRange(i32),

    #[error("Unknown symptom '{0}' (pass --allow-custom to log it anyway)")]
    UnknownSymptom(String),

    #[error("Symptom name must not be empty")]
    EmptySymptom,
}
