use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://symptom-log.db";

pub const DEFAULT_SYMPTOMS: [&str; 12] = [
    "Headache",
    "Dizziness",
    "Nausea",
    "Sensitivity to Light",
    "Sensitivity to Sound",
    "Memory Fog",
    "Fatigue",
    "Irritability",
    "Sleep Disturbance",
    "Balance Issues",
    "Blurred Vision",
    "Concentration Difficulty",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// SQLite connection string for the local event store.
    pub database_url: String,
    /// Symptom names accepted by `log` and `edit` without `--allow-custom`.
    pub symptoms: Vec<String>,
}

impl Settings {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database_url must not be empty".to_string(),
            ));
        }
        if self.symptoms.is_empty() {
            return Err(ConfigError::Validation(
                "symptoms vocabulary must list at least one name".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Loads settings from defaults, then `symptom-log.toml` if present, then
/// `SYMPTOM_LOG_*` environment variables.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("database_url", DEFAULT_DATABASE_URL)?
        .set_default(
            "symptoms",
            DEFAULT_SYMPTOMS
                .iter()
                .map(|name| name.to_string())
                .collect::<Vec<_>>(),
        )?
        .add_source(config::File::with_name("symptom-log").required(false))
        .add_source(env_source());

    from_builder(builder)
}

/// `SYMPTOM_LOG_SYMPTOMS` is read as a comma-separated list.
fn env_source() -> config::Environment {
    config::Environment::with_prefix("SYMPTOM_LOG")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("symptoms")
}

fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Settings, ConfigError> {
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()
}
