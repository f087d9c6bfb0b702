use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub endpoint: String,
    pub api_key: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default = "default_classifier_api_url")]
    pub api_url: String,
    pub api_key: String,
    #[serde(default = "default_classifier_model")]
    pub model: String,
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_classifier_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub criteria_hints: Vec<String>,
}

fn default_classifier_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}
fn default_classifier_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}
fn default_classifier_timeout_secs() -> u64 {
    30
}
fn default_classifier_max_tokens() -> u32 {
    1024
}

/// Defaults applied when an analyze request leaves the tuning knobs unset
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_area_tolerance_percent")]
    pub area_tolerance_percent: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            area_tolerance_percent: default_area_tolerance_percent(),
        }
    }
}

fn default_radius_km() -> f64 {
    2.0
}
fn default_area_tolerance_percent() -> f64 {
    15.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RENTBAND_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RENTBAND_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RENTBAND")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RENTBAND")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Promote well-known environment variables into the config tree
///
/// The classifier key is commonly provided as ANTHROPIC_API_KEY and the
/// store key as STORE_API_KEY; both also accept the RENTBAND_-prefixed
/// form handled by the Environment source above.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let classifier_api_key = env::var("ANTHROPIC_API_KEY").ok();
    let store_api_key = env::var("STORE_API_KEY").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = classifier_api_key {
        builder = builder.set_override("classifier.api_key", api_key)?;
    }
    if let Some(api_key) = store_api_key {
        builder = builder.set_override("store.api_key", api_key)?;
    }

    builder.build()
}
