use crate::core::scoring::{
    ScoringConfig, DISTANCE_DECAY_KM, EXPERIENCE_SATURATION_YEARS, PARTIAL_LANGUAGE_SCORE,
    RATING_PRIOR_MEAN, RATING_PRIOR_WEIGHT,
};
use crate::core::explain::REASON_THRESHOLD;
use crate::models::{ScoringWeights, MAX_BOOKING_HOURS, MAX_TOTAL_SCORE};
use crate::resolve::RequestDefaults;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "SEBA";

/// Application configuration
///
/// Every section has defaults so the service starts without a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub supabase: SupabaseSettings,
    pub cache: CacheSettings,
    pub matching: MatchingSettings,
    pub scoring: ScoringSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

/// Where caregiver data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Files,
    Supabase,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub source: DataSource,
    pub mock_dir: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source: DataSource::Files,
            mock_dir: "data/mock".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    pub caregivers_table: String,
    pub seniors_table: String,
    pub bookings_table: String,
    pub timeout_secs: u64,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            caregivers_table: "caregivers".to_string(),
            seniors_table: "seniors".to_string(),
            bookings_table: "bookings".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
            max_entries: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    pub default_top_n: usize,
    pub max_top_n: usize,
    pub default_duration_hrs: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_top_n: 5,
            max_top_n: 50,
            default_duration_hrs: 4.0,
        }
    }
}

impl MatchingSettings {
    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            top_n: self.default_top_n,
            max_top_n: self.max_top_n,
            duration_hrs: self.default_duration_hrs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub weights: WeightsConfig,
    pub distance_decay_km: f64,
    pub rating_prior_mean: f64,
    pub rating_prior_weight: f64,
    pub experience_saturation_years: f64,
    pub partial_language_score: f64,
    pub reason_threshold: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            distance_decay_km: DISTANCE_DECAY_KM,
            rating_prior_mean: RATING_PRIOR_MEAN,
            rating_prior_weight: RATING_PRIOR_WEIGHT,
            experience_saturation_years: EXPERIENCE_SATURATION_YEARS,
            partial_language_score: PARTIAL_LANGUAGE_SCORE,
            reason_threshold: REASON_THRESHOLD,
        }
    }
}

impl ScoringSettings {
    pub fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            weights: self.weights.into(),
            distance_decay_km: self.distance_decay_km,
            rating_prior_mean: self.rating_prior_mean,
            rating_prior_weight: self.rating_prior_weight,
            experience_saturation_years: self.experience_saturation_years,
            partial_language_score: self.partial_language_score,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_distance_weight")]
    pub distance: f64,
    #[serde(default = "default_skill_weight")]
    pub skill: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_experience_weight")]
    pub experience: f64,
    #[serde(default = "default_gender_weight")]
    pub gender: f64,
    #[serde(default = "default_language_weight")]
    pub language: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            distance: default_distance_weight(),
            skill: default_skill_weight(),
            rating: default_rating_weight(),
            experience: default_experience_weight(),
            gender: default_gender_weight(),
            language: default_language_weight(),
        }
    }
}

impl From<WeightsConfig> for ScoringWeights {
    fn from(w: WeightsConfig) -> Self {
        ScoringWeights {
            distance: w.distance,
            skill: w.skill,
            rating: w.rating,
            experience: w.experience,
            gender: w.gender,
            language: w.language,
        }
    }
}

fn default_distance_weight() -> f64 { 30.0 }
fn default_skill_weight() -> f64 { 25.0 }
fn default_rating_weight() -> f64 { 20.0 }
fn default_experience_weight() -> f64 { 15.0 }
fn default_gender_weight() -> f64 { 5.0 }
fn default_language_weight() -> f64 { 5.0 }

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

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SEBA__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SEBA__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.source == DataSource::Supabase
            && (self.supabase.url.is_empty() || self.supabase.api_key.is_empty())
        {
            return Err(ConfigError::Message(
                "data.source is supabase but supabase.url or supabase.api_key is not set".to_string(),
            ));
        }

        if self.matching.max_top_n == 0 {
            return Err(ConfigError::Message("matching.max_top_n must be at least 1".to_string()));
        }

        let weights: ScoringWeights = self.scoring.weights.into();
        if [weights.distance, weights.skill, weights.rating, weights.experience, weights.gender, weights.language]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(ConfigError::Message("scoring weights must be non-negative numbers".to_string()));
        }
        if weights.sum() > MAX_TOTAL_SCORE + WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Message(format!(
                "scoring weights sum to {} but may add up to at most {}",
                weights.sum(),
                MAX_TOTAL_SCORE
            )));
        }

        let duration = self.matching.default_duration_hrs;
        if !duration.is_finite() || duration <= 0.0 || duration > MAX_BOOKING_HOURS {
            return Err(ConfigError::Message(format!(
                "matching.default_duration_hrs must be within (0, {}]",
                MAX_BOOKING_HOURS
            )));
        }

        Ok(())
    }
}

/// Slack for weights written as decimals that do not add up exactly
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional Supabase variables on top of loaded settings
///
/// `SUPABASE_URL` and `SUPABASE_KEY` are what the rest of the platform uses,
/// so they win over the prefixed variants when both are set.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let supabase_url = env::var("SUPABASE_URL").ok();
    let supabase_key = env::var("SUPABASE_KEY")
        .or_else(|_| env::var("SUPABASE_SERVICE_ROLE_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = supabase_url {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Some(key) = supabase_key {
        builder = builder.set_override("supabase.api_key", key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.distance, 30.0);
        assert_eq!(weights.skill, 25.0);
        assert_eq!(weights.rating, 20.0);
        assert_eq!(weights.experience, 15.0);
        assert_eq!(weights.gender, 5.0);
        assert_eq!(weights.language, 5.0);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_defaults_are_usable() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.data.source, DataSource::Files);
        assert_eq!(settings.data.mock_dir, "data/mock");
        assert_eq!(settings.matching.request_defaults(), RequestDefaults::default());
        assert_eq!(settings.scoring.scoring_config(), ScoringConfig::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_supabase_source_requires_credentials() {
        let mut settings = Settings::default();
        settings.data.source = DataSource::Supabase;
        assert!(settings.validate().is_err());

        settings.supabase.url = "https://project.supabase.co".to_string();
        settings.supabase.api_key = "key".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_weights_above_one_hundred_rejected() {
        let mut settings = Settings::default();
        settings.scoring.weights.distance = 60.0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("at most 100"));

        // Summing below the ceiling is allowed
        settings.scoring.weights.distance = 10.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_duration_must_fit_one_day() {
        let mut settings = Settings::default();
        settings.matching.default_duration_hrs = 36.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_partial_file() {
        let path = std::env::temp_dir().join(format!("seba-match-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[scoring.weights]\ndistance = 25.0\nskill = 30.0\n\n[matching]\nmax_top_n = 20"
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.scoring.weights.distance, 25.0);
        assert_eq!(settings.scoring.weights.skill, 30.0);
        assert_eq!(settings.scoring.weights.rating, 20.0);
        assert_eq!(settings.matching.max_top_n, 20);
        assert_eq!(settings.matching.default_top_n, 5);
    }
}
