use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::RecommendLimits;
use crate::models::{ScoringModel, ScoringWeights};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub elasticsearch: ElasticsearchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
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
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchSettings {
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn default_index() -> String { "locations".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub enabled: bool,
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: usize,
    #[serde(default = "default_max_region_depth")]
    pub max_region_depth: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            overfetch_factor: default_overfetch_factor(),
            max_region_depth: default_max_region_depth(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl RecommendationSettings {
    pub fn limits(&self) -> RecommendLimits {
        RecommendLimits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
            overfetch_factor: self.overfetch_factor,
            max_region_depth: self.max_region_depth,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 200 }
fn default_overfetch_factor() -> usize { 3 }
fn default_max_region_depth() -> usize { 32 }
fn default_request_timeout_ms() -> u64 { 5000 }

/// Scoring parameters
///
/// `distance_decay_km` is the distance from the region center at which the
/// proximity signal falls to one half; `demand_saturation` is the daily foot
/// traffic at which the demand signal reaches one half.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default = "default_distance_decay_km")]
    pub distance_decay_km: f64,
    #[serde(default = "default_demand_saturation")]
    pub demand_saturation: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            distance_decay_km: default_distance_decay_km(),
            demand_saturation: default_demand_saturation(),
        }
    }
}

impl ScoringSettings {
    pub fn model(&self) -> ScoringModel {
        ScoringModel {
            weights: ScoringWeights {
                competition: self.weights.competition,
                demand: self.weights.demand,
                proximity: self.weights.proximity,
            },
            distance_decay_km: self.distance_decay_km,
            demand_saturation: self.demand_saturation,
        }
    }
}

fn default_distance_decay_km() -> f64 { 25.0 }
fn default_demand_saturation() -> f64 { 1000.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_competition_weight")]
    pub competition: f64,
    #[serde(default = "default_demand_weight")]
    pub demand: f64,
    #[serde(default = "default_proximity_weight")]
    pub proximity: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            competition: default_competition_weight(),
            demand: default_demand_weight(),
            proximity: default_proximity_weight(),
        }
    }
}

fn default_competition_weight() -> f64 { 0.40 }
fn default_demand_weight() -> f64 { 0.35 }
fn default_proximity_weight() -> f64 { 0.25 }

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
    /// 4. Environment variables (prefixed with LOCREC__)
    /// 5. DATABASE_URL / ELASTICSEARCH_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LOCREC__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("LOCREC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LOCREC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional connection-string variables on top of the config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(elasticsearch_url) = env::var("ELASTICSEARCH_URL") {
        builder = builder.set_override("elasticsearch.url", elasticsearch_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    builder.build()
}
