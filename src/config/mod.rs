use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::error::AdSmartError;
use crate::logging::LoggingConfig;

/// Sentinel location used when the caller configures no service locations
pub const DEFAULT_SERVICE_LOCATION: &str = "Mumbai, Maharashtra";

/// Application configuration, loaded from a YAML document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub brand: SiteConfig,
    pub competitor: SiteConfig,
    pub keyword_settings: KeywordSettings,
    pub scoring: ScoringWeights,
    pub geo_targeting: GeoTargeting,
    #[serde(default)]
    pub service_locations: Vec<String>,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub scraping: ScrapingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub website: String,
}

/// Keyword research mode: `minimal_content` delegates seed generation to the
/// LLM, anything else extracts seeds directly from the scraped sites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSettings {
    #[serde(default = "default_mode")]
    pub mode: String,
    pub min_search_volume: u64,
    /// Carried through for reporting; not used by scoring
    pub conversion_rate: f64,
}

fn default_mode() -> String {
    "full_content".to_string()
}

/// Composite score weights. Loaded values are normalized to sum to 1.0;
/// the scorer itself never re-normalizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub search_volume_weight: f64,
    pub competition_weight: f64,
    pub cpc_weight: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.search_volume_weight + self.competition_weight + self.cpc_weight
    }

    /// Scale the weights so they sum to 1.0
    pub fn normalized(self) -> Self {
        let sum = self.sum();
        Self {
            search_volume_weight: self.search_volume_weight / sum,
            competition_weight: self.competition_weight / sum,
            cpc_weight: self.cpc_weight / sum,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoTargeting {
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingConfig {
    pub request_timeout_seconds: u64,
    pub max_retries: usize,
    pub retry_delay_seconds: u64,
    pub max_concurrent_requests: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            max_retries: 2,
            retry_delay_seconds: 1,
            max_concurrent_requests: 5,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            brand: SiteConfig {
                name: "Example Brand".to_string(),
                website: "https://example.com".to_string(),
            },
            competitor: SiteConfig {
                name: "Example Competitor".to_string(),
                website: "https://competitor.example.com".to_string(),
            },
            keyword_settings: KeywordSettings {
                mode: default_mode(),
                min_search_volume: 500,
                conversion_rate: 0.02,
            },
            scoring: ScoringWeights {
                search_volume_weight: 0.5,
                competition_weight: 0.3,
                cpc_weight: 0.2,
            },
            geo_targeting: GeoTargeting {
                country: "IN".to_string(),
            },
            service_locations: vec![DEFAULT_SERVICE_LOCATION.to_string()],
            export: ExportConfig::default(),
            scraping: ScrapingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, validate it, and normalize
    /// the scoring weights and service locations
    pub async fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AdSmartError::InvalidConfig {
                path: format!("{}: {}", path.as_ref().display(), e),
            }
        })?;
        let config: AppConfig = serde_yaml::from_str(&content).map_err(|e| {
            AdSmartError::InvalidConfig {
                path: format!("{}: {}", path.as_ref().display(), e),
            }
        })?;

        let config = config.validated()?;
        info!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate values and apply normalization. Invalid weight or threshold
    /// configuration is fatal to the run.
    pub fn validated(mut self) -> Result<Self, AdSmartError> {
        let weights = &self.scoring;
        if !weights.search_volume_weight.is_finite()
            || !weights.competition_weight.is_finite()
            || !weights.cpc_weight.is_finite()
        {
            return Err(AdSmartError::config("scoring weights must be finite numbers"));
        }
        if weights.search_volume_weight < 0.0
            || weights.competition_weight < 0.0
            || weights.cpc_weight < 0.0
        {
            return Err(AdSmartError::config("scoring weights must be non-negative"));
        }
        if weights.sum() <= 0.0 {
            return Err(AdSmartError::config("scoring weights must not all be zero"));
        }
        self.scoring = self.scoring.normalized();

        if !self.keyword_settings.conversion_rate.is_finite()
            || self.keyword_settings.conversion_rate < 0.0
        {
            return Err(AdSmartError::config("conversion_rate must be a non-negative number"));
        }

        if self.brand.website.trim().is_empty() {
            return Err(AdSmartError::config("brand.website must be set"));
        }

        if self.service_locations.is_empty() {
            info!(
                "No service locations configured, defaulting to {}",
                DEFAULT_SERVICE_LOCATION
            );
            self.service_locations = vec![DEFAULT_SERVICE_LOCATION.to_string()];
        }

        Ok(self)
    }
}

/// API credentials for external collaborators. Read from the environment in
/// `main` only and passed explicitly into constructors; the core never
/// touches ambient process state.
#[derive(Debug, Clone, Default)]
pub struct ApiCredentials {
    pub openai_api_key: Option<String>,
    pub serp_api_key: Option<String>,
}

impl ApiCredentials {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            serp_api_key: std::env::var("SERP_API_KEY").ok(),
        }
    }
}
