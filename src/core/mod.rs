use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adgroups::{AdGroupBuilder, KeywordClassifier, RuleBasedClassifier};
use crate::config::{ApiCredentials, AppConfig};
use crate::error::AdSmartError;
use crate::export::{ExportManager, ReportContext};
use crate::llm::{LlmClassifier, OpenAiClient};
use crate::model::{AdGroupCollection, KeywordRecord, Summary};
use crate::processor::KeywordProcessor;
use crate::research::SerpClient;
use crate::scraper::{extract_products_services, SiteContent, WebsiteScraper};

/// Number of competitor keyword candidates sent for metric estimation
const COMPETITOR_KEYWORD_LIMIT: usize = 20;

/// Result of a full research run
pub struct PipelineOutcome {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub keywords: Vec<KeywordRecord>,
    pub ad_groups: AdGroupCollection,
    pub summary: Summary,
    pub written_files: Vec<PathBuf>,
}

/// Orchestrates the full keyword research run: scrape the brand and
/// competitor sites, derive seed keywords, research and estimate metrics,
/// process and categorize, then export.
///
/// Credentials are injected at construction. The SERP key is mandatory;
/// without an OpenAI key the pipeline degrades to site-content seed
/// extraction and rule-based categorization.
pub struct AdSmartPipeline {
    config: AppConfig,
    scraper: WebsiteScraper,
    serp: SerpClient,
    llm: Option<OpenAiClient>,
    processor: KeywordProcessor,
    builder: AdGroupBuilder,
    exporter: ExportManager,
}

impl AdSmartPipeline {
    pub fn new(config: AppConfig, credentials: ApiCredentials) -> Result<Self> {
        let serp_key = credentials
            .serp_api_key
            .ok_or_else(|| AdSmartError::config("SERP_API_KEY is required"))?;

        let llm = match credentials.openai_api_key {
            Some(key) => Some(OpenAiClient::new(key)?),
            None => {
                warn!("No OpenAI API key; using rule-based categorization only");
                None
            }
        };

        Ok(Self {
            scraper: WebsiteScraper::new(&config.scraping)?,
            serp: SerpClient::new(serp_key)?,
            llm,
            processor: KeywordProcessor::new(&config),
            builder: AdGroupBuilder::new(config.keyword_settings.conversion_rate),
            exporter: ExportManager::new(&config.export),
            config,
        })
    }

    /// Execute the full run and write export files to disk
    pub async fn run(&self) -> Result<PipelineOutcome> {
        let run_id = Uuid::new_v4().to_string();
        info!("Starting keyword research run {}", run_id);

        let brand_site = self.scrape_or_empty(&self.config.brand.website).await;
        let competitor_site = self.scrape_or_empty(&self.config.competitor.website).await;

        let seeds = self.derive_seed_keywords(&brand_site, &competitor_site).await;
        if seeds.is_empty() {
            return Err(AdSmartError::research("no seed keywords could be derived").into());
        }
        info!("Derived {} seed keywords", seeds.len());

        let mut raw = self
            .serp
            .get_keyword_ideas(&seeds, &self.config.geo_targeting.country)
            .await?;
        raw.extend(self.competitor_keyword_records().await);
        info!("Collected {} raw keyword records", raw.len());

        let classifier: Box<dyn KeywordClassifier> = match &self.llm {
            Some(client) => Box::new(LlmClassifier::new(client.clone())),
            None => Box::new(RuleBasedClassifier),
        };

        let (keywords, ad_groups, summary) =
            self.process_records(raw, classifier.as_ref()).await;

        let files = self.exporter.generate_files(
            &ad_groups,
            &summary,
            &keywords,
            &ReportContext {
                mode: self.config.keyword_settings.mode.clone(),
                min_search_volume: self.config.keyword_settings.min_search_volume,
            },
        )?;
        let written_files = self.exporter.write_all(&files).await?;

        info!(
            "Run {} complete: {} keywords in {} ad groups, {} files written",
            run_id,
            summary.total_keywords,
            summary.total_ad_groups,
            written_files.len()
        );

        Ok(PipelineOutcome {
            run_id,
            generated_at: Utc::now(),
            keywords,
            ad_groups,
            summary,
            written_files,
        })
    }

    /// The offline half of the run: dedup, filter, geo-expand and score the
    /// raw records, then categorize and summarize them
    pub async fn process_records(
        &self,
        raw: Vec<KeywordRecord>,
        classifier: &dyn KeywordClassifier,
    ) -> (Vec<KeywordRecord>, AdGroupCollection, Summary) {
        let scored = self.processor.process(raw);
        let ad_groups = self.builder.build_ad_groups(scored.clone(), classifier).await;
        let summary = self.builder.generate_summary(&ad_groups);
        (scored, ad_groups, summary)
    }

    /// A failed scrape degrades the run instead of aborting it
    async fn scrape_or_empty(&self, url: &str) -> SiteContent {
        match self.scraper.scrape_website(url).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Scrape failed for {}: {}; continuing with empty content", url, e);
                SiteContent::empty(url)
            }
        }
    }

    /// Seed keywords come from the LLM in `minimal_content` mode, otherwise
    /// from products and services extracted off the scraped sites. Extraction
    /// coming up empty falls back to the LLM when one is available.
    async fn derive_seed_keywords(
        &self,
        brand: &SiteContent,
        competitor: &SiteContent,
    ) -> Vec<String> {
        if self.config.keyword_settings.mode == "minimal_content" {
            if let Some(client) = &self.llm {
                match client.generate_seed_keywords(brand, competitor).await {
                    Ok(seeds) if !seeds.is_empty() => return seeds,
                    Ok(_) => warn!("LLM returned no seed keywords, extracting from sites"),
                    Err(e) => warn!("LLM seed generation failed: {}; extracting from sites", e),
                }
            } else {
                warn!("minimal_content mode needs an OpenAI key, extracting from sites");
            }
        }

        let mut seeds = extract_products_services(brand);
        for seed in extract_products_services(competitor) {
            if !seeds.contains(&seed) {
                seeds.push(seed);
            }
        }

        if seeds.is_empty() {
            if let Some(client) = &self.llm {
                warn!("Site extraction produced no seeds, asking LLM");
                if let Ok(generated) = client.generate_seed_keywords(brand, competitor).await {
                    seeds = generated;
                }
            }
        }

        seeds
    }

    /// Competitor keyword candidates with estimated metrics. Failures here
    /// cost coverage, not the run.
    async fn competitor_keyword_records(&self) -> Vec<KeywordRecord> {
        let candidates = match self
            .serp
            .get_competitor_keywords(&self.config.competitor.website)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Competitor keyword extraction failed: {}", e);
                return Vec::new();
            }
        };

        let top: Vec<String> = candidates.into_iter().take(COMPETITOR_KEYWORD_LIMIT).collect();
        if top.is_empty() {
            return Vec::new();
        }

        match self
            .serp
            .get_keyword_metrics(&top, &self.config.geo_targeting.country)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!("Competitor keyword metrics failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Competition};

    fn pipeline() -> AdSmartPipeline {
        let credentials = ApiCredentials {
            openai_api_key: None,
            serp_api_key: Some("test-key".to_string()),
        };
        AdSmartPipeline::new(AppConfig::default(), credentials).unwrap()
    }

    fn record(keyword: &str, volume: u64, competition: Competition) -> KeywordRecord {
        KeywordRecord::new(keyword, volume, competition, 10.0, 40.0)
    }

    #[test]
    fn test_missing_serp_key_is_fatal() {
        let credentials = ApiCredentials {
            openai_api_key: Some("sk-test".to_string()),
            serp_api_key: None,
        };
        assert!(AdSmartPipeline::new(AppConfig::default(), credentials).is_err());
    }

    #[test]
    fn test_missing_openai_key_degrades() {
        let credentials = ApiCredentials {
            openai_api_key: None,
            serp_api_key: Some("test-key".to_string()),
        };
        let pipeline = AdSmartPipeline::new(AppConfig::default(), credentials).unwrap();
        assert!(pipeline.llm.is_none());
    }

    #[tokio::test]
    async fn test_process_records_end_to_end() {
        let pipeline = pipeline();
        let raw = vec![
            record("acme services", 3000, Competition::Low),
            record("acme services", 100, Competition::High),
            record("how to fix a tap", 2500, Competition::Low),
            record("plumbing service", 1800, Competition::Medium),
            record("tiny keyword", 50, Competition::Low),
        ];

        let (keywords, ad_groups, summary) =
            pipeline.process_records(raw, &RuleBasedClassifier).await;

        // Duplicate and below-threshold records are gone; only geo variants
        // added after filtering may sit under the volume floor
        assert!(keywords
            .iter()
            .filter(|kw| !kw.is_location_variant)
            .all(|kw| kw.avg_monthly_searches >= 500));
        assert_eq!(
            keywords
                .iter()
                .filter(|kw| kw.keyword == "acme services")
                .count(),
            1
        );

        // Every surviving record is scored and categorized
        assert!(keywords.iter().all(|kw| kw.score.is_some()));
        assert_eq!(ad_groups.total_keywords(), keywords.len());
        for (_, group) in ad_groups.non_empty_groups() {
            for kw in group {
                assert!(kw.category.is_some());
                assert!(!kw.match_types.is_empty());
                assert!(kw.suggested_cpc_start.is_some());
                assert!(kw.suggested_cpc_ceiling.is_some());
            }
        }

        // Informational trigger term routed by the fallback rules
        let informational = &ad_groups.groups[&Category::InformationalTerms];
        assert!(informational
            .iter()
            .any(|kw| kw.keyword.starts_with("how to fix")));

        assert_eq!(summary.total_keywords, keywords.len());
        assert_eq!(summary.total_ad_groups, summary.ad_group_details.len());
    }

    #[tokio::test]
    async fn test_process_records_empty_input() {
        let pipeline = pipeline();
        let (keywords, ad_groups, summary) =
            pipeline.process_records(Vec::new(), &RuleBasedClassifier).await;

        assert!(keywords.is_empty());
        assert_eq!(ad_groups.total_keywords(), 0);
        assert_eq!(summary.total_keywords, 0);
        assert_eq!(summary.total_ad_groups, 0);
        assert!(summary.ad_group_details.is_empty());
    }
}
