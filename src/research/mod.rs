use anyhow::Result;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::AdSmartError;
use crate::model::{Competition, KeywordRecord};

const SERP_ENDPOINT: &str = "https://serpapi.com/search.json";

/// Keywords researched per run is capped to bound API spend
const MAX_RESEARCH_KEYWORDS: usize = 100;

/// Competitor keyword extraction cap
const MAX_COMPETITOR_KEYWORDS: usize = 30;

/// In-flight metric lookups
const MAX_CONCURRENT_LOOKUPS: usize = 5;

const STOP_WORDS: [&str; 35] = [
    "and", "the", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old",
    "see", "two", "who", "did", "she", "use", "way", "many", "then",
];

/// Search-API-backed keyword research: autocomplete expansion of seed
/// keywords, then per-keyword volume/competition/CPC estimation from
/// result counts. The credential is injected explicitly; nothing here
/// reads process environment.
pub struct SerpClient {
    api_key: String,
    client: reqwest::Client,
    max_retries: usize,
}

impl SerpClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            max_retries: 2,
        })
    }

    /// Expand seed keywords through autocomplete suggestions and estimate
    /// metrics for each unique suggestion
    pub async fn get_keyword_ideas(
        &self,
        seed_keywords: &[String],
        location: &str,
    ) -> Result<Vec<KeywordRecord>> {
        if seed_keywords.is_empty() {
            warn!("No seed keywords provided");
            return Ok(Vec::new());
        }

        let location = canonical_location(location);
        info!(
            "Researching {} seed keywords for location: {}",
            seed_keywords.len(),
            location
        );

        let mut seen = std::collections::HashSet::new();
        let mut all_keywords = Vec::new();

        for (i, seed) in seed_keywords.iter().enumerate() {
            debug!("Processing seed {}/{}: {}", i + 1, seed_keywords.len(), seed);

            match self.autocomplete_suggestions(seed).await {
                Ok(suggestions) => {
                    for suggestion in suggestions {
                        if suggestion.len() > 2 && seen.insert(suggestion.to_lowercase()) {
                            all_keywords.push(suggestion);
                        }
                    }
                }
                Err(e) => {
                    warn!("Error getting suggestions for '{}': {}", seed, e);
                    continue;
                }
            }

            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        info!("Total unique keywords found: {}", all_keywords.len());
        if all_keywords.len() > MAX_RESEARCH_KEYWORDS {
            all_keywords.truncate(MAX_RESEARCH_KEYWORDS);
            info!("Limited to top {} keywords", MAX_RESEARCH_KEYWORDS);
        }

        self.get_keyword_metrics(&all_keywords, &location).await
    }

    /// Estimate metrics for each keyword with bounded concurrency
    pub async fn get_keyword_metrics(
        &self,
        keywords: &[String],
        location: &str,
    ) -> Result<Vec<KeywordRecord>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let location = canonical_location(location);
        info!("Getting metrics for {} keywords", keywords.len());

        let records: Vec<KeywordRecord> = futures::stream::iter(keywords.iter().cloned())
            .map(|keyword| {
                let location = location.clone();
                async move {
                    match self.single_keyword_metrics(&keyword, &location).await {
                        Ok(record) => Some(record),
                        Err(e) => {
                            warn!("Error getting metrics for '{}': {}", keyword, e);
                            None
                        }
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
            .filter_map(|record| async move { record })
            .collect()
            .await;

        info!(
            "Successfully processed {} out of {} keywords",
            records.len(),
            keywords.len()
        );
        Ok(records)
    }

    /// Extract candidate keywords from a competitor's indexed pages
    pub async fn get_competitor_keywords(&self, competitor_url: &str) -> Result<Vec<String>> {
        info!("Analyzing competitor: {}", competitor_url);

        let parsed = url::Url::parse(competitor_url)?;
        let domain = parsed
            .host_str()
            .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
            .ok_or_else(|| AdSmartError::research("competitor URL has no host"))?;

        let results = self
            .request(&[
                ("engine", "google"),
                ("q", &format!("site:{domain}")),
                ("num", "20"),
                ("location", "India"),
            ])
            .await?;

        let organic = results
            .get("organic_results")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        debug!("Found {} pages from competitor", organic.len());

        let texts: Vec<String> = organic
            .iter()
            .map(|result| {
                let title = result.get("title").and_then(|v| v.as_str()).unwrap_or("");
                let snippet = result.get("snippet").and_then(|v| v.as_str()).unwrap_or("");
                format!("{title} {snippet}").to_lowercase()
            })
            .collect();

        let keywords = extract_keyword_candidates(&texts);
        info!("Extracted {} potential competitor keywords", keywords.len());
        Ok(keywords)
    }

    async fn autocomplete_suggestions(&self, seed: &str) -> Result<Vec<String>> {
        let results = self
            .request(&[("engine", "google_autocomplete"), ("q", seed)])
            .await?;

        let suggestions = results
            .get("suggestions")
            .and_then(|v| v.as_array())
            .map(|array| {
                array
                    .iter()
                    .filter_map(|s| s.get("value").and_then(|v| v.as_str()))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(suggestions)
    }

    async fn single_keyword_metrics(&self, keyword: &str, location: &str) -> Result<KeywordRecord> {
        let results = self
            .request(&[("engine", "google"), ("q", keyword), ("location", location)])
            .await?;

        let total_results = results
            .get("search_information")
            .and_then(|info| info.get("total_results"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let volume = estimate_search_volume(keyword, total_results);
        let competition = estimate_competition(total_results);
        let (cpc_low, cpc_high) = estimate_cpc(keyword, competition);

        Ok(KeywordRecord::new(keyword, volume, competition, cpc_low, cpc_high))
    }

    /// Search request with fixed-backoff retries
    async fn request(&self, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries.max(1) {
            let result = self
                .client
                .get(SERP_ENDPOINT)
                .query(params)
                .query(&[("api_key", self.api_key.as_str())])
                .send()
                .await;

            match result {
                Ok(response) => {
                    let body: serde_json::Value = response.json().await?;
                    if let Some(error) = body.get("error").and_then(|v| v.as_str()) {
                        last_error = Some(
                            AdSmartError::SearchApi { message: error.to_string() }.into(),
                        );
                    } else {
                        return Ok(body);
                    }
                }
                Err(e) => {
                    last_error = Some(e.into());
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Search API request failed")))
    }
}

/// Map common country codes to the search API's canonical location names
pub fn canonical_location(location: &str) -> String {
    match location {
        "US" => "United States",
        "IN" => "India",
        "CA" => "Canada",
        "UK" => "United Kingdom",
        "AU" => "Australia",
        other => other,
    }
    .to_string()
}

/// Estimate monthly search volume from the total result count.
/// Never drops below 500.
pub fn estimate_search_volume(keyword: &str, total_results: u64) -> u64 {
    if total_results == 0 {
        return 500;
    }

    let mut base_volume = (total_results / 1000).min(100_000) as f64;
    let word_count = keyword.split_whitespace().count();

    match word_count {
        1 => base_volume = (base_volume * 2.5).trunc(),
        2 => base_volume = (base_volume * 1.5).trunc(),
        n if n > 4 => base_volume = (base_volume * 0.3).trunc(),
        _ => {}
    }

    let keyword_lower = keyword.to_lowercase();
    let commercial = ["buy", "purchase", "order", "price", "cost", "best", "review"];
    if commercial.iter().any(|word| keyword_lower.contains(word)) {
        base_volume = (base_volume * 1.3).trunc();
    }

    if ["near me", "online", "delivery"]
        .iter()
        .any(|word| keyword_lower.contains(word))
    {
        base_volume = (base_volume * 1.2).trunc();
    }

    (base_volume as u64).max(500)
}

/// Competition level from the total result count
pub fn estimate_competition(total_results: u64) -> Competition {
    if total_results > 100_000_000 {
        Competition::High
    } else if total_results > 1_000_000 {
        Competition::Medium
    } else {
        Competition::Low
    }
}

/// Estimated top-of-page bid range by keyword intent and competition
pub fn estimate_cpc(keyword: &str, competition: Competition) -> (f64, f64) {
    let (mut low, mut high): (i64, i64) = match competition {
        Competition::Low => (5, 25),
        Competition::Medium => (15, 75),
        Competition::High => (30, 200),
    };

    let keyword_lower = keyword.to_lowercase();
    let contains_any =
        |terms: &[&str]| terms.iter().any(|term| keyword_lower.contains(term));

    if contains_any(&["buy", "purchase", "order", "price", "cost", "hire", "service"]) {
        low = (low as f64 * 2.0) as i64;
        high = (high as f64 * 2.5) as i64;
    } else if contains_any(&["how", "what", "why", "guide", "tips", "tutorial", "free"]) {
        low = (low as f64 * 0.4) as i64;
        high = (high as f64 * 0.6) as i64;
    } else if contains_any(&["vs", "alternative", "competitor", "compare"]) {
        low = (low as f64 * 1.5) as i64;
        high = (high as f64 * 1.8) as i64;
    } else if contains_any(&["near me", "in", "mumbai", "delhi", "bangalore", "local"]) {
        low = (low as f64 * 1.2) as i64;
        high = (high as f64 * 1.3) as i64;
    }

    let low = low.max(5);
    let high = high.max(low + 10);
    (low as f64, high as f64)
}

/// Unigram and bigram candidates from page titles and snippets, filtered
/// against stop words and capped
pub fn extract_keyword_candidates(texts: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut keywords = Vec::new();

    let mut push = |candidate: String| {
        if !STOP_WORDS.contains(&candidate.as_str())
            && candidate.split_whitespace().count() <= 3
            && seen.insert(candidate.clone())
        {
            keywords.push(candidate);
        }
    };

    for text in texts {
        let words: Vec<&str> = text.split_whitespace().collect();

        for word in &words {
            let cleaned: String = word.chars().filter(|c| c.is_alphabetic()).collect();
            if cleaned.len() > 3 {
                push(cleaned);
            }
        }

        for pair in words.windows(2) {
            let first: String = pair[0].chars().filter(|c| c.is_alphabetic()).collect();
            let second: String = pair[1].chars().filter(|c| c.is_alphabetic()).collect();
            if first.len() > 2 && second.len() > 2 {
                push(format!("{first} {second}"));
            }
        }
    }

    keywords.truncate(MAX_COMPETITOR_KEYWORDS);
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_location() {
        assert_eq!(canonical_location("IN"), "India");
        assert_eq!(canonical_location("US"), "United States");
        assert_eq!(canonical_location("France"), "France");
    }

    #[test]
    fn test_volume_floor() {
        assert_eq!(estimate_search_volume("anything", 0), 500);
        assert_eq!(estimate_search_volume("obscure niche term here now", 1000), 500);
    }

    #[test]
    fn test_volume_word_count_multipliers() {
        // base = 10_000_000 / 1000 = 10_000
        assert_eq!(estimate_search_volume("plumber", 10_000_000), 25_000);
        assert_eq!(estimate_search_volume("plumber pune", 10_000_000), 15_000);
        assert_eq!(estimate_search_volume("plumber for my old house", 10_000_000), 3_000);
    }

    #[test]
    fn test_volume_intent_multipliers() {
        // base 10_000, two words x1.5 = 15_000, commercial x1.3 = 19_500
        assert_eq!(estimate_search_volume("buy widgets", 10_000_000), 19_500);
        // three words, no word-count multiplier; "near me" x1.2
        assert_eq!(estimate_search_volume("plumber near me", 10_000_000), 12_000);
    }

    #[test]
    fn test_volume_base_is_capped() {
        // total/1000 capped at 100_000 before multipliers
        assert_eq!(estimate_search_volume("hotels", 1_000_000_000), 250_000);
    }

    #[test]
    fn test_competition_thresholds() {
        assert_eq!(estimate_competition(500_000), Competition::Low);
        assert_eq!(estimate_competition(1_000_001), Competition::Medium);
        assert_eq!(estimate_competition(50_000_000), Competition::Medium);
        assert_eq!(estimate_competition(100_000_001), Competition::High);
    }

    #[test]
    fn test_cpc_transactional_keywords_cost_more() {
        let (low, high) = estimate_cpc("hire plumber", Competition::Medium);
        assert_eq!((low, high), (30.0, 187.0));
    }

    #[test]
    fn test_cpc_informational_keywords_cost_less() {
        let (low, high) = estimate_cpc("how to fix tap", Competition::Medium);
        // 15 x 0.4 = 6, 75 x 0.6 = 45
        assert_eq!((low, high), (6.0, 45.0));
    }

    #[test]
    fn test_cpc_floors() {
        let (low, high) = estimate_cpc("what guide", Competition::Low);
        // 5 x 0.4 = 2 -> floor 5; 25 x 0.6 = 15 -> floor low + 10
        assert_eq!(low, 5.0);
        assert_eq!(high, 15.0);
        assert!(high >= low + 10.0);
    }

    #[test]
    fn test_extract_keyword_candidates() {
        let texts = vec!["premium widget repair and maintenance".to_string()];
        let keywords = extract_keyword_candidates(&texts);

        assert!(keywords.contains(&"premium".to_string()));
        assert!(keywords.contains(&"widget repair".to_string()));
        // Stop words are excluded as unigrams
        assert!(!keywords.contains(&"and".to_string()));
    }

    #[test]
    fn test_extract_keyword_candidates_strips_punctuation() {
        let texts = vec!["widgets, gadgets! (cheap)".to_string()];
        let keywords = extract_keyword_candidates(&texts);

        assert!(keywords.contains(&"widgets".to_string()));
        assert!(keywords.contains(&"gadgets".to_string()));
        assert!(keywords.contains(&"cheap".to_string()));
    }
}
