use tracing::info;

pub mod geo;
pub mod scoring;

use crate::config::{AppConfig, ScoringWeights};
use crate::model::KeywordRecord;

pub use geo::GeoExpander;
pub use scoring::KeywordScorer;

/// Deduplication, volume filtering, geo expansion and scoring of keyword
/// metric records. Each stage consumes its input and produces a fresh
/// sequence; nothing is mutated in place across stages.
pub struct KeywordProcessor {
    min_volume: u64,
    expander: GeoExpander,
    scorer: KeywordScorer,
}

impl KeywordProcessor {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            min_volume: config.keyword_settings.min_search_volume,
            expander: GeoExpander::new(config.service_locations.clone()),
            scorer: KeywordScorer::new(config.scoring),
        }
    }

    pub fn with_settings(
        min_volume: u64,
        locations: Vec<String>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            min_volume,
            expander: GeoExpander::new(locations),
            scorer: KeywordScorer::new(weights),
        }
    }

    /// Remove duplicate keywords. Identity is the lowercased, trimmed
    /// keyword text; the first occurrence wins and later duplicates are
    /// discarded, never merged.
    pub fn deduplicate(&self, keywords: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
        let before = keywords.len();
        let mut seen = std::collections::HashSet::new();
        let mut unique = Vec::with_capacity(before);

        for record in keywords {
            if seen.insert(record.normalized_key()) {
                unique.push(record);
            }
        }

        info!("Deduplicated keywords: {} -> {}", before, unique.len());
        unique
    }

    /// Keep keywords meeting the configured minimum search volume.
    /// Records exactly at the threshold are kept.
    pub fn filter_by_volume(&self, keywords: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
        let before = keywords.len();
        let filtered: Vec<KeywordRecord> = keywords
            .into_iter()
            .filter(|kw| kw.avg_monthly_searches >= self.min_volume)
            .collect();

        info!(
            "Filtered keywords: {} -> {} (min volume: {})",
            before,
            filtered.len(),
            self.min_volume
        );
        filtered
    }

    /// Full processing pass: dedup -> volume filter -> geo expansion -> score
    pub fn process(&self, raw: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
        let unique = self.deduplicate(raw);
        let filtered = self.filter_by_volume(unique);
        let expanded = self.expander.expand(filtered);
        self.scorer.score(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Competition;

    fn processor(min_volume: u64) -> KeywordProcessor {
        KeywordProcessor::with_settings(
            min_volume,
            vec!["Pune, Maharashtra".to_string()],
            ScoringWeights {
                search_volume_weight: 0.5,
                competition_weight: 0.3,
                cpc_weight: 0.2,
            },
        )
    }

    fn record(keyword: &str, volume: u64) -> KeywordRecord {
        KeywordRecord::new(keyword, volume, Competition::Medium, 10.0, 30.0)
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let input = vec![
            record("Plumber", 1000),
            record("plumber ", 50),
            record("electrician", 700),
        ];

        let unique = processor(0).deduplicate(input);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].keyword, "Plumber");
        assert_eq!(unique[0].avg_monthly_searches, 1000);
        assert_eq!(unique[1].keyword, "electrician");
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let input = vec![record("a", 1), record("b", 2), record("c", 3)];
        let p = processor(0);

        let once = p.deduplicate(input);
        let keywords_once: Vec<String> = once.iter().map(|k| k.keyword.clone()).collect();
        let twice = p.deduplicate(once);
        let keywords_twice: Vec<String> = twice.iter().map(|k| k.keyword.clone()).collect();

        assert_eq!(keywords_once, keywords_twice);
    }

    #[test]
    fn test_filter_keeps_records_at_threshold() {
        let input = vec![record("low", 499), record("at", 500), record("high", 501)];

        let filtered = processor(500).filter_by_volume(input);
        let keywords: Vec<&str> = filtered.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["at", "high"]);
    }

    #[test]
    fn test_filter_is_monotone_in_threshold() {
        let input: Vec<KeywordRecord> =
            (0..20).map(|i| record(&format!("kw{i}"), i * 100)).collect();

        let mut previous_len = usize::MAX;
        for threshold in [0, 100, 500, 1000, 5000] {
            let len = processor(threshold).filter_by_volume(input.clone()).len();
            assert!(len <= previous_len);
            previous_len = len;
        }
    }

    #[test]
    fn test_empty_input_flows_through() {
        let result = processor(500).process(Vec::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_process_scores_every_record() {
        let input = vec![
            record("ac repair service", 2000),
            record("buy air conditioner", 1500),
        ];

        let scored = processor(500).process(input);
        assert!(!scored.is_empty());
        assert!(scored.iter().all(|kw| kw.score.is_some()));
        assert!(scored.iter().all(|kw| kw.score.unwrap().is_finite()));
    }
}
