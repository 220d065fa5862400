use tracing::debug;

use crate::config::ScoringWeights;
use crate::model::{round_to, KeywordRecord};

/// Weighted composite scoring over a full batch of keywords.
///
/// Normalization bounds come from the batch itself, so scoring is a two-pass
/// operation and cannot run record-by-record.
pub struct KeywordScorer {
    weights: ScoringWeights,
}

impl KeywordScorer {
    /// The weights are expected to already sum to 1.0 (the config loader
    /// normalizes them); no re-normalization happens here.
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Score every record and sort descending. The sort is stable: records
    /// with equal scores keep their relative input order.
    pub fn score(&self, keywords: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
        if keywords.is_empty() {
            return keywords;
        }

        let volume_min = keywords.iter().map(|kw| kw.avg_monthly_searches).min().unwrap_or(0);
        let volume_max = keywords.iter().map(|kw| kw.avg_monthly_searches).max().unwrap_or(0);
        let cpc_min = keywords
            .iter()
            .map(|kw| kw.top_of_page_bid_high)
            .fold(f64::INFINITY, f64::min);
        let cpc_max = keywords
            .iter()
            .map(|kw| kw.top_of_page_bid_high)
            .fold(f64::NEG_INFINITY, f64::max);

        debug!(
            "Scoring {} keywords (volume {}..{}, cpc {}..{})",
            keywords.len(),
            volume_min,
            volume_max,
            cpc_min,
            cpc_max
        );

        let mut scored: Vec<KeywordRecord> = keywords
            .into_iter()
            .map(|mut kw| {
                // Higher volume is better; a flat batch scores mid-range
                let volume_norm = if volume_max > volume_min {
                    (kw.avg_monthly_searches - volume_min) as f64
                        / (volume_max - volume_min) as f64
                } else {
                    0.5
                };

                // Lower CPC is better, so the normalization is inverted
                let cpc_norm = if cpc_max > cpc_min {
                    1.0 - (kw.top_of_page_bid_high - cpc_min) / (cpc_max - cpc_min)
                } else {
                    0.5
                };

                // Lower competition is better
                let competition_norm = 1.0 - kw.competition_score;

                let score = self.weights.search_volume_weight * volume_norm
                    + self.weights.cpc_weight * cpc_norm
                    + self.weights.competition_weight * competition_norm;

                kw.score = Some(round_to(score, 3));
                kw
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0))
        });

        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Competition;

    fn weights() -> ScoringWeights {
        ScoringWeights {
            search_volume_weight: 0.5,
            competition_weight: 0.3,
            cpc_weight: 0.2,
        }
    }

    fn record(keyword: &str, volume: u64, competition: Competition, cpc_high: f64) -> KeywordRecord {
        KeywordRecord::new(keyword, volume, competition, cpc_high / 3.0, cpc_high)
    }

    #[test]
    fn test_empty_batch_returns_empty() {
        let scored = KeywordScorer::new(weights()).score(Vec::new());
        assert!(scored.is_empty());
    }

    #[test]
    fn test_best_record_ranks_first() {
        let input = vec![
            record("low", 500, Competition::High, 30.0),
            record("mid", 1000, Competition::Medium, 20.0),
            record("best", 2000, Competition::Low, 10.0),
        ];

        let scored = KeywordScorer::new(weights()).score(input);
        assert_eq!(scored[0].keyword, "best");
        // Dominant on every factor: volume_norm=1, cpc_norm=1, comp_norm=0.8
        assert_eq!(scored[0].score, Some(0.94));
        assert_eq!(scored[2].keyword, "low");
        assert_eq!(scored[2].score, Some(0.06));
    }

    #[test]
    fn test_scores_are_bounded() {
        let input = vec![
            record("a", 500, Competition::Low, 10.0),
            record("b", 1000, Competition::Medium, 20.0),
            record("c", 2000, Competition::High, 30.0),
        ];

        for kw in KeywordScorer::new(weights()).score(input) {
            let score = kw.score.unwrap();
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn test_degenerate_batch_uses_flat_midpoint() {
        let input = vec![
            record("a", 1000, Competition::Medium, 25.0),
            record("b", 1000, Competition::Medium, 25.0),
        ];

        let scored = KeywordScorer::new(weights()).score(input);
        // 0.5*0.5 + 0.2*0.5 + 0.3*0.5
        assert!(scored.iter().all(|kw| kw.score == Some(0.5)));
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let input = vec![
            record("first", 1000, Competition::Medium, 25.0),
            record("second", 1000, Competition::Medium, 25.0),
            record("third", 1000, Competition::Medium, 25.0),
        ];

        let scored = KeywordScorer::new(weights()).score(input);
        let keywords: Vec<&str> = scored.iter().map(|kw| kw.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_scores_rounded_to_three_decimals() {
        let input = vec![
            record("a", 500, Competition::Low, 10.0),
            record("b", 777, Competition::Medium, 17.3),
            record("c", 2000, Competition::High, 30.0),
        ];

        for kw in KeywordScorer::new(weights()).score(input) {
            let score = kw.score.unwrap();
            assert_eq!(score, round_to(score, 3));
        }
    }
}
