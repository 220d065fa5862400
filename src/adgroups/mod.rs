use std::collections::HashMap;
use tracing::{info, warn};

pub mod classifier;

use crate::model::{
    normalize_keyword, round_to, AdGroupCollection, AdGroupDetail, Category, Competition,
    KeywordRecord, MatchType, Summary,
};

pub use classifier::{KeywordClassifier, RuleBasedClassifier};

/// Volume threshold above which Broad match becomes a candidate
const BROAD_MATCH_VOLUME_THRESHOLD: u64 = 2000;

/// Builds ad groups from scored keywords: categorization through a pluggable
/// classifier (repaired against the rule-based fallback), then match type
/// and CPC recommendations per keyword.
pub struct AdGroupBuilder {
    /// Carried through from configuration for reporting; bid math uses
    /// competition only
    pub conversion_rate: f64,
}

impl AdGroupBuilder {
    pub fn new(conversion_rate: f64) -> Self {
        Self { conversion_rate }
    }

    /// Categorize and enrich the scored keywords. Categorization is total:
    /// every input record lands in exactly one category, with the
    /// rule-based fallback covering anything the classifier mishandles.
    pub async fn build_ad_groups(
        &self,
        keywords: Vec<KeywordRecord>,
        classifier: &dyn KeywordClassifier,
    ) -> AdGroupCollection {
        let categorized = categorize(keywords, classifier).await;

        let mut collection = AdGroupCollection::default();
        for category in Category::ALL {
            collection.groups.insert(category, Vec::new());
        }

        for (category, records) in categorized {
            let group = collection.groups.entry(category).or_default();
            for record in records {
                group.push(self.enrich(record, category));
            }
        }

        info!(
            "Built {} ad groups over {} keywords",
            collection.non_empty_groups().count(),
            collection.total_keywords()
        );
        collection
    }

    /// Apply category, match types, and suggested CPC bids to one record
    fn enrich(&self, mut record: KeywordRecord, category: Category) -> KeywordRecord {
        record.match_types = match_types_for(&record, category);
        record.suggested_cpc_start = Some(suggested_cpc(&record, CpcKind::Start));
        record.suggested_cpc_ceiling = Some(suggested_cpc(&record, CpcKind::Ceiling));
        record.category = Some(category);
        record
    }

    /// Per-ad-group and overall statistics. Empty categories are omitted
    /// from the detail map and excluded from `total_ad_groups`.
    pub fn generate_summary(&self, ad_groups: &AdGroupCollection) -> Summary {
        let mut details = std::collections::BTreeMap::new();

        for (category, keywords) in ad_groups.non_empty_groups() {
            let count = keywords.len();
            let total_volume: u64 = keywords.iter().map(|kw| kw.avg_monthly_searches).sum();
            let total_score: f64 = keywords.iter().filter_map(|kw| kw.score).sum();
            let total_cpc: f64 = keywords
                .iter()
                .filter_map(|kw| kw.suggested_cpc_start)
                .sum();

            let mut by_score: Vec<&KeywordRecord> = keywords.iter().collect();
            by_score.sort_by(|a, b| {
                b.score
                    .unwrap_or(0.0)
                    .total_cmp(&a.score.unwrap_or(0.0))
            });
            let top_keywords = by_score
                .iter()
                .take(5)
                .map(|kw| kw.keyword.clone())
                .collect();

            details.insert(
                *category,
                AdGroupDetail {
                    keyword_count: count,
                    avg_search_volume: (total_volume as f64 / count as f64).round() as u64,
                    avg_score: round_to(total_score / count as f64, 3),
                    avg_cpc_start: round_to(total_cpc / count as f64, 2),
                    top_keywords,
                },
            );
        }

        Summary {
            total_keywords: ad_groups.total_keywords(),
            total_ad_groups: details.len(),
            ad_group_details: details,
        }
    }
}

/// Assign every record to exactly one category.
///
/// The external classifier's output is matched back to records by
/// case-insensitive exact keyword text. A keyword counts as placed only if
/// the classifier put it in exactly one known category; everything else
/// (omitted, duplicated, unknown category name, classifier failure) goes
/// through the rule-based fallback.
pub async fn categorize(
    keywords: Vec<KeywordRecord>,
    classifier: &dyn KeywordClassifier,
) -> Vec<(Category, Vec<KeywordRecord>)> {
    let texts: Vec<String> = keywords.iter().map(|kw| kw.keyword.clone()).collect();

    let placements = match classifier.classify(&texts).await {
        Ok(raw) => placements_from(&keywords, raw),
        Err(e) => {
            warn!(
                "Classifier '{}' unavailable, degrading to rule-based categorization: {}",
                classifier.name(),
                e
            );
            HashMap::new()
        }
    };

    let mut groups: Vec<(Category, Vec<KeywordRecord>)> = Category::ALL
        .iter()
        .map(|category| (*category, Vec::new()))
        .collect();
    let mut fallback_count = 0usize;

    for record in keywords {
        let key = record.normalized_key();
        let category = match placements.get(&key) {
            Some(Some(category)) => *category,
            _ => {
                fallback_count += 1;
                RuleBasedClassifier::categorize_one(&record.keyword)
            }
        };

        if let Some((_, records)) = groups.iter_mut().find(|(c, _)| *c == category) {
            records.push(record);
        }
    }

    if fallback_count > 0 {
        info!("Rule-based fallback categorized {} keywords", fallback_count);
    }

    groups
}

/// Normalized keyword -> Some(category) when placed exactly once in a known
/// category, None when duplicated across categories
fn placements_from(
    keywords: &[KeywordRecord],
    raw: HashMap<String, Vec<String>>,
) -> HashMap<String, Option<Category>> {
    let known: std::collections::HashSet<String> =
        keywords.iter().map(|kw| kw.normalized_key()).collect();

    let mut placements: HashMap<String, Option<Category>> = HashMap::new();

    for (category_name, texts) in raw {
        let Some(category) = Category::parse(&category_name) else {
            warn!("Classifier returned unknown category '{}', ignoring", category_name);
            continue;
        };

        for text in texts {
            let key = normalize_keyword(&text);
            if !known.contains(&key) {
                continue;
            }

            placements
                .entry(key)
                .and_modify(|existing| {
                    // Placed more than once: the placement is unusable
                    if existing.map_or(true, |c| c != category) {
                        *existing = None;
                    }
                })
                .or_insert(Some(category));
        }
    }

    placements
}

enum CpcKind {
    Start,
    Ceiling,
}

/// Match types by category, with Broad appended for high-volume,
/// low-competition category/informational keywords
fn match_types_for(record: &KeywordRecord, category: Category) -> Vec<MatchType> {
    let mut match_types = match category {
        Category::BrandTerms => vec![MatchType::Exact, MatchType::Phrase],
        Category::CategoryTerms => vec![MatchType::Phrase, MatchType::Exact],
        Category::CompetitorTerms => vec![MatchType::Exact],
        Category::LocationTerms => vec![MatchType::Phrase, MatchType::Exact],
        Category::InformationalTerms => vec![MatchType::Phrase],
    };

    let broad_eligible = matches!(
        category,
        Category::CategoryTerms | Category::InformationalTerms
    );
    if broad_eligible
        && record.avg_monthly_searches > BROAD_MATCH_VOLUME_THRESHOLD
        && record.competition == Competition::Low
    {
        match_types.push(MatchType::Broad);
    }

    match_types
}

/// Suggested CPC from the top-of-page bid benchmarks. Missing bids behave
/// as 0 and negative inputs are clamped.
fn suggested_cpc(record: &KeywordRecord, kind: CpcKind) -> f64 {
    let low_bid = record.top_of_page_bid_low.max(0.0);
    let high_bid = record.top_of_page_bid_high.max(0.0);

    let mut suggested = match kind {
        // Start at 75% of the low bid or the mid-point, whichever is lower
        CpcKind::Start => (low_bid * 0.75).min((low_bid + high_bid) / 2.0),
        CpcKind::Ceiling => high_bid,
    };

    match record.competition {
        Competition::Low => suggested *= 0.9,
        Competition::High => suggested *= 1.1,
        Competition::Medium => {}
    }

    round_to(suggested, 2)
}
