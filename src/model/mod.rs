use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Estimated competition level for a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Competition {
    Low,
    Medium,
    High,
}

impl Competition {
    /// Numeric score in [0,1], monotone in the competition level
    pub fn score(&self) -> f64 {
        match self {
            Competition::Low => 0.2,
            Competition::Medium => 0.5,
            Competition::High => 0.8,
        }
    }
}

impl std::fmt::Display for Competition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Competition::Low => write!(f, "LOW"),
            Competition::Medium => write!(f, "MEDIUM"),
            Competition::High => write!(f, "HIGH"),
        }
    }
}

/// Keyword-matching strictness mode for an ad platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    Exact,
    Phrase,
    Broad,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact"),
            MatchType::Phrase => write!(f, "Phrase"),
            MatchType::Broad => write!(f, "Broad"),
        }
    }
}

/// Ad group category a keyword is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BrandTerms,
    CategoryTerms,
    CompetitorTerms,
    LocationTerms,
    InformationalTerms,
}

impl Category {
    /// All categories, in the order ad groups are reported
    pub const ALL: [Category; 5] = [
        Category::BrandTerms,
        Category::CategoryTerms,
        Category::CompetitorTerms,
        Category::LocationTerms,
        Category::InformationalTerms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BrandTerms => "brand_terms",
            Category::CategoryTerms => "category_terms",
            Category::CompetitorTerms => "competitor_terms",
            Category::LocationTerms => "location_terms",
            Category::InformationalTerms => "informational_terms",
        }
    }

    /// Parse a category name as returned by an external classifier
    pub fn parse(name: &str) -> Option<Category> {
        match name.trim().to_lowercase().as_str() {
            "brand_terms" => Some(Category::BrandTerms),
            "category_terms" => Some(Category::CategoryTerms),
            "competitor_terms" => Some(Category::CompetitorTerms),
            "location_terms" => Some(Category::LocationTerms),
            "informational_terms" => Some(Category::InformationalTerms),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A keyword and its estimated metrics, flowing through every pipeline stage.
///
/// Stages never mutate records they received; each stage produces new values
/// so the same record is never aliased across ad group lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRecord {
    /// Display form of the query; comparisons use the normalized key
    pub keyword: String,
    #[serde(default)]
    pub avg_monthly_searches: u64,
    pub competition: Competition,
    #[serde(default)]
    pub competition_score: f64,
    #[serde(default)]
    pub top_of_page_bid_low: f64,
    #[serde(default)]
    pub top_of_page_bid_high: f64,
    #[serde(default)]
    pub is_location_variant: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_types: Vec<MatchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_cpc_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_cpc_ceiling: Option<f64>,
}

impl KeywordRecord {
    /// Create a record from externally estimated metrics
    pub fn new(
        keyword: impl Into<String>,
        avg_monthly_searches: u64,
        competition: Competition,
        top_of_page_bid_low: f64,
        top_of_page_bid_high: f64,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            avg_monthly_searches,
            competition,
            competition_score: competition.score(),
            top_of_page_bid_low,
            top_of_page_bid_high,
            is_location_variant: false,
            score: None,
            category: None,
            match_types: Vec::new(),
            suggested_cpc_start: None,
            suggested_cpc_ceiling: None,
        }
    }

    /// Case- and whitespace-insensitive identity used for deduplication
    /// and for matching classifier output back to records
    pub fn normalized_key(&self) -> String {
        normalize_keyword(&self.keyword)
    }
}

/// Normalized form of a keyword: lowercased, trimmed
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Mapping from category to the enriched keywords assigned to it.
/// Order within each group is categorization order, not score order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdGroupCollection {
    pub groups: BTreeMap<Category, Vec<KeywordRecord>>,
}

impl AdGroupCollection {
    pub fn total_keywords(&self) -> usize {
        self.groups.values().map(|kws| kws.len()).sum()
    }

    /// Categories that actually received keywords
    pub fn non_empty_groups(&self) -> impl Iterator<Item = (&Category, &Vec<KeywordRecord>)> {
        self.groups.iter().filter(|(_, kws)| !kws.is_empty())
    }
}

/// Per-ad-group aggregate statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdGroupDetail {
    pub keyword_count: usize,
    pub avg_search_volume: u64,
    pub avg_score: f64,
    pub avg_cpc_start: f64,
    pub top_keywords: Vec<String>,
}

/// Read-only aggregate view over an enriched ad group collection.
///
/// `total_ad_groups` counts only categories that received keywords; empty
/// categories are omitted from the detail map and from the total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_keywords: usize,
    pub total_ad_groups: usize,
    pub ad_group_details: BTreeMap<Category, AdGroupDetail>,
}
