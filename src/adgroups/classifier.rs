use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::model::Category;

/// Informational query triggers, checked before location triggers
const INFO_TRIGGER_TERMS: [&str; 7] = ["how", "what", "best", "top", "review", "guide", "tips"];

/// Location intent triggers for the fallback classifier
const LOCATION_TRIGGER_TERMS: [&str; 5] = ["near me", "in", "city", "local", "area"];

/// Pluggable keyword classification capability.
///
/// Implementations receive only keyword texts and return a mapping of
/// category name to keyword texts. They are treated as unreliable: they may
/// fail outright, omit keywords, duplicate them across categories, or
/// return unknown category names. The categorizer repairs all of that
/// against the rule-based fallback.
#[async_trait]
pub trait KeywordClassifier: Send + Sync {
    async fn classify(&self, keywords: &[String]) -> Result<HashMap<String, Vec<String>>>;

    fn name(&self) -> &'static str;
}

/// Deterministic rule-based classifier, used standalone or as the repair
/// path behind an external classifier.
///
/// Brand and competitor detection need business-specific name matching that
/// only an external classifier performs, so this never yields
/// `brand_terms` or `competitor_terms`.
#[derive(Debug, Default, Clone)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a single keyword by trigger-term rules
    pub fn categorize_one(keyword: &str) -> Category {
        let keyword_lower = keyword.to_lowercase();

        if INFO_TRIGGER_TERMS
            .iter()
            .any(|term| keyword_lower.contains(term))
        {
            Category::InformationalTerms
        } else if LOCATION_TRIGGER_TERMS
            .iter()
            .any(|term| keyword_lower.contains(term))
        {
            Category::LocationTerms
        } else {
            Category::CategoryTerms
        }
    }
}

#[async_trait]
impl KeywordClassifier for RuleBasedClassifier {
    async fn classify(&self, keywords: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();

        for keyword in keywords {
            let category = Self::categorize_one(keyword);
            result
                .entry(category.as_str().to_string())
                .or_default()
                .push(keyword.clone());
        }

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "rule_based"
    }
}
