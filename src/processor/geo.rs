use tracing::info;

use crate::model::KeywordRecord;

/// Terms signalling that a keyword carries local service intent
const LOCATION_RELEVANT_TERMS: [&str; 17] = [
    "service",
    "repair",
    "store",
    "shop",
    "clinic",
    "doctor",
    "dentist",
    "restaurant",
    "delivery",
    "installation",
    "contractor",
    "lawyer",
    "real estate",
    "plumber",
    "electrician",
    "near me",
    "local",
];

/// Volume discount applied to synthesized location variants
const VARIANT_VOLUME_FACTOR: f64 = 0.1;

/// Synthesizes per-city keyword variants for location-relevant keywords.
///
/// Locations are configured as `"City, Region"` strings; only the city
/// token before the first comma is used.
pub struct GeoExpander {
    locations: Vec<String>,
}

impl GeoExpander {
    pub fn new(locations: Vec<String>) -> Self {
        Self { locations }
    }

    /// Append location variants to the input sequence. Originals are kept
    /// unchanged and in order; each relevant, non-local keyword yields
    /// exactly three variants per configured location.
    pub fn expand(&self, keywords: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
        if self.locations.is_empty() {
            return keywords;
        }

        let cities: Vec<&str> = self.locations.iter().map(|loc| city_token(loc)).collect();
        let mut variants = Vec::new();

        for record in &keywords {
            let keyword_lower = record.keyword.to_lowercase();

            // Already local queries are never re-localized
            if cities
                .iter()
                .any(|city| keyword_lower.contains(&city.to_lowercase()))
            {
                continue;
            }

            if !is_location_relevant(&keyword_lower) {
                continue;
            }

            for city in &cities {
                for variant_text in [
                    format!("{} {}", record.keyword, city),
                    format!("{} in {}", record.keyword, city),
                    format!("{} {}", city, record.keyword),
                ] {
                    let mut variant = record.clone();
                    variant.keyword = variant_text;
                    variant.avg_monthly_searches =
                        (record.avg_monthly_searches as f64 * VARIANT_VOLUME_FACTOR) as u64;
                    variant.is_location_variant = true;
                    variants.push(variant);
                }
            }
        }

        info!(
            "Geo expansion added {} location variants across {} locations",
            variants.len(),
            self.locations.len()
        );

        let mut expanded = keywords;
        expanded.extend(variants);
        expanded
    }
}

/// City part of a `"City, Region"` location string
fn city_token(location: &str) -> &str {
    location.split(',').next().unwrap_or(location).trim()
}

fn is_location_relevant(keyword_lower: &str) -> bool {
    LOCATION_RELEVANT_TERMS
        .iter()
        .any(|term| keyword_lower.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Competition;

    fn record(keyword: &str, volume: u64) -> KeywordRecord {
        KeywordRecord::new(keyword, volume, Competition::Low, 5.0, 20.0)
    }

    fn expander(locations: &[&str]) -> GeoExpander {
        GeoExpander::new(locations.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_relevant_keyword_gets_three_variants_per_location() {
        let expanded = expander(&["Pune, Maharashtra", "Nashik, Maharashtra"])
            .expand(vec![record("ac repair", 1000)]);

        // 1 original + 3 variants x 2 locations
        assert_eq!(expanded.len(), 7);
        assert!(!expanded[0].is_location_variant);
        assert!(expanded[1..].iter().all(|kw| kw.is_location_variant));

        let texts: Vec<&str> = expanded[1..].iter().map(|kw| kw.keyword.as_str()).collect();
        assert!(texts.contains(&"ac repair Pune"));
        assert!(texts.contains(&"ac repair in Pune"));
        assert!(texts.contains(&"Pune ac repair"));
        assert!(texts.contains(&"Nashik ac repair"));
    }

    #[test]
    fn test_variant_volume_is_discounted() {
        let expanded = expander(&["Pune, Maharashtra"]).expand(vec![record("ac repair", 1999)]);

        for variant in &expanded[1..] {
            // floor(1999 * 0.1)
            assert_eq!(variant.avg_monthly_searches, 199);
        }
    }

    #[test]
    fn test_non_relevant_keyword_is_not_expanded() {
        let expanded = expander(&["Pune, Maharashtra"]).expand(vec![record("blue widgets", 1000)]);
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn test_already_local_keyword_is_skipped() {
        let expanded =
            expander(&["Pune, Maharashtra"]).expand(vec![record("plumber in pune", 1000)]);
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn test_locality_check_covers_all_configured_cities() {
        // Relevant keyword mentioning the second city must not be expanded
        // for the first one either
        let expanded = expander(&["Pune, Maharashtra", "Nashik, Maharashtra"])
            .expand(vec![record("Nashik plumber", 1000)]);
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn test_empty_location_list_expands_nothing() {
        let expanded = expander(&[]).expand(vec![record("ac repair", 1000)]);
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn test_expansion_cardinality() {
        let relevant: Vec<KeywordRecord> = (0..4)
            .map(|i| record(&format!("widget repair {i}"), 1000))
            .collect();
        let locations = ["Pune, Maharashtra", "Nashik, Maharashtra", "Mumbai, Maharashtra"];

        let expanded = expander(&locations).expand(relevant);
        // 4 originals + 3 variants x 4 keywords x 3 locations
        assert_eq!(expanded.len(), 4 + 3 * 4 * 3);
    }
}
