use crate::scraper::SiteContent;

/// Prompt for generating seed keywords from scraped brand and competitor
/// content. The response must be a bare JSON array of keyword strings.
pub fn seed_keywords_prompt(brand: &SiteContent, competitor: &SiteContent) -> String {
    format!(
        r#"Based on the following website content, generate 15-20 relevant seed keywords for search advertising campaigns.

BRAND WEBSITE:
Title: {brand_title}
Meta Description: {brand_meta}
Main Headings: {brand_headings:?}
Navigation: {brand_nav:?}
Content Sample: {brand_content}

COMPETITOR WEBSITE:
Title: {competitor_title}
Navigation: {competitor_nav:?}

Generate seed keywords that are:
1. Relevant to the brand's products/services
2. Include both broad and specific terms
3. Include location-based variations if applicable
4. Include competitor comparison terms
5. Include long-tail informational queries

Return ONLY a JSON array of keywords, no other text:
["keyword1", "keyword2", ...]"#,
        brand_title = brand.title,
        brand_meta = brand.meta_description,
        brand_headings = brand.headings.h1,
        brand_nav = brand.navigation,
        brand_content = truncate(&brand.content, 1000),
        competitor_title = competitor.title,
        competitor_nav = competitor.navigation,
    )
}

/// Prompt for categorizing keywords into ad group types. The response must
/// be a JSON object mapping category names to keyword arrays.
pub fn categorize_prompt(keywords: &[String]) -> String {
    format!(
        r#"Categorize the following keywords into these ad group types:
- brand_terms: Keywords containing the brand name
- category_terms: Product/service category keywords
- competitor_terms: Keywords mentioning competitors
- location_terms: Keywords with location intent
- informational_terms: How-to, what is, best, reviews, etc.

Keywords to categorize:
{keywords:?}

Return a JSON object with categories as keys and arrays of keywords as values:
{{
    "brand_terms": ["keyword1", "keyword2"],
    "category_terms": ["keyword3", "keyword4"],
    ...
}}"#,
    )
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_prompt_includes_site_content() {
        let mut brand = SiteContent::empty("https://acme.example");
        brand.title = "Acme Plumbing".to_string();
        brand.navigation = vec!["Pipe Repair".to_string()];
        let competitor = SiteContent::empty("https://rival.example");

        let prompt = seed_keywords_prompt(&brand, &competitor);
        assert!(prompt.contains("Acme Plumbing"));
        assert!(prompt.contains("Pipe Repair"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_categorize_prompt_lists_keywords_and_categories() {
        let keywords = vec!["plumber near me".to_string(), "acme reviews".to_string()];
        let prompt = categorize_prompt(&keywords);

        assert!(prompt.contains("plumber near me"));
        assert!(prompt.contains("brand_terms"));
        assert!(prompt.contains("informational_terms"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 4), "héll");
        assert_eq!(truncate("short", 100), "short");
    }
}
