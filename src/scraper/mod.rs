use anyhow::Result;
use rand::seq::SliceRandom;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ScrapingConfig;

/// Content sent to the LLM is capped to keep prompts bounded
const CONTENT_CHAR_LIMIT: usize = 5000;

const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/120.0.0.0 Safari/537.36",
];

/// Extracted content of a single page, used for seed keyword derivation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteContent {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: Headings,
    pub navigation: Vec<String>,
    pub content: String,
    pub content_length: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

impl SiteContent {
    /// Placeholder for a site that could not be fetched; the pipeline
    /// degrades rather than aborting on a failed scrape
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Fetches and extracts website content for keyword derivation
pub struct WebsiteScraper {
    client: reqwest::Client,
    config: ScrapingConfig,
}

impl WebsiteScraper {
    pub fn new(config: &ScrapingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch a page and extract title, meta description, headings,
    /// navigation texts, and cleaned body content
    pub async fn scrape_website(&self, url: &str) -> Result<SiteContent> {
        info!("Scraping website: {}", url);
        let html = self.fetch_with_retries(url).await?;
        let content = parse_site_content(url, &html)?;

        debug!(
            "Scraped {}: {} chars of content, {} navigation items",
            url,
            content.content_length,
            content.navigation.len()
        );
        Ok(content)
    }

    async fn fetch_with_retries(&self, url: &str) -> Result<String> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let mut last_error = None;
        for attempt in 1..=self.config.max_retries.max(1) {
            debug!("HTTP GET attempt {} for: {}", attempt, url);
            match self
                .client
                .get(url)
                .header("User-Agent", user_agent)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.text().await?);
                }
                Ok(response) => {
                    warn!("HTTP {} for {}", response.status(), url);
                    last_error = Some(anyhow::anyhow!(
                        "HTTP request failed: {} - {}",
                        url,
                        response.status()
                    ));
                }
                Err(e) => {
                    warn!("Request failed for {} (attempt {}): {}", url, attempt, e);
                    last_error = Some(e.into());
                }
            }

            if attempt < self.config.max_retries {
                tokio::time::sleep(Duration::from_secs(self.config.retry_delay_seconds)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("All retry attempts failed for {}", url)))
    }
}

/// Parse fetched HTML into structured content
pub fn parse_site_content(url: &str, html: &str) -> Result<SiteContent> {
    // Script and style bodies would pollute the text extraction
    let script_re = Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>")
        .map_err(|e| anyhow::anyhow!("Invalid cleanup pattern: {}", e))?;
    let cleaned_html = script_re.replace_all(html, " ");

    let document = Html::parse_document(&cleaned_html);

    let title = select_first_text(&document, "title")?.unwrap_or_default();

    let meta_selector = parse_selector("meta[name=\"description\"]")?;
    let meta_description = document
        .select(&meta_selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string();

    let headings = Headings {
        h1: select_all_texts(&document, "h1")?,
        h2: select_all_texts(&document, "h2")?,
        h3: select_all_texts(&document, "h3")?,
    };

    let nav_selector = parse_selector("nav a, menu a")?;
    let mut navigation = Vec::new();
    for link in document.select(&nav_selector) {
        let text = collapse_whitespace(&link.text().collect::<String>());
        if !text.is_empty() {
            navigation.push(text);
        }
    }

    let text = collapse_whitespace(&document.root_element().text().collect::<String>());
    let content_length = text.len();
    let content: String = text.chars().take(CONTENT_CHAR_LIMIT).collect();

    Ok(SiteContent {
        url: url.to_string(),
        title: collapse_whitespace(&title),
        meta_description,
        headings,
        navigation,
        content,
        content_length,
    })
}

/// Candidate product/service seed keywords from navigation and headings:
/// lowercased, trimmed, plausible length, first-seen order deduplicated
pub fn extract_products_services(content: &SiteContent) -> Vec<String> {
    let mut candidates: Vec<&String> = content.navigation.iter().collect();
    candidates.extend(&content.headings.h1);
    candidates.extend(&content.headings.h2);
    candidates.extend(&content.headings.h3);

    let mut seen = std::collections::HashSet::new();
    let mut cleaned = Vec::new();
    for item in candidates {
        let normalized = item.trim().to_lowercase();
        if normalized.len() > 2 && normalized.len() < 50 && seen.insert(normalized.clone()) {
            cleaned.push(normalized);
        }
    }

    cleaned
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow::anyhow!("Invalid CSS selector '{selector}': {e}"))
}

fn select_first_text(document: &Html, selector: &str) -> Result<Option<String>> {
    let selector = parse_selector(selector)?;
    Ok(document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>()))
}

fn select_all_texts(document: &Html, selector: &str) -> Result<Vec<String>> {
    let selector = parse_selector(selector)?;
    Ok(document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <html>
          <head>
            <title>  Acme  Plumbing  </title>
            <meta name="description" content="Trusted plumbing services">
            <style>body { color: red; }</style>
          </head>
          <body>
            <nav>
              <a href="/repair">Pipe Repair</a>
              <a href="/install"> Water Heater Installation </a>
              <a href="/empty">   </a>
            </nav>
            <h1>Plumbing Services</h1>
            <h2>Emergency Repair</h2>
            <h2>Emergency Repair</h2>
            <script>console.log("tracking");</script>
            <p>We fix leaks fast.</p>
          </body>
        </html>
    "#;

    #[test]
    fn test_parse_site_content() {
        let content = parse_site_content("https://acme.example", SAMPLE_HTML).unwrap();

        assert_eq!(content.title, "Acme Plumbing");
        assert_eq!(content.meta_description, "Trusted plumbing services");
        assert_eq!(content.headings.h1, vec!["Plumbing Services"]);
        assert_eq!(content.navigation, vec!["Pipe Repair", "Water Heater Installation"]);
        assert!(content.content.contains("We fix leaks fast."));
        assert!(!content.content.contains("tracking"));
        assert!(!content.content.contains("color: red"));
    }

    #[test]
    fn test_extract_products_services() {
        let content = parse_site_content("https://acme.example", SAMPLE_HTML).unwrap();
        let seeds = extract_products_services(&content);

        assert!(seeds.contains(&"pipe repair".to_string()));
        assert!(seeds.contains(&"water heater installation".to_string()));
        assert!(seeds.contains(&"plumbing services".to_string()));

        // Duplicated h2 collapses to a single seed
        let repairs = seeds.iter().filter(|s| s.as_str() == "emergency repair").count();
        assert_eq!(repairs, 1);
    }

    #[test]
    fn test_empty_site_content_placeholder() {
        let content = SiteContent::empty("https://down.example");
        assert_eq!(content.url, "https://down.example");
        assert!(content.title.is_empty());
        assert!(content.navigation.is_empty());
    }

    #[test]
    fn test_content_is_capped() {
        let body = "word ".repeat(3000);
        let html = format!("<html><body><p>{body}</p></body></html>");
        let content = parse_site_content("https://big.example", &html).unwrap();

        assert!(content.content.chars().count() <= CONTENT_CHAR_LIMIT);
        assert!(content.content_length > CONTENT_CHAR_LIMIT);
    }
}
