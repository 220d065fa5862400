use crate::model::{KeywordRecord, Summary};

/// Context lines rendered into the report header
pub struct ReportContext {
    pub mode: String,
    pub min_search_volume: u64,
}

/// Narrative Markdown report: overall summary, per-ad-group breakdown,
/// and the top 20 keywords by score
pub fn markdown_report(
    summary: &Summary,
    keywords: &[KeywordRecord],
    context: &ReportContext,
) -> String {
    let mut report = format!(
        r#"# AdSmart - Keyword Research Report

## Summary
- **Total Keywords**: {total_keywords}
- **Total Ad Groups**: {total_ad_groups}
- **Configuration**: {mode} mode
- **Min Search Volume**: {min_volume}

## Ad Group Breakdown

"#,
        total_keywords = summary.total_keywords,
        total_ad_groups = summary.total_ad_groups,
        mode = context.mode,
        min_volume = context.min_search_volume,
    );

    for (category, details) in &summary.ad_group_details {
        report.push_str(&format!(
            r#"### {title}
- **Keywords**: {count}
- **Avg Search Volume**: {volume}
- **Avg Score**: {score}
- **Avg Starting CPC**: ₹{cpc}
- **Top Keywords**: {top}

"#,
            title = title_case(category.as_str()),
            count = details.keyword_count,
            volume = details.avg_search_volume,
            score = details.avg_score,
            cpc = details.avg_cpc_start,
            top = details.top_keywords.join(", "),
        ));
    }

    report.push_str(
        "## Top 20 Keywords Overall\n\n\
         | Keyword | Search Volume | Competition | Score | CPC Low | CPC High |\n\
         |---------|---------------|-------------|-------|---------|----------|\n",
    );

    let mut by_score: Vec<&KeywordRecord> = keywords.iter().collect();
    by_score.sort_by(|a, b| b.score.unwrap_or(0.0).total_cmp(&a.score.unwrap_or(0.0)));

    for kw in by_score.iter().take(20) {
        report.push_str(&format!(
            "| {} | {} | {} | {} | ₹{} | ₹{} |\n",
            kw.keyword,
            kw.avg_monthly_searches,
            kw.competition,
            kw.score.unwrap_or(0.0),
            kw.top_of_page_bid_low,
            kw.top_of_page_bid_high,
        ));
    }

    report
}

/// `brand_terms` -> `Brand Terms`
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdGroupDetail, Category, Competition};
    use std::collections::BTreeMap;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("brand_terms"), "Brand Terms");
        assert_eq!(title_case("informational_terms"), "Informational Terms");
    }

    #[test]
    fn test_report_structure() {
        let mut details = BTreeMap::new();
        details.insert(
            Category::CategoryTerms,
            AdGroupDetail {
                keyword_count: 2,
                avg_search_volume: 1500,
                avg_score: 0.7,
                avg_cpc_start: 9.5,
                top_keywords: vec!["widget repair".to_string(), "widget shop".to_string()],
            },
        );
        let summary = Summary {
            total_keywords: 2,
            total_ad_groups: 1,
            ad_group_details: details,
        };

        let mut kw = KeywordRecord::new("widget repair", 1200, Competition::Low, 10.0, 40.0);
        kw.score = Some(0.84);

        let report = markdown_report(
            &summary,
            &[kw],
            &ReportContext {
                mode: "full_content".to_string(),
                min_search_volume: 500,
            },
        );

        assert!(report.contains("# AdSmart - Keyword Research Report"));
        assert!(report.contains("**Total Keywords**: 2"));
        assert!(report.contains("### Category Terms"));
        assert!(report.contains("widget repair, widget shop"));
        assert!(report.contains("| widget repair | 1200 | LOW | 0.84 |"));
    }

    #[test]
    fn test_report_top_table_is_sorted_and_capped() {
        let summary = Summary {
            total_keywords: 25,
            total_ad_groups: 1,
            ad_group_details: BTreeMap::new(),
        };

        let keywords: Vec<KeywordRecord> = (0..25)
            .map(|i| {
                let mut kw =
                    KeywordRecord::new(format!("kw{i}"), 1000, Competition::Medium, 5.0, 20.0);
                kw.score = Some(i as f64 / 100.0);
                kw
            })
            .collect();

        let report = markdown_report(
            &summary,
            &keywords,
            &ReportContext {
                mode: "full_content".to_string(),
                min_search_volume: 500,
            },
        );

        let table_rows = report.lines().filter(|l| l.starts_with("| kw")).count();
        assert_eq!(table_rows, 20);

        // Highest score first
        let first_row = report.lines().find(|l| l.starts_with("| kw")).unwrap();
        assert!(first_row.starts_with("| kw24 |"));
    }
}
