use anyhow::Result;
use csv::WriterBuilder;

use crate::model::{Category, KeywordRecord};

/// Render the full scored keyword list, all fields included
pub fn master_csv(keywords: &[KeywordRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(vec![]);

    writer.write_record([
        "keyword",
        "avg_monthly_searches",
        "competition",
        "competition_score",
        "top_of_page_bid_low",
        "top_of_page_bid_high",
        "is_location_variant",
        "score",
        "category",
        "match_types",
        "suggested_cpc_start",
        "suggested_cpc_ceiling",
    ])?;

    for kw in keywords {
        writer.write_record([
            kw.keyword.clone(),
            kw.avg_monthly_searches.to_string(),
            kw.competition.to_string(),
            kw.competition_score.to_string(),
            kw.top_of_page_bid_low.to_string(),
            kw.top_of_page_bid_high.to_string(),
            kw.is_location_variant.to_string(),
            optional_number(kw.score),
            kw.category.map(|c| c.to_string()).unwrap_or_default(),
            join_match_types(kw),
            optional_number(kw.suggested_cpc_start),
            optional_number(kw.suggested_cpc_ceiling),
        ])?;
    }

    finish(writer)
}

/// Render one ad group as a campaign-ready table
pub fn ad_group_csv(_category: Category, keywords: &[KeywordRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(vec![]);

    writer.write_record([
        "keyword",
        "avg_monthly_searches",
        "competition",
        "score",
        "suggested_cpc_start",
        "suggested_cpc_ceiling",
        "match_types",
    ])?;

    for kw in keywords {
        writer.write_record([
            kw.keyword.clone(),
            kw.avg_monthly_searches.to_string(),
            kw.competition.to_string(),
            optional_number(kw.score),
            optional_number(kw.suggested_cpc_start),
            optional_number(kw.suggested_cpc_ceiling),
            join_match_types(kw),
        ])?;
    }

    finish(writer)
}

fn join_match_types(kw: &KeywordRecord) -> String {
    kw.match_types
        .iter()
        .map(|mt| mt.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}
