use anyhow::Result;

use crate::model::{AdGroupCollection, Summary};

/// Ad groups as nested JSON, category name -> enriched keyword records
pub fn ad_groups_json(ad_groups: &AdGroupCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ad_groups.groups)?)
}

/// Summary statistics as nested JSON
pub fn summary_json(summary: &Summary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
