use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

pub mod csv_exporter;
pub mod json_exporter;
pub mod report;

use crate::config::ExportConfig;
use crate::model::{AdGroupCollection, KeywordRecord, Summary};

pub use report::ReportContext;

/// Renders and persists the run's export artifacts. Files are generated
/// in memory first so callers can serve them without touching disk.
pub struct ExportManager {
    config: ExportConfig,
}

impl ExportManager {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Generate every export artifact as an in-memory name -> content map:
    /// the master keyword CSV, ad-group and summary JSON, one CSV per
    /// non-empty ad group, and the Markdown run report.
    pub fn generate_files(
        &self,
        ad_groups: &AdGroupCollection,
        summary: &Summary,
        scored_keywords: &[KeywordRecord],
        context: &ReportContext,
    ) -> Result<BTreeMap<String, String>> {
        let mut files = BTreeMap::new();

        files.insert(
            "keywords_master.csv".to_string(),
            csv_exporter::master_csv(scored_keywords)?,
        );
        files.insert(
            "ad_groups_search.json".to_string(),
            json_exporter::ad_groups_json(ad_groups)?,
        );
        files.insert(
            "ad_groups_summary.json".to_string(),
            json_exporter::summary_json(summary)?,
        );

        for (category, keywords) in ad_groups.non_empty_groups() {
            files.insert(
                format!("ad_group_{}.csv", category.as_str()),
                csv_exporter::ad_group_csv(*category, keywords)?,
            );
        }

        files.insert(
            "run_report.md".to_string(),
            report::markdown_report(summary, scored_keywords, context),
        );

        info!("Generated {} export files", files.len());
        Ok(files)
    }

    /// Write the generated files to the configured output directory,
    /// creating it on demand
    pub async fn write_all(&self, files: &BTreeMap<String, String>) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&self.config.output_directory).await?;

        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = self.config.output_directory.join(name);
            tokio::fs::write(&path, content).await?;
            info!("Wrote {} ({} bytes)", path.display(), content.len());
            written.push(path);
        }

        Ok(written)
    }
}
