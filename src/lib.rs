//! AdSmart - AI-assisted keyword research for search campaigns
//!
//! This library provides the core functionality for AdSmart, including:
//! - Website content scraping for seed keyword derivation
//! - SERP-based keyword research and metric estimation
//! - Deduplication, volume filtering, geo expansion and composite scoring
//! - LLM-assisted ad group categorization with a rule-based fallback
//! - Campaign-ready CSV, JSON and Markdown exports

pub mod adgroups;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod llm;
pub mod logging;
pub mod model;
pub mod processor;
pub mod research;
pub mod scraper;

// Re-export main types for convenience
pub use crate::config::{ApiCredentials, AppConfig};
pub use crate::core::{AdSmartPipeline, PipelineOutcome};
pub use crate::error::AdSmartError;
pub use crate::model::KeywordRecord;
