//! Workspace configuration
//!
//! Tunables for the tree engine and the workspace facade. Every field has a
//! serde default so a partial (or missing) `config.json` still loads.

use crate::db::REBALANCE_GAP_THRESHOLD;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for the edge zones; above one half they would overlap
const MAX_DROP_EDGE_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Fraction of a row's height at the top and bottom that means before/after
    pub drop_edge_fraction: f64,

    /// Gap between neighbouring positions below which a warning is logged
    pub rebalance_gap_threshold: f64,

    /// Trimmed queries shorter than this return no results
    pub search_min_query_len: usize,

    /// Maximum number of search results
    pub search_result_limit: usize,

    /// Prefix marking unsaved draft ids in tabs and routes
    pub draft_id_prefix: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            drop_edge_fraction: 0.25,
            rebalance_gap_threshold: REBALANCE_GAP_THRESHOLD,
            search_min_query_len: 2,
            search_result_limit: 8,
            draft_id_prefix: "draft-".to_string(),
        }
    }
}

impl WorkspaceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.drop_edge_fraction > 0.0 && self.drop_edge_fraction <= MAX_DROP_EDGE_FRACTION) {
            return Err(format!(
                "drop_edge_fraction must be in (0, {}], got {}",
                MAX_DROP_EDGE_FRACTION, self.drop_edge_fraction
            ));
        }

        if !(self.rebalance_gap_threshold.is_finite() && self.rebalance_gap_threshold > 0.0) {
            return Err("rebalance_gap_threshold must be a positive number".to_string());
        }

        if self.search_result_limit == 0 {
            return Err("search_result_limit must be greater than 0".to_string());
        }

        if self.draft_id_prefix.is_empty() {
            return Err("draft_id_prefix cannot be empty".to_string());
        }

        Ok(())
    }

    /// Load and validate a JSON config file
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        let config: WorkspaceConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults
    pub async fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path).await
    }
}
