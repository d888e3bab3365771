//! Renderer Configuration

use serde::{Deserialize, Serialize};

/// Renderer configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Maximum nesting depth of a description below the root
    pub max_depth: usize,

    /// Log a `debug!` summary after every sync
    pub log_stats: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            log_stats: true,
        }
    }
}

impl RendererConfig {
    /// Set the depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
