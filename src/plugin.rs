//! Deploy pipeline plugin
//!
//! The host calls [`JsonConfigPlugin::configure`] once, then
//! [`JsonConfigPlugin::did_build`] after the build step has written the page.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{BuildContext, PluginConfig, ResolvedConfig};
use crate::error::{ConfigError, Result};
use crate::extractors::extract_bytes;
use crate::sink::{find_input, read_input, FileSink};

pub const DEFAULT_PLUGIN_NAME: &str = "json-config";

/// Files produced by a hook, relative to the dist dir.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub dist_files: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct JsonConfigPlugin {
    name: String,
    config: PluginConfig,
    resolved: Option<ResolvedConfig>,
}

impl JsonConfigPlugin {
    pub fn new(name: impl Into<String>, config: PluginConfig) -> Self {
        Self {
            name: name.into(),
            config,
            resolved: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Settings fixed by the last successful `configure`.
    pub fn resolved(&self) -> Option<&ResolvedConfig> {
        self.resolved.as_ref()
    }

    /// Resolve deferred options and validate the blueprint.
    pub fn configure(&mut self, context: &BuildContext) -> Result<()> {
        let resolved = self.config.resolve(context)?;
        // Fail on bad selectors now rather than after the page is read
        resolved.blueprint.compile::<crate::document::HtmlDocument>()?;

        info!(
            plugin = %self.name,
            dist_dir = %resolved.dist_dir.display(),
            keys = resolved.blueprint.len(),
            "configured"
        );
        self.resolved = Some(resolved);
        Ok(())
    }

    /// Generate the output document from the built page.
    pub async fn did_build(&self, _context: &BuildContext) -> Result<BuildResult> {
        let result = self.run().await;
        if let Err(e) = &result {
            warn!(plugin = %self.name, error = %e, "failed to generate output document");
        }
        result
    }

    async fn run(&self) -> Result<BuildResult> {
        let resolved = self.resolved.as_ref().ok_or_else(|| ConfigError::NotConfigured {
            name: self.name.clone(),
        })?;

        let input = find_input(&resolved.dist_dir, &resolved.input_pattern).await?;
        info!(plugin = %self.name, input = %input.display(), "extracting");
        let markup = read_input(&input).await?;

        let document = extract_bytes(&markup, &resolved.blueprint, None)?;

        FileSink::new(&resolved.dist_dir)
            .write(&resolved.output_pattern, &document)
            .await?;

        Ok(BuildResult {
            dist_files: vec![resolved.output_pattern.clone()],
        })
    }
}

impl Default for JsonConfigPlugin {
    fn default() -> Self {
        Self::new(DEFAULT_PLUGIN_NAME, PluginConfig::default())
    }
}
