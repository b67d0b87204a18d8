//! Plugin configuration
//!
//! [`PluginConfig`] is what a host hands the plugin. Directory options may be
//! deferred until the build context is known; they are resolved exactly once,
//! in `configure`, into a [`ResolvedConfig`] of plain paths.
//!
//! [`FileConfig`] is the on-disk form, layered with figment:
//! 1. Environment variables (`JSON_CONFIG_*`)
//! 2. An optional TOML file (snake_case or camelCase keys)
//! 3. Built-in defaults

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Dict;
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::blueprint::{resolve, Blueprint};
use crate::error::{ConfigError, Error, Result};

pub const DEFAULT_INPUT_PATTERN: &str = "index.html";
pub const DEFAULT_OUTPUT_PATTERN: &str = "index.json";
pub const ENV_PREFIX: &str = "JSON_CONFIG_";

const GLOB_CHARS: &[char] = &['*', '?', '['];

/// What the host build knows when the plugin runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Directory the build step wrote its output to
    pub dist_dir: PathBuf,
    pub project_root: PathBuf,
}

impl BuildContext {
    pub fn new(dist_dir: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            dist_dir: dist_dir.into(),
            project_root: project_root.into(),
        }
    }
}

/// A literal value or a function of the build context.
pub enum Deferred<T> {
    Literal(T),
    Resolver(Arc<dyn Fn(&BuildContext) -> T + Send + Sync>),
}

impl<T: Clone> Deferred<T> {
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&BuildContext) -> T + Send + Sync + 'static,
    {
        Deferred::Resolver(Arc::new(f))
    }

    pub fn resolve(&self, context: &BuildContext) -> T {
        match self {
            Deferred::Literal(value) => value.clone(),
            Deferred::Resolver(f) => f(context),
        }
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        match self {
            Deferred::Literal(value) => Deferred::Literal(value.clone()),
            Deferred::Resolver(f) => Deferred::Resolver(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Deferred::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<PathBuf> for Deferred<PathBuf> {
    fn from(path: PathBuf) -> Self {
        Deferred::Literal(path)
    }
}

impl From<&str> for Deferred<PathBuf> {
    fn from(path: &str) -> Self {
        Deferred::Literal(PathBuf::from(path))
    }
}

/// Options recognized by the plugin.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub file_input_pattern: String,
    pub file_output_pattern: String,
    /// Defaults to the build context's dist dir
    pub dist_dir: Option<Deferred<PathBuf>>,
    /// Defaults to the build context's project root
    pub project_root: Option<Deferred<PathBuf>>,
    /// Replaces the built-in blueprint entirely when set
    pub json_blueprint: Option<Blueprint>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            file_input_pattern: DEFAULT_INPUT_PATTERN.to_string(),
            file_output_pattern: DEFAULT_OUTPUT_PATTERN.to_string(),
            dist_dir: None,
            project_root: None,
            json_blueprint: None,
        }
    }
}

impl PluginConfig {
    pub fn with_dist_dir(mut self, dist_dir: impl Into<Deferred<PathBuf>>) -> Self {
        self.dist_dir = Some(dist_dir.into());
        self
    }

    pub fn with_project_root(mut self, project_root: impl Into<Deferred<PathBuf>>) -> Self {
        self.project_root = Some(project_root.into());
        self
    }

    pub fn with_blueprint(mut self, blueprint: Blueprint) -> Self {
        self.json_blueprint = Some(blueprint);
        self
    }

    pub fn with_patterns(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.file_input_pattern = input.into();
        self.file_output_pattern = output.into();
        self
    }

    /// Resolve deferred values and validate everything that can be checked
    /// without touching the filesystem.
    pub fn resolve(&self, context: &BuildContext) -> std::result::Result<ResolvedConfig, ConfigError> {
        check_input_pattern(&self.file_input_pattern)?;
        check_output_pattern(&self.file_output_pattern)?;

        let blueprint = resolve(&Blueprint::builtin(), self.json_blueprint.as_ref())?;

        let project_root = match &self.project_root {
            Some(root) => root.resolve(context),
            None => context.project_root.clone(),
        };
        let dist_dir = match &self.dist_dir {
            Some(dir) => dir.resolve(context),
            None => context.dist_dir.clone(),
        };

        Ok(ResolvedConfig {
            input_pattern: self.file_input_pattern.clone(),
            output_pattern: self.file_output_pattern.clone(),
            dist_dir: resolve_dist_dir(&dist_dir, &project_root),
            blueprint,
        })
    }
}

/// Configuration after `configure`: plain paths and a validated blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub input_pattern: String,
    pub output_pattern: String,
    /// Absolute, or relative to the process cwd if the project root was
    pub dist_dir: PathBuf,
    pub blueprint: Blueprint,
}

/// Absolute dist dirs are used as-is; relative ones hang off the project root.
pub fn resolve_dist_dir(dist_dir: &Path, project_root: &Path) -> PathBuf {
    if dist_dir.is_absolute() {
        dist_dir.to_path_buf()
    } else {
        project_root.join(dist_dir)
    }
}

fn check_input_pattern(pattern: &str) -> std::result::Result<(), ConfigError> {
    if pattern.trim().is_empty() {
        return Err(ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "pattern is empty".to_string(),
        });
    }
    glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn check_output_pattern(pattern: &str) -> std::result::Result<(), ConfigError> {
    let reason = if pattern.trim().is_empty() {
        "pattern is empty"
    } else if pattern.contains(GLOB_CHARS) {
        "output names cannot contain wildcards"
    } else if Path::new(pattern).is_absolute() {
        "output names must be relative to the dist dir"
    } else if Path::new(pattern)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        "output names cannot leave the dist dir"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    })
}

pub(crate) fn is_glob(pattern: &str) -> bool {
    pattern.contains(GLOB_CHARS)
}

/// `fileInputPattern` -> `file_input_pattern`; snake_case passes through.
fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn default_input_pattern() -> String {
    DEFAULT_INPUT_PATTERN.to_string()
}

fn default_output_pattern() -> String {
    DEFAULT_OUTPUT_PATTERN.to_string()
}

/// Configuration as read from TOML and the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default = "default_input_pattern")]
    pub file_input_pattern: String,

    #[serde(default = "default_output_pattern")]
    pub file_output_pattern: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,

    /// JSON file holding a blueprint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_path: Option<PathBuf>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            file_input_pattern: default_input_pattern(),
            file_output_pattern: default_output_pattern(),
            dist_dir: None,
            project_root: None,
            blueprint_path: None,
        }
    }
}

impl FileConfig {
    /// Provider chain: `path` if it exists, then env. File keys are folded
    /// to snake_case first so env vars override them whichever style the
    /// file uses. Defaults come from the serde attributes.
    pub fn figment(path: Option<&Path>) -> std::result::Result<Figment, ConfigError> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if path.exists() {
                let file: Dict = Figment::from(Toml::file(path)).extract()?;
                let file: Dict = file
                    .into_iter()
                    .map(|(key, value)| (snake_case(&key), value))
                    .collect();
                figment = figment.merge(Serialized::defaults(file));
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn load(path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        Ok(Self::figment(path)?.extract()?)
    }

    /// Convert to a [`PluginConfig`], reading the blueprint file if one is set.
    pub fn into_plugin_config(self) -> Result<PluginConfig> {
        let json_blueprint = match &self.blueprint_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                Some(Blueprint::from_json_str(&json)?)
            }
            None => None,
        };

        Ok(PluginConfig {
            file_input_pattern: self.file_input_pattern,
            file_output_pattern: self.file_output_pattern,
            dist_dir: self.dist_dir.map(Deferred::Literal),
            project_root: self.project_root.map(Deferred::Literal),
            json_blueprint,
        })
    }
}
