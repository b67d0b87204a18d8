//! HTML to JSON asset manifest for build pipelines
//!
//! Reads the page a build step produced and writes a JSON summary of the
//! elements a blueprint asks for:
//! - base, meta, stylesheet link and script tags by default
//! - any CSS selector with a chosen attribute list and optional text content
//!
//! The extraction core is synchronous and pure; file I/O lives in [`sink`]
//! and [`plugin`].

pub mod blueprint;
pub mod config;
pub mod document;
pub mod error;
pub mod extractors;
pub mod ffi;
pub mod plugin;
pub mod sink;

pub use blueprint::{resolve, Blueprint, BlueprintEntry};
pub use config::{BuildContext, Deferred, FileConfig, PluginConfig, ResolvedConfig};
pub use document::{DocumentQuery, ElementView, HtmlDocument};
pub use error::{ConfigError, Error, ParseError, Result};
pub use extractors::*;
pub use ffi::*;
pub use plugin::{BuildResult, JsonConfigPlugin, DEFAULT_PLUGIN_NAME};
