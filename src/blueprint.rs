//! Extraction blueprints
//!
//! A blueprint maps an output key to the selector that feeds it, the
//! attributes to keep from every match, and whether to capture text content.
//! Key order is significant: it is the order of keys in the output document.

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::document::DocumentQuery;
use crate::error::ConfigError;

/// One blueprint entry, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintEntry {
    /// CSS selector. Optional here so a missing one surfaces as a
    /// [`ConfigError`] instead of a deserialization failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Attributes to project, in output order
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub include_content: bool,
}

impl BlueprintEntry {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::default()
        }
    }

    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }
}

/// Ordered mapping of output key to [`BlueprintEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Blueprint {
    entries: Vec<(String, BlueprintEntry)>,
}

impl Blueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in blueprint: base, meta, link and script tags.
    pub fn builtin() -> Self {
        Self::new()
            .with_entry("base", BlueprintEntry::new("head base").attributes(["href"]))
            .with_entry(
                "meta",
                BlueprintEntry::new("head meta[name]").attributes(["name", "content"]),
            )
            .with_entry(
                "link",
                BlueprintEntry::new(r#"head link[rel="stylesheet"]"#)
                    .attributes(["rel", "href", "integrity"]),
            )
            .with_entry(
                "script",
                BlueprintEntry::new("script").attributes(["src", "integrity"]),
            )
    }

    /// Add an entry. A key that already exists keeps its position and takes
    /// the new entry.
    pub fn with_entry(mut self, key: impl Into<String>, entry: BlueprintEntry) -> Self {
        self.insert(key.into(), entry);
        self
    }

    fn insert(&mut self, key: String, entry: BlueprintEntry) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Blueprint)
    }

    pub fn get(&self, key: &str) -> Option<&BlueprintEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BlueprintEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every entry: selector present and non-blank, no repeated
    /// attribute names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, entry) in &self.entries {
            match entry.selector.as_deref() {
                Some(s) if !s.trim().is_empty() => {}
                _ => return Err(ConfigError::MissingSelector { key: key.clone() }),
            }

            let mut seen = HashSet::new();
            for attribute in &entry.attributes {
                if !seen.insert(attribute.as_str()) {
                    return Err(ConfigError::DuplicateAttribute {
                        key: key.clone(),
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate and compile every selector for backend `D`.
    pub fn compile<D: DocumentQuery>(&self) -> Result<CompiledBlueprint<D::Query>, ConfigError> {
        self.validate()?;

        let mut entries = Vec::with_capacity(self.entries.len());
        for (key, entry) in &self.entries {
            // validate() guarantees a selector
            let selector = entry.selector.as_deref().unwrap_or_default();
            let query = D::compile(selector).map_err(|reason| ConfigError::InvalidSelector {
                key: key.clone(),
                selector: selector.to_string(),
                reason,
            })?;
            entries.push(CompiledEntry {
                key: key.clone(),
                query,
                attributes: entry.attributes.clone(),
                include_content: entry.include_content,
            });
        }

        Ok(CompiledBlueprint { entries })
    }
}

/// Pick the effective blueprint.
///
/// An absent or empty override yields `default`. Any other override replaces
/// the default wholesale; keys are never merged.
pub fn resolve(default: &Blueprint, over: Option<&Blueprint>) -> Result<Blueprint, ConfigError> {
    let chosen = match over {
        Some(bp) if !bp.is_empty() => bp,
        _ => default,
    };
    chosen.validate()?;
    Ok(chosen.clone())
}

/// Blueprint entry with its selector compiled.
#[derive(Debug, Clone)]
pub struct CompiledEntry<Q> {
    pub key: String,
    pub query: Q,
    pub attributes: Vec<String>,
    pub include_content: bool,
}

#[derive(Debug, Clone)]
pub struct CompiledBlueprint<Q> {
    entries: Vec<CompiledEntry<Q>>,
}

impl<Q> CompiledBlueprint<Q> {
    pub fn entries(&self) -> &[CompiledEntry<Q>] {
        &self.entries
    }
}

impl Serialize for Blueprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Blueprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BlueprintVisitor;

        impl<'de> Visitor<'de> for BlueprintVisitor {
            type Value = Blueprint;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of blueprint keys to entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Blueprint, A::Error> {
                let mut blueprint = Blueprint::new();
                while let Some((key, entry)) = access.next_entry::<String, BlueprintEntry>()? {
                    blueprint.insert(key, entry);
                }
                Ok(blueprint)
            }
        }

        deserializer.deserialize_map(BlueprintVisitor)
    }
}
