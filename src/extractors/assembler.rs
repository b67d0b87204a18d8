//! Output assembly
//!
//! Groups projected records under their blueprint key. Keys appear in
//! blueprint order and are always present, even with no matches.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use super::projector::{project, Record};
use super::selector::select;
use crate::blueprint::CompiledBlueprint;
use crate::document::DocumentQuery;

/// Blueprint key to ordered list of records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputDocument {
    groups: Vec<(String, Vec<Record>)>,
}

impl OutputDocument {
    pub fn get(&self, key: &str) -> Option<&[Record]> {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, records)| records.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.groups.iter().map(|(k, r)| (k.as_str(), r.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Run every blueprint entry against `document`.
pub fn assemble<D: DocumentQuery>(
    blueprint: &CompiledBlueprint<D::Query>,
    document: &D,
) -> OutputDocument {
    let mut groups = Vec::with_capacity(blueprint.entries().len());

    for entry in blueprint.entries() {
        let records: Vec<Record> = select(document, &entry.query)
            .map(|m| project(&m.element, &entry.attributes, entry.include_content))
            .collect();

        debug!(key = %entry.key, matches = records.len(), "assembled blueprint key");
        groups.push((entry.key.clone(), records));
    }

    OutputDocument { groups }
}

impl Serialize for OutputDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (key, records) in &self.groups {
            map.serialize_entry(key, records)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OutputDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OutputVisitor;

        impl<'de> Visitor<'de> for OutputVisitor {
            type Value = OutputDocument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of keys to record lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OutputDocument, A::Error> {
                let mut groups = Vec::new();
                while let Some((key, records)) = access.next_entry::<String, Vec<Record>>()? {
                    groups.push((key, records));
                }
                Ok(OutputDocument { groups })
            }
        }

        deserializer.deserialize_map(OutputVisitor)
    }
}
