//! Attribute projection
//!
//! Turns one matched element into a [`Record`]: the requested attributes that
//! are present, in blueprint order, then the trimmed text content when asked
//! for and non-empty. Missing attributes are left out, never nulled.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::document::ElementView;

/// Field name used for captured text content.
pub const CONTENT_FIELD: &str = "content";

/// Ordered string-to-string mapping for one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    fn remove(&mut self, name: &str) {
        self.fields.retain(|(k, _)| k != name);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.push(k, v);
        }
        record
    }
}

/// Build the record for `element`.
pub fn project<E: ElementView>(element: &E, attributes: &[String], include_content: bool) -> Record {
    let mut record = Record::new();

    for name in attributes {
        if let Some(value) = element.attr(name) {
            record.push(name.as_str(), value);
        }
    }

    if include_content {
        let text = element.text_content();
        let text = text.trim();
        if !text.is_empty() {
            // A `content` attribute gives way to the captured text, which
            // always goes last
            record.remove(CONTENT_FIELD);
            record.push(CONTENT_FIELD, text);
        }
    }

    record
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of string fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    record.push(k, v);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentQuery, HtmlDocument};

    fn first(html: &str, selector: &str, attributes: &[&str], include_content: bool) -> Record {
        let document = HtmlDocument::parse(html).unwrap();
        let query = HtmlDocument::compile(selector).unwrap();
        let element = document.select(&query).next().unwrap();
        let attributes: Vec<String> = attributes.iter().map(|s| s.to_string()).collect();
        project(&element, &attributes, include_content)
    }

    #[test]
    fn test_attributes_follow_blueprint_order() {
        let record = first(
            r#"<link integrity="sha256-abc" href="app.css" rel="stylesheet">"#,
            "link",
            &["rel", "href", "integrity"],
            false,
        );

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["rel", "href", "integrity"]);
        assert_eq!(record.get("integrity"), Some("sha256-abc"));
    }

    #[test]
    fn test_missing_attributes_are_omitted() {
        let record = first(
            r#"<script src="assets/app.js"></script>"#,
            "script",
            &["src", "integrity"],
            false,
        );

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("integrity"), None);
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"src":"assets/app.js"}"#);
    }

    #[test]
    fn test_empty_attribute_value_is_kept() {
        let record = first(r#"<script src="" async></script>"#, "script", &["src", "async"], false);
        assert_eq!(record.get("src"), Some(""));
        assert_eq!(record.get("async"), Some(""));
    }

    #[test]
    fn test_no_attributes_yields_empty_record() {
        let record = first("<script>var a = 1;</script>", "script", &["src", "integrity"], false);
        assert!(record.is_empty());
        assert_eq!(serde_json::to_string(&record).unwrap(), "{}");
    }

    #[test]
    fn test_content_is_trimmed() {
        let record = first(
            "<script>\n    var a = 'foo';\n  </script>",
            "script",
            &[],
            true,
        );
        assert_eq!(record.get(CONTENT_FIELD), Some("var a = 'foo';"));
    }

    #[test]
    fn test_whitespace_content_is_dropped() {
        let record = first("<script src=\"a.js\">  \n\t </script>", "script", &["src"], true);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["src"]);
    }

    #[test]
    fn test_content_comes_last() {
        let record = first(
            r#"<script type="module" src="m.js"> boot(); </script>"#,
            "script",
            &["type", "src"],
            true,
        );
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["type", "src", "content"]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"type":"module","src":"m.js","content":"boot();"}"#
        );
    }

    #[test]
    fn test_content_replaces_content_attribute() {
        let record = first(
            r#"<div content="attr" id="x">text</div>"#,
            "div",
            &["content", "id"],
            true,
        );
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["id", "content"]);
        assert_eq!(record.get("content"), Some("text"));
    }

    #[test]
    fn test_content_attribute_kept_without_capture() {
        let record = first(
            r#"<meta name="a" content="b">"#,
            "meta",
            &["content", "name"],
            false,
        );
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["content", "name"]);
    }

    #[test]
    fn test_push_appends() {
        let mut record = Record::new();
        record.push("src", "a.js");
        record.push("integrity", "sha256-x");
        assert_eq!(record.iter().collect::<Vec<_>>(), vec![("src", "a.js"), ("integrity", "sha256-x")]);
    }

    #[test]
    fn test_record_roundtrip_keeps_order() {
        let record: Record = serde_json::from_str(r#"{"z":"1","a":"2"}"#).unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }
}
