//! Payload templates mixing literals and runtime path references.
//!
//! The target format marks a path-valued field by appending `.$` to its key
//! and resolving the value against the running data context at execution
//! time. Templates keep their fields in insertion order so that compilation
//! stays deterministic.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A single field value inside a [`PayloadTemplate`].
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    /// A literal JSON value, emitted verbatim.
    Literal(serde_json::Value),
    /// A runtime data-context path, emitted under a `.$`-suffixed key.
    Path(String),
    /// A nested template.
    Template(PayloadTemplate),
}

/// Ordered mapping of named fields, some literal and some resolved from the
/// runtime data context.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PayloadTemplate {
    fields: IndexMap<String, PayloadValue>,
}

impl PayloadTemplate {
    /// Creates an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a literal field.
    pub fn literal(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields
            .insert(key.into(), PayloadValue::Literal(value.into()));
        self
    }

    /// Adds a field resolved from a data-context path at execution time.
    pub fn path(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.fields.insert(key.into(), PayloadValue::Path(path.into()));
        self
    }

    /// Adds a nested template field.
    pub fn nested(mut self, key: impl Into<String>, template: PayloadTemplate) -> Self {
        self.fields
            .insert(key.into(), PayloadValue::Template(template));
        self
    }

    /// Returns whether the template has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns an iterator over the fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl Serialize for PayloadTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            match value {
                PayloadValue::Literal(literal) => map.serialize_entry(key, literal)?,
                PayloadValue::Path(path) => map.serialize_entry(&format!("{key}.$"), path)?,
                PayloadValue::Template(template) => map.serialize_entry(key, template)?,
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn path_fields_serialize_with_marker_suffix() {
        let template = PayloadTemplate::new()
            .literal("FunctionName", "arn:aws:lambda:us-east-1:0:function:Extract")
            .path("event", "$");

        let value = serde_json::to_value(&template).expect("template serializes");
        assert_eq!(
            value,
            json!({
                "FunctionName": "arn:aws:lambda:us-east-1:0:function:Extract",
                "event.$": "$",
            })
        );
    }

    #[test]
    fn nested_templates_serialize_recursively() {
        let template = PayloadTemplate::new().nested(
            "Payload",
            PayloadTemplate::new()
                .path("tweetEvent", "$.GenerateTweetEvent.result.tweetEvent")
                .literal("dryRun", false),
        );

        let value = serde_json::to_value(&template).expect("template serializes");
        assert_eq!(
            value,
            json!({
                "Payload": {
                    "tweetEvent.$": "$.GenerateTweetEvent.result.tweetEvent",
                    "dryRun": false,
                }
            })
        );
    }

    #[test]
    fn field_order_follows_insertion_order() {
        let template = PayloadTemplate::new()
            .path("event", "$")
            .path("eventScores", "$.ExtractFeatures.result.eventScores")
            .path("eventHighlights", "$.ExtractFeatures.result.eventHighlights");

        let rendered = serde_json::to_string(&template).expect("template serializes");
        let scores = rendered.find("eventScores").expect("scores field present");
        let highlights = rendered
            .find("eventHighlights")
            .expect("highlights field present");
        assert!(rendered.find("event.$").expect("event field present") < scores);
        assert!(scores < highlights);
    }
}
