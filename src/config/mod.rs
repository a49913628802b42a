//! Blueprint configuration source.
//!
//! Blueprints are JSON documents. [`ConfigNode`] is a borrowed view over a
//! parsed document offering dotted-path lookup and string coercion, which is
//! all the loaders need. Object key order is preserved, so declaration
//! order in the file is the order variables and instructions run in.

use std::path::Path;

use serde_json::Value as Json;

use crate::core::error::LoadError;
use crate::material::Properties;

/// Parse a JSON document from a string.
pub fn parse_document(json: &str) -> Result<Json, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a JSON document (sync)
pub fn read_document(path: &Path) -> Result<Json, LoadError> {
    let json = std::fs::read_to_string(path)?;
    parse_document(&json)
}

/// Borrowed view of one node in a configuration document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigNode<'a> {
    value: &'a Json,
}

impl<'a> ConfigNode<'a> {
    pub fn new(value: &'a Json) -> Self {
        Self { value }
    }

    /// Child at a dotted path (`"position.x"`). The empty path is `self`.
    pub fn get(&self, path: &str) -> Option<ConfigNode<'a>> {
        if path.is_empty() {
            return Some(*self);
        }
        path.split('.')
            .try_fold(self.value, |node, key| node.as_object()?.get(key))
            .map(ConfigNode::new)
    }

    /// String form of a scalar node. Objects, arrays and null give `None`.
    pub fn as_string(&self) -> Option<String> {
        match self.value {
            Json::String(s) => Some(s.clone()),
            Json::Number(n) => Some(n.to_string()),
            Json::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Shorthand for `get(path)?.as_string()`.
    pub fn string(&self, path: &str) -> Option<String> {
        self.get(path)?.as_string()
    }

    pub fn is_object(&self) -> bool {
        self.value.is_object()
    }

    /// Object entries in declaration order; array items keyed by index.
    pub fn children(&self) -> Vec<(String, ConfigNode<'a>)> {
        match self.value {
            Json::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), ConfigNode::new(v)))
                .collect(),
            Json::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), ConfigNode::new(v)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Flatten nested objects into dotted keys with string leaves.
    ///
    /// `{ "inner": { "material": "dirt" } }` and `{ "inner.material": "dirt" }`
    /// both produce `inner.material = dirt`.
    pub fn properties(&self) -> Properties {
        let mut out = Properties::new();
        flatten_into("", self.value, &mut out);
        out
    }

    pub fn json(&self) -> &'a Json {
        self.value
    }
}

fn flatten_into(prefix: &str, value: &Json, out: &mut Properties) {
    match value {
        Json::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&path, child, out);
            }
        }
        other => {
            if let Some(s) = ConfigNode::new(other).as_string() {
                out.insert(prefix.to_string(), s);
            }
        }
    }
}
