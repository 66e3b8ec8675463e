use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Document, Node};
use crate::plugin::PluginRegistry;

pub const PLATE_SCHEMA: &str = "plate";
pub const PLATE_VERSION: u32 = 1;

fn default_schema() -> String {
    PLATE_SCHEMA.to_string()
}

fn default_version() -> u32 {
    PLATE_VERSION
}

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("failed to parse document: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },
    #[error("unsupported schema `{found}`")]
    UnsupportedSchema { found: String },
    #[error("unsupported version {found} (newest known is {PLATE_VERSION})")]
    UnsupportedVersion { found: u32 },
    #[error("unknown node kind `{kind}`")]
    UnknownKind { kind: String },
}

/// Persisted form of a document. Inline attributes, anchors included, are
/// stored on the nodes as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub document: Document,
}

impl PlateValue {
    pub fn from_document(document: Document) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            document,
        }
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses and checks the envelope. Missing `schema`/`version` fall back to
    /// the current ones.
    pub fn from_json_str(s: &str) -> Result<Self, ValueError> {
        let value: Self = serde_json::from_str(s)?;
        if value.schema != PLATE_SCHEMA {
            return Err(ValueError::UnsupportedSchema {
                found: value.schema,
            });
        }
        if value.version > PLATE_VERSION {
            return Err(ValueError::UnsupportedVersion {
                found: value.version,
            });
        }
        Ok(value)
    }

    /// Rejects element and void kinds no plugin in `registry` declares.
    pub fn check_kinds(&self, registry: &PluginRegistry) -> Result<(), ValueError> {
        fn walk(nodes: &[Node], registry: &PluginRegistry) -> Result<(), ValueError> {
            for node in nodes {
                let kind = match node {
                    Node::Text(_) => continue,
                    Node::Void(v) => &v.kind,
                    Node::Element(el) => {
                        walk(&el.children, registry)?;
                        &el.kind
                    }
                };
                if !registry.is_known_kind(kind) {
                    return Err(ValueError::UnknownKind { kind: kind.clone() });
                }
            }
            Ok(())
        }

        walk(&self.document.children, registry)
    }
}
