use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decorator::decorator_attribute;
use crate::view::{RESERVED_ATTRIBUTES, is_attribute_name};

const DEFAULT_ID_PREFIX: &str = "anchor-";

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse anchor config: {source}")]
    ConfigParseError { source: serde_json::Error },

    #[error("Decorator at position {index} has an empty id")]
    EmptyDecoratorId { index: usize },

    #[error("Decorator id {id:?} is declared more than once")]
    DuplicateDecoratorId { id: String },

    #[error("Decorator {id:?} cannot render attribute {name:?}")]
    InvalidDecoratorAttribute { id: String, name: String },
}

/// A manual decorator: a boolean switch shown next to the anchor id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorConfig {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub default_value: bool,
    /// Extra attributes on the rendered `<a>` while the decorator is on.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

impl DecoratorConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            default_value: false,
            attributes: BTreeMap::new(),
            classes: Vec::new(),
        }
    }

    pub fn default_value(mut self, default_value: bool) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Model attribute that stores this decorator's state.
    pub fn model_attribute(&self) -> String {
        decorator_attribute(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorConfig {
    #[serde(default)]
    pub decorators: Vec<DecoratorConfig>,
    /// Prefix of identifiers generated for new anchors.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            decorators: Vec::new(),
            id_prefix: default_id_prefix(),
        }
    }
}

impl AnchorConfig {
    pub fn with_decorators(decorators: Vec<DecoratorConfig>) -> Result<Self, ConfigError> {
        let config = Self {
            decorators,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: AnchorConfig =
            serde_json::from_str(s).map_err(|source| ConfigError::ConfigParseError { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (index, decorator) in self.decorators.iter().enumerate() {
            if decorator.id.trim().is_empty() {
                return Err(ConfigError::EmptyDecoratorId { index });
            }
            if !seen.insert(decorator.id.as_str()) {
                return Err(ConfigError::DuplicateDecoratorId {
                    id: decorator.id.clone(),
                });
            }
            if let Some(name) = decorator
                .attributes
                .keys()
                .find(|name| RESERVED_ATTRIBUTES.contains(&name.as_str()) || !is_attribute_name(name))
            {
                return Err(ConfigError::InvalidDecoratorAttribute {
                    id: decorator.id.clone(),
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_keys_and_defaults() {
        let config = AnchorConfig::from_json_str(
            r#"{
                "decorators": [
                    { "id": "isExternal", "label": "Open in a new tab", "defaultValue": true,
                      "attributes": { "target": "_blank" } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.id_prefix, "anchor-");
        assert_eq!(config.decorators.len(), 1);
        let decorator = &config.decorators[0];
        assert!(decorator.default_value);
        assert_eq!(decorator.attributes.get("target").map(String::as_str), Some("_blank"));
        assert!(decorator.classes.is_empty());
        assert_eq!(decorator.model_attribute(), "anchorIsExternal");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = AnchorConfig::with_decorators(vec![
            DecoratorConfig::new("bold", "Bold"),
            DecoratorConfig::new("bold", "Bold again"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateDecoratorId { id } if id == "bold"));
    }

    #[test]
    fn rejects_empty_ids() {
        let err = AnchorConfig::from_json_str(r#"{ "decorators": [ { "id": " ", "label": "x" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDecoratorId { index: 0 }));
    }

    #[test]
    fn rejects_attributes_that_would_clobber_the_anchor() {
        let err = AnchorConfig::with_decorators(vec![
            DecoratorConfig::new("jump", "Jump").attribute("id", "other"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDecoratorAttribute { ref name, .. } if name == "id"
        ));

        let err = AnchorConfig::from_json_str(
            r#"{ "decorators": [ { "id": "x", "label": "x", "attributes": { "on click": "y" } } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDecoratorAttribute { .. }));
    }

    #[test]
    fn reports_parse_errors() {
        let err = AnchorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }
}
