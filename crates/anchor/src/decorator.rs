//! Decorator attribute naming and derived decorator state.
//!
//! A decorator `isExternal` is stored on content as the boolean attribute
//! `anchorIsExternal`. The attribute is either `true` or absent.

use plate_core::Attrs;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DecoratorConfig;

const ATTRIBUTE_PREFIX: &str = "anchor";

pub fn decorator_attribute(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => format!(
            "{ATTRIBUTE_PREFIX}{}{}",
            first.to_uppercase(),
            chars.as_str()
        ),
        None => ATTRIBUTE_PREFIX.to_string(),
    }
}

/// Inverse of [`decorator_attribute`].
pub fn decorator_id(attribute: &str) -> Option<String> {
    let rest = attribute.strip_prefix(ATTRIBUTE_PREFIX)?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    Some(format!("{}{}", first.to_lowercase(), chars.as_str()))
}

/// Declared decorator, as shown to a UI building toggle controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorDecl {
    pub id: String,
    pub label: String,
    pub default_value: bool,
}

impl From<&DecoratorConfig> for DecoratorDecl {
    fn from(config: &DecoratorConfig) -> Self {
        Self {
            id: config.id.clone(),
            label: config.label.clone(),
            default_value: config.default_value,
        }
    }
}

/// Runtime value of a decorator at the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratorState {
    pub id: String,
    pub label: String,
    pub value: bool,
}

pub fn decorator_states(decorators: &[DecoratorConfig], attrs: &Attrs) -> Vec<DecoratorState> {
    decorators
        .iter()
        .map(|decorator| DecoratorState {
            id: decorator.id.clone(),
            label: decorator.label.clone(),
            value: attrs.get(&decorator.model_attribute()) == Some(&Value::Bool(true)),
        })
        .collect()
}
