use std::sync::Arc;

use plate_core::{
    AttributeSpec, CommandError, CommandSpec, Editor, PlatePlugin, PluginRegistry, QueryError,
    QuerySpec, RegistryError,
};
use serde::{Deserialize, Serialize};

use crate::command::{AnchorArgs, current_anchor_id, set_anchor, unset_anchor};
use crate::config::AnchorConfig;
use crate::decorator::{DecoratorDecl, DecoratorState, decorator_states};
use crate::view::highlighted_range;
use crate::{ANCHOR_COMMAND, ANCHOR_ID_ATTR, UNANCHOR_COMMAND};

/// Snapshot of the anchor at the selection, as read by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorState {
    pub id: Option<String>,
    pub decorators: Vec<DecoratorState>,
}

pub fn anchor_state(editor: &Editor, config: &AnchorConfig) -> AnchorState {
    AnchorState {
        id: current_anchor_id(editor),
        decorators: decorator_states(&config.decorators, &editor.selection_attrs()),
    }
}

/// Whether the schema permits an anchor at the selection.
pub fn anchor_allowed(editor: &Editor) -> bool {
    let selection = editor.selection();
    let registry = editor.registry();
    if selection.is_collapsed() {
        registry.allows_attribute_at(editor.doc(), &selection.focus, ANCHOR_ID_ATTR)
    } else {
        !registry
            .valid_ranges(editor.doc(), &editor.selection_ranges(), &[ANCHOR_ID_ATTR])
            .is_empty()
    }
}

pub struct AnchorPlugin {
    config: Arc<AnchorConfig>,
}

impl AnchorPlugin {
    pub fn new(config: AnchorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Core plugins plus the anchor plugin.
pub fn anchor_registry(config: AnchorConfig) -> Result<PluginRegistry, RegistryError> {
    PluginRegistry::with_core([Box::new(AnchorPlugin::new(config)) as Box<dyn PlatePlugin>])
}

impl PlatePlugin for AnchorPlugin {
    fn id(&self) -> &'static str {
        "anchor"
    }

    fn attribute_specs(&self) -> Vec<AttributeSpec> {
        std::iter::once(ANCHOR_ID_ATTR.to_string())
            .chain(self.config.decorators.iter().map(|d| d.model_attribute()))
            .map(|key| AttributeSpec::text(key).on_voids(["image"]))
            .collect()
    }

    fn commands(&self) -> Vec<CommandSpec> {
        let set_config = self.config.clone();
        let unset_config = self.config.clone();
        vec![
            CommandSpec::new(ANCHOR_COMMAND, "Anchor", move |editor, args| {
                let args: AnchorArgs = args
                    .ok_or_else(|| CommandError::new("Missing args"))
                    .and_then(|args| {
                        serde_json::from_value(args)
                            .map_err(|err| CommandError::new(format!("Invalid args: {err}")))
                    })?;
                let Some(tx) = set_anchor(editor, &set_config.decorators, &args)
                    .map_err(CommandError::new)?
                else {
                    return Ok(());
                };
                editor
                    .apply(tx)
                    .map_err(|e| CommandError::new(format!("Failed to set anchor: {e}")))
            })
            .enabled_when(anchor_allowed),
            CommandSpec::new(UNANCHOR_COMMAND, "Unanchor", move |editor, _args| {
                let Some(tx) =
                    unset_anchor(editor, &unset_config.decorators).map_err(CommandError::new)?
                else {
                    return Ok(());
                };
                editor
                    .apply(tx)
                    .map_err(|e| CommandError::new(format!("Failed to remove anchor: {e}")))
            })
            .enabled_when(|editor| current_anchor_id(editor).is_some()),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        let state_config = self.config.clone();
        let decorators: Vec<DecoratorDecl> =
            self.config.decorators.iter().map(DecoratorDecl::from).collect();
        vec![
            QuerySpec::new("anchor.state", move |editor, _args| {
                serde_json::to_value(anchor_state(editor, &state_config))
                    .map_err(|err| QueryError::new(format!("Failed to encode anchor state: {err}")))
            }),
            QuerySpec::new("anchor.decorators", move |_editor, _args| {
                serde_json::to_value(&decorators)
                    .map_err(|err| QueryError::new(format!("Failed to encode decorators: {err}")))
            }),
            QuerySpec::new("anchor.highlighted_range", |editor, _args| {
                serde_json::to_value(highlighted_range(editor))
                    .map_err(|err| QueryError::new(format!("Failed to encode range: {err}")))
            }),
        ]
    }
}
