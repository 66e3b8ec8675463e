use std::str::FromStr;

use plate_core::{CommandError, Editor};
use thiserror::Error;
use uuid::Uuid;

use super::actions::{ActionControl, AnchorActionsView};
use super::form::{AnchorFormView, FormControl, FormError};
use crate::config::AnchorConfig;
use crate::plugin::anchor_state;
use crate::view::AnchorHighlight;
use crate::{ANCHOR_COMMAND, UNANCHOR_COMMAND};

#[derive(Debug, Error)]
pub enum UiError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Failed to encode anchor args: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Anchors are not allowed at the selection")]
    NotAllowed,
    #[error("Unknown keystroke: {0}")]
    UnknownKeystroke(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Hidden,
    Actions,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    CtrlK,
    Escape,
    Tab,
    ShiftTab,
    Enter,
}

impl FromStr for Keystroke {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ctrl+k" | "cmd+k" => Ok(Keystroke::CtrlK),
            "esc" | "escape" => Ok(Keystroke::Escape),
            "tab" => Ok(Keystroke::Tab),
            "shift+tab" => Ok(Keystroke::ShiftTab),
            "enter" | "return" => Ok(Keystroke::Enter),
            _ => Err(UiError::UnknownKeystroke(s.to_string())),
        }
    }
}

/// Panel state for the anchor balloon: hidden, actions, or the form.
pub struct AnchorUi {
    config: AnchorConfig,
    panel: Panel,
    form: AnchorFormView,
    actions: AnchorActionsView,
    highlight: AnchorHighlight,
}

impl AnchorUi {
    pub fn new(config: AnchorConfig) -> Self {
        let form = AnchorFormView::new(&config.decorators);
        Self {
            config,
            panel: Panel::Hidden,
            form,
            actions: AnchorActionsView::default(),
            highlight: AnchorHighlight::default(),
        }
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn form(&self) -> &AnchorFormView {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AnchorFormView {
        &mut self.form
    }

    pub fn actions(&self) -> &AnchorActionsView {
        &self.actions
    }

    pub fn highlight(&self) -> &AnchorHighlight {
        &self.highlight
    }

    pub fn fresh_id(&self) -> String {
        format!("{}{}", self.config.id_prefix, Uuid::new_v4())
    }

    /// Actions when the selection is in an anchor, otherwise a form
    /// pre-filled with a fresh id.
    pub fn show(&mut self, editor: &Editor) -> Result<(), UiError> {
        let state = anchor_state(editor, &self.config);
        if let Some(id) = state.id {
            self.actions.load(id);
            self.panel = Panel::Actions;
            return Ok(());
        }
        if !editor.is_command_enabled(ANCHOR_COMMAND) {
            return Err(UiError::NotAllowed);
        }
        let id = self.fresh_id();
        self.form = AnchorFormView::new(&self.config.decorators);
        self.form.load(id, &[]);
        self.panel = Panel::Form;
        Ok(())
    }

    pub fn edit(&mut self, editor: &Editor) {
        let state = anchor_state(editor, &self.config);
        self.form = AnchorFormView::new(&self.config.decorators);
        self.form.load(state.id.unwrap_or_default(), &state.decorators);
        self.panel = Panel::Form;
    }

    pub fn submit(&mut self, editor: &mut Editor) -> Result<(), UiError> {
        let args = self.form.submit()?;
        editor.run_command(ANCHOR_COMMAND, Some(serde_json::to_value(&args)?))?;
        self.close();
        self.refresh(editor);
        Ok(())
    }

    pub fn unanchor(&mut self, editor: &mut Editor) -> Result<(), UiError> {
        editor.run_command(UNANCHOR_COMMAND, None)?;
        self.close();
        self.refresh(editor);
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.panel = Panel::Hidden;
        self.form.focus_mut().blur();
        self.actions.focus_mut().blur();
    }

    /// Recomputes the highlight after a change; hides the actions once the
    /// selection has left the anchor. Returns whether the highlight moved.
    pub fn refresh(&mut self, editor: &Editor) -> bool {
        if self.panel == Panel::Actions && anchor_state(editor, &self.config).id.is_none() {
            self.close();
        }
        self.highlight.refresh(editor)
    }

    /// Returns whether the keystroke was handled.
    pub fn handle_keystroke(
        &mut self,
        editor: &mut Editor,
        keystroke: Keystroke,
    ) -> Result<bool, UiError> {
        match (keystroke, self.panel) {
            (Keystroke::CtrlK, _) => {
                self.show(editor)?;
                Ok(true)
            }
            (_, Panel::Hidden) => Ok(false),
            (Keystroke::Escape, _) => {
                self.cancel();
                Ok(true)
            }
            (Keystroke::Tab, Panel::Form) => Ok(self.form.focus_mut().next().is_some()),
            (Keystroke::ShiftTab, Panel::Form) => Ok(self.form.focus_mut().previous().is_some()),
            (Keystroke::Tab, Panel::Actions) => Ok(self.actions.focus_mut().next().is_some()),
            (Keystroke::ShiftTab, Panel::Actions) => {
                Ok(self.actions.focus_mut().previous().is_some())
            }
            (Keystroke::Enter, Panel::Form) => match self.form.focus().current().cloned() {
                Some(FormControl::Cancel) => {
                    self.cancel();
                    Ok(true)
                }
                Some(FormControl::Switch(id)) => Ok(self.form.toggle(&id).is_some()),
                _ => self.submit(editor).map(|()| true),
            },
            (Keystroke::Enter, Panel::Actions) => match self.actions.focus().current().copied() {
                Some(ActionControl::Edit) => {
                    self.edit(editor);
                    Ok(true)
                }
                Some(ActionControl::Unanchor) => self.unanchor(editor).map(|()| true),
                Some(ActionControl::Preview) | None => Ok(false),
            },
        }
    }
}
