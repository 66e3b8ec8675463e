use thiserror::Error;

use super::focus::FocusCycler;
use crate::command::AnchorArgs;
use crate::config::DecoratorConfig;
use crate::decorator::DecoratorState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Anchor id must not be empty")]
    EmptyId,
    #[error("Anchor id must not contain whitespace")]
    ContainsWhitespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormControl {
    IdInput,
    Switch(String),
    Save,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorSwitch {
    pub id: String,
    pub label: String,
    pub on: bool,
}

/// Id input plus one switch per decorator.
#[derive(Debug, Clone)]
pub struct AnchorFormView {
    id: String,
    switches: Vec<DecoratorSwitch>,
    error: Option<FormError>,
    focus: FocusCycler<FormControl>,
}

impl AnchorFormView {
    pub fn new(decorators: &[DecoratorConfig]) -> Self {
        let switches: Vec<DecoratorSwitch> = decorators
            .iter()
            .map(|d| DecoratorSwitch {
                id: d.id.clone(),
                label: d.label.clone(),
                on: d.default_value,
            })
            .collect();

        let mut controls = vec![FormControl::IdInput];
        controls.extend(switches.iter().map(|s| FormControl::Switch(s.id.clone())));
        controls.extend([FormControl::Save, FormControl::Cancel]);

        Self {
            id: String::new(),
            switches,
            error: None,
            focus: FocusCycler::new(controls),
        }
    }

    /// Loads `id` and the switch positions, then focuses the id input.
    pub fn load(&mut self, id: impl Into<String>, states: &[DecoratorState]) {
        self.id = id.into();
        for switch in &mut self.switches {
            if let Some(state) = states.iter().find(|s| s.id == switch.id) {
                switch.on = state.value;
            }
        }
        self.error = None;
        self.focus.focus(&FormControl::IdInput);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.error = None;
    }

    pub fn switches(&self) -> &[DecoratorSwitch] {
        &self.switches
    }

    pub fn toggle(&mut self, decorator: &str) -> Option<bool> {
        let switch = self.switches.iter_mut().find(|s| s.id == decorator)?;
        switch.on = !switch.on;
        Some(switch.on)
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn focus(&self) -> &FocusCycler<FormControl> {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusCycler<FormControl> {
        &mut self.focus
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.id.is_empty() {
            return Err(FormError::EmptyId);
        }
        if self.id.chars().any(char::is_whitespace) {
            return Err(FormError::ContainsWhitespace);
        }
        Ok(())
    }

    /// Validated command arguments; every switch is sent explicitly.
    pub fn submit(&mut self) -> Result<AnchorArgs, FormError> {
        if let Err(err) = self.validate() {
            self.error = Some(err.clone());
            return Err(err);
        }
        self.error = None;
        Ok(self
            .switches
            .iter()
            .fold(AnchorArgs::new(self.id.clone()), |args, s| {
                args.decorator(s.id.clone(), s.on)
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> AnchorFormView {
        AnchorFormView::new(&[
            DecoratorConfig::new("isExternal", "External").default_value(true),
            DecoratorConfig::new("download", "Download"),
        ])
    }

    #[test]
    fn switches_start_at_defaults_and_submit_all() {
        let mut form = form();
        form.set_id("intro");
        form.toggle("download");

        assert_eq!(
            form.submit(),
            Ok(AnchorArgs::new("intro")
                .decorator("isExternal", true)
                .decorator("download", true))
        );
    }

    #[test]
    fn whitespace_in_id_is_rejected() {
        let mut form = form();
        form.set_id("my anchor");
        assert_eq!(form.submit(), Err(FormError::ContainsWhitespace));
        assert_eq!(form.error(), Some(&FormError::ContainsWhitespace));

        form.set_id("my-anchor");
        assert_eq!(form.error(), None);
        assert!(form.submit().is_ok());
    }

    #[test]
    fn tab_order_is_input_switches_then_buttons() {
        let mut form = form();
        form.load("x", &[]);
        let order: Vec<FormControl> = (0..5)
            .filter_map(|_| form.focus_mut().next().cloned())
            .collect();
        assert_eq!(
            order,
            vec![
                FormControl::Switch("isExternal".to_string()),
                FormControl::Switch("download".to_string()),
                FormControl::Save,
                FormControl::Cancel,
                FormControl::IdInput,
            ]
        );
    }
}
