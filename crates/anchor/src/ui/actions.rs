use super::focus::FocusCycler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionControl {
    Preview,
    Edit,
    Unanchor,
}

/// Shown while the caret is inside an anchor: preview, edit, unanchor.
#[derive(Debug, Clone)]
pub struct AnchorActionsView {
    id: Option<String>,
    focus: FocusCycler<ActionControl>,
}

impl Default for AnchorActionsView {
    fn default() -> Self {
        Self {
            id: None,
            focus: FocusCycler::new(vec![
                ActionControl::Preview,
                ActionControl::Edit,
                ActionControl::Unanchor,
            ]),
        }
    }
}

impl AnchorActionsView {
    pub fn load(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
        self.focus.focus(&ActionControl::Edit);
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// `#id`, the fragment a link to this anchor would use.
    pub fn preview_text(&self) -> Option<String> {
        self.id.as_ref().map(|id| format!("#{id}"))
    }

    pub fn focus(&self) -> &FocusCycler<ActionControl> {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusCycler<ActionControl> {
        &mut self.focus
    }
}
