/// Highlight state: one persisted selection plus one transient hover.
///
/// Hover never clobbers the persisted selection; the two are cleared and
/// set independently. All mutators return `true` only when state actually
/// changed, so callers can skip redundant notifications under rapid
/// repeated firing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<String>,
    hover: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `code`; re-selecting the current code is a no-op.
    pub fn select(&mut self, code: &str) -> bool {
        if self.selected.as_deref() == Some(code) {
            return false;
        }
        self.selected = Some(code.to_string());
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn set_hover(&mut self, code: Option<&str>) -> bool {
        if self.hover.as_deref() == code {
            return false;
        }
        self.hover = code.map(str::to_string);
        true
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hover(&self) -> Option<&str> {
        self.hover.as_deref()
    }

    /// Whether `code` should render highlighted (hovered or selected).
    pub fn is_highlighted(&self, code: &str) -> bool {
        self.hover.as_deref() == Some(code) || self.selected.as_deref() == Some(code)
    }
}
