use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Public enum `ViewMode` in `relay-render`.
pub enum ViewMode {
    #[default]
    Text,
    Dashboard,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Dashboard => "dashboard",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Text => Self::Dashboard,
            Self::Dashboard => Self::Text,
        }
    }

    pub(crate) fn toggle_label(self) -> &'static str {
        match self {
            Self::Text => "Show dashboard",
            Self::Dashboard => "Show text",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Per-message view mode owned by the chat surface; messages default to text.
pub struct ViewModePreferences {
    modes: HashMap<String, ViewMode>,
}

impl ViewModePreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode_for(&self, message_id: &str) -> ViewMode {
        self.modes.get(message_id).copied().unwrap_or_default()
    }

    pub fn set(&mut self, message_id: impl Into<String>, mode: ViewMode) {
        self.modes.insert(message_id.into(), mode);
    }

    pub fn toggle(&mut self, message_id: &str) -> ViewMode {
        let next = self.mode_for(message_id).toggled();
        self.set(message_id, next);
        next
    }

    pub fn clear(&mut self) {
        self.modes.clear();
    }
}
