use serde::{Deserialize, Serialize};

/// Which of the two main panes are on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewMode {
    #[default]
    Split,
    EditorOnly,
    PreviewOnly,
}

impl ViewMode {
    fn from_visibility(editor: bool, preview: bool) -> Self {
        match (editor, preview) {
            (true, false) => Self::EditorOnly,
            (false, true) => Self::PreviewOnly,
            _ => Self::Split,
        }
    }
}

/// Pane visibility for the main window body.
///
/// At least one of editor and preview is always visible; hiding the last
/// visible one brings the other back instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    pub view_mode: ViewMode,
    pub sidebar_visible: bool,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Split,
            sidebar_visible: true,
        }
    }
}

impl LayoutState {
    pub fn editor_visible(&self) -> bool {
        self.view_mode != ViewMode::PreviewOnly
    }

    pub fn preview_visible(&self) -> bool {
        self.view_mode != ViewMode::EditorOnly
    }

    pub fn toggle_editor(&mut self) -> ViewMode {
        let editor = !self.editor_visible();
        let preview = self.preview_visible() || !editor;
        self.view_mode = ViewMode::from_visibility(editor, preview);
        self.view_mode
    }

    pub fn toggle_preview(&mut self) -> ViewMode {
        let preview = !self.preview_visible();
        let editor = self.editor_visible() || !preview;
        self.view_mode = ViewMode::from_visibility(editor, preview);
        self.view_mode
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_visible = !self.sidebar_visible;
        self.sidebar_visible
    }
}
