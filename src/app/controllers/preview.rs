use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use fltk::app::{self, Sender};

use crate::app::domain::messages::Message;
use crate::app::services::preview::{render_markdown, wrap_for_helpview};

/// Delay between the last keystroke and re-rendering the preview pane.
const PREVIEW_DELAY_SECS: f64 = 0.3;

pub struct PreviewController {
    timer_active: bool,
    last_rendered: Option<(u64, bool)>,
}

impl PreviewController {
    pub fn new() -> Self {
        Self {
            timer_active: false,
            last_rendered: None,
        }
    }

    /// Arm the refresh timer unless one is already pending.
    pub fn schedule(&mut self, sender: &Sender<Message>) {
        if self.timer_active {
            return;
        }
        self.timer_active = true;
        let s = *sender;
        app::add_timeout3(PREVIEW_DELAY_SECS, move |_| {
            s.send(Message::PreviewTick);
        });
    }

    pub fn timer_fired(&mut self) {
        self.timer_active = false;
    }

    /// Forget what was rendered so the next `render` always produces output.
    pub fn invalidate(&mut self) {
        self.last_rendered = None;
    }

    /// HelpView markup for `text`, or `None` if it would be identical to the
    /// last render.
    pub fn render(&mut self, text: &str, is_dark: bool) -> Option<String> {
        let key = (content_hash(text), is_dark);
        if self.last_rendered == Some(key) {
            return None;
        }
        self.last_rendered = Some(key);
        Some(wrap_for_helpview(&render_markdown(text), is_dark))
    }
}

impl Default for PreviewController {
    fn default() -> Self {
        Self::new()
    }
}

fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_skips_unchanged_text() {
        let mut preview = PreviewController::new();
        assert!(preview.render("# A", false).is_some());
        assert!(preview.render("# A", false).is_none());
        assert!(preview.render("# B", false).is_some());
    }

    #[test]
    fn test_theme_change_forces_render() {
        let mut preview = PreviewController::new();
        preview.render("# A", false);
        let dark = preview.render("# A", true).unwrap();
        assert!(dark.contains("#1e1e1e"));
    }

    #[test]
    fn test_invalidate() {
        let mut preview = PreviewController::new();
        preview.render("# A", false);
        preview.invalidate();
        assert!(preview.render("# A", false).is_some());
    }
}
