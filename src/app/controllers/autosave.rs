use std::time::Instant;

use fltk::app::{self, Sender};

use crate::app::domain::messages::Message;
use crate::app::services::autosave::{AutosaveConfig, DraftAutosaver, SaveStatus};
use crate::app::services::draft_store::{DRAFT_KEY, FileStore, load_draft};

/// Drives a `DraftAutosaver` from FLTK timeouts.
///
/// At most one timeout is armed at a time. A timer that fires early just
/// polls, finds nothing due, and re-arms. One armed too late is replaced as
/// soon as an earlier deadline shows up.
pub struct AutosaveController {
    saver: DraftAutosaver<FileStore>,
    armed: Option<(Instant, app::TimeoutHandle)>,
}

impl AutosaveController {
    pub fn new(store: FileStore, config: AutosaveConfig) -> Self {
        Self {
            saver: DraftAutosaver::new(store, DRAFT_KEY, config),
            armed: None,
        }
    }

    pub fn stored_draft(&self) -> Option<String> {
        load_draft(self.saver.store())
    }

    pub fn status(&self) -> SaveStatus {
        self.saver.status()
    }

    pub fn set_config(&mut self, config: AutosaveConfig) {
        self.saver.set_config(config);
    }

    pub fn store(&self) -> &FileStore {
        self.saver.store()
    }

    pub fn record_edit(&mut self, text: String, sender: &Sender<Message>) {
        self.saver.on_edit(text, Instant::now());
        self.arm_timer(sender);
    }

    /// Handle `Message::AutosaveTick`. Returns the latest status if it changed.
    pub fn tick(&mut self, sender: &Sender<Message>) -> Option<SaveStatus> {
        // The armed timeout is the one that just fired
        self.armed = None;
        let transitions = self.saver.poll(Instant::now());
        self.arm_timer(sender);
        transitions.last().copied()
    }

    /// Write the pending draft now (window closing).
    pub fn flush(&mut self) -> Option<SaveStatus> {
        self.saver.flush(Instant::now()).last().copied()
    }

    fn arm_timer(&mut self, sender: &Sender<Message>) {
        let next = self.saver.next_deadline();
        if !needs_rearm(self.armed.map(|(at, _)| at), next) {
            return;
        }
        let Some(deadline) = next else {
            return;
        };
        if let Some((_, handle)) = self.armed.take() {
            app::remove_timeout3(handle);
        }
        let wait = deadline.saturating_duration_since(Instant::now()).as_secs_f64();
        let s = *sender;
        let handle = app::add_timeout3(wait, move |_| {
            s.send(Message::AutosaveTick);
        });
        self.armed = Some((deadline, handle));
    }
}

/// Whether a timeout armed for `armed` has to be replaced so that `next` is
/// met on time.
fn needs_rearm(armed: Option<Instant>, next: Option<Instant>) -> bool {
    match (armed, next) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(armed), Some(next)) => next < armed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::app::services::draft_store::MemoryStore;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_arms_when_idle() {
        let t0 = Instant::now();
        assert!(needs_rearm(None, Some(t0)));
        assert!(!needs_rearm(None, None));
        assert!(!needs_rearm(Some(t0), None));
    }

    #[test]
    fn test_later_deadline_keeps_timer() {
        let t0 = Instant::now();
        assert!(!needs_rearm(Some(t0 + ms(500)), Some(t0 + ms(800))));
        assert!(!needs_rearm(Some(t0 + ms(500)), Some(t0 + ms(500))));
    }

    #[test]
    fn test_edit_during_saved_display_rearms_earlier() {
        let t0 = Instant::now();
        let mut saver = DraftAutosaver::new(
            MemoryStore::new(),
            DRAFT_KEY,
            AutosaveConfig::from_millis(750, 2500),
        );
        saver.on_edit("a", t0);
        saver.poll(t0 + ms(750));
        // Only the Saved display is left, expiring at 3250
        let armed = saver.next_deadline();
        assert_eq!(armed, Some(t0 + ms(3250)));

        saver.on_edit("ab", t0 + ms(1000));
        let next = saver.next_deadline();
        assert_eq!(next, Some(t0 + ms(1750)));
        assert!(needs_rearm(armed, next));
    }
}
