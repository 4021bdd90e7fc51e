//! Debounced draft persistence.
//!
//! Every edit replaces the pending value and pushes its deadline back, so a
//! burst of keystrokes turns into a single write of the last value once the
//! editor has been quiet for `delay`. The autosaver owns no timer: the UI
//! asks for `next_deadline()`, arms a timeout, and calls `poll()` when it
//! fires. That keeps the whole state machine testable with plain `Instant`s.

use std::time::{Duration, Instant};

use super::draft_store::KeyValueStore;

const MIN_DELAY_MS: u64 = 500;
const MAX_DELAY_MS: u64 = 1000;
const MIN_STATUS_RESET_MS: u64 = 2000;
const MAX_STATUS_RESET_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub delay: Duration,
    pub status_reset: Duration,
}

impl AutosaveConfig {
    /// Build from settings values, clamped to the supported ranges.
    pub fn from_millis(delay_ms: u64, status_reset_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS)),
            status_reset: Duration::from_millis(
                status_reset_ms.clamp(MIN_STATUS_RESET_MS, MAX_STATUS_RESET_MS),
            ),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self::from_millis(750, 2500)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Saving => "Saving draft...",
            Self::Saved => "Draft saved",
            Self::Error => "Draft could not be saved",
        }
    }
}

#[derive(Debug, Clone)]
struct PendingWrite {
    text: String,
    due: Instant,
}

pub struct DraftAutosaver<S: KeyValueStore> {
    store: S,
    key: String,
    config: AutosaveConfig,
    pending: Option<PendingWrite>,
    status: SaveStatus,
    status_expires: Option<Instant>,
}

impl<S: KeyValueStore> DraftAutosaver<S> {
    pub fn new(store: S, key: impl Into<String>, config: AutosaveConfig) -> Self {
        Self {
            store,
            key: key.into(),
            config,
            pending: None,
            status: SaveStatus::Idle,
            status_expires: None,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn set_config(&mut self, config: AutosaveConfig) {
        self.config = config;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record an edit. Replaces any pending value and restarts the quiet period.
    pub fn on_edit(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some(PendingWrite {
            text: text.into(),
            due: now + self.config.delay,
        });
    }

    /// Earliest instant at which `poll` has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pending.as_ref().map(|p| p.due), self.status_expires) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Advance the state machine to `now`.
    ///
    /// Returns the status transitions that happened, in order. A due write
    /// yields `[Saving, Saved]` or `[Saving, Error]`; an expired Saved/Error
    /// display yields `[Idle]`.
    pub fn poll(&mut self, now: Instant) -> Vec<SaveStatus> {
        let mut transitions = Vec::new();

        if let Some(expires) = self.status_expires {
            if now >= expires {
                self.status_expires = None;
                self.set_status(SaveStatus::Idle, &mut transitions);
            }
        }

        let due = self.pending.as_ref().is_some_and(|p| now >= p.due);
        if due {
            if let Some(pending) = self.pending.take() {
                self.write(&pending.text, now, &mut transitions);
            }
        }

        transitions
    }

    /// Write any pending value immediately, ignoring the quiet period.
    pub fn flush(&mut self, now: Instant) -> Vec<SaveStatus> {
        let mut transitions = Vec::new();
        if let Some(pending) = self.pending.take() {
            self.write(&pending.text, now, &mut transitions);
        }
        transitions
    }

    fn write(&mut self, text: &str, now: Instant, transitions: &mut Vec<SaveStatus>) {
        self.set_status(SaveStatus::Saving, transitions);

        let result = if text.is_empty() {
            self.store.remove(&self.key)
        } else {
            self.store.set(&self.key, text)
        };

        match result {
            Ok(()) => {
                tracing::debug!(key = %self.key, bytes = text.len(), "Draft persisted");
                self.set_status(SaveStatus::Saved, transitions);
            }
            Err(e) => {
                tracing::warn!(key = %self.key, "Failed to persist draft: {}", e);
                self.set_status(SaveStatus::Error, transitions);
            }
        }
        self.status_expires = Some(now + self.config.status_reset);
    }

    fn set_status(&mut self, status: SaveStatus, transitions: &mut Vec<SaveStatus>) {
        if self.status != status {
            self.status = status;
            transitions.push(status);
        }
    }
}
