//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (settings, messages, conversion, layout, workspace)
//! - `services/` - Business operations (draft store, autosave, converter, print, preview)
//! - `controllers/` - Orchestration between services and the UI
//! - `infrastructure/` - External integrations (HTTP, logging, platform, FLTK buffer, error)
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use domain::{
    AppSettings, ConversionOptions, ConversionTarget, DownloadDescriptor, LayoutState, Message,
    Notification, ThemeMode, ViewMode,
};
pub use infrastructure::error::{AppError, Result};
pub use services::autosave::{AutosaveConfig, DraftAutosaver, SaveStatus};
pub use services::draft_store::{DRAFT_KEY, FileStore, KeyValueStore, MemoryStore};
