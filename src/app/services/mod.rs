//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - Draft key-value storage
//! - Debounced draft autosave
//! - Conversion service client
//! - Print view rendering
//! - Live preview rendering
//! - Workspace file tree scanning

pub mod autosave;
pub mod converter;
pub mod draft_store;
pub mod preview;
pub mod print;
pub mod workspace_fs;
