//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the UI:
//! - Draft autosave scheduling
//! - Conversion requests and downloads
//! - Live preview refresh

pub mod autosave;
pub mod conversion;
pub mod preview;
