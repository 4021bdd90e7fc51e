//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - FLTK buffer utilities
//! - HTTP transport for the conversion service
//! - Logging setup
//! - Platform-specific detection
//! - Error types

pub mod buffer;
pub mod error;
pub mod http;
pub mod logging;
pub mod platform;
