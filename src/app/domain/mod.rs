//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Application settings
//! - Conversion requests, responses and errors
//! - Pane layout state
//! - User notifications
//! - Workspace file tree
//! - Message types for the event system

pub mod conversion;
pub mod layout;
pub mod messages;
pub mod notification;
pub mod settings;
pub mod workspace;

pub use conversion::{
    Backend, ConversionError, ConversionOptions, ConversionTarget, DownloadDescriptor,
};
pub use layout::{LayoutState, ViewMode};
pub use messages::Message;
pub use notification::{Notification, NotificationLevel};
pub use settings::{AppSettings, ThemeMode};
pub use workspace::{ItemKind, WorkspaceItem};
