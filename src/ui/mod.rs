//! FLTK widgets and dialogs. Everything here builds widgets and forwards
//! user actions as `Message`s; behavior lives in `app::state`.

pub mod dialogs;
pub mod file_dialogs;
pub mod main_window;
pub mod menu;
pub mod theme;
pub mod workspace_tree;
