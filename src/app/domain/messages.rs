use std::path::PathBuf;

use super::conversion::{ConversionError, ConversionTarget, DownloadDescriptor};

/// All messages that can be sent through the FLTK channel.
/// Menu callbacks, timers and worker threads send these; the dispatch loop
/// in main hands them to `AppState`.
#[derive(Debug, Clone)]
pub enum Message {
    // File
    FileNew,
    FileOpen,
    FileSave,
    FileSaveAs,
    OpenFolder,
    PrintPreview,
    FileQuit,
    WindowClose,

    // Workspace. Paths are relative to the workspace root.
    WorkspaceOpen(PathBuf),
    WorkspaceNewFile,
    WorkspaceRefresh,

    // Editor
    BufferModified,
    AutosaveTick,
    PreviewTick,

    // Convert
    Convert(ConversionTarget),
    ConvertAgain,
    ConversionFinished(Result<DownloadDescriptor, ConversionError>),
    DownloadResult,
    DownloadFinished(Result<PathBuf, String>),

    // View
    ToggleEditor,
    TogglePreview,
    ToggleSidebar,
    ToggleDarkMode,
    ToggleLineNumbers,
    ToggleWordWrap,

    // Settings & Help
    OpenSettings,
    ShowAbout,

    // Notification banner
    ShowNotificationDetail,
}
