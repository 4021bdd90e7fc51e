use fltk::{
    app::Sender,
    enums::Shortcut,
    menu::{MenuBar, MenuFlag},
    prelude::*,
};

use crate::app::domain::conversion::ConversionTarget;
use crate::app::domain::layout::LayoutState;
use crate::app::domain::messages::Message;
use crate::app::domain::settings::AppSettings;

fn toggle_flag(on: bool) -> MenuFlag {
    if on { MenuFlag::Toggle | MenuFlag::Value } else { MenuFlag::Toggle }
}

pub fn build_menu(
    menu: &mut MenuBar,
    sender: &Sender<Message>,
    settings: &AppSettings,
    initial_dark_mode: bool,
) {
    let s = sender;
    let layout: LayoutState = settings.layout();

    // File
    menu.add("File/New", Shortcut::Ctrl | 'n', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileNew) });
    menu.add("File/Open...", Shortcut::Ctrl | 'o', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileOpen) });
    menu.add("File/Open Folder...", Shortcut::Ctrl | Shortcut::Shift | 'o', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::OpenFolder) });
    menu.add("File/New File in Folder...", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::WorkspaceNewFile) });
    menu.add("File/Refresh Folder", Shortcut::None, MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::WorkspaceRefresh) });
    menu.add("File/Save", Shortcut::Ctrl | 's', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileSave) });
    menu.add("File/Save As...", Shortcut::Ctrl | Shortcut::Shift | 's', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::FileSaveAs) });
    menu.add("File/Print Preview", Shortcut::Ctrl | 'p', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::PrintPreview) });
    menu.add("File/Settings...", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::OpenSettings) });
    menu.add("File/Quit", Shortcut::Ctrl | 'q', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileQuit) });

    // Convert
    for target in ConversionTarget::all() {
        let target = *target;
        let label = format!("Convert/{}...", target.display_name());
        menu.add(&label, Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::Convert(target)) });
    }
    menu.add("Convert/Convert Again", Shortcut::Ctrl | 'e', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::ConvertAgain) });
    menu.add("Convert/Download Last Result...", Shortcut::Ctrl | Shortcut::Shift | 'd', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::DownloadResult) });

    // View
    menu.add("View/Toggle Editor", Shortcut::Ctrl | '1', toggle_flag(layout.editor_visible()), { let s = *s; move |_| s.send(Message::ToggleEditor) });
    menu.add("View/Toggle Preview", Shortcut::Ctrl | '2', toggle_flag(layout.preview_visible()), { let s = *s; move |_| s.send(Message::TogglePreview) });
    menu.add("View/Toggle Sidebar", Shortcut::Ctrl | 'b', toggle_flag(layout.sidebar_visible), { let s = *s; move |_| s.send(Message::ToggleSidebar) });
    menu.add("View/Toggle Dark Mode", Shortcut::None, toggle_flag(initial_dark_mode), { let s = *s; move |_| s.send(Message::ToggleDarkMode) });
    menu.add("View/Toggle Line Numbers", Shortcut::None, toggle_flag(settings.line_numbers_enabled), { let s = *s; move |_| s.send(Message::ToggleLineNumbers) });
    menu.add("View/Toggle Word Wrap", Shortcut::None, toggle_flag(settings.word_wrap_enabled), { let s = *s; move |_| s.send(Message::ToggleWordWrap) });

    // Help
    menu.add("Help/About MarkPress", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ShowAbout) });
}
