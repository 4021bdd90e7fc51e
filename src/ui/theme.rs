use fltk::{
    enums::Color,
    frame::Frame,
    menu::MenuBar,
    misc::HelpView,
    prelude::*,
    text::TextEditor,
    tree::Tree,
    window::Window,
};

use crate::app::domain::notification::NotificationLevel;

/// Widgets recolored on a theme switch.
pub struct ThemedWidgets<'a> {
    pub editor: &'a mut TextEditor,
    pub window: &'a mut Window,
    pub menu: &'a mut MenuBar,
    pub sidebar: &'a mut Tree,
    pub preview: &'a mut HelpView,
    pub status: &'a mut Frame,
}

pub fn apply_theme(widgets: &mut ThemedWidgets, is_dark: bool) {
    let ThemedWidgets {
        editor,
        window,
        menu,
        sidebar,
        preview,
        status,
    } = widgets;

    if is_dark {
        editor.set_color(Color::from_rgb(30, 30, 30));
        editor.set_text_color(Color::from_rgb(220, 220, 220));
        editor.set_cursor_color(Color::from_rgb(255, 255, 255));
        editor.set_selection_color(Color::from_rgb(70, 70, 100));
        editor.set_linenumber_bgcolor(Color::from_rgb(40, 40, 40));
        editor.set_linenumber_fgcolor(Color::from_rgb(150, 150, 150));
        window.set_color(Color::from_rgb(25, 25, 25));
        window.set_label_color(Color::from_rgb(220, 220, 220));
        menu.set_color(Color::from_rgb(35, 35, 35));
        menu.set_text_color(Color::from_rgb(220, 220, 220));
        menu.set_selection_color(Color::from_rgb(60, 60, 60)); // Hover color
        sidebar.set_color(Color::from_rgb(37, 37, 38));
        sidebar.set_item_label_fgcolor(Color::from_rgb(204, 204, 204));
        sidebar.set_connector_color(Color::from_rgb(90, 90, 90));
        sidebar.set_selection_color(Color::from_rgb(55, 55, 80));
        preview.set_color(Color::from_rgb(30, 30, 30));
        preview.set_text_color(Color::from_rgb(220, 220, 220));
        status.set_color(Color::from_rgb(35, 35, 35));
        status.set_label_color(Color::from_rgb(180, 180, 180));
    } else {
        editor.set_color(Color::White);
        editor.set_text_color(Color::Black);
        editor.set_cursor_color(Color::Black);
        editor.set_selection_color(Color::from_rgb(173, 216, 230));
        editor.set_linenumber_bgcolor(Color::from_rgb(240, 240, 240));
        editor.set_linenumber_fgcolor(Color::from_rgb(100, 100, 100));
        window.set_color(Color::from_rgb(240, 240, 240));
        window.set_label_color(Color::Black);
        menu.set_color(Color::from_rgb(240, 240, 240));
        menu.set_text_color(Color::Black);
        menu.set_selection_color(Color::from_rgb(200, 200, 200)); // Hover color
        sidebar.set_color(Color::from_rgb(247, 247, 247));
        sidebar.set_item_label_fgcolor(Color::from_rgb(40, 40, 40));
        sidebar.set_connector_color(Color::from_rgb(170, 170, 170));
        sidebar.set_selection_color(Color::from_rgb(173, 216, 230));
        preview.set_color(Color::White);
        preview.set_text_color(Color::Black);
        status.set_color(Color::from_rgb(230, 230, 230));
        status.set_label_color(Color::from_rgb(70, 70, 70));
    }

    editor.redraw();
    window.redraw();
    menu.redraw();
    sidebar.redraw();
    preview.redraw();
    status.redraw();
}

/// Banner colors per notification level.
pub fn apply_banner_theme(banner: &mut Frame, level: NotificationLevel, is_dark: bool) {
    let (bg, fg) = match (level, is_dark) {
        (NotificationLevel::Error, false) => (Color::from_rgb(253, 226, 226), Color::from_rgb(130, 20, 20)),
        (NotificationLevel::Error, true) => (Color::from_rgb(110, 30, 30), Color::White),
        (NotificationLevel::Success, false) => (Color::from_rgb(221, 244, 222), Color::from_rgb(20, 90, 30)),
        (NotificationLevel::Success, true) => (Color::from_rgb(30, 90, 45), Color::White),
        (NotificationLevel::Info, false) => (Color::from_rgb(255, 250, 205), Color::Black), // Lemon chiffon
        (NotificationLevel::Info, true) => (Color::from_rgb(139, 128, 0), Color::White), // Darker yellow/olive
    };
    banner.set_color(bg);
    banner.set_label_color(fg);
    banner.redraw();
}

/// Set Windows title bar theme (Windows 10 build 1809+)
/// Must be called AFTER window.show() to have a valid HWND
#[cfg(target_os = "windows")]
pub fn set_windows_titlebar_theme(window: &Window, is_dark: bool) {
    use std::mem::size_of;
    use std::ptr::from_ref;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::Graphics::Dwm::{DWMWINDOWATTRIBUTE, DwmSetWindowAttribute};

    unsafe {
        let hwnd = HWND(window.raw_handle() as *mut std::ffi::c_void);
        let on: i32 = if is_dark { 1 } else { 0 };

        // 20 is DWMWA_USE_IMMERSIVE_DARK_MODE; 19 is the pre-2004 value
        for attribute in [20, 19] {
            let _ = DwmSetWindowAttribute(
                hwnd,
                DWMWINDOWATTRIBUTE(attribute),
                from_ref(&on).cast(),
                size_of::<i32>() as u32,
            );
        }
    }
}
