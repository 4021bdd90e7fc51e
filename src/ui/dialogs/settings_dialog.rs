use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    button::{Button, CheckButton, RadioRoundButton},
    enums::{Align, Color},
    frame::Frame,
    group::Group,
    input::{Input, IntInput},
    prelude::*,
    window::Window,
};

use crate::app::domain::settings::{AppSettings, ThemeMode};
use crate::app::services::autosave::AutosaveConfig;

/// Show settings dialog and return updated settings if user clicked Save.
pub fn show_settings_dialog(current_settings: &AppSettings) -> Option<AppSettings> {
    let mut dialog = Window::default()
        .with_size(350, 520)
        .with_label("Settings")
        .center_screen();
    dialog.make_modal(true);

    // Theme section
    Frame::default().with_pos(15, 15).with_size(320, 25).with_label("Theme:").with_align(Align::Left | Align::Inside);
    let theme_group = Group::default().with_pos(30, 45).with_size(280, 75);
    let mut theme_light = RadioRoundButton::default().with_pos(30, 45).with_size(280, 25).with_label("Light");
    let mut theme_dark = RadioRoundButton::default().with_pos(30, 70).with_size(280, 25).with_label("Dark");
    let mut theme_system = RadioRoundButton::default().with_pos(30, 95).with_size(280, 25).with_label("System Default");
    theme_group.end();

    match current_settings.theme_mode {
        ThemeMode::Light => theme_light.set_value(true),
        ThemeMode::Dark => theme_dark.set_value(true),
        ThemeMode::SystemDefault => theme_system.set_value(true),
    }

    // Font size section
    Frame::default().with_pos(15, 130).with_size(320, 25).with_label("Font Size:").with_align(Align::Left | Align::Inside);
    let size_group = Group::default().with_pos(30, 160).with_size(280, 75);
    let mut size_12 = RadioRoundButton::default().with_pos(30, 160).with_size(280, 25).with_label("Small (12)");
    let mut size_16 = RadioRoundButton::default().with_pos(30, 185).with_size(280, 25).with_label("Medium (16)");
    let mut size_20 = RadioRoundButton::default().with_pos(30, 210).with_size(280, 25).with_label("Large (20)");
    size_group.end();

    match current_settings.font_size {
        12 => size_12.set_value(true),
        20 => size_20.set_value(true),
        _ => size_16.set_value(true),
    }

    // View options section
    Frame::default().with_pos(15, 245).with_size(320, 25).with_label("View Options:").with_align(Align::Left | Align::Inside);
    let mut check_line_numbers = CheckButton::default().with_pos(30, 275).with_size(280, 25).with_label("Show Line Numbers");
    let mut check_word_wrap = CheckButton::default().with_pos(30, 300).with_size(280, 25).with_label("Word Wrap");
    check_line_numbers.set_value(current_settings.line_numbers_enabled);
    check_word_wrap.set_value(current_settings.word_wrap_enabled);

    // Conversion server
    Frame::default().with_pos(15, 335).with_size(320, 25).with_label("Conversion Server URL:").with_align(Align::Left | Align::Inside);
    let mut server_input = Input::default().with_pos(30, 360).with_size(290, 25);
    server_input.set_value(&current_settings.server_url);

    // Autosave
    Frame::default().with_pos(15, 395).with_size(320, 25).with_label("Draft Autosave Delay (ms):").with_align(Align::Left | Align::Inside);
    let mut delay_input = IntInput::default().with_pos(30, 420).with_size(100, 25);
    delay_input.set_value(&current_settings.autosave_delay_ms.to_string());

    let mut info_frame = Frame::default().with_pos(140, 420).with_size(180, 25);
    info_frame.set_label("500 to 1000");
    info_frame.set_label_size(11);
    info_frame.set_label_color(Color::from_rgb(100, 100, 100));
    info_frame.set_align(Align::Left | Align::Inside);

    // Buttons at bottom
    let mut save_btn = Button::default().with_pos(150, 480).with_size(90, 30).with_label("Save");
    let mut cancel_btn = Button::default().with_pos(250, 480).with_size(90, 30).with_label("Cancel");

    dialog.end();
    dialog.show();

    let result = Rc::new(RefCell::new(None));
    let result_save = result.clone();
    let result_cancel = result.clone();

    let dialog_save = dialog.clone();
    let current = current_settings.clone();
    save_btn.set_callback(move |_| {
        let delay_ms = delay_input
            .value()
            .trim()
            .parse::<u64>()
            .unwrap_or(current.autosave_delay_ms);
        // Store the clamped value so the file shows what is actually used
        let delay = AutosaveConfig::from_millis(delay_ms, current.status_reset_ms).delay;
        let server_url = server_input.value().trim().trim_end_matches('/').to_string();

        let new_settings = AppSettings {
            theme_mode: if theme_light.value() {
                ThemeMode::Light
            } else if theme_dark.value() {
                ThemeMode::Dark
            } else {
                ThemeMode::SystemDefault
            },
            font_size: if size_12.value() {
                12
            } else if size_20.value() {
                20
            } else {
                16
            },
            line_numbers_enabled: check_line_numbers.value(),
            word_wrap_enabled: check_word_wrap.value(),
            server_url: if server_url.is_empty() {
                current.server_url.clone()
            } else {
                server_url
            },
            autosave_delay_ms: delay.as_millis() as u64,
            ..current.clone()
        };

        *result_save.borrow_mut() = Some(new_settings);
        dialog_save.clone().hide();
    });

    let dialog_cancel = dialog.clone();
    cancel_btn.set_callback(move |_| {
        *result_cancel.borrow_mut() = None;
        dialog_cancel.clone().hide();
    });

    let result_close = result.clone();
    dialog.set_callback(move |w| {
        *result_close.borrow_mut() = None;
        w.hide();
    });

    super::run_dialog(&dialog);

    result.borrow().clone()
}
