use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    button::{Button, CheckButton},
    enums::{Align, Color},
    frame::Frame,
    input::Input,
    menu::Choice,
    prelude::*,
    window::Window,
};

use crate::app::domain::conversion::{Backend, ConversionOptions, ConversionTarget};

/// Ask which format to produce and with which options. Returns `None` if the
/// user cancelled.
pub fn show_convert_dialog(
    initial: ConversionTarget,
    options: &ConversionOptions,
) -> Option<(ConversionTarget, ConversionOptions)> {
    let mut dialog = Window::default()
        .with_size(380, 280)
        .with_label("Convert")
        .center_screen();
    dialog.make_modal(true);

    Frame::default().with_pos(15, 15).with_size(350, 25).with_label("Format:").with_align(Align::Left | Align::Inside);
    let mut target_choice = Choice::default().with_pos(30, 40).with_size(320, 25);
    for target in ConversionTarget::all() {
        target_choice.add_choice(target.display_name());
    }
    target_choice.set_value(target_index(initial));

    // Marp options
    Frame::default().with_pos(15, 75).with_size(350, 25).with_label("Slide theme (Marp):").with_align(Align::Left | Align::Inside);
    let mut theme_input = Input::default().with_pos(30, 100).with_size(320, 25);
    theme_input.set_value(options.theme.as_deref().unwrap_or(""));
    theme_input.set_tooltip("default, gaia, uncover, or a custom theme name");

    // Pandoc options
    Frame::default().with_pos(15, 135).with_size(350, 25).with_label("Document options (Pandoc):").with_align(Align::Left | Align::Inside);
    let mut check_toc = CheckButton::default().with_pos(30, 160).with_size(320, 25).with_label("Table of contents");
    check_toc.set_value(options.toc);
    let mut check_numbers = CheckButton::default().with_pos(30, 185).with_size(320, 25).with_label("Number sections");
    check_numbers.set_value(options.number_sections);

    let mut hint = Frame::default().with_pos(30, 212).with_size(320, 20);
    hint.set_label("The result is kept until you download it.");
    hint.set_label_size(11);
    hint.set_label_color(Color::from_rgb(100, 100, 100));
    hint.set_align(Align::Left | Align::Inside);

    let mut convert_btn = Button::default().with_pos(170, 240).with_size(90, 30).with_label("Convert");
    let mut cancel_btn = Button::default().with_pos(270, 240).with_size(90, 30).with_label("Cancel");

    dialog.end();

    let sync_options = {
        let mut theme_input = theme_input.clone();
        let mut check_toc = check_toc.clone();
        let mut check_numbers = check_numbers.clone();
        move |target: Option<ConversionTarget>| {
            let marp = matches!(target.map(|t| t.backend()), Some(Backend::Marp));
            if marp {
                theme_input.activate();
                check_toc.deactivate();
                check_numbers.deactivate();
            } else {
                theme_input.deactivate();
                check_toc.activate();
                check_numbers.activate();
            }
        }
    };
    let mut sync_initial = sync_options.clone();
    sync_initial(Some(initial));
    let mut sync_on_change = sync_options;
    target_choice.set_callback(move |c| sync_on_change(index_to_target(c.value())));

    dialog.show();

    let result = Rc::new(RefCell::new(None));
    let result_convert = result.clone();
    let dialog_convert = dialog.clone();
    convert_btn.set_callback(move |_| {
        let Some(target) = index_to_target(target_choice.value()) else {
            return;
        };
        let theme = theme_input.value();
        let chosen = match target.backend() {
            Backend::Marp => ConversionOptions {
                theme: Some(theme.trim().to_string()).filter(|t| !t.is_empty()),
                ..Default::default()
            },
            Backend::Pandoc => ConversionOptions {
                toc: check_toc.value(),
                number_sections: check_numbers.value(),
                ..Default::default()
            },
        };
        *result_convert.borrow_mut() = Some((target, chosen));
        dialog_convert.clone().hide();
    });

    let result_cancel = result.clone();
    let dialog_cancel = dialog.clone();
    cancel_btn.set_callback(move |_| {
        *result_cancel.borrow_mut() = None;
        dialog_cancel.clone().hide();
    });

    super::run_dialog(&dialog);

    result.borrow().clone()
}

/// Convert ConversionTarget to dropdown index
fn target_index(target: ConversionTarget) -> i32 {
    ConversionTarget::all()
        .iter()
        .position(|t| *t == target)
        .map(|i| i as i32)
        .unwrap_or(0)
}

/// Convert dropdown index to ConversionTarget
fn index_to_target(index: i32) -> Option<ConversionTarget> {
    if index < 0 {
        return None;
    }
    ConversionTarget::all().get(index as usize).copied()
}
