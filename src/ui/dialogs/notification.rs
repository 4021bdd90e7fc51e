use fltk::{
    button::Button,
    enums::{Align, Font},
    frame::Frame,
    group::{Flex, FlexType},
    prelude::*,
    text::{TextBuffer, TextDisplay, WrapMode},
    window::Window,
};

use crate::app::domain::notification::Notification;

/// Show a notification with its full diagnostic text (server stderr and
/// stdout for failed conversions) in a scrollable, selectable view.
pub fn show_notification_dialog(note: &Notification) {
    let mut dialog = Window::default()
        .with_size(640, 420)
        .with_label("Details")
        .center_screen();
    dialog.make_modal(true);

    let mut flex = Flex::new(10, 10, 620, 400, None);
    flex.set_type(FlexType::Column);
    flex.set_spacing(8);

    let mut title = Frame::default();
    title.set_label(&note.title);
    title.set_label_font(Font::HelveticaBold);
    title.set_label_size(14);
    title.set_align(Align::Left | Align::Inside | Align::Wrap);
    flex.fixed(&title, 40);

    let mut buffer = TextBuffer::default();
    buffer.set_text(note.detail.as_deref().unwrap_or("No further details."));
    let mut display = TextDisplay::default();
    display.set_buffer(buffer);
    display.set_text_font(Font::Courier);
    display.set_text_size(12);
    display.wrap_mode(WrapMode::AtBounds, 0);

    let mut close_btn = Button::default().with_label("Close");
    flex.fixed(&close_btn, 30);

    flex.end();
    dialog.end();
    dialog.make_resizable(true);

    let mut dialog_close = dialog.clone();
    close_btn.set_callback(move |_| {
        dialog_close.hide();
    });

    dialog.show();
    super::run_dialog(&dialog);
}
