use fltk::{
    app::Sender,
    enums::{Align, Color, Event, FrameType},
    frame::Frame,
    group::{Flex, FlexType},
    menu::MenuBar,
    misc::HelpView,
    prelude::*,
    text::{TextBuffer, TextEditor},
    tree::Tree,
    window::Window,
};

use super::workspace_tree;
use crate::app::domain::messages::Message;

pub const MENU_HEIGHT: i32 = 30;
pub const BANNER_HEIGHT: i32 = 30;
pub const STATUS_HEIGHT: i32 = 22;
pub const SIDEBAR_WIDTH: i32 = 220;

pub struct MainWidgets {
    pub wind: Window,
    pub flex: Flex,
    pub menu: MenuBar,
    pub banner_frame: Frame,
    pub body: Flex,
    pub sidebar: Tree,
    pub buffer: TextBuffer,
    pub text_editor: TextEditor,
    pub preview: HelpView,
    pub status_frame: Frame,
}

pub fn build_main_window(sender: &Sender<Message>) -> MainWidgets {
    let mut wind = Window::new(100, 100, 1100, 720, "Untitled - MarkPress");
    wind.set_xclass("MarkPress");

    let mut flex = Flex::new(0, 0, 1100, 720, None);
    flex.set_type(FlexType::Column);

    let menu = MenuBar::new(0, 0, 0, MENU_HEIGHT, "");
    flex.fixed(&menu, MENU_HEIGHT);

    // Notification banner (initially hidden). Clicking it opens the details.
    let mut banner_frame = Frame::default().with_size(0, 0);
    banner_frame.set_frame(FrameType::FlatBox);
    banner_frame.set_color(Color::from_rgb(255, 250, 205));
    banner_frame.set_label_color(Color::Black);
    banner_frame.set_label_size(13);
    banner_frame.set_align(Align::Left | Align::Inside);
    banner_frame.hide();
    banner_frame.handle({
        let s = *sender;
        move |_, event| match event {
            Event::Push => {
                s.send(Message::ShowNotificationDetail);
                true
            }
            _ => false,
        }
    });
    flex.fixed(&banner_frame, 0);

    // Body row: workspace tree | editor | preview
    let mut body = Flex::default();
    body.set_type(FlexType::Row);
    body.set_spacing(2);

    let sidebar = workspace_tree::build_tree(sender);
    body.fixed(&sidebar, SIDEBAR_WIDTH);

    let buffer = TextBuffer::default();
    let mut text_editor = TextEditor::default();
    text_editor.set_buffer(buffer.clone());
    text_editor.set_linenumber_bgcolor(Color::from_rgb(240, 240, 240));
    text_editor.set_linenumber_fgcolor(Color::from_rgb(100, 100, 100));

    let preview = HelpView::default();
    body.end();

    let mut status_frame = Frame::default();
    status_frame.set_frame(FrameType::FlatBox);
    status_frame.set_align(Align::Left | Align::Inside);
    status_frame.set_label_size(12);
    flex.fixed(&status_frame, STATUS_HEIGHT);

    flex.end();
    wind.end();
    wind.resizable(&flex);

    MainWidgets {
        wind,
        flex,
        menu,
        banner_frame,
        body,
        sidebar,
        buffer,
        text_editor,
        preview,
        status_frame,
    }
}
