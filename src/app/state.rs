use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fltk::{
    app::Sender,
    dialog,
    frame::Frame,
    group::Flex,
    menu::MenuBar,
    misc::HelpView,
    prelude::*,
    text::{TextBuffer, TextEditor, WrapMode},
    tree::Tree,
    window::Window,
};

use super::controllers::autosave::AutosaveController;
use super::controllers::conversion::ConversionController;
use super::controllers::preview::PreviewController;
use super::domain::conversion::{ConversionError, ConversionOptions, ConversionTarget, DownloadDescriptor};
use super::domain::layout::LayoutState;
use super::domain::messages::Message;
use super::domain::notification::Notification;
use super::domain::settings::{AppSettings, ThemeMode};
use super::domain::workspace::WorkspaceItem;
use super::infrastructure::buffer::buffer_text;
use super::infrastructure::http::MinreqTransport;
use super::infrastructure::platform::detect_system_dark_mode;
use super::services::autosave::{AutosaveConfig, SaveStatus};
use super::services::converter::ConversionClient;
use super::services::draft_store::FileStore;
use super::services::print::{open_print_view, resolve_print_source};
use super::services::workspace_fs::{self, DEFAULT_MAX_DEPTH};
use crate::ui::dialogs::about::show_about_dialog;
use crate::ui::dialogs::convert::show_convert_dialog;
use crate::ui::dialogs::notification::show_notification_dialog;
use crate::ui::dialogs::settings_dialog::show_settings_dialog;
use crate::ui::file_dialogs::{
    native_download_dialog, native_folder_dialog, native_open_dialog, native_save_dialog,
};
use crate::ui::main_window::{BANNER_HEIGHT, MainWidgets, SIDEBAR_WIDTH};
use crate::ui::theme::{ThemedWidgets, apply_banner_theme, apply_theme};
#[cfg(target_os = "windows")]
use crate::ui::theme::set_windows_titlebar_theme;
use crate::ui::workspace_tree;

pub struct AppState {
    pub window: Window,
    pub menu: MenuBar,
    pub flex: Flex,
    pub body: Flex,
    pub banner_frame: Frame,
    pub status_frame: Frame,
    pub sidebar: Tree,
    pub editor: TextEditor,
    pub buffer: TextBuffer,
    pub preview: HelpView,
    pub sender: Sender<Message>,
    pub settings: Rc<RefCell<AppSettings>>,
    pub dark_mode: bool,
    pub show_linenumbers: bool,
    pub word_wrap: bool,
    pub layout: LayoutState,
    pub autosave: AutosaveController,
    pub preview_ctl: PreviewController,
    pub conversion: ConversionController,
    /// File backing the editor, `None` for an untitled draft.
    pub file_path: Option<PathBuf>,
    /// Unsaved relative to `file_path`. The draft store is separate.
    pub dirty: bool,
    pub workspace: Option<WorkspaceItem>,
    pub notification: Option<Notification>,
    /// Last directory used in a file open/save dialog.
    pub last_open_directory: Option<String>,
    /// Set while the editor text is replaced programmatically so the modify
    /// callback does not report it as an edit.
    loading: Rc<Cell<bool>>,
}

impl AppState {
    pub fn new(
        widgets: MainWidgets,
        sender: Sender<Message>,
        settings: Rc<RefCell<AppSettings>>,
        dark_mode: bool,
    ) -> Self {
        let MainWidgets {
            wind,
            flex,
            menu,
            banner_frame,
            body,
            sidebar,
            mut buffer,
            text_editor,
            preview,
            status_frame,
        } = widgets;

        let loading = Rc::new(Cell::new(false));
        {
            let loading = loading.clone();
            let s = sender;
            buffer.add_modify_callback(move |_pos, inserted, deleted, _restyled, _deleted_text| {
                if (inserted > 0 || deleted > 0) && !loading.get() {
                    s.send(Message::BufferModified);
                }
            });
        }

        let (config, layout, show_linenumbers, word_wrap) = {
            let s = settings.borrow();
            (
                AutosaveConfig::from_millis(s.autosave_delay_ms, s.status_reset_ms),
                s.layout(),
                s.line_numbers_enabled,
                s.word_wrap_enabled,
            )
        };

        Self {
            window: wind,
            menu,
            flex,
            body,
            banner_frame,
            status_frame,
            sidebar,
            editor: text_editor,
            buffer,
            preview,
            sender,
            settings,
            dark_mode,
            show_linenumbers,
            word_wrap,
            layout,
            autosave: AutosaveController::new(FileStore::open_default(), config),
            preview_ctl: PreviewController::new(),
            conversion: ConversionController::new(),
            file_path: None,
            dirty: false,
            workspace: None,
            notification: None,
            last_open_directory: None,
            loading,
        }
    }

    pub fn editor_text(&self) -> String {
        buffer_text(&self.buffer)
    }

    /// Replace the editor contents without treating it as an edit.
    fn set_editor_text(&mut self, text: &str) {
        self.loading.set(true);
        self.buffer.set_text(text);
        self.loading.set(false);
        self.editor.set_insert_position(0);
        self.editor.show_insert_position();
        self.update_linenumber_width();
        self.preview_ctl.invalidate();
        self.refresh_preview();
    }

    pub fn update_window_title(&mut self) {
        let name = self
            .file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string());
        let prefix = if self.dirty { "*" } else { "" };
        self.window.set_label(&format!("{}{} - MarkPress", prefix, name));
    }

    pub fn update_status(&mut self) {
        let location = match (&self.file_path, &self.workspace) {
            (Some(path), Some(root)) if path.starts_with(&root.path) => {
                workspace_fs::relative_to_root(&root.path, path)
            }
            (Some(path), _) => path.display().to_string(),
            (None, _) => "Untitled draft".to_string(),
        };
        let status = self.autosave.status();
        let draft = if status == SaveStatus::Idle {
            String::new()
        } else {
            format!("{}   |   ", status.label())
        };
        let busy = if self.conversion.is_busy() { "   |   Converting..." } else { "" };
        self.status_frame.set_label(&format!("  {}{}{}", draft, location, busy));
        self.status_frame.redraw();
    }

    // --- Startup ---

    /// Put the stored draft back into the editor. Returns false if there was
    /// nothing to restore.
    pub fn restore_draft(&mut self) -> bool {
        let Some(draft) = self.autosave.stored_draft() else {
            return false;
        };
        self.set_editor_text(&draft);
        self.file_path = None;
        self.dirty = false;
        self.update_window_title();
        self.notify(Notification::info("Restored your unsaved draft"));
        tracing::info!(bytes = draft.len(), "Draft restored");
        true
    }

    pub fn restore_workspace(&mut self) {
        let root = self.settings.borrow().workspace_root.clone();
        if let Some(root) = root {
            let root = PathBuf::from(root);
            if root.is_dir() {
                self.load_workspace(root);
            }
        }
    }

    // --- Editing ---

    pub fn handle_buffer_modified(&mut self) {
        if !self.dirty {
            self.dirty = true;
            self.update_window_title();
        }
        let text = self.editor_text();
        self.autosave.record_edit(text, &self.sender);
        self.update_status();
        self.update_linenumber_width();
        self.preview_ctl.schedule(&self.sender);
    }

    pub fn handle_autosave_tick(&mut self) {
        if self.autosave.tick(&self.sender).is_some() {
            self.update_status();
        }
    }

    pub fn handle_preview_tick(&mut self) {
        self.preview_ctl.timer_fired();
        self.refresh_preview();
    }

    fn refresh_preview(&mut self) {
        if !self.layout.preview_visible() {
            return;
        }
        let text = self.editor_text();
        if let Some(html) = self.preview_ctl.render(&text, self.dark_mode) {
            let top = self.preview.top_line();
            self.preview.set_value(&html);
            self.preview.set_top_line(top);
        }
    }

    // --- File operations ---

    /// Ask what to do with unsaved work. `replacing` is true when the editor
    /// content is about to be swapped out, false on exit. Returns false to
    /// abort.
    fn confirm_discard(&mut self, replacing: bool) -> bool {
        let text = self.editor_text();
        let Some(question) = discard_prompt(self.dirty, self.file_path.is_some(), &text, replacing)
        else {
            return true;
        };
        let choice = dialog::choice2_default(question, "Save", "Discard", "Cancel");
        match choice {
            Some(0) => {
                self.file_save();
                // Save As may have been cancelled
                self.file_path.is_some() && !self.dirty
            }
            Some(1) => true,
            _ => false,
        }
    }

    pub fn open_file(&mut self, path: PathBuf) {
        // Remember the parent directory for future open/save dialogs
        if let Some(parent) = path.parent() {
            self.last_open_directory = Some(parent.to_string_lossy().to_string());
        }
        match fs::read_to_string(&path) {
            Ok(content) => {
                tracing::info!(path = %path.display(), "Opened file");
                self.set_editor_text(&content);
                self.file_path = Some(path);
                self.dirty = false;
                self.update_window_title();
                self.update_status();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to open: {}", e);
                dialog::alert_default(&format!("Error opening file: {}", e));
            }
        }
    }

    pub fn file_new(&mut self) {
        if !self.confirm_discard(true) {
            return;
        }
        self.set_editor_text("");
        self.file_path = None;
        self.dirty = false;
        // An empty editor clears the stored draft
        self.autosave.record_edit(String::new(), &self.sender);
        self.update_window_title();
        self.update_status();
    }

    pub fn file_open(&mut self) {
        if !self.confirm_discard(true) {
            return;
        }
        if let Some(path) = native_open_dialog(self.last_open_directory.as_deref()) {
            self.open_file(PathBuf::from(path));
        }
    }

    pub fn file_save(&mut self) {
        let Some(path) = self.file_path.clone() else {
            self.file_save_as();
            return;
        };
        let text = self.editor_text();
        match workspace_fs::save_file(self.workspace.as_ref(), &path, &text) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Saved file");
                self.dirty = false;
                self.update_window_title();
            }
            Err(e) => dialog::alert_default(&format!("Error saving file: {}", e)),
        }
    }

    pub fn file_save_as(&mut self) {
        let Some(path) = native_save_dialog(self.last_open_directory.as_deref()) else {
            return;
        };
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            self.last_open_directory = Some(parent.to_string_lossy().to_string());
        }
        let text = self.editor_text();
        match workspace_fs::save_file(self.workspace.as_ref(), &path, &text) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Saved file");
                let in_workspace = self
                    .workspace
                    .as_ref()
                    .is_some_and(|root| path.starts_with(&root.path));
                self.file_path = Some(path);
                self.dirty = false;
                self.update_window_title();
                self.update_status();
                if in_workspace {
                    self.refresh_workspace();
                }
            }
            Err(e) => dialog::alert_default(&format!("Error saving file: {}", e)),
        }
    }

    /// Handle quit request. Returns `true` if the app should exit.
    pub fn file_quit(&mut self) -> bool {
        if !self.confirm_discard(false) {
            return false;
        }
        if let Some(SaveStatus::Error) = self.autosave.flush() {
            let choice = dialog::choice2_default(
                "The draft could not be saved and will be lost.",
                "Quit Anyway",
                "Cancel",
                "",
            );
            if choice != Some(0) {
                return false;
            }
        }
        tracing::info!("Quitting");
        true
    }

    // --- Workspace ---

    pub fn open_folder(&mut self) {
        let start = self
            .workspace
            .as_ref()
            .map(|w| w.path.to_string_lossy().to_string())
            .or_else(|| self.last_open_directory.clone());
        if let Some(dir) = native_folder_dialog(start.as_deref()) {
            self.load_workspace(PathBuf::from(dir));
        }
    }

    fn load_workspace(&mut self, root: PathBuf) {
        match workspace_fs::scan(&root, DEFAULT_MAX_DEPTH) {
            Ok(tree) => {
                tracing::info!(root = %root.display(), files = tree.files().len(), "Workspace opened");
                workspace_tree::populate(&mut self.sidebar, &tree);
                self.workspace = Some(tree);
                {
                    let mut s = self.settings.borrow_mut();
                    s.workspace_root = Some(root.to_string_lossy().to_string());
                    if let Err(e) = s.save() {
                        tracing::warn!("Failed to save settings: {}", e);
                    }
                }
                if !self.layout.sidebar_visible {
                    self.toggle_sidebar();
                }
                self.update_status();
            }
            Err(e) => self.notify(Notification::error(
                "Could not open folder",
                Some(e.to_string()),
            )),
        }
    }

    pub fn refresh_workspace(&mut self) {
        match self.workspace.as_ref().map(|w| w.path.clone()) {
            Some(root) => self.load_workspace(root),
            None => {
                workspace_tree::clear(&mut self.sidebar);
                self.notify(Notification::info("Open a folder first (File > Open Folder)"));
            }
        }
    }

    pub fn workspace_open(&mut self, relative: PathBuf) {
        let Some(root) = self.workspace.as_ref() else {
            return;
        };
        let path = root.path.join(&relative);
        let Some(item) = root.find(&path).cloned() else {
            tracing::debug!(path = %path.display(), "Selection is not a workspace file");
            return;
        };
        if self.file_path.as_deref() == Some(item.path.as_path()) {
            return;
        }
        if !self.confirm_discard(true) {
            return;
        }
        match workspace_fs::read_item(&item) {
            Ok(content) => {
                self.set_editor_text(&content);
                self.file_path = Some(item.path);
                self.dirty = false;
                self.update_window_title();
                self.update_status();
            }
            Err(e) => self.notify(Notification::error(
                format!("Could not open {}", item.name),
                Some(e.to_string()),
            )),
        }
    }

    pub fn workspace_new_file(&mut self) {
        let Some(root) = self.workspace.as_ref().map(|w| w.path.clone()) else {
            self.notify(Notification::info("Open a folder first (File > Open Folder)"));
            return;
        };
        let Some(name) = dialog::input_default("New markdown file name:", "untitled.md") else {
            return;
        };
        if !self.confirm_discard(true) {
            return;
        }
        match workspace_fs::create_markdown_file(&root, &name) {
            Ok(path) => {
                self.refresh_workspace();
                self.open_file(path);
            }
            Err(e) => self.notify(Notification::error(
                "Could not create file",
                Some(e.to_string()),
            )),
        }
    }

    // --- Print ---

    pub fn print_preview(&mut self) {
        let text = self.editor_text();
        let source = resolve_print_source(Some(text.as_str()), self.autosave.store());
        match open_print_view(&source) {
            Ok(_) => self.notify(Notification::info("Print view opened in your browser")),
            Err(e) => self.notify(Notification::error(
                "Could not open the print view",
                Some(e.to_string()),
            )),
        }
    }

    // --- Conversion ---

    pub fn convert(&mut self, target: ConversionTarget) {
        let options = self.settings.borrow().conversion_options(target);
        let Some((target, options)) = show_convert_dialog(target, &options) else {
            return;
        };
        {
            let mut s = self.settings.borrow_mut();
            s.remember_conversion(target, &options);
            if let Err(e) = s.save() {
                tracing::warn!("Failed to save settings: {}", e);
            }
        }
        self.start_conversion(target, options);
    }

    pub fn convert_again(&mut self) {
        let (target, options) = {
            let s = self.settings.borrow();
            (s.last_target, s.conversion_options(s.last_target))
        };
        self.start_conversion(target, options);
    }

    fn start_conversion(&mut self, target: ConversionTarget, options: ConversionOptions) {
        let markdown = self.editor_text();
        if let Err(note) = self.conversion.begin(&markdown, target) {
            self.notify(note);
            return;
        }
        self.notify(Notification::info(format!(
            "Converting to {}...",
            target.display_name()
        )));
        self.update_status();

        let base_url = self.settings.borrow().effective_server_url();
        let s = self.sender;
        std::thread::spawn(move || {
            let client = ConversionClient::new(MinreqTransport::default(), base_url);
            let result = client.convert(&markdown, target, &options);
            s.send(Message::ConversionFinished(result));
        });
    }

    pub fn conversion_finished(&mut self, result: Result<DownloadDescriptor, ConversionError>) {
        let note = self.conversion.finish(result);
        self.notify(note);
        self.update_status();
    }

    pub fn download_result(&mut self) {
        let Some(filename) = self
            .conversion
            .download_descriptor()
            .map(|d| d.filename.clone())
        else {
            self.notify(Notification::info("No converted document to download yet"));
            return;
        };
        let Some(dest) = native_download_dialog(self.last_open_directory.as_deref(), &filename)
        else {
            return;
        };
        let descriptor = match self.conversion.begin_download() {
            Ok(d) => d,
            Err(note) => {
                self.notify(note);
                return;
            }
        };

        let base_url = self.settings.borrow().effective_server_url();
        let dest = PathBuf::from(dest);
        let s = self.sender;
        std::thread::spawn(move || {
            let client = ConversionClient::new(MinreqTransport::default(), base_url);
            let result = client
                .download_to(&descriptor, &dest)
                .map_err(|e| e.to_string());
            s.send(Message::DownloadFinished(result));
        });
    }

    pub fn download_finished(&mut self, result: Result<PathBuf, String>) {
        let note = self.conversion.finish_download(result);
        self.notify(note);
    }

    // --- Notifications ---

    pub fn notify(&mut self, note: Notification) {
        if note.is_error() {
            tracing::warn!(detail = ?note.detail, "{}", note.title);
        } else {
            tracing::info!("{}", note.title);
        }
        let hint = if note.detail.is_some() {
            "  (click for details)"
        } else {
            "  (click to dismiss)"
        };
        self.banner_frame.set_label(&format!("  {}{}", note.title, hint));
        apply_banner_theme(&mut self.banner_frame, note.level, self.dark_mode);
        self.banner_frame.show();
        self.flex.fixed(&self.banner_frame, BANNER_HEIGHT);
        self.window.redraw();
        self.notification = Some(note);
    }

    pub fn show_notification_detail(&mut self) {
        if let Some(note) = self.notification.clone() {
            if note.detail.is_some() {
                show_notification_dialog(&note);
            }
        }
        self.dismiss_banner();
    }

    fn dismiss_banner(&mut self) {
        self.notification = None;
        self.banner_frame.hide();
        self.flex.fixed(&self.banner_frame, 0);
        self.window.redraw();
    }

    // --- View toggles ---

    pub fn apply_layout(&mut self) {
        if self.layout.sidebar_visible {
            self.sidebar.show();
        } else {
            self.sidebar.hide();
        }
        if self.layout.editor_visible() {
            self.editor.show();
        } else {
            self.editor.hide();
        }
        if self.layout.preview_visible() {
            self.preview.show();
        } else {
            self.preview.hide();
        }
        let width = if self.layout.sidebar_visible { SIDEBAR_WIDTH } else { 0 };
        self.body.fixed(&self.sidebar, width);
        self.update_menu_checkbox("View/Toggle Editor", self.layout.editor_visible());
        self.update_menu_checkbox("View/Toggle Preview", self.layout.preview_visible());
        self.update_menu_checkbox("View/Toggle Sidebar", self.layout.sidebar_visible);
        self.window.redraw();
    }

    fn persist_layout(&mut self) {
        let mut s = self.settings.borrow_mut();
        s.set_layout(self.layout);
        if let Err(e) = s.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    pub fn toggle_editor(&mut self) {
        self.layout.toggle_editor();
        self.apply_layout();
        self.persist_layout();
        self.refresh_preview();
    }

    pub fn toggle_preview(&mut self) {
        self.layout.toggle_preview();
        self.apply_layout();
        self.persist_layout();
        self.refresh_preview();
    }

    pub fn toggle_sidebar(&mut self) {
        self.layout.toggle_sidebar();
        self.apply_layout();
        self.persist_layout();
    }

    pub fn update_linenumber_width(&mut self) {
        if !self.show_linenumbers {
            self.editor.set_linenumber_width(0);
            return;
        }
        let line_count = self.buffer.count_lines(0, self.buffer.length());
        let digits = ((line_count + 1) as f64).log10().floor() as i32 + 1;
        let width = (digits * 8 + 16).max(40);
        self.editor.set_linenumber_width(width);
    }

    pub fn toggle_line_numbers(&mut self) {
        self.show_linenumbers = !self.show_linenumbers;
        self.update_linenumber_width();
        self.editor.redraw();
        let mut s = self.settings.borrow_mut();
        s.line_numbers_enabled = self.show_linenumbers;
        if let Err(e) = s.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    fn apply_word_wrap(&mut self) {
        if self.word_wrap {
            self.editor.wrap_mode(WrapMode::AtBounds, 0);
        } else {
            self.editor.wrap_mode(WrapMode::None, 0);
        }
        self.editor.redraw();
    }

    pub fn toggle_word_wrap(&mut self) {
        self.word_wrap = !self.word_wrap;
        self.apply_word_wrap();
        let mut s = self.settings.borrow_mut();
        s.word_wrap_enabled = self.word_wrap;
        if let Err(e) = s.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    fn apply_current_theme(&mut self) {
        apply_theme(
            &mut ThemedWidgets {
                editor: &mut self.editor,
                window: &mut self.window,
                menu: &mut self.menu,
                sidebar: &mut self.sidebar,
                preview: &mut self.preview,
                status: &mut self.status_frame,
            },
            self.dark_mode,
        );
        if let Some(level) = self.notification.as_ref().map(|n| n.level) {
            apply_banner_theme(&mut self.banner_frame, level, self.dark_mode);
        }
        #[cfg(target_os = "windows")]
        set_windows_titlebar_theme(&self.window, self.dark_mode);
        self.update_menu_checkbox("View/Toggle Dark Mode", self.dark_mode);
        self.refresh_preview();
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.apply_current_theme();
        let mut s = self.settings.borrow_mut();
        s.theme_mode = if self.dark_mode { ThemeMode::Dark } else { ThemeMode::Light };
        if let Err(e) = s.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    // --- Settings ---

    pub fn open_settings(&mut self) {
        let current = self.settings.borrow().clone();
        if let Some(new_settings) = show_settings_dialog(&current) {
            if let Err(e) = new_settings.save() {
                dialog::alert_default(&format!("Failed to save settings: {}", e));
                return;
            }
            self.apply_settings(new_settings);
        }
    }

    pub fn apply_settings(&mut self, new_settings: AppSettings) {
        self.dark_mode = match new_settings.theme_mode {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::SystemDefault => detect_system_dark_mode(),
        };

        self.editor.set_text_size(new_settings.font_size as i32);

        self.show_linenumbers = new_settings.line_numbers_enabled;
        self.update_linenumber_width();
        self.update_menu_checkbox("View/Toggle Line Numbers", self.show_linenumbers);

        self.word_wrap = new_settings.word_wrap_enabled;
        self.apply_word_wrap();
        self.update_menu_checkbox("View/Toggle Word Wrap", self.word_wrap);

        self.autosave.set_config(AutosaveConfig::from_millis(
            new_settings.autosave_delay_ms,
            new_settings.status_reset_ms,
        ));

        self.layout = new_settings.layout();
        *self.settings.borrow_mut() = new_settings;

        self.apply_layout();
        self.apply_current_theme();
    }

    pub fn show_about(&self) {
        let url = self.settings.borrow().effective_server_url();
        show_about_dialog(&url);
    }

    fn update_menu_checkbox(&self, path: &str, checked: bool) {
        let idx = self.menu.find_index(path);
        if idx >= 0 {
            if let Some(mut item) = self.menu.at(idx) {
                if checked {
                    item.set();
                } else {
                    item.clear();
                }
            }
        }
    }
}

/// Question to ask before unsaved work is lost, or `None` when nothing is at
/// risk. An untitled draft stays in the draft store on exit, so it only
/// needs a prompt when the editor is about to be replaced.
fn discard_prompt(dirty: bool, has_file: bool, text: &str, replacing: bool) -> Option<&'static str> {
    if has_file {
        dirty.then_some("You have unsaved changes.")
    } else if replacing && !text.trim().is_empty() {
        Some("This draft has not been saved to a file and will be replaced.")
    } else {
        None
    }
}
