use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use fltk::{app, enums::Event, prelude::*};

use mark_press::app::domain::messages::Message;
use mark_press::app::domain::settings::{AppSettings, ThemeMode};
use mark_press::app::infrastructure::logging::init_logging;
use mark_press::app::infrastructure::platform::detect_system_dark_mode;
use mark_press::app::services::draft_store::FileStore;
use mark_press::app::services::print::{open_print_view, resolve_print_source};
use mark_press::app::state::AppState;
use mark_press::ui::main_window::build_main_window;
use mark_press::ui::menu::build_menu;

const USAGE: &str = "\
Usage: MarkPress [FILE]
       MarkPress --print [FILE]

  FILE           Markdown file to open. Without it the last draft is restored.
  --print        Open the print view for FILE (or the stored draft) and exit.
  -h, --help     Show this help.
  -V, --version  Show the version.";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Edit(Option<PathBuf>),
    Print(Option<PathBuf>),
    Help,
    Version,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let mut print = false;
    let mut file = None;

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--print" | "-p" => print = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("Unknown option: {}", flag));
            }
            path => {
                if file.is_some() {
                    return Err("Only one file can be given".to_string());
                }
                file = Some(PathBuf::from(path));
            }
        }
    }

    Ok(if print { Command::Print(file) } else { Command::Edit(file) })
}

/// Print view from the command line: the file's content wins, else the
/// stored draft.
fn run_print(file: Option<PathBuf>) -> ExitCode {
    let content = match file {
        Some(path) => match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::error!(path = %path.display(), "Cannot read file: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let store = FileStore::open_default();
    let source = resolve_print_source(content.as_deref(), &store);
    if source.trim().is_empty() {
        tracing::warn!("Nothing to print: no file given and no stored draft");
    }

    match open_print_view(&source) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_editor(file: Option<PathBuf>) -> ExitCode {
    let app = app::App::default().with_scheme(app::Scheme::Gtk);

    let settings = AppSettings::load();
    let dark_mode = match settings.theme_mode {
        ThemeMode::Light => false,
        ThemeMode::Dark => true,
        ThemeMode::SystemDefault => detect_system_dark_mode(),
    };

    let (sender, receiver) = app::channel::<Message>();

    let mut widgets = build_main_window(&sender);
    build_menu(&mut widgets.menu, &sender, &settings, dark_mode);
    widgets.wind.set_callback({
        let s = sender;
        move |_| {
            // Escape also triggers the window callback; only a real close quits
            if app::event() == Event::Close {
                s.send(Message::WindowClose);
            }
        }
    });

    let initial = settings.clone();
    let settings = Rc::new(RefCell::new(settings));
    let mut state = AppState::new(widgets, sender, settings, dark_mode);

    state.window.show();
    state.apply_settings(initial);
    state.restore_workspace();

    match file {
        Some(path) => state.open_file(path),
        None => {
            state.restore_draft();
        }
    }
    state.update_window_title();
    state.update_status();

    while app.wait() {
        let Some(msg) = receiver.recv() else {
            continue;
        };
        match msg {
            Message::FileNew => state.file_new(),
            Message::FileOpen => state.file_open(),
            Message::FileSave => state.file_save(),
            Message::FileSaveAs => state.file_save_as(),
            Message::OpenFolder => state.open_folder(),
            Message::PrintPreview => state.print_preview(),
            Message::FileQuit | Message::WindowClose => {
                if state.file_quit() {
                    app.quit();
                }
            }

            Message::WorkspaceOpen(path) => state.workspace_open(path),
            Message::WorkspaceNewFile => state.workspace_new_file(),
            Message::WorkspaceRefresh => state.refresh_workspace(),

            Message::BufferModified => state.handle_buffer_modified(),
            Message::AutosaveTick => state.handle_autosave_tick(),
            Message::PreviewTick => state.handle_preview_tick(),

            Message::Convert(target) => state.convert(target),
            Message::ConvertAgain => state.convert_again(),
            Message::ConversionFinished(result) => state.conversion_finished(result),
            Message::DownloadResult => state.download_result(),
            Message::DownloadFinished(result) => state.download_finished(result),

            Message::ToggleEditor => state.toggle_editor(),
            Message::TogglePreview => state.toggle_preview(),
            Message::ToggleSidebar => state.toggle_sidebar(),
            Message::ToggleDarkMode => state.toggle_dark_mode(),
            Message::ToggleLineNumbers => state.toggle_line_numbers(),
            Message::ToggleWordWrap => state.toggle_word_wrap(),

            Message::OpenSettings => state.open_settings(),
            Message::ShowAbout => state.show_about(),

            Message::ShowNotificationDetail => state.show_notification_detail(),
        }
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    init_logging();

    match parse_args(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            println!("{}", USAGE);
            ExitCode::SUCCESS
        }
        Ok(Command::Version) => {
            println!("MarkPress {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Ok(Command::Print(file)) => run_print(file),
        Ok(Command::Edit(file)) => run_editor(file),
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_restores_draft() {
        assert_eq!(parse_args(args(&[])), Ok(Command::Edit(None)));
    }

    #[test]
    fn test_file_argument() {
        assert_eq!(
            parse_args(args(&["notes.md"])),
            Ok(Command::Edit(Some(PathBuf::from("notes.md"))))
        );
    }

    #[test]
    fn test_print_with_and_without_file() {
        assert_eq!(parse_args(args(&["--print"])), Ok(Command::Print(None)));
        assert_eq!(
            parse_args(args(&["talk.md", "--print"])),
            Ok(Command::Print(Some(PathBuf::from("talk.md"))))
        );
    }

    #[test]
    fn test_rejects_unknown_flag_and_extra_files() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["a.md", "b.md"])).is_err());
    }

    #[test]
    fn test_help_wins() {
        assert_eq!(parse_args(args(&["a.md", "--help"])), Ok(Command::Help));
    }
}
