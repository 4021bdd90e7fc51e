use fltk::dialog::{FileDialogOptions, FileDialogType, NativeFileChooser};

/// FLTK adds "All Files" itself.
const MARKDOWN_FILTER: &str = "Markdown Files\t*.{md,markdown,mdown}";

fn run_chooser(
    kind: FileDialogType,
    title: &str,
    filter: Option<&str>,
    directory: Option<&str>,
    preset: Option<&str>,
) -> Option<String> {
    let mut nfc = NativeFileChooser::new(kind);
    nfc.set_title(title);
    if let Some(filter) = filter {
        nfc.set_filter(filter);
    }
    if let Some(dir) = directory {
        if let Err(e) = nfc.set_directory(&dir) {
            tracing::debug!("Ignoring dialog directory {}: {}", dir, e);
        }
    }
    if let Some(name) = preset {
        nfc.set_preset_file(name);
        nfc.set_option(FileDialogOptions::SaveAsConfirm);
    }
    nfc.show(); // blocks until close
    let filename = nfc.filename();
    let s = filename.to_string_lossy();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

pub fn native_open_dialog(directory: Option<&str>) -> Option<String> {
    run_chooser(FileDialogType::BrowseFile, "Open Markdown", Some(MARKDOWN_FILTER), directory, None)
}

pub fn native_save_dialog(directory: Option<&str>) -> Option<String> {
    run_chooser(FileDialogType::BrowseSaveFile, "Save As", Some(MARKDOWN_FILTER), directory, Some("Untitled.md"))
}

/// Save dialog for a converted document, prefilled with its file name.
pub fn native_download_dialog(directory: Option<&str>, filename: &str) -> Option<String> {
    run_chooser(FileDialogType::BrowseSaveFile, "Save Converted Document", None, directory, Some(filename))
}

pub fn native_folder_dialog(directory: Option<&str>) -> Option<String> {
    run_chooser(FileDialogType::BrowseDir, "Open Folder", None, directory, None)
}
