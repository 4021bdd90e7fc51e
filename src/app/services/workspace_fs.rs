use std::fs;
use std::path::{Path, PathBuf};

use super::preview::is_markdown_file;
use crate::app::domain::workspace::WorkspaceItem;
use crate::app::infrastructure::error::{AppError, Result};

/// Deep enough for any notes folder; stops runaway scans of a home directory.
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// Build the workspace tree for `root`.
///
/// Folders come before files, both sorted case-insensitively. Hidden entries
/// and non-markdown files are skipped, and folders with no markdown below
/// them are pruned.
pub fn scan(root: &Path, max_depth: usize) -> Result<WorkspaceItem> {
    if !root.is_dir() {
        return Err(AppError::Workspace(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    let children = scan_dir(root, max_depth)?;
    tracing::debug!(root = %root.display(), entries = children.len(), "Workspace scanned");
    Ok(WorkspaceItem::folder(root, children))
}

fn scan_dir(dir: &Path, depth_left: usize) -> Result<Vec<WorkspaceItem>> {
    let mut folders = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if depth_left == 0 {
                continue;
            }
            match scan_dir(&path, depth_left - 1) {
                Ok(children) if !children.is_empty() => {
                    folders.push(WorkspaceItem::folder(&path, children));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(path = %path.display(), "Skipping unreadable folder: {}", e),
            }
        } else if is_markdown_file(&name) {
            files.push(WorkspaceItem::file(&path));
        }
    }

    folders.sort_by_key(|f| f.name.to_lowercase());
    files.sort_by_key(|f| f.name.to_lowercase());
    folders.extend(files);
    Ok(folders)
}

pub fn read_item(item: &WorkspaceItem) -> Result<String> {
    if item.is_folder() {
        return Err(AppError::Workspace(format!(
            "{} is a folder",
            item.path.display()
        )));
    }
    Ok(fs::read_to_string(&item.path)?)
}

pub fn write_item(item: &WorkspaceItem, content: &str) -> Result<()> {
    if item.is_folder() {
        return Err(AppError::Workspace(format!(
            "{} is a folder",
            item.path.display()
        )));
    }
    fs::write(&item.path, content)?;
    Ok(())
}

/// Write `content` to `path`, through the workspace tree when the file is
/// one of its entries.
pub fn save_file(workspace: Option<&WorkspaceItem>, path: &Path, content: &str) -> Result<()> {
    match workspace.and_then(|root| root.find(path)) {
        Some(item) => write_item(item, content),
        None => {
            fs::write(path, content)?;
            Ok(())
        }
    }
}

/// Create an empty markdown file in `dir`, adding `.md` if the name has no
/// markdown extension. Never overwrites.
pub fn create_markdown_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(AppError::Workspace(format!("Invalid file name: {:?}", name)));
    }

    let file_name = if is_markdown_file(name) {
        name.to_string()
    } else {
        format!("{}.md", name)
    };
    let path = dir.join(file_name);

    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => {
                AppError::Workspace(format!("{} already exists", path.display()))
            }
            _ => AppError::Io(e),
        })?;
    Ok(path)
}

/// Path of `path` relative to the workspace root, with `/` separators.
/// Falls back to the full path when it lies outside the root.
pub fn relative_to_root(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().to_string(),
    }
}
