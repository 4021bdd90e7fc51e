use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    File,
}

/// A node in the workspace tree. File contents are read on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceItem {
    pub name: String,
    pub path: PathBuf,
    pub kind: ItemKind,
    pub children: Vec<WorkspaceItem>,
}

impl WorkspaceItem {
    pub fn folder(path: &Path, children: Vec<WorkspaceItem>) -> Self {
        Self {
            name: display_name(path),
            path: path.to_path_buf(),
            kind: ItemKind::Folder,
            children,
        }
    }

    pub fn file(path: &Path) -> Self {
        Self {
            name: display_name(path),
            path: path.to_path_buf(),
            kind: ItemKind::File,
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    /// All files below this node, depth first, in tree order.
    pub fn files(&self) -> Vec<&WorkspaceItem> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a WorkspaceItem>) {
        match self.kind {
            ItemKind::File => out.push(self),
            ItemKind::Folder => {
                for child in &self.children {
                    child.collect_files(out);
                }
            }
        }
    }

    pub fn find(&self, path: &Path) -> Option<&WorkspaceItem> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WorkspaceItem {
        WorkspaceItem::folder(
            Path::new("/notes"),
            vec![
                WorkspaceItem::folder(
                    Path::new("/notes/talks"),
                    vec![WorkspaceItem::file(Path::new("/notes/talks/rustconf.md"))],
                ),
                WorkspaceItem::file(Path::new("/notes/README.md")),
            ],
        )
    }

    #[test]
    fn test_names_come_from_last_component() {
        let root = sample();
        assert_eq!(root.name, "notes");
        assert_eq!(root.children[0].name, "talks");
        assert!(root.children[0].is_folder());
        assert!(!root.children[1].is_folder());
    }

    #[test]
    fn test_files_in_tree_order() {
        let root = sample();
        let names: Vec<&str> = root.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["rustconf.md", "README.md"]);
    }

    #[test]
    fn test_find_by_path() {
        let root = sample();
        let found = root.find(Path::new("/notes/talks/rustconf.md")).unwrap();
        assert_eq!(found.kind, ItemKind::File);
        assert!(root.find(Path::new("/elsewhere.md")).is_none());
    }
}
