use std::path::PathBuf;

use fltk::{
    app::Sender,
    enums::FrameType,
    prelude::*,
    tree::{Tree, TreeItem, TreeReason, TreeSelect},
};

use crate::app::domain::messages::Message;
use crate::app::domain::workspace::WorkspaceItem;
use crate::app::services::workspace_fs::relative_to_root;

pub fn build_tree(sender: &Sender<Message>) -> Tree {
    let mut tree = Tree::default();
    tree.set_frame(FrameType::FlatBox);
    tree.set_show_root(false);
    tree.set_select_mode(TreeSelect::Single);
    tree.set_root_label("Workspace");

    let s = *sender;
    tree.set_callback(move |t| {
        if t.callback_reason() != TreeReason::Selected {
            return;
        }
        let Some(item) = t.callback_item() else {
            return;
        };
        // Folders only expand and collapse
        if item.has_children() {
            return;
        }
        if let Some(rel) = item_relative_path(&item) {
            s.send(Message::WorkspaceOpen(rel));
        }
    });
    tree
}

/// Replace the tree contents with the files under `root`.
pub fn populate(tree: &mut Tree, root: &WorkspaceItem) {
    tree.clear();
    for file in root.files() {
        let rel = relative_to_root(&root.path, &file.path);
        // FLTK treats '/' as a separator and '\' as an escape
        tree.add(&rel.replace('\\', "\\\\"));
    }
    tree.set_root_label(&root.name);
    tree.redraw();
}

pub fn clear(tree: &mut Tree) {
    tree.clear();
    tree.redraw();
}

/// Labels from just below the root down to `item`, joined as a path.
fn item_relative_path(item: &TreeItem) -> Option<PathBuf> {
    let mut parts = Vec::new();
    let mut current = Some(item.clone());
    while let Some(node) = current {
        if node.is_root() {
            break;
        }
        parts.push(node.label()?);
        current = node.parent();
    }
    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.iter().collect())
}
