use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::folder::path;

/// Stable identity of a folder or file, independent of its current path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    /// Fresh client-side id for folders created or copied locally.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Type of node in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    File,
}

/// Lazy-load state of a folder's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    /// Children never fetched.
    #[default]
    Unloaded,
    /// A fetch is in flight.
    Loading,
    /// Children loaded, hidden.
    Collapsed,
    /// Children loaded, shown.
    Expanded,
}

impl Expansion {
    pub fn is_loaded(self) -> bool {
        matches!(self, Expansion::Collapsed | Expansion::Expanded)
    }
}

/// Capabilities granted on an item. Each flag gates one context-menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_move: bool,
    pub can_copy: bool,
    pub can_download: bool,
    pub can_comment: bool,
    pub can_change_icon: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self::all()
    }
}

impl Permissions {
    pub fn all() -> Self {
        Self {
            can_view: true,
            can_edit: true,
            can_delete: true,
            can_move: true,
            can_copy: true,
            can_download: true,
            can_comment: true,
            can_change_icon: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            can_view: true,
            can_download: true,
            ..Self::none()
        }
    }

    pub fn none() -> Self {
        Self {
            can_view: false,
            can_edit: false,
            can_delete: false,
            can_move: false,
            can_copy: false,
            can_download: false,
            can_comment: false,
            can_change_icon: false,
        }
    }

    /// Capabilities held by both sides.
    pub fn meet(self, other: Self) -> Self {
        Self {
            can_view: self.can_view && other.can_view,
            can_edit: self.can_edit && other.can_edit,
            can_delete: self.can_delete && other.can_delete,
            can_move: self.can_move && other.can_move,
            can_copy: self.can_copy && other.can_copy,
            can_download: self.can_download && other.can_download,
            can_comment: self.can_comment && other.can_comment,
            can_change_icon: self.can_change_icon && other.can_change_icon,
        }
    }
}

/// A folder or file in the displayed hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderItem {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Full logical address; always `parent.path + "/" + name`.
    pub path: String,
    pub icon: Option<String>,
    /// `None` until the folder has been loaded. Always `None` for files.
    pub children: Option<Vec<FolderItem>>,
    pub expansion: Expansion,
    pub permissions: Permissions,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub comment_count: usize,
}

impl FolderItem {
    pub fn folder(id: impl Into<String>, parent: &str, name: &str) -> Self {
        Self {
            id: ItemId(id.into()),
            name: name.to_string(),
            kind: ItemKind::Folder,
            path: path::join(parent, name),
            icon: None,
            children: None,
            expansion: Expansion::Unloaded,
            permissions: Permissions::all(),
            created_at: None,
            updated_at: None,
            comment_count: 0,
        }
    }

    pub fn file(id: impl Into<String>, parent: &str, name: &str) -> Self {
        Self {
            kind: ItemKind::File,
            ..Self::folder(id, parent, name)
        }
    }

    /// Attach loaded children (builder style, for fixtures).
    #[cfg(test)]
    pub fn with_children(mut self, children: Vec<FolderItem>) -> Self {
        self.children = Some(children);
        self.expansion = Expansion::Collapsed;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    /// Recompute this item's path and all loaded descendants' paths under a
    /// new parent.
    #[cfg(test)]
    pub fn rebase_under(&mut self, new_parent: &str) {
        let old = self.path.clone();
        let new = path::join(new_parent, &self.name);
        self.rebase_prefix(&old, &new);
    }

    /// Replace `old` with `new` in this subtree's paths.
    pub fn rebase_prefix(&mut self, old: &str, new: &str) {
        self.path = path::rebase(&self.path, old, new);
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                child.rebase_prefix(old, new);
            }
        }
    }

    /// Give this node and every loaded descendant a fresh id.
    pub fn regenerate_ids(&mut self) {
        self.id = ItemId::generate();
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                child.regenerate_ids();
            }
        }
    }

    /// Depth-first walk over this node and its loaded descendants.
    #[cfg(test)]
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a FolderItem>) {
        out.push(self);
        if let Some(children) = &self.children {
            for child in children {
                child.walk(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FolderItem {
        FolderItem::folder("a", "/Root", "A").with_children(vec![
            FolderItem::file("x", "/Root/A", "x"),
            FolderItem::folder("b", "/Root/A", "B")
                .with_children(vec![FolderItem::file("y", "/Root/A/B", "y")]),
        ])
    }

    #[test]
    fn constructors_build_paths() {
        let item = FolderItem::file("1", "/Root", "report.pdf");
        assert_eq!(item.path, "/Root/report.pdf");
        assert_eq!(item.kind, ItemKind::File);
        assert!(item.children.is_none());
    }

    #[test]
    fn rebase_under_rewrites_descendants() {
        let mut item = sample();
        item.rebase_under("/Root/Dest");
        let mut all = Vec::new();
        item.walk(&mut all);
        let paths: Vec<&str> = all.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/Root/Dest/A",
                "/Root/Dest/A/x",
                "/Root/Dest/A/B",
                "/Root/Dest/A/B/y"
            ]
        );
    }

    #[test]
    fn regenerate_ids_touches_every_node() {
        let mut item = sample();
        item.regenerate_ids();
        let mut all = Vec::new();
        item.walk(&mut all);
        for node in all {
            assert!(!["a", "x", "b", "y"].contains(&node.id.0.as_str()));
        }
    }

    #[test]
    fn permissions_meet_is_intersection() {
        let mut limited = Permissions::all();
        limited.can_delete = false;
        let met = Permissions::all().meet(limited);
        assert!(!met.can_delete);
        assert!(met.can_move);
        assert_eq!(Permissions::read_only().meet(Permissions::all()), Permissions::read_only());
    }

    #[test]
    fn expansion_loaded_states() {
        assert!(!Expansion::Unloaded.is_loaded());
        assert!(!Expansion::Loading.is_loaded());
        assert!(Expansion::Collapsed.is_loaded());
        assert!(Expansion::Expanded.is_loaded());
    }
}
