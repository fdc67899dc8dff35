//! Local edits applied to an [`ItemTree`] before (or instead of) a backend
//! round-trip.
//!
//! Each function touches only the tree it is given. The caller owns the
//! snapshot used for rollback and the request sent to the backend.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::folder::item::{Expansion, FolderItem, ItemId};
use crate::folder::path;
use crate::folder::tree::ItemTree;

/// Copy keeps the originals; Move prunes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
}

impl TransferMode {
    pub fn label(self) -> &'static str {
        match self {
            TransferMode::Copy => "Copy",
            TransferMode::Move => "Move",
        }
    }
}

/// Confirmation prompt for deleting `count` items.
pub fn delete_prompt(count: usize) -> String {
    if count == 1 {
        "Delete this item?".to_string()
    } else {
        format!("Delete these {} items?", count)
    }
}

/// Check a proposed name for a new or renamed item under `parent`.
///
/// `current` is the name being replaced, if any.
pub fn validate_name(
    tree: &ItemTree,
    parent: &str,
    name: &str,
    current: Option<&str>,
) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if current == Some(name) {
        return Err(ValidationError::UnchangedName);
    }
    if name.contains('/') {
        return Err(ValidationError::InvalidCharacter);
    }
    // A case-only rename of the same item is not a collision.
    let same_item = current.is_some_and(|c| c.eq_ignore_ascii_case(name));
    if !same_item && tree.contains_name(parent, name) {
        return Err(ValidationError::DuplicateName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Remove every item in `ids` from every loaded level. Returns what was removed.
pub fn delete(tree: &mut ItemTree, ids: &[ItemId]) -> Vec<FolderItem> {
    let targets: HashSet<&ItemId> = ids.iter().collect();
    let mut removed = Vec::new();
    prune(&mut tree.items, &targets, &mut removed);
    removed
}

fn prune(items: &mut Vec<FolderItem>, targets: &HashSet<&ItemId>, removed: &mut Vec<FolderItem>) {
    let mut kept = Vec::with_capacity(items.len());
    for mut item in items.drain(..) {
        if targets.contains(&item.id) {
            removed.push(item);
            continue;
        }
        if let Some(children) = &mut item.children {
            prune(children, targets, removed);
        }
        kept.push(item);
    }
    *items = kept;
}

/// Rename one item in place, rebasing its subtree's paths.
pub fn rename(tree: &mut ItemTree, id: &ItemId, new_name: &str) -> Result<(), ValidationError> {
    let (old_path, old_name) = {
        let item = tree.find_by_id(id).ok_or(ValidationError::MissingItem)?;
        (item.path.clone(), item.name.clone())
    };
    let parent = path::parent(&old_path).unwrap_or("/").to_string();
    let new_name = validate_name(tree, &parent, new_name, Some(&old_name))?;

    let item = tree.find_by_id_mut(id).ok_or(ValidationError::MissingItem)?;
    let new_path = path::join(&parent, &new_name);
    item.name = new_name;
    item.rebase_prefix(&old_path, &new_path);

    let (sort_by, folders_first) = (tree.sort_by, tree.folders_first);
    if let Some(siblings) = tree.children_at_mut(&parent) {
        ItemTree::sort_items(siblings, sort_by, folders_first);
    }
    Ok(())
}

/// Copy or move `ids` under `dest`.
///
/// Returns the items as they now exist under the destination (cloned for
/// Copy, the originals for Move). The destination is either the tree root,
/// a loaded folder found by exact path, or an unloaded folder, in which case
/// nothing is inserted locally and the next expansion fetches it.
pub fn transfer(
    tree: &mut ItemTree,
    ids: &[ItemId],
    dest: &str,
    mode: TransferMode,
) -> Result<Vec<FolderItem>, ValidationError> {
    let dest = path::normalize(dest);
    let mut sources = Vec::with_capacity(ids.len());
    for id in ids {
        let item = tree.find_by_id(id).ok_or(ValidationError::MissingItem)?;
        if item.is_folder() && path::is_within(&dest, &item.path) {
            return Err(ValidationError::DestinationInsideSource);
        }
        sources.push(item.clone());
    }
    // A folder carries its selected descendants along.
    let source_paths: Vec<String> = sources.iter().map(|s| s.path.clone()).collect();
    let outer = path::outermost(&source_paths);
    sources.retain(|item| outer.contains(&item.path));

    if mode == TransferMode::Move {
        delete(tree, ids);
    }

    let mut taken: Vec<String> = tree
        .children_at(&dest)
        .map(|children| children.iter().map(|c| c.name.to_lowercase()).collect())
        .unwrap_or_default();

    let mut placed = Vec::with_capacity(sources.len());
    for mut item in sources {
        if mode == TransferMode::Copy {
            item.regenerate_ids();
        }
        let name = unique_name(&item.name, &taken);
        taken.push(name.to_lowercase());
        let old_path = item.path.clone();
        item.name = name;
        let new_path = path::join(&dest, &item.name);
        item.rebase_prefix(&old_path, &new_path);
        placed.push(item);
    }

    let (sort_by, folders_first) = (tree.sort_by, tree.folders_first);
    if let Some(children) = tree.children_at_mut(&dest) {
        children.extend(placed.iter().cloned());
        ItemTree::sort_items(children, sort_by, folders_first);
    } else if let Some(folder) = tree.find_by_path_mut(&dest) {
        // Known but never expanded: leave it unloaded so the next expand fetches it.
        folder.expansion = Expansion::Unloaded;
    }
    Ok(placed)
}

/// Resolve a name collision by appending ` (copy)`, ` (copy 2)`, etc.
pub fn unique_name(name: &str, taken: &[String]) -> String {
    if !taken.contains(&name.to_lowercase()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    };

    for i in 1..=1000 {
        let suffix = if i == 1 {
            " (copy)".to_string()
        } else {
            format!(" (copy {})", i)
        };
        let candidate = match ext {
            Some(e) => format!("{}{}.{}", stem, suffix, e),
            None => format!("{}{}", stem, suffix),
        };
        if !taken.contains(&candidate.to_lowercase()) {
            return candidate;
        }
    }

    name.to_string()
}

/// Insert a new, empty folder under `parent`.
pub fn insert_folder(
    tree: &mut ItemTree,
    parent: &str,
    name: &str,
) -> Result<FolderItem, ValidationError> {
    let name = validate_name(tree, parent, name, None)?;
    let mut folder = FolderItem::folder(ItemId::generate().0, parent, &name);
    folder.children = Some(Vec::new());
    folder.expansion = Expansion::Collapsed;

    let (sort_by, folders_first) = (tree.sort_by, tree.folders_first);
    match tree.children_at_mut(parent) {
        Some(children) => {
            children.push(folder.clone());
            ItemTree::sort_items(children, sort_by, folders_first);
        }
        None => {
            if let Some(node) = tree.find_by_path_mut(parent) {
                node.expansion = Expansion::Unloaded;
            }
        }
    }
    Ok(folder)
}

/// Set (or clear) a folder's icon. Returns the previous icon.
pub fn change_icon(
    tree: &mut ItemTree,
    id: &ItemId,
    icon: Option<String>,
) -> Result<Option<String>, ValidationError> {
    let item = tree.find_by_id_mut(id).ok_or(ValidationError::MissingItem)?;
    Ok(std::mem::replace(&mut item.icon, icon))
}

/// Record a comment that the backend accepted.
pub fn record_comment(tree: &mut ItemTree, id: &ItemId) {
    if let Some(item) = tree.find_by_id_mut(id) {
        item.comment_count += 1;
    }
}
