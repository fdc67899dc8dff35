use std::cmp::Ordering;

use crate::folder::item::{Expansion, FolderItem, ItemId, ItemKind};
use crate::folder::path;

/// Sort criteria for sibling lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Alphabetical (case-insensitive), default.
    Name,
    /// By creation time (newest first).
    Created,
    /// By last update (newest first).
    Updated,
}

impl SortBy {
    /// Parse sort_by from config string.
    pub fn from_config(s: &str) -> Self {
        match s {
            "created" => SortBy::Created,
            "updated" => SortBy::Updated,
            _ => SortBy::Name,
        }
    }

    /// Get the display label for the current sort.
    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Name => "Name",
            SortBy::Created => "Created",
            SortBy::Updated => "Updated",
        }
    }

    /// Cycle to the next sort option.
    pub fn next(&self) -> Self {
        match self {
            SortBy::Name => SortBy::Created,
            SortBy::Created => SortBy::Updated,
            SortBy::Updated => SortBy::Name,
        }
    }
}

/// What `toggle_expand` decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// First expansion (or forced): caller must fetch the folder's listing.
    NeedsLoad,
    /// A fetch for this folder is already in flight.
    Pending,
    /// Loaded folder flipped; the value is the new expanded state.
    Toggled(bool),
    NotAFolder,
    NotFound,
}

/// A flattened representation of a tree node for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: ItemId,
    pub name: String,
    pub path: String,
    pub kind: ItemKind,
    pub icon: Option<String>,
    pub depth: usize,
    pub expansion: Expansion,
    pub is_last_sibling: bool,
}

impl Row {
    fn from_item(item: &FolderItem, depth: usize, is_last_sibling: bool) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            path: item.path.clone(),
            kind: item.kind,
            icon: item.icon.clone(),
            depth,
            expansion: item.expansion,
            is_last_sibling,
        }
    }
}

/// The currently fetched slice of the hierarchy, rooted at `root_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTree {
    pub root_path: String,
    pub items: Vec<FolderItem>,
    pub sort_by: SortBy,
    pub folders_first: bool,
}

impl ItemTree {
    pub fn new(root_path: &str) -> Self {
        Self {
            root_path: path::normalize(root_path),
            items: Vec::new(),
            sort_by: SortBy::Name,
            folders_first: true,
        }
    }

    /// Start over at a new root; previously loaded items are discarded.
    pub fn reset(&mut self, root_path: &str) {
        self.root_path = path::normalize(root_path);
        self.items.clear();
    }

    /// Install a listing for `at`.
    ///
    /// A listing for the root replaces the top level. A listing for a loaded
    /// descendant folder becomes its children and expands it. Returns `false`
    /// when `at` is neither.
    pub fn load(&mut self, at: &str, mut listing: Vec<FolderItem>) -> bool {
        Self::sort_recursive(&mut listing, self.sort_by, self.folders_first);
        if at == self.root_path {
            self.items = listing;
            return true;
        }
        match self.find_by_path_mut(at) {
            Some(node) if node.is_folder() => {
                node.children = Some(listing);
                node.expansion = Expansion::Expanded;
                true
            }
            _ => false,
        }
    }

    /// Flip a folder's expansion, requesting a load the first time.
    pub fn toggle_expand(&mut self, at: &str, force: bool) -> ExpandOutcome {
        let Some(node) = self.find_by_path_mut(at) else {
            return ExpandOutcome::NotFound;
        };
        if !node.is_folder() {
            return ExpandOutcome::NotAFolder;
        }
        match node.expansion {
            Expansion::Loading => ExpandOutcome::Pending,
            Expansion::Unloaded => {
                node.expansion = Expansion::Loading;
                ExpandOutcome::NeedsLoad
            }
            _ if force => {
                node.expansion = Expansion::Loading;
                ExpandOutcome::NeedsLoad
            }
            Expansion::Collapsed => {
                node.expansion = Expansion::Expanded;
                ExpandOutcome::Toggled(true)
            }
            Expansion::Expanded => {
                node.expansion = Expansion::Collapsed;
                ExpandOutcome::Toggled(false)
            }
        }
    }

    /// A child fetch failed: allow a retry, keep whatever was already loaded.
    pub fn expand_failed(&mut self, at: &str) {
        if let Some(node) = self.find_by_path_mut(at) {
            node.expansion = if node.children.is_some() {
                Expansion::Collapsed
            } else {
                Expansion::Unloaded
            };
        }
    }

    /// Forget in-flight child fetches. Used after swapping in a saved tree,
    /// whose pending responses may never be applied.
    pub fn settle_loading(&mut self) {
        fn settle(items: &mut [FolderItem]) {
            for item in items {
                if item.expansion == Expansion::Loading {
                    item.expansion = if item.children.is_some() {
                        Expansion::Collapsed
                    } else {
                        Expansion::Unloaded
                    };
                }
                if let Some(children) = item.children.as_mut() {
                    settle(children);
                }
            }
        }
        settle(&mut self.items);
    }

    /// Find a reference to a node by path.
    pub fn find_by_path(&self, target: &str) -> Option<&FolderItem> {
        Self::find_in(&self.items, &|item| item.path == target)
    }

    /// Find a mutable reference to a node by path.
    pub fn find_by_path_mut(&mut self, target: &str) -> Option<&mut FolderItem> {
        Self::find_in_mut(&mut self.items, &|item| item.path == target)
    }

    pub fn find_by_id(&self, id: &ItemId) -> Option<&FolderItem> {
        Self::find_in(&self.items, &|item| &item.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: &ItemId) -> Option<&mut FolderItem> {
        Self::find_in_mut(&mut self.items, &|item| &item.id == id)
    }

    fn find_in<'a>(
        items: &'a [FolderItem],
        pred: &dyn Fn(&FolderItem) -> bool,
    ) -> Option<&'a FolderItem> {
        for item in items {
            if pred(item) {
                return Some(item);
            }
            if let Some(children) = &item.children {
                if let Some(found) = Self::find_in(children, pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn find_in_mut<'a>(
        items: &'a mut [FolderItem],
        pred: &dyn Fn(&FolderItem) -> bool,
    ) -> Option<&'a mut FolderItem> {
        for item in items.iter_mut() {
            if pred(item) {
                return Some(item);
            }
            if let Some(children) = &mut item.children {
                if let Some(found) = Self::find_in_mut(children, pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// The sibling list that lives at `parent`: the top level for the root,
    /// a loaded folder's children otherwise.
    pub fn children_at_mut(&mut self, parent: &str) -> Option<&mut Vec<FolderItem>> {
        if parent == self.root_path {
            return Some(&mut self.items);
        }
        self.find_by_path_mut(parent)
            .and_then(|node| node.children.as_mut())
    }

    pub fn children_at(&self, parent: &str) -> Option<&Vec<FolderItem>> {
        if parent == self.root_path {
            return Some(&self.items);
        }
        self.find_by_path(parent)
            .and_then(|node| node.children.as_ref())
    }

    /// Whether `parent` already holds a child called `name` (case-insensitive).
    pub fn contains_name(&self, parent: &str, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.children_at(parent)
            .map(|children| children.iter().any(|c| c.name.to_lowercase() == lower))
            .unwrap_or(false)
    }

    /// Every loaded node, depth-first.
    #[cfg(test)]
    pub fn all_items(&self) -> Vec<&FolderItem> {
        let mut out = Vec::new();
        for item in &self.items {
            item.walk(&mut out);
        }
        out
    }

    /// Flatten into display rows.
    ///
    /// `nested` descends into expanded folders (tree view); otherwise only the
    /// top level is listed. A non-empty `filter` keeps case-insensitive name
    /// matches and, when nested, their ancestors.
    pub fn visible_rows(&self, nested: bool, filter: &str) -> Vec<Row> {
        let mut rows = Vec::new();
        let query = filter.trim().to_lowercase();
        let count = self.items.len();
        for (i, item) in self.items.iter().enumerate() {
            Self::flatten_node(item, 0, i + 1 == count, nested, &query, &mut rows);
        }
        rows
    }

    /// Returns true if this subtree contributed any rows.
    fn flatten_node(
        node: &FolderItem,
        depth: usize,
        is_last: bool,
        nested: bool,
        query: &str,
        rows: &mut Vec<Row>,
    ) -> bool {
        let self_matches = query.is_empty() || node.name.to_lowercase().contains(query);

        let mut child_rows = Vec::new();
        let mut child_matches = false;
        if nested {
            if let Some(children) = &node.children {
                // Filtering reveals matches inside collapsed folders too.
                let descend = node.expansion == Expansion::Expanded || !query.is_empty();
                if descend {
                    let count = children.len();
                    for (i, child) in children.iter().enumerate() {
                        if Self::flatten_node(
                            child,
                            depth + 1,
                            i + 1 == count,
                            nested,
                            query,
                            &mut child_rows,
                        ) {
                            child_matches = true;
                        }
                    }
                }
            }
        }

        if self_matches || child_matches {
            let mut row = Row::from_item(node, depth, is_last);
            if child_matches && !query.is_empty() {
                row.expansion = Expansion::Expanded;
            }
            rows.push(row);
            rows.extend(child_rows);
            true
        } else {
            false
        }
    }

    /// Sort a sibling list (non-recursive).
    pub fn sort_items(items: &mut [FolderItem], sort_by: SortBy, folders_first: bool) {
        items.sort_by(|a, b| {
            let mut cmp = Ordering::Equal;

            if folders_first {
                cmp = b.is_folder().cmp(&a.is_folder());
            }

            cmp.then_with(|| match sort_by {
                SortBy::Name => Ordering::Equal,
                SortBy::Created => b.created_at.cmp(&a.created_at),
                SortBy::Updated => b.updated_at.cmp(&a.updated_at),
            })
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
    }

    fn sort_recursive(items: &mut [FolderItem], sort_by: SortBy, folders_first: bool) {
        Self::sort_items(items, sort_by, folders_first);
        for item in items.iter_mut() {
            if let Some(children) = &mut item.children {
                Self::sort_recursive(children, sort_by, folders_first);
            }
        }
    }

    /// Sort every loaded level.
    pub fn sort_all(&mut self) {
        let (sort_by, folders_first) = (self.sort_by, self.folders_first);
        Self::sort_recursive(&mut self.items, sort_by, folders_first);
    }

    /// Cycle to the next sort mode and re-sort.
    pub fn cycle_sort(&mut self) {
        self.sort_by = self.sort_by.next();
        self.sort_all();
    }
}
