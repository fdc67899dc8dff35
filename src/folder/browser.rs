//! One folder browser: tree, selection, address bar and view state.
//!
//! The main screen owns one; the move/copy dialog embeds a second one as its
//! destination picker with multi-selection disabled.

use std::time::Duration;

use tracing::debug;

use crate::folder::address::AddressBar;
use crate::folder::item::{FolderItem, ItemId, ItemKind};
use crate::folder::path;
use crate::folder::selection::Selection;
use crate::folder::tree::{ExpandOutcome, ItemTree, Row};

/// Presentation of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    List,
    Tree,
}

impl ViewMode {
    pub fn from_config(s: &str) -> Self {
        match s {
            "list" => ViewMode::List,
            "tree" => ViewMode::Tree,
            _ => ViewMode::Grid,
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Tree,
            ViewMode::Tree => ViewMode::Grid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Grid => "Grid",
            ViewMode::List => "List",
            ViewMode::Tree => "Tree",
        }
    }

    pub fn is_nested(self) -> bool {
        self == ViewMode::Tree
    }
}

/// A backend read the browser needs, stamped with the generation it was
/// issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    List { generation: u64, path: String },
    Children { generation: u64, path: String },
    Search { generation: u64, path: String, keyword: String },
    Validate { generation: u64, path: String },
}

/// Listing saved while search results are shown.
#[derive(Debug, Clone)]
struct SearchStash {
    tree: ItemTree,
    /// An edit was made on the results, so the saved listing is out of date.
    stale: bool,
}

pub struct Browser {
    /// Namespace root; navigation never goes above it.
    pub root: String,
    pub current_path: String,
    pub tree: ItemTree,
    pub selection: Selection,
    pub address: AddressBar,
    pub view: ViewMode,
    /// Quick filter text (client-side, no backend call).
    pub filter: String,
    pub filtering: bool,
    /// Keyboard focus as an index into `rows()`.
    pub focus: usize,
    /// First visible content line.
    pub scroll: usize,
    pub loading: bool,
    generation: u64,
    search: Option<SearchStash>,
}

impl Browser {
    pub fn new(root: &str, view: ViewMode, multi_enabled: bool, clear_delay: Duration) -> Self {
        let root = path::normalize(root);
        Self {
            tree: ItemTree::new(&root),
            current_path: root.clone(),
            root,
            selection: Selection::new(multi_enabled, clear_delay),
            address: AddressBar::default(),
            view,
            filter: String::new(),
            filtering: false,
            focus: 0,
            scroll: 0,
            loading: false,
            generation: 0,
            search: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_search_results(&self) -> bool {
        self.search.is_some()
    }

    /// Go to `target`, discarding the loaded tree. Older responses become stale.
    pub fn navigate(&mut self, target: &str) -> Fetch {
        let target = path::normalize(target);
        let target = if path::is_within(&target, &self.root) {
            target
        } else {
            self.root.clone()
        };
        self.generation += 1;
        self.current_path = target.clone();
        self.tree.reset(&target);
        self.search = None;
        self.selection.clear();
        self.filter.clear();
        self.filtering = false;
        self.focus = 0;
        self.scroll = 0;
        self.loading = true;
        Fetch::List {
            generation: self.generation,
            path: target,
        }
    }

    /// Refetch the current path.
    pub fn refresh(&mut self) -> Fetch {
        let current = self.current_path.clone();
        self.navigate(&current)
    }

    /// Parent of the current path, unless already at the root.
    pub fn go_up(&mut self) -> Option<Fetch> {
        if self.current_path == self.root {
            return None;
        }
        let parent = path::parent(&self.current_path)?.to_string();
        Some(self.navigate(&parent))
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "dropping stale response"
            );
            return false;
        }
        true
    }

    /// Install the listing for the current path. Stale responses are ignored.
    pub fn apply_listing(&mut self, generation: u64, at: &str, items: Vec<FolderItem>) -> bool {
        if !self.is_current(generation) || at != self.current_path {
            return false;
        }
        self.loading = false;
        self.tree.load(at, items);
        self.sync_selection();
        true
    }

    pub fn listing_failed(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.loading = false;
        true
    }

    /// Expand (or collapse) a folder in tree view.
    pub fn toggle_expand(&mut self, at: &str, force: bool) -> Option<Fetch> {
        let outcome = self.tree.toggle_expand(at, force);
        debug!(path = at, ?outcome, "toggle expand");
        let fetch = match outcome {
            ExpandOutcome::NeedsLoad => Some(Fetch::Children {
                generation: self.generation,
                path: at.to_string(),
            }),
            _ => None,
        };
        self.sync_selection();
        fetch
    }

    pub fn apply_children(&mut self, generation: u64, at: &str, items: Vec<FolderItem>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        let applied = self.tree.load(at, items);
        self.sync_selection();
        applied
    }

    pub fn children_failed(&mut self, generation: u64, at: &str) {
        if self.is_current(generation) {
            self.tree.expand_failed(at);
        }
    }

    /// Start (or replace) a backend search under the current path.
    pub fn search(&mut self, keyword: &str) -> Fetch {
        if self.search.is_none() {
            self.search = Some(SearchStash {
                tree: self.tree.clone(),
                stale: false,
            });
        }
        self.generation += 1;
        self.loading = true;
        Fetch::Search {
            generation: self.generation,
            path: self.current_path.clone(),
            keyword: keyword.to_string(),
        }
    }

    pub fn apply_search(&mut self, generation: u64, results: Vec<FolderItem>) -> bool {
        if !self.is_current(generation) || self.search.is_none() {
            return false;
        }
        self.loading = false;
        self.tree.items.clear();
        let root = self.tree.root_path.clone();
        self.tree.load(&root, results);
        self.focus = 0;
        self.scroll = 0;
        self.sync_selection();
        true
    }

    /// Leave search mode and show the directory listing again.
    ///
    /// Returns a refetch when the saved listing went stale while the results
    /// were shown.
    pub fn clear_search(&mut self) -> Option<Fetch> {
        let stash = self.search.take()?;
        if stash.stale {
            debug!("listing changed during search; refetching");
            return Some(self.refresh());
        }
        self.generation += 1;
        self.loading = false;
        self.tree = stash.tree;
        self.tree.settle_loading();
        self.focus = 0;
        self.scroll = 0;
        self.sync_selection();
        None
    }

    /// Note that search results were edited.
    pub fn mark_search_stale(&mut self) {
        if let Some(stash) = self.search.as_mut() {
            stash.stale = true;
        }
    }

    /// Address bar Enter on an edited path.
    pub fn validate(&self, target: &str) -> Fetch {
        Fetch::Validate {
            generation: self.generation,
            path: target.to_string(),
        }
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.focus = 0;
        self.scroll = 0;
        self.sync_selection();
    }

    pub fn clear_filter(&mut self) {
        self.filtering = false;
        self.set_filter("");
    }

    pub fn rows(&self) -> Vec<Row> {
        self.tree.visible_rows(self.view.is_nested(), &self.filter)
    }

    pub fn visible_ids(&self) -> Vec<ItemId> {
        self.rows().into_iter().map(|r| r.id).collect()
    }

    /// Keep the selection a subset of what is visible, and focus in range.
    pub fn sync_selection(&mut self) {
        let visible = self.visible_ids();
        self.selection.retain_visible(&visible);
        if !visible.is_empty() && self.focus >= visible.len() {
            self.focus = visible.len() - 1;
        }
    }

    pub fn cycle_view(&mut self) {
        self.view = self.view.next();
        self.scroll = 0;
        self.sync_selection();
    }

    pub fn focused_row(&self) -> Option<Row> {
        self.rows().into_iter().nth(self.focus)
    }

    pub fn focus_next(&mut self, step: usize) {
        let len = self.rows().len();
        if len > 0 {
            self.focus = (self.focus + step).min(len - 1);
        }
    }

    pub fn focus_previous(&mut self, step: usize) {
        self.focus = self.focus.saturating_sub(step);
    }

    pub fn focus_first(&mut self) {
        self.focus = 0;
    }

    pub fn focus_last(&mut self) {
        self.focus = self.rows().len().saturating_sub(1);
    }

    pub fn focus_id(&mut self, id: &ItemId) {
        if let Some(idx) = self.rows().iter().position(|r| &r.id == id) {
            self.focus = idx;
        }
    }

    /// Open a row: folders are entered (or expanded in tree view).
    ///
    /// Returns `None` for files; the caller shows their details.
    pub fn open(&mut self, row: &Row) -> Option<Fetch> {
        if row.kind != ItemKind::Folder {
            return None;
        }
        if self.view.is_nested() {
            self.toggle_expand(&row.path, false)
        } else {
            Some(self.navigate(&row.path))
        }
    }

    /// Keep `focus` within a viewport of `height` lines of `per_line` items.
    pub fn update_scroll(&mut self, height: usize, per_line: usize) {
        if height == 0 || per_line == 0 {
            return;
        }
        let line = self.focus / per_line;
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }
}
