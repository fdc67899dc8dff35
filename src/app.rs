use std::collections::HashMap;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::components::grid::GridLayout;
use crate::config::AppConfig;
use crate::dispatch::{Mutation, Request, Target};
use crate::error::{ApiError, ValidationError};
use crate::event::ApiEvent;
use crate::folder::address::{AddressBar, AddressCommand};
use crate::folder::browser::{Browser, Fetch, ViewMode};
use crate::folder::dialog::{icon_index, ActiveDialog, DialogState, ICON_CHOICES};
use crate::folder::item::{Expansion, FolderItem, ItemId, ItemKind};
use crate::folder::menu::{available_actions, ContextAction, ContextMenu};
use crate::folder::mutation::{self, TransferMode};
use crate::folder::path;
use crate::folder::selection::{Bounds, Point, PointerButton};
use crate::folder::tree::{ItemTree, Row, SortBy};
use crate::theme::{resolve_theme, ThemeColors};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(3);
/// Two clicks on the same item within this window open it.
pub const DOUBLE_CLICK: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A transient message in the status bar.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created: Instant,
}

/// Where things were drawn last frame, for mouse hit-testing.
#[derive(Debug, Clone, Default)]
pub struct ScreenLayout {
    pub address: Rect,
    /// Screen column span `[start, end)` of each breadcrumb.
    pub crumbs: Vec<(u16, u16)>,
    /// Listing area inside its border.
    pub content: Rect,
    pub grid: GridLayout,
    /// Item boxes in content coordinates, in row order.
    pub boxes: Vec<(ItemId, Bounds)>,
    pub menu: Option<Rect>,
    pub dialog: Option<Rect>,
}

/// Work left to do once a mutation's response arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Followup {
    None,
    RecordComment(ItemId),
    /// Swap the locally generated id for the one the backend assigned.
    AdoptServerId(ItemId),
}

/// A mutation applied locally and awaiting the backend.
struct PendingMutation {
    /// Tree before the local edit; `None` for operations with no local edit.
    snapshot: Option<ItemTree>,
    /// Value of `mutation_seq` right after this edit was applied.
    seq: u64,
    generation: u64,
    label: &'static str,
    success: String,
    followup: Followup,
}

/// Main application state.
pub struct App {
    pub browser: Browser,
    pub dialog: DialogState,
    pub menu: Option<ContextMenu>,
    /// Items the open context menu acts on. Empty for the background menu.
    pub menu_targets: Vec<ItemId>,
    pub toast: Option<Toast>,
    pub theme: ThemeColors,
    pub layout: ScreenLayout,
    pub show_help: bool,
    pub help_scroll: usize,
    pub should_quit: bool,
    pub confirm_delete: bool,
    pub grid_cell_width: u16,
    pub use_icons: bool,
    clear_delay: Duration,
    pending: HashMap<u64, PendingMutation>,
    next_op: u64,
    mutation_seq: u64,
    outbox: Vec<Request>,
    last_click: Option<(ItemId, Instant)>,
    /// Keys go to the address bar input.
    typing: bool,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let clear_delay = config.drag_clear_delay();
        let mut browser = Browser::new(
            config.root_path(),
            ViewMode::from_config(config.view()),
            true,
            clear_delay,
        );
        browser.tree.sort_by = SortBy::from_config(config.sort_by());
        browser.tree.folders_first = config.folders_first();

        Self {
            browser,
            dialog: DialogState::default(),
            menu: None,
            menu_targets: Vec::new(),
            toast: None,
            theme: resolve_theme(&config.theme),
            layout: ScreenLayout::default(),
            show_help: false,
            help_scroll: 0,
            should_quit: false,
            confirm_delete: config.confirm_delete(),
            grid_cell_width: config.grid_cell_width(),
            use_icons: config.use_icons(),
            clear_delay,
            pending: HashMap::new(),
            next_op: 1,
            mutation_seq: 0,
            outbox: Vec::new(),
            last_click: None,
            typing: false,
        }
    }

    /// Load the first listing.
    pub fn start(&mut self, path: &str) {
        info!(path, root = %self.browser.root, "starting browser");
        self.navigate(path);
    }

    /// Requests queued since the last call, for the event loop to dispatch.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    fn push_fetch(&mut self, target: Target, fetch: Fetch) {
        self.outbox.push(Request::from_fetch(target, fetch));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            created: Instant::now(),
        });
    }

    /// Expire the toast and any lingering drag box.
    pub fn tick(&mut self, now: Instant) {
        self.browser.selection.tick(now);
        if self
            .toast
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.created) >= TOAST_TTL)
        {
            self.toast = None;
        }
    }

    // ── Navigation ───────────────────────────────────────────────────────

    pub fn navigate(&mut self, target: &str) {
        if self.browser.address.is_searching() {
            self.browser.address.cancel();
        }
        self.menu = None;
        self.last_click = None;
        let fetch = self.browser.navigate(target);
        debug!(?fetch, "navigate");
        self.push_fetch(Target::Main, fetch);
    }

    pub fn refresh(&mut self) {
        let current = self.browser.current_path.clone();
        self.navigate(&current);
    }

    pub fn go_up(&mut self) {
        if self.browser.current_path == self.browser.root {
            return;
        }
        let parent = path::parent(&self.browser.current_path)
            .unwrap_or(&self.browser.root)
            .to_string();
        self.navigate(&parent);
    }

    pub fn cycle_view(&mut self) {
        self.browser.cycle_view();
        self.show_toast(
            format!("View: {}", self.browser.view.label()),
            ToastKind::Info,
        );
    }

    pub fn cycle_sort(&mut self) {
        self.browser.tree.cycle_sort();
        self.browser.sync_selection();
        self.show_toast(
            format!("Sort: {}", self.browser.tree.sort_by.label()),
            ToastKind::Info,
        );
    }

    pub fn open_focused(&mut self) {
        if let Some(row) = self.browser.focused_row() {
            self.open_row(&row);
        }
    }

    pub fn open_item(&mut self, id: &ItemId) {
        if let Some(row) = self.browser.rows().into_iter().find(|r| &r.id == id) {
            self.open_row(&row);
        }
    }

    /// Folders are entered (or expanded in tree view); files show details.
    fn open_row(&mut self, row: &Row) {
        match self.browser.open(row) {
            Some(fetch) => {
                if matches!(fetch, Fetch::List { .. }) && self.browser.address.is_searching() {
                    self.browser.address.cancel();
                }
                self.push_fetch(Target::Main, fetch);
            }
            None if row.kind == ItemKind::File => self.show_details(&row.id),
            None => {}
        }
    }

    /// Tree view Right: expand, or step into an expanded folder.
    pub fn expand_focused(&mut self) {
        let Some(row) = self.browser.focused_row() else {
            return;
        };
        if row.kind != ItemKind::Folder {
            return;
        }
        if row.expansion == Expansion::Expanded {
            self.browser.focus_next(1);
        } else if let Some(fetch) = self.browser.toggle_expand(&row.path, false) {
            self.push_fetch(Target::Main, fetch);
        }
    }

    /// Tree view Left: collapse, or jump to the parent row.
    pub fn collapse_focused(&mut self) {
        let Some(row) = self.browser.focused_row() else {
            return;
        };
        if row.kind == ItemKind::Folder && row.expansion == Expansion::Expanded {
            self.browser.toggle_expand(&row.path, false);
            return;
        }
        let Some(parent) = path::parent(&row.path) else {
            return;
        };
        if let Some(parent_row) = self.browser.rows().into_iter().find(|r| r.path == parent) {
            self.browser.focus_id(&parent_row.id);
        }
    }

    /// Reload the focused folder's children in tree view.
    pub fn reload_focused(&mut self) {
        let Some(row) = self.browser.focused_row() else {
            return;
        };
        if row.kind == ItemKind::Folder && row.expansion.is_loaded() {
            if let Some(fetch) = self.browser.toggle_expand(&row.path, true) {
                self.push_fetch(Target::Main, fetch);
            }
        }
    }

    // ── Focus & selection ────────────────────────────────────────────────

    /// Items per visual line: grid columns in grid view, else one.
    pub fn line_step(&self) -> usize {
        match self.browser.view {
            ViewMode::Grid => self.layout.grid.columns.max(1),
            _ => 1,
        }
    }

    /// Move keyboard focus; `extend` grows the selection like shift-click.
    pub fn move_focus(&mut self, delta: isize, extend: bool) {
        if extend && self.browser.selection.is_empty() {
            if let Some(row) = self.browser.focused_row() {
                self.browser.selection.click(&row.id);
            }
        }
        if delta >= 0 {
            self.browser.focus_next(delta.unsigned_abs());
        } else {
            self.browser.focus_previous(delta.unsigned_abs());
        }
        if extend {
            if let Some(row) = self.browser.focused_row() {
                let visible = self.browser.visible_ids();
                self.browser.selection.extend_to(&row.id, &visible);
            }
        }
    }

    pub fn toggle_focused(&mut self) {
        if let Some(row) = self.browser.focused_row() {
            self.browser.selection.toggle(&row.id);
        }
    }

    pub fn select_all(&mut self) {
        let visible = self.browser.visible_ids();
        self.browser.selection.select_all(&visible);
    }

    /// Esc in normal mode: drop the selection, then the search results.
    pub fn clear_selection(&mut self) {
        if !self.browser.selection.is_empty() {
            self.browser.selection.clear();
        } else if self.browser.is_search_results() {
            self.browser.address.cancel();
            self.leave_search();
        } else if !self.browser.filter.is_empty() {
            self.browser.clear_filter();
        }
    }

    /// What keyboard actions apply to: the selection, else the focused item.
    pub fn action_targets(&self) -> Vec<ItemId> {
        if !self.browser.selection.is_empty() {
            return self.browser.selection.ids().to_vec();
        }
        self.browser
            .focused_row()
            .map(|row| vec![row.id])
            .unwrap_or_default()
    }

    /// Screen cell below the focused item, for menus opened from the keyboard.
    pub fn focus_anchor(&self) -> (u16, u16) {
        let content = self.layout.content;
        let scroll_lines = self.browser.scroll as i32 * self.layout.grid.cell_height as i32;
        self.layout
            .boxes
            .get(self.browser.focus)
            .map(|(_, b)| {
                let x = content.x as i32 + b.left;
                let y = content.y as i32 + b.top - scroll_lines + 1;
                (x.max(0) as u16, y.max(0) as u16)
            })
            .unwrap_or((content.x, content.y))
    }

    fn resolve(&self, ids: &[ItemId]) -> Vec<&FolderItem> {
        ids.iter()
            .filter_map(|id| self.browser.tree.find_by_id(id))
            .collect()
    }

    // ── Context menu & actions ───────────────────────────────────────────

    /// Open the menu for the keyboard targets at `anchor`.
    pub fn open_menu(&mut self, anchor: (u16, u16)) {
        let ids = self.action_targets();
        self.open_menu_for(ids, anchor);
    }

    fn open_menu_for(&mut self, ids: Vec<ItemId>, anchor: (u16, u16)) {
        let actions = available_actions(&self.resolve(&ids));
        if actions.is_empty() {
            self.show_toast("No actions available", ToastKind::Info);
            return;
        }
        debug!(targets = ids.len(), ?actions, "opening context menu");
        self.menu = Some(ContextMenu::new(actions, anchor));
        self.menu_targets = ids;
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
        self.menu_targets.clear();
    }

    /// Run the focused menu entry.
    pub fn activate_menu(&mut self) {
        let Some(action) = self.menu.as_ref().and_then(ContextMenu::focused) else {
            return;
        };
        let targets = std::mem::take(&mut self.menu_targets);
        self.menu = None;
        self.run_action_on(action, targets);
    }

    /// Run the menu entry at `index` (mouse click).
    pub fn activate_menu_at(&mut self, index: usize) {
        if let Some(menu) = self.menu.as_mut() {
            if index < menu.actions.len() {
                menu.focus = index;
                self.activate_menu();
            }
        }
    }

    /// Keyboard shortcut for `action` on the current targets.
    pub fn run_action(&mut self, action: ContextAction) {
        let targets = match action {
            ContextAction::NewFolder => Vec::new(),
            _ => self.action_targets(),
        };
        self.run_action_on(action, targets);
    }

    fn run_action_on(&mut self, action: ContextAction, ids: Vec<ItemId>) {
        if action != ContextAction::NewFolder {
            let allowed = !ids.is_empty() && available_actions(&self.resolve(&ids)).contains(&action);
            if !allowed {
                debug!(?action, targets = ids.len(), "action not permitted");
                self.show_toast(
                    format!("{} is not available for this selection", action.label()),
                    ToastKind::Info,
                );
                return;
            }
        }

        match action {
            ContextAction::Open => self.open_item(&ids[0]),
            ContextAction::NewFolder => {
                let parent = self.browser.current_path.clone();
                self.dialog.open(ActiveDialog::NewFolder { parent });
            }
            ContextAction::Rename => {
                if let Some(item) = self.browser.tree.find_by_id(&ids[0]) {
                    let original = item.name.clone();
                    self.dialog.open(ActiveDialog::Rename {
                        id: ids[0].clone(),
                        original,
                    });
                }
            }
            ContextAction::Move => self.open_transfer(ids, TransferMode::Move),
            ContextAction::Copy => self.open_transfer(ids, TransferMode::Copy),
            ContextAction::Delete => {
                if self.confirm_delete {
                    let names = self.names_of(&ids);
                    self.dialog.open(ActiveDialog::Delete { ids, names });
                } else {
                    self.apply_delete(ids);
                }
            }
            ContextAction::Comment => {
                if let Some(item) = self.browser.tree.find_by_id(&ids[0]) {
                    let name = item.name.clone();
                    self.dialog.open(ActiveDialog::Comment {
                        id: ids[0].clone(),
                        name,
                    });
                }
            }
            ContextAction::ChangeIcon => {
                if let Some(item) = self.browser.tree.find_by_id(&ids[0]) {
                    let name = item.name.clone();
                    let choice = icon_index(item.icon.as_deref());
                    self.dialog.open(ActiveDialog::ChangeIcon {
                        id: ids[0].clone(),
                        name,
                        choice,
                    });
                }
            }
            ContextAction::Details => self.show_details(&ids[0]),
        }
    }

    fn names_of(&self, ids: &[ItemId]) -> Vec<String> {
        self.resolve(ids).iter().map(|i| i.name.clone()).collect()
    }

    fn show_details(&mut self, id: &ItemId) {
        let Some(item) = self.browser.tree.find_by_id(id).cloned() else {
            return;
        };
        let path = item.path.clone();
        self.dialog.open(ActiveDialog::Details {
            item: Box::new(item),
        });
        self.outbox.push(Request::Detail { path });
    }

    fn open_transfer(&mut self, ids: Vec<ItemId>, mode: TransferMode) {
        let names = self.names_of(&ids);
        let mut picker = Browser::new(&self.browser.root, ViewMode::List, false, self.clear_delay);
        let fetch = picker.navigate(&self.browser.current_path);
        self.dialog.open(ActiveDialog::Transfer {
            ids,
            names,
            mode,
            picker: Box::new(picker),
        });
        self.push_fetch(Target::Picker, fetch);
    }

    // ── Destination picker ───────────────────────────────────────────────

    pub fn picker_move_focus(&mut self, delta: isize) {
        if let Some(picker) = self.dialog.picker_mut() {
            if delta >= 0 {
                picker.focus_next(delta.unsigned_abs());
            } else {
                picker.focus_previous(delta.unsigned_abs());
            }
        }
    }

    /// Enter the focused folder in the picker.
    pub fn picker_open(&mut self) {
        let fetch = self.dialog.picker_mut().and_then(|picker| {
            let row = picker.focused_row()?;
            picker.open(&row)
        });
        if let Some(fetch) = fetch {
            self.push_fetch(Target::Picker, fetch);
        }
    }

    pub fn picker_go_up(&mut self) {
        if let Some(fetch) = self.dialog.picker_mut().and_then(Browser::go_up) {
            self.push_fetch(Target::Picker, fetch);
        }
    }

    /// Mark the focused folder as the destination (or unmark it).
    pub fn picker_toggle(&mut self) {
        if let Some(picker) = self.dialog.picker_mut() {
            if let Some(row) = picker.focused_row() {
                if picker.selection.contains(&row.id) {
                    picker.selection.clear();
                } else {
                    picker.selection.click(&row.id);
                }
            }
        }
    }

    // ── Dialog submission ────────────────────────────────────────────────

    /// Enter in a dialog. Validation errors keep it open.
    pub fn submit_dialog(&mut self) {
        let text = self.dialog.input.value.clone();
        let outcome = match &self.dialog.active {
            ActiveDialog::None => return,
            ActiveDialog::NewFolder { parent } => {
                let parent = parent.clone();
                self.submit_new_folder(&parent, &text)
            }
            ActiveDialog::Rename { id, .. } => {
                let id = id.clone();
                self.submit_rename(&id, &text)
            }
            ActiveDialog::Delete { ids, .. } => {
                let ids = ids.clone();
                self.apply_delete(ids);
                Ok(())
            }
            ActiveDialog::Transfer {
                ids, mode, picker, ..
            } => {
                let dest = picker
                    .selection
                    .ids()
                    .first()
                    .and_then(|id| picker.tree.find_by_id(id))
                    .filter(|item| item.is_folder())
                    .map(|item| item.path.clone())
                    .unwrap_or_else(|| picker.current_path.clone());
                let (ids, mode) = (ids.clone(), *mode);
                self.submit_transfer(&ids, &dest, mode)
            }
            ActiveDialog::Comment { id, .. } => {
                let id = id.clone();
                self.submit_comment(&id, &text)
            }
            ActiveDialog::ChangeIcon { id, choice, .. } => {
                let (id, choice) = (id.clone(), *choice);
                self.submit_icon(&id, choice)
            }
            ActiveDialog::Details { .. } | ActiveDialog::NotFound { .. } => Ok(()),
        };

        match outcome {
            Ok(()) => {
                let closed = self.dialog.close();
                debug!(dialog = closed.title(), "dialog submitted");
            }
            Err(err) => {
                debug!(%err, "dialog validation failed");
                self.dialog.set_error(err);
            }
        }
    }

    pub fn cancel_dialog(&mut self) {
        let closed = self.dialog.close();
        debug!(dialog = closed.title(), "dialog cancelled");
    }

    fn path_of(&self, id: &ItemId) -> Result<String, ValidationError> {
        self.browser
            .tree
            .find_by_id(id)
            .map(|item| item.path.clone())
            .ok_or(ValidationError::MissingItem)
    }

    fn submit_new_folder(&mut self, parent: &str, name: &str) -> Result<(), ValidationError> {
        let snapshot = self.browser.tree.clone();
        let folder = mutation::insert_folder(&mut self.browser.tree, parent, name)?;
        self.browser.sync_selection();
        self.commit(
            Some(snapshot),
            Mutation::CreateFolder {
                parent: parent.to_string(),
                name: folder.name.clone(),
            },
            format!("Created \"{}\"", folder.name),
            Followup::AdoptServerId(folder.id),
        );
        Ok(())
    }

    fn submit_rename(&mut self, id: &ItemId, name: &str) -> Result<(), ValidationError> {
        let old_path = self.path_of(id)?;
        let snapshot = self.browser.tree.clone();
        mutation::rename(&mut self.browser.tree, id, name)?;
        let new_name = path::file_name(&self.path_of(id)?).to_string();
        self.commit(
            Some(snapshot),
            Mutation::Rename {
                path: old_path,
                new_name: new_name.clone(),
            },
            format!("Renamed to \"{}\"", new_name),
            Followup::None,
        );
        Ok(())
    }

    fn submit_transfer(
        &mut self,
        ids: &[ItemId],
        dest: &str,
        mode: TransferMode,
    ) -> Result<(), ValidationError> {
        let paths = ids
            .iter()
            .map(|id| self.path_of(id))
            .collect::<Result<Vec<_>, _>>()?;
        let snapshot = self.browser.tree.clone();
        let placed = mutation::transfer(&mut self.browser.tree, ids, dest, mode)?;
        self.browser.sync_selection();
        let verb = match mode {
            TransferMode::Copy => "Copied",
            TransferMode::Move => "Moved",
        };
        self.commit(
            Some(snapshot),
            Mutation::Transfer {
                paths,
                dest: dest.to_string(),
                mode,
            },
            format!("{} {} item(s) to {}", verb, placed.len(), dest),
            Followup::None,
        );
        Ok(())
    }

    fn apply_delete(&mut self, ids: Vec<ItemId>) {
        let paths: Vec<String> = self.resolve(&ids).iter().map(|i| i.path.clone()).collect();
        let snapshot = self.browser.tree.clone();
        let removed = mutation::delete(&mut self.browser.tree, &ids);
        if removed.is_empty() {
            return;
        }
        self.browser.sync_selection();
        let success = match removed.len() {
            1 => format!("Deleted \"{}\"", removed[0].name),
            n => format!("Deleted {} items", n),
        };
        self.commit(
            Some(snapshot),
            Mutation::Delete { paths },
            success,
            Followup::None,
        );
    }

    fn submit_comment(&mut self, id: &ItemId, text: &str) -> Result<(), ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingField("Comment"));
        }
        let path = self.path_of(id)?;
        self.commit(
            None,
            Mutation::Comment {
                path,
                text: text.to_string(),
            },
            "Comment added".to_string(),
            Followup::RecordComment(id.clone()),
        );
        Ok(())
    }

    fn submit_icon(&mut self, id: &ItemId, choice: usize) -> Result<(), ValidationError> {
        let icon = ICON_CHOICES
            .get(choice)
            .copied()
            .flatten()
            .map(str::to_string);
        let path = self.path_of(id)?;
        let snapshot = self.browser.tree.clone();
        mutation::change_icon(&mut self.browser.tree, id, icon.clone())?;
        self.commit(
            Some(snapshot),
            Mutation::ChangeIcon { path, icon },
            "Icon updated".to_string(),
            Followup::None,
        );
        Ok(())
    }

    /// Record a mutation whose local edit (if any) is applied and queue its request.
    fn commit(
        &mut self,
        snapshot: Option<ItemTree>,
        call: Mutation,
        success: String,
        followup: Followup,
    ) {
        if snapshot.is_some() {
            self.mutation_seq += 1;
        }
        self.browser.mark_search_stale();
        let op = self.next_op;
        self.next_op += 1;
        info!(op, action = call.label(), "applying mutation");
        self.pending.insert(
            op,
            PendingMutation {
                snapshot,
                seq: self.mutation_seq,
                generation: self.browser.generation(),
                label: call.label(),
                success,
                followup,
            },
        );
        self.outbox.push(Request::Mutate { op, call });
    }

    fn mutation_finished(&mut self, op: u64, result: Result<Option<FolderItem>, ApiError>) {
        let Some(pending) = self.pending.remove(&op) else {
            warn!(op, "response for unknown mutation");
            return;
        };
        let same_listing = pending.generation == self.browser.generation();

        match result {
            Ok(server_item) => {
                info!(op, action = pending.label, "mutation confirmed");
                match pending.followup {
                    Followup::RecordComment(id) if same_listing => {
                        mutation::record_comment(&mut self.browser.tree, &id);
                    }
                    Followup::AdoptServerId(local) => {
                        if let (Some(server), Some(item)) =
                            (server_item, self.browser.tree.find_by_id_mut(&local))
                        {
                            item.id = server.id.clone();
                            item.permissions = server.permissions;
                            item.created_at = server.created_at;
                            item.updated_at = server.updated_at;
                            self.browser.selection.rekey(&local, &server.id);
                        }
                    }
                    _ => {}
                }
                self.show_toast(pending.success, ToastKind::Success);
            }
            Err(err) => {
                warn!(op, action = pending.label, %err, "mutation failed");
                match pending.snapshot {
                    Some(snapshot) if same_listing && pending.seq == self.mutation_seq => {
                        debug!(op, "rolling back local edit");
                        self.browser.tree = snapshot;
                        self.browser.tree.settle_loading();
                        self.browser.sync_selection();
                    }
                    Some(_) if same_listing => {
                        debug!(op, "later edits applied; refetching");
                        self.refresh();
                    }
                    _ => {}
                }
                self.show_toast(format!("{} failed: {}", pending.label, err), ToastKind::Error);
            }
        }
    }

    // ── Backend responses ────────────────────────────────────────────────

    pub fn handle_api(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Listed {
                target: Target::Main,
                generation,
                path,
                result,
            } => match result {
                Ok(items) => {
                    if self.browser.apply_listing(generation, &path, items) {
                        debug!(path, "listing applied");
                    }
                }
                Err(err) => {
                    if self.browser.listing_failed(generation) {
                        warn!(path, %err, "listing failed");
                        self.show_toast(format!("Could not load {}: {}", path, err), ToastKind::Error);
                    }
                }
            },
            ApiEvent::Listed {
                target: Target::Picker,
                generation,
                path,
                result,
            } => {
                let Some(picker) = self.dialog.picker_mut() else {
                    debug!(path, "picker closed; dropping listing");
                    return;
                };
                let failed = match result {
                    Ok(items) => {
                        picker.apply_listing(generation, &path, folders_only(items));
                        None
                    }
                    Err(err) => picker.listing_failed(generation).then_some(err),
                };
                if let Some(err) = failed {
                    warn!(path, %err, "picker listing failed");
                    self.show_toast(format!("Could not load {}: {}", path, err), ToastKind::Error);
                }
            }
            ApiEvent::Children {
                target,
                generation,
                path,
                result,
            } => {
                let browser = match target {
                    Target::Main => &mut self.browser,
                    Target::Picker => match self.dialog.picker_mut() {
                        Some(picker) => picker,
                        None => return,
                    },
                };
                let failed = match result {
                    Ok(items) => {
                        let items = match target {
                            Target::Picker => folders_only(items),
                            Target::Main => items,
                        };
                        browser.apply_children(generation, &path, items);
                        None
                    }
                    Err(err) => {
                        let current = generation == browser.generation();
                        browser.children_failed(generation, &path);
                        current.then_some(err)
                    }
                };
                if let Some(err) = failed {
                    warn!(path, %err, "expand failed");
                    self.show_toast(format!("Could not expand {}: {}", path, err), ToastKind::Error);
                }
            }
            ApiEvent::Searched { generation, result } => match result {
                Ok(items) => {
                    let count = items.len();
                    if self.browser.apply_search(generation, items) {
                        self.show_toast(format!("{} result(s)", count), ToastKind::Info);
                    }
                }
                Err(err) => {
                    if self.browser.listing_failed(generation) {
                        warn!(%err, "search failed");
                        self.show_toast(format!("Search failed: {}", err), ToastKind::Error);
                    }
                }
            },
            ApiEvent::Validated {
                generation,
                path,
                result,
            } => self.path_validated(generation, path, result),
            ApiEvent::Detail { path, result } => match result {
                Ok(fresh) => {
                    if let ActiveDialog::Details { item } = &mut self.dialog.active {
                        if item.path == path {
                            item.permissions = fresh.permissions;
                            item.created_at = fresh.created_at;
                            item.updated_at = fresh.updated_at;
                            item.comment_count = fresh.comment_count;
                            item.icon = fresh.icon;
                        }
                    }
                }
                Err(err) => debug!(path, %err, "detail fetch failed; showing cached metadata"),
            },
            ApiEvent::Mutated { op, result } => self.mutation_finished(op, result),
        }
    }

    fn path_validated(&mut self, generation: u64, path: String, result: Result<bool, ApiError>) {
        if generation != self.browser.generation() || !self.browser.address.is_editing() {
            debug!(path, "dropping stale path validation");
            return;
        }
        self.browser.address.finish_edit();
        match result {
            Ok(true) => self.navigate(&path),
            Ok(false) | Err(ApiError::NotFound(_)) => {
                info!(path, "address not found");
                self.dialog.open(ActiveDialog::NotFound { path });
            }
            Err(err) => {
                warn!(path, %err, "path validation failed");
                self.show_toast(format!("Could not check {}: {}", path, err), ToastKind::Error);
            }
        }
    }

    // ── Address bar & filter ─────────────────────────────────────────────

    /// Whether typed keys belong to the address bar.
    pub fn address_typing(&self) -> bool {
        self.typing && self.browser.address.is_editing()
    }

    pub fn begin_address_edit(&mut self) {
        self.leave_search();
        let current = self.browser.current_path.clone();
        self.browser.address.begin_edit(&current);
        self.typing = true;
    }

    /// Open the search box, keeping the last query while results are shown.
    pub fn begin_search(&mut self) {
        let query = if self.browser.address.is_searching() {
            self.browser
                .address
                .input()
                .map(|input| input.value.clone())
                .unwrap_or_default()
        } else {
            String::new()
        };
        self.browser.address.begin_search(&query);
        self.typing = true;
    }

    pub fn submit_address(&mut self) {
        let root = self.browser.root.clone();
        match self.browser.address.submit(&root) {
            AddressCommand::Validate(target) => {
                let fetch = self.browser.validate(&target);
                self.push_fetch(Target::Main, fetch);
            }
            AddressCommand::Invalid(target) => {
                info!(path = target, "address outside root");
                self.dialog.open(ActiveDialog::NotFound { path: target });
            }
            AddressCommand::Search(keyword) => {
                // Results take the keyboard; the query stays visible.
                self.typing = false;
                let fetch = self.browser.search(&keyword);
                self.push_fetch(Target::Main, fetch);
            }
            AddressCommand::ClearSearch => self.leave_search(),
            AddressCommand::None => {}
        }
    }

    pub fn cancel_address(&mut self) {
        if self.browser.address.cancel() == AddressCommand::ClearSearch {
            self.leave_search();
        }
    }

    /// Back from search results to the listing, refetching it if it was edited.
    fn leave_search(&mut self) {
        if let Some(fetch) = self.browser.clear_search() {
            self.push_fetch(Target::Main, fetch);
        }
    }

    pub fn click_crumb(&mut self, index: usize) {
        let target =
            AddressBar::crumb_target(&self.browser.current_path, &self.browser.root, index);
        if let Some(target) = target {
            self.navigate(&target);
        }
    }

    pub fn begin_filter(&mut self) {
        self.browser.filtering = true;
    }

    pub fn filter_push(&mut self, c: char) {
        let mut filter = self.browser.filter.clone();
        filter.push(c);
        self.browser.set_filter(&filter);
    }

    pub fn filter_pop(&mut self) {
        let mut filter = self.browser.filter.clone();
        filter.pop();
        self.browser.set_filter(&filter);
    }

    /// Leave filter entry; `keep` leaves the narrowed listing in place.
    pub fn end_filter(&mut self, keep: bool) {
        if keep {
            self.browser.filtering = false;
        } else {
            self.browser.clear_filter();
        }
    }

    // ── Mouse ────────────────────────────────────────────────────────────

    fn content_point(&self, col: u16, row: u16) -> Point {
        let content = self.layout.content;
        let scroll_lines = self.browser.scroll as i32 * self.layout.grid.cell_height as i32;
        Point::new(
            col as i32 - content.x as i32,
            row as i32 - content.y as i32 + scroll_lines,
        )
    }

    fn hit_test(&self, point: Point) -> Option<ItemId> {
        self.layout
            .boxes
            .iter()
            .find(|(_, bounds)| bounds.contains(point))
            .map(|(id, _)| id.clone())
    }

    pub fn mouse_down(
        &mut self,
        col: u16,
        row: u16,
        button: PointerButton,
        ctrl: bool,
        shift: bool,
        now: Instant,
    ) {
        if self.menu.is_some() {
            match self.layout.menu {
                Some(rect) if rect_contains(rect, col, row) => {
                    // Entries start below the top border.
                    let index = row.saturating_sub(rect.y + 1) as usize;
                    self.activate_menu_at(index);
                }
                _ => self.close_menu(),
            }
            return;
        }
        if self.dialog.is_open() || self.show_help {
            return;
        }

        if rect_contains(self.layout.address, col, row) {
            if button == PointerButton::Primary {
                let crumb = self
                    .layout
                    .crumbs
                    .iter()
                    .position(|&(start, end)| col >= start && col < end);
                match crumb {
                    Some(index) if !self.browser.address.is_editing() => self.click_crumb(index),
                    _ => self.begin_address_edit(),
                }
            }
            return;
        }

        if !rect_contains(self.layout.content, col, row) {
            return;
        }
        let point = self.content_point(col, row);
        let hit = self.hit_test(point);

        match (button, hit) {
            (PointerButton::Secondary, Some(id)) => {
                if !self.browser.selection.contains(&id) {
                    self.browser.selection.click(&id);
                }
                self.browser.focus_id(&id);
                let ids = self.browser.selection.ids().to_vec();
                self.open_menu_for(ids, (col, row));
            }
            (PointerButton::Secondary, None) => {
                self.browser.selection.clear();
                self.open_menu_for(Vec::new(), (col, row));
            }
            (PointerButton::Primary, Some(id)) => {
                self.browser.focus_id(&id);
                if ctrl {
                    self.browser.selection.toggle(&id);
                } else if shift {
                    let visible = self.browser.visible_ids();
                    self.browser.selection.extend_to(&id, &visible);
                } else {
                    let double = self.last_click.as_ref().is_some_and(|(prev, at)| {
                        prev == &id && now.saturating_duration_since(*at) <= DOUBLE_CLICK
                    });
                    self.browser.selection.click(&id);
                    if double {
                        self.last_click = None;
                        self.open_item(&id);
                    } else {
                        self.last_click = Some((id, now));
                    }
                }
            }
            (PointerButton::Primary, None) => {
                if !ctrl {
                    self.browser.selection.click_background(now);
                }
                let nested = self.browser.view.is_nested();
                self.browser
                    .selection
                    .begin_drag(point, button, nested, ctrl);
            }
            (PointerButton::Middle, _) => {}
        }
    }

    pub fn mouse_drag(&mut self, col: u16, row: u16) {
        if !self.browser.selection.is_dragging() {
            return;
        }
        let point = self.content_point(col, row);
        self.browser.selection.update_drag(point, &self.layout.boxes);
    }

    pub fn mouse_up(&mut self, now: Instant) {
        self.browser.selection.end_drag(now);
    }

    pub fn scroll_by(&mut self, lines: isize) {
        if let Some(picker) = self.dialog.picker_mut() {
            if lines >= 0 {
                picker.focus_next(lines.unsigned_abs());
            } else {
                picker.focus_previous(lines.unsigned_abs());
            }
            return;
        }
        let step = self.line_step() as isize;
        self.move_focus(lines * step, false);
    }
}

fn folders_only(items: Vec<FolderItem>) -> Vec<FolderItem> {
    items.into_iter().filter(FolderItem::is_folder).collect()
}

fn rect_contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::input::TextInput;
    use crate::folder::item::Permissions;

    const ROOT: &str = "/Root";

    fn config(confirm_delete: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.general.root_path = Some(ROOT.to_string());
        config.general.confirm_delete = Some(confirm_delete);
        config.selection.drag_clear_delay_ms = Some(100);
        config
    }

    fn listing() -> Vec<FolderItem> {
        vec![
            FolderItem::folder("a", ROOT, "A")
                .with_children(vec![FolderItem::file("x", "/Root/A", "x")]),
            FolderItem::folder("b", ROOT, "B"),
            FolderItem::folder("dest", ROOT, "Dest").with_children(Vec::new()),
            FolderItem::file("f", ROOT, "f.txt"),
        ]
    }

    fn deliver_listing(app: &mut App, target: Target, items: Vec<FolderItem>) {
        let request = app
            .take_requests()
            .into_iter()
            .find(|r| matches!(r, Request::List { target: t, .. } if *t == target))
            .expect("list request");
        let Request::List {
            generation, path, ..
        } = request
        else {
            unreachable!();
        };
        app.handle_api(ApiEvent::Listed {
            target,
            generation,
            path,
            result: Ok(items),
        });
    }

    fn loaded_with(confirm_delete: bool) -> App {
        let mut app = App::new(&config(confirm_delete));
        app.start(ROOT);
        deliver_listing(&mut app, Target::Main, listing());
        app
    }

    fn loaded() -> App {
        loaded_with(true)
    }

    fn mutation(app: &mut App) -> (u64, Mutation) {
        app.take_requests()
            .into_iter()
            .find_map(|r| match r {
                Request::Mutate { op, call } => Some((op, call)),
                _ => None,
            })
            .expect("mutation request")
    }

    fn names(app: &App) -> Vec<String> {
        app.browser.rows().into_iter().map(|r| r.name).collect()
    }

    fn select(app: &mut App, ids: &[&str]) {
        app.browser.selection.clear();
        for id in ids {
            app.browser.selection.toggle(&ItemId::from(*id));
        }
    }

    #[test]
    fn initial_listing_is_shown() {
        let app = loaded();
        assert_eq!(names(&app), vec!["A", "B", "Dest", "f.txt"]);
        assert!(!app.browser.loading);
    }

    #[test]
    fn stale_listing_is_dropped() {
        let mut app = App::new(&config(true));
        app.start(ROOT);
        let first = app.take_requests();
        app.navigate("/Root/A");
        let Request::List {
            generation, path, ..
        } = first[0].clone()
        else {
            panic!("expected list request");
        };
        app.handle_api(ApiEvent::Listed {
            target: Target::Main,
            generation,
            path,
            result: Ok(listing()),
        });
        assert!(app.browser.rows().is_empty());
        assert_eq!(app.browser.current_path, "/Root/A");
    }

    #[test]
    fn address_outside_root_is_rejected_locally() {
        let mut app = loaded();
        app.begin_address_edit();
        *app.browser.address.input_mut().unwrap() = TextInput::with_value("/Elsewhere");
        app.submit_address();
        assert!(matches!(
            &app.dialog.active,
            ActiveDialog::NotFound { path } if path == "/Elsewhere"
        ));
        assert!(app.take_requests().is_empty());
        assert_eq!(app.browser.current_path, ROOT);
    }

    #[test]
    fn unknown_address_opens_not_found_and_keeps_path() {
        let mut app = loaded();
        app.begin_address_edit();
        *app.browser.address.input_mut().unwrap() = TextInput::with_value("/Root/Nope");
        app.submit_address();
        let requests = app.take_requests();
        let [Request::Validate { generation, path }] = requests.as_slice() else {
            panic!("expected one validation request, got {:?}", requests);
        };
        app.handle_api(ApiEvent::Validated {
            generation: *generation,
            path: path.clone(),
            result: Ok(false),
        });
        assert!(matches!(app.dialog.active, ActiveDialog::NotFound { .. }));
        assert_eq!(app.browser.current_path, ROOT);
        assert!(!app.browser.address.is_editing());
        assert_eq!(names(&app).len(), 4);
    }

    #[test]
    fn valid_address_navigates() {
        let mut app = loaded();
        app.begin_address_edit();
        *app.browser.address.input_mut().unwrap() = TextInput::with_value("/Root/A/");
        app.submit_address();
        let requests = app.take_requests();
        let Request::Validate { generation, path } = requests[0].clone() else {
            panic!("expected validation request");
        };
        assert_eq!(path, "/Root/A");
        app.handle_api(ApiEvent::Validated {
            generation,
            path,
            result: Ok(true),
        });
        assert_eq!(app.browser.current_path, "/Root/A");
        assert!(matches!(
            app.take_requests().as_slice(),
            [Request::List { path, .. }] if path == "/Root/A"
        ));
    }

    #[test]
    fn rename_rebases_descendants() {
        let mut app = loaded();
        select(&mut app, &["a"]);
        app.run_action(ContextAction::Rename);
        assert_eq!(app.dialog.input.value, "A");
        app.dialog.input = TextInput::with_value("A2");
        app.submit_dialog();

        assert!(!app.dialog.is_open());
        let x = app.browser.tree.find_by_id(&ItemId::from("x")).unwrap();
        assert_eq!(x.path, "/Root/A2/x");
        let (_, call) = mutation(&mut app);
        assert_eq!(
            call,
            Mutation::Rename {
                path: "/Root/A".into(),
                new_name: "A2".into()
            }
        );
    }

    #[test]
    fn duplicate_rename_keeps_dialog_open() {
        let mut app = loaded();
        select(&mut app, &["a"]);
        app.run_action(ContextAction::Rename);
        app.dialog.input = TextInput::with_value("b");
        app.submit_dialog();
        assert!(app.dialog.is_open());
        assert_eq!(
            app.dialog.error,
            Some(ValidationError::DuplicateName("b".into()))
        );
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn failed_delete_rolls_back() {
        let mut app = loaded();
        select(&mut app, &["a", "b"]);
        app.run_action(ContextAction::Delete);
        assert!(matches!(app.dialog.active, ActiveDialog::Delete { .. }));
        app.submit_dialog();
        assert_eq!(names(&app), vec!["Dest", "f.txt"]);

        let (op, call) = mutation(&mut app);
        assert_eq!(
            call,
            Mutation::Delete {
                paths: vec!["/Root/A".into(), "/Root/B".into()]
            }
        );
        app.handle_api(ApiEvent::Mutated {
            op,
            result: Err(ApiError::Transport("down".into())),
        });
        assert_eq!(names(&app), vec!["A", "B", "Dest", "f.txt"]);
        assert_eq!(app.toast.as_ref().unwrap().kind, ToastKind::Error);
    }

    #[test]
    fn failure_after_later_edit_refetches() {
        let mut app = loaded_with(false);
        select(&mut app, &["a"]);
        app.run_action(ContextAction::Delete);
        let (first, _) = mutation(&mut app);
        select(&mut app, &["b"]);
        app.run_action(ContextAction::Delete);
        let (second, _) = mutation(&mut app);
        assert_eq!(names(&app), vec!["Dest", "f.txt"]);

        app.handle_api(ApiEvent::Mutated {
            op: first,
            result: Err(ApiError::Status {
                status: 500,
                message: "boom".into(),
            }),
        });
        assert!(matches!(
            app.take_requests().as_slice(),
            [Request::List { path, .. }] if path == ROOT
        ));

        // The refetch supersedes the second edit's snapshot as well.
        app.handle_api(ApiEvent::Mutated {
            op: second,
            result: Err(ApiError::Transport("down".into())),
        });
        assert!(app.take_requests().is_empty());
        assert!(app.browser.rows().is_empty());
    }

    #[test]
    fn rollback_leaves_pending_expansion_retryable() {
        let mut app = loaded();
        app.browser.view = ViewMode::Tree;
        assert!(app.browser.toggle_expand("/Root/B", false).is_some());
        select(&mut app, &["f"]);
        app.run_action(ContextAction::Delete);
        app.submit_dialog();
        let (op, _) = mutation(&mut app);
        app.handle_api(ApiEvent::Mutated {
            op,
            result: Err(ApiError::Transport("down".into())),
        });
        let b = app.browser.tree.find_by_path("/Root/B").unwrap();
        assert_eq!(b.expansion, Expansion::Unloaded);
        assert!(app.browser.toggle_expand("/Root/B", false).is_some());
    }

    fn show_search_results(app: &mut App, keyword: char, results: Vec<FolderItem>) {
        app.begin_search();
        app.browser.address.input_mut().unwrap().insert(keyword);
        app.submit_address();
        let requests = app.take_requests();
        let [Request::Search { generation, .. }] = requests.as_slice() else {
            panic!("expected search request");
        };
        app.handle_api(ApiEvent::Searched {
            generation: *generation,
            result: Ok(results),
        });
    }

    #[test]
    fn leaving_search_after_delete_refetches_listing() {
        let mut app = loaded_with(false);
        show_search_results(&mut app, 'f', vec![FolderItem::file("f", ROOT, "f.txt")]);
        select(&mut app, &["f"]);
        app.run_action(ContextAction::Delete);
        assert!(names(&app).is_empty());
        let (op, _) = mutation(&mut app);
        app.handle_api(ApiEvent::Mutated { op, result: Ok(None) });

        app.begin_search();
        app.cancel_address();
        assert!(!app.browser.is_search_results());
        let mut server = listing();
        server.retain(|item| item.name != "f.txt");
        deliver_listing(&mut app, Target::Main, server);
        assert_eq!(names(&app), vec!["A", "B", "Dest"]);
    }

    #[test]
    fn editing_address_leaves_search_results() {
        let mut app = loaded();
        show_search_results(&mut app, 'x', vec![FolderItem::file("x", "/Root/A", "x")]);
        assert_eq!(names(&app), vec!["x"]);
        app.begin_address_edit();
        assert!(!app.browser.is_search_results());
        assert!(app.browser.address.is_editing());
        assert_eq!(names(&app).len(), 4);
    }

    #[test]
    fn delete_without_confirmation_applies_immediately() {
        let mut app = loaded_with(false);
        select(&mut app, &["f"]);
        app.run_action(ContextAction::Delete);
        assert!(!app.dialog.is_open());
        assert_eq!(names(&app), vec!["A", "B", "Dest"]);
        let (op, _) = mutation(&mut app);
        app.handle_api(ApiEvent::Mutated { op, result: Ok(None) });
        assert_eq!(app.toast.as_ref().unwrap().message, "Deleted \"f.txt\"");
    }

    #[test]
    fn picker_lists_folders_only() {
        let mut app = loaded();
        select(&mut app, &["f"]);
        app.run_action(ContextAction::Move);
        deliver_listing(&mut app, Target::Picker, listing());
        let picker = app.dialog.picker_mut().unwrap();
        let rows: Vec<String> = picker.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(rows, vec!["A", "B", "Dest"]);
        assert!(!picker.selection.multi_enabled);
    }

    #[test]
    fn copy_into_destination_keeps_source() {
        let mut app = loaded();
        select(&mut app, &["a"]);
        app.run_action(ContextAction::Copy);
        deliver_listing(&mut app, Target::Picker, listing());
        app.dialog
            .picker_mut()
            .unwrap()
            .selection
            .click(&ItemId::from("dest"));
        app.submit_dialog();

        assert!(!app.dialog.is_open());
        let dest = app.browser.tree.find_by_path("/Root/Dest").unwrap();
        let copied = &dest.children.as_ref().unwrap()[0];
        assert_eq!(copied.path, "/Root/Dest/A");
        assert_ne!(copied.id, ItemId::from("a"));
        assert!(app.browser.tree.find_by_id(&ItemId::from("a")).is_some());
        let (_, call) = mutation(&mut app);
        assert_eq!(
            call,
            Mutation::Transfer {
                paths: vec!["/Root/A".into()],
                dest: "/Root/Dest".into(),
                mode: TransferMode::Copy
            }
        );
    }

    #[test]
    fn moving_folder_into_itself_is_rejected() {
        let mut app = loaded();
        select(&mut app, &["a"]);
        app.run_action(ContextAction::Move);
        deliver_listing(&mut app, Target::Picker, listing());
        app.dialog
            .picker_mut()
            .unwrap()
            .selection
            .click(&ItemId::from("a"));
        app.submit_dialog();
        assert_eq!(
            app.dialog.error,
            Some(ValidationError::DestinationInsideSource)
        );
    }

    #[test]
    fn comment_count_changes_after_success() {
        let mut app = loaded();
        select(&mut app, &["b"]);
        app.run_action(ContextAction::Comment);
        app.submit_dialog();
        assert_eq!(
            app.dialog.error,
            Some(ValidationError::MissingField("Comment"))
        );

        app.dialog.input = TextInput::with_value("Looks good");
        app.submit_dialog();
        let b = ItemId::from("b");
        assert_eq!(app.browser.tree.find_by_id(&b).unwrap().comment_count, 0);
        let (op, _) = mutation(&mut app);
        app.handle_api(ApiEvent::Mutated { op, result: Ok(None) });
        assert_eq!(app.browser.tree.find_by_id(&b).unwrap().comment_count, 1);
    }

    #[test]
    fn icon_change_is_applied_locally() {
        let mut app = loaded();
        select(&mut app, &["b"]);
        app.run_action(ContextAction::ChangeIcon);
        app.dialog.cycle_icon(4);
        app.submit_dialog();
        let b = app.browser.tree.find_by_id(&ItemId::from("b")).unwrap();
        assert_eq!(b.icon.as_deref(), Some("green"));
        let (_, call) = mutation(&mut app);
        assert_eq!(
            call,
            Mutation::ChangeIcon {
                path: "/Root/B".into(),
                icon: Some("green".into())
            }
        );
    }

    #[test]
    fn created_folder_adopts_server_id() {
        let mut app = loaded();
        app.run_action(ContextAction::NewFolder);
        app.dialog.input = TextInput::with_value("Reports");
        app.submit_dialog();
        assert!(names(&app).contains(&"Reports".to_string()));
        let (op, call) = mutation(&mut app);
        assert_eq!(
            call,
            Mutation::CreateFolder {
                parent: ROOT.into(),
                name: "Reports".into()
            }
        );
        let local = app.browser.tree.find_by_path("/Root/Reports").unwrap().id.clone();
        app.browser.selection.click(&local);
        app.handle_api(ApiEvent::Mutated {
            op,
            result: Ok(Some(FolderItem::folder("srv-1", ROOT, "Reports"))),
        });
        assert!(app
            .browser
            .tree
            .find_by_id(&ItemId::from("srv-1"))
            .is_some());
        assert_eq!(app.browser.selection.ids(), &[ItemId::from("srv-1")]);
    }

    #[test]
    fn actions_respect_permissions() {
        let mut app = loaded();
        app.browser
            .tree
            .find_by_id_mut(&ItemId::from("b"))
            .unwrap()
            .permissions = Permissions::read_only();
        select(&mut app, &["b"]);
        app.run_action(ContextAction::Delete);
        assert!(!app.dialog.is_open());
        assert_eq!(app.toast.as_ref().unwrap().kind, ToastKind::Info);
        assert!(names(&app).contains(&"B".to_string()));
    }

    #[test]
    fn file_open_shows_details() {
        let mut app = loaded();
        app.open_item(&ItemId::from("f"));
        assert!(matches!(app.dialog.active, ActiveDialog::Details { .. }));
        assert!(matches!(
            app.take_requests().as_slice(),
            [Request::Detail { path }] if path == "/Root/f.txt"
        ));
    }

    fn grid_layout(app: &mut App) {
        let grid = GridLayout::grid(40, 18);
        app.layout.content = Rect::new(0, 2, 40, 10);
        app.layout.grid = grid;
        app.layout.boxes = grid.boxes(&app.browser.rows());
    }

    #[test]
    fn drag_selects_covered_items() {
        let mut app = loaded();
        grid_layout(&mut app);
        let now = Instant::now();
        app.mouse_down(36, 2, PointerButton::Primary, false, false, now);
        app.mouse_drag(1, 3);
        let selected: Vec<ItemId> = app.browser.selection.ids().to_vec();
        assert_eq!(selected, vec![ItemId::from("a"), ItemId::from("b")]);

        app.mouse_up(now);
        assert!(app.browser.selection.drag().is_some());
        app.tick(now + Duration::from_millis(150));
        assert!(app.browser.selection.drag().is_none());
        assert_eq!(app.browser.selection.len(), 2);
    }

    #[test]
    fn drag_accounts_for_scroll() {
        let mut app = loaded();
        grid_layout(&mut app);
        // One grid line down: the first screen line shows Dest and f.txt.
        app.browser.scroll = 1;
        let now = Instant::now();
        app.mouse_down(36, 2, PointerButton::Primary, false, false, now);
        app.mouse_drag(1, 3);
        let selected: Vec<ItemId> = app.browser.selection.ids().to_vec();
        assert_eq!(selected, vec![ItemId::from("dest"), ItemId::from("f")]);

        let drag = app.browser.selection.drag().unwrap();
        assert_eq!(drag.bounds().top, 3);
    }

    #[test]
    fn double_click_opens_folder() {
        let mut app = loaded();
        grid_layout(&mut app);
        let now = Instant::now();
        app.mouse_down(2, 2, PointerButton::Primary, false, false, now);
        assert!(app.take_requests().is_empty());
        app.mouse_down(
            2,
            2,
            PointerButton::Primary,
            false,
            false,
            now + Duration::from_millis(200),
        );
        assert_eq!(app.browser.current_path, "/Root/A");
    }

    #[test]
    fn right_click_on_background_offers_new_folder() {
        let mut app = loaded();
        grid_layout(&mut app);
        select(&mut app, &["a"]);
        app.mouse_down(36, 2, PointerButton::Secondary, false, false, Instant::now());
        let menu = app.menu.as_ref().unwrap();
        assert_eq!(menu.actions, vec![ContextAction::NewFolder]);
        assert!(app.browser.selection.is_empty());
    }

    #[test]
    fn toast_expires() {
        let mut app = loaded();
        app.show_toast("hello", ToastKind::Info);
        let created = app.toast.as_ref().unwrap().created;
        app.tick(created + Duration::from_secs(1));
        assert!(app.toast.is_some());
        app.tick(created + TOAST_TTL);
        assert!(app.toast.is_none());
    }

    #[test]
    fn search_results_take_the_keyboard() {
        let mut app = loaded();
        app.begin_search();
        assert!(app.address_typing());
        app.browser.address.input_mut().unwrap().insert('x');
        app.submit_address();
        assert!(!app.address_typing());
        let requests = app.take_requests();
        let [Request::Search { generation, keyword, .. }] = requests.as_slice() else {
            panic!("expected search request");
        };
        assert_eq!(keyword, "x");
        app.handle_api(ApiEvent::Searched {
            generation: *generation,
            result: Ok(vec![FolderItem::file("x", "/Root/A", "x")]),
        });
        assert_eq!(names(&app), vec!["x"]);

        app.begin_search();
        assert_eq!(app.browser.address.input().unwrap().value, "x");
        app.cancel_address();
        assert_eq!(names(&app).len(), 4);
    }

    #[test]
    fn filter_narrows_and_clears() {
        let mut app = loaded();
        app.begin_filter();
        app.filter_push('d');
        assert_eq!(names(&app), vec!["Dest"]);
        app.end_filter(false);
        assert_eq!(names(&app).len(), 4);
    }

    #[tokio::test]
    async fn round_trip_against_memory_backend() {
        use crate::api::memory::MemoryFolderApi;
        use crate::api::FolderApi;
        use crate::dispatch::execute;

        let api = MemoryFolderApi::demo("/Organizations");
        let mut app = App::new(&AppConfig::default());
        app.start("/Organizations");

        async fn pump(app: &mut App, api: &MemoryFolderApi) {
            loop {
                let requests = app.take_requests();
                if requests.is_empty() {
                    break;
                }
                for request in requests {
                    let event = execute(api, request).await;
                    app.handle_api(event);
                }
            }
        }

        pump(&mut app, &api).await;
        assert_eq!(names(&app), vec!["Acme", "Globex", "readme.txt"]);

        app.browser.focus_first();
        app.run_action(ContextAction::Rename);
        app.dialog.input = TextInput::with_value("Acme Corp");
        app.submit_dialog();
        pump(&mut app, &api).await;

        assert_eq!(app.toast.as_ref().unwrap().kind, ToastKind::Success);
        let listed = api.list("/Organizations").await.unwrap();
        assert!(listed.iter().any(|i| i.name == "Acme Corp"));
    }
}
