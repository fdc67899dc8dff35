//! In-memory backend used by `--demo` and the tests.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::api::{FolderApi, ItemDto};
use crate::error::ApiError;
use crate::folder::item::{FolderItem, ItemId, ItemKind, Permissions};
use crate::folder::mutation::{unique_name, TransferMode};
use crate::folder::path;

#[derive(Debug, Clone)]
struct Node {
    dto: ItemDto,
    comments: Vec<String>,
}

#[derive(Debug, Default)]
struct Store {
    /// Every folder and file keyed by full path, the root included.
    nodes: BTreeMap<String, Node>,
    fail_next: Option<ApiError>,
}

impl Store {
    fn get(&self, p: &str) -> Result<&Node, ApiError> {
        self.nodes
            .get(p)
            .ok_or_else(|| ApiError::NotFound(p.to_string()))
    }

    fn folder(&self, p: &str) -> Result<&Node, ApiError> {
        let node = self.get(p)?;
        if node.dto.kind != ItemKind::Folder {
            return Err(ApiError::Conflict(format!("{} is not a folder", p)));
        }
        Ok(node)
    }

    fn child_names(&self, parent: &str) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|k| path::parent(k) == Some(parent))
            .map(|k| path::file_name(k).to_lowercase())
            .collect()
    }

    /// Keys of `p` and everything below it.
    fn subtree(&self, p: &str) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|k| path::is_within(k, p))
            .cloned()
            .collect()
    }

    fn insert(&mut self, dto: ItemDto) {
        self.nodes.insert(
            dto.path.clone(),
            Node {
                dto,
                comments: Vec::new(),
            },
        );
    }

    /// Re-key the subtree at `old` under `new`, optionally with fresh ids.
    fn relocate(&mut self, old: &str, new: &str, keep: bool) {
        for key in self.subtree(old) {
            let node = if keep {
                self.nodes.get(&key).cloned()
            } else {
                self.nodes.remove(&key)
            };
            let Some(mut node) = node else {
                continue;
            };
            node.dto.path = path::rebase(&key, old, new);
            if node.dto.path == new {
                node.dto.name = path::file_name(new).to_string();
            }
            if keep {
                node.dto.id = ItemId::generate().0;
                node.comments.clear();
                node.dto.comment_count = 0;
            }
            node.dto.update_date = Some(Utc::now());
            self.nodes.insert(node.dto.path.clone(), node);
        }
    }

    /// Remove the subtree at `p`, keyed by its old paths.
    fn detach(&mut self, p: &str) -> Vec<(String, Node)> {
        self.subtree(p)
            .into_iter()
            .filter_map(|key| self.nodes.remove(&key).map(|node| (key, node)))
            .collect()
    }

    /// Insert a detached subtree that used to live at `old` under `new`.
    fn attach(&mut self, old: &str, new: &str, nodes: Vec<(String, Node)>) {
        for (key, mut node) in nodes {
            node.dto.path = path::rebase(&key, old, new);
            if node.dto.path == new {
                node.dto.name = path::file_name(new).to_string();
            }
            node.dto.update_date = Some(Utc::now());
            self.nodes.insert(node.dto.path.clone(), node);
        }
    }
}

/// Folder service held entirely in memory.
pub struct MemoryFolderApi {
    root: String,
    store: RwLock<Store>,
    latency: Duration,
}

impl MemoryFolderApi {
    /// An empty namespace containing only `root`.
    pub fn empty(root: &str) -> Self {
        let root = path::normalize(root);
        let mut store = Store::default();
        let parent = path::parent(&root).unwrap_or("/").to_string();
        let mut dto = ItemDto::from(&FolderItem::folder("root", &parent, path::file_name(&root)));
        dto.path = root.clone();
        store.insert(dto);
        Self {
            root,
            store: RwLock::new(store),
            latency: Duration::ZERO,
        }
    }

    /// A small organization hierarchy for trying the browser out.
    pub fn demo(root: &str) -> Self {
        let mut api = Self::empty(root);
        seed(api.store.get_mut(), &api.root);
        api
    }

    /// Delay every call, so in-flight states are visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Make the next call fail with `error`.
    pub async fn fail_next(&self, error: ApiError) {
        self.store.write().await.fail_next = Some(error);
    }

    pub async fn comments(&self, p: &str) -> Vec<String> {
        self.store
            .read()
            .await
            .nodes
            .get(p)
            .map(|n| n.comments.clone())
            .unwrap_or_default()
    }

    async fn begin(&self, op: &str) -> Result<(), ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut store = self.store.write().await;
        if let Some(err) = store.fail_next.take() {
            info!(op, error = %err, "injected failure");
            return Err(err);
        }
        debug!(op, "memory backend call");
        Ok(())
    }

    fn check_within_root(&self, p: &str) -> Result<(), ApiError> {
        if path::is_within(p, &self.root) {
            Ok(())
        } else {
            Err(ApiError::NotFound(p.to_string()))
        }
    }
}

fn seed(store: &mut Store, root: &str) {
    let date = |d: u32| Utc.with_ymd_and_hms(2026, 1, d, 9, 0, 0).single();
    let mut add = |parent: &str, name: &str, kind: ItemKind, day: u32, perms: Permissions| {
        let item = match kind {
            ItemKind::Folder => FolderItem::folder(ItemId::generate().0, parent, name),
            ItemKind::File => FolderItem::file(ItemId::generate().0, parent, name),
        };
        let mut dto = ItemDto::from(&item);
        dto.permissions = perms;
        dto.create_date = date(day);
        dto.update_date = date(day + 1);
        store.insert(dto);
    };

    let acme = path::join(root, "Acme");
    let finance = path::join(&acme, "Finance");
    let globex = path::join(root, "Globex");
    let contracts = path::join(&globex, "Contracts");

    add(root, "Acme", ItemKind::Folder, 2, Permissions::all());
    add(&acme, "Finance", ItemKind::Folder, 3, Permissions::all());
    add(&finance, "Budget 2026.xlsx", ItemKind::File, 4, Permissions::all());
    add(&finance, "Q1 Report.pdf", ItemKind::File, 5, Permissions::all());
    add(&acme, "HR", ItemKind::Folder, 6, Permissions::all());
    add(&path::join(&acme, "HR"), "Handbook.pdf", ItemKind::File, 7, Permissions::all());
    add(&acme, "Engineering", ItemKind::Folder, 8, Permissions::all());
    add(root, "Globex", ItemKind::Folder, 9, Permissions::all());
    add(&globex, "Contracts", ItemKind::Folder, 10, Permissions::read_only());
    add(&contracts, "NDA.docx", ItemKind::File, 11, Permissions::read_only());
    add(root, "readme.txt", ItemKind::File, 12, Permissions::all());
}

#[async_trait]
impl FolderApi for MemoryFolderApi {
    async fn list(&self, p: &str) -> Result<Vec<FolderItem>, ApiError> {
        self.begin("list").await?;
        self.check_within_root(p)?;
        let store = self.store.read().await;
        store.folder(p)?;
        let (folders, files): (Vec<&Node>, Vec<&Node>) = store
            .nodes
            .iter()
            .filter(|(k, _)| path::parent(k) == Some(p))
            .map(|(_, n)| n)
            .partition(|n| n.dto.kind == ItemKind::Folder);
        Ok(folders
            .into_iter()
            .chain(files)
            .map(|n| n.dto.clone().into())
            .collect())
    }

    async fn detail(&self, p: &str) -> Result<FolderItem, ApiError> {
        self.begin("detail").await?;
        let store = self.store.read().await;
        Ok(store.get(p)?.dto.clone().into())
    }

    async fn exists(&self, p: &str) -> Result<bool, ApiError> {
        self.begin("exists").await?;
        let store = self.store.read().await;
        Ok(store
            .nodes
            .get(p)
            .is_some_and(|n| n.dto.kind == ItemKind::Folder))
    }

    async fn search(&self, p: &str, keyword: &str) -> Result<Vec<FolderItem>, ApiError> {
        self.begin("search").await?;
        self.check_within_root(p)?;
        let needle = keyword.to_lowercase();
        let store = self.store.read().await;
        store.folder(p)?;
        Ok(store
            .nodes
            .iter()
            .filter(|(k, n)| {
                k.as_str() != p
                    && path::is_within(k, p)
                    && n.dto.name.to_lowercase().contains(&needle)
            })
            .map(|(_, n)| n.dto.clone().into())
            .collect())
    }

    async fn create_folder(&self, parent: &str, name: &str) -> Result<FolderItem, ApiError> {
        self.begin("create folder").await?;
        let mut store = self.store.write().await;
        store.folder(parent)?;
        if store.child_names(parent).contains(&name.to_lowercase()) {
            return Err(ApiError::Conflict(format!("\"{}\" already exists", name)));
        }
        let mut dto = ItemDto::from(&FolderItem::folder(ItemId::generate().0, parent, name));
        dto.create_date = Some(Utc::now());
        dto.update_date = dto.create_date;
        store.insert(dto.clone());
        Ok(dto.into())
    }

    async fn rename(&self, p: &str, new_name: &str) -> Result<(), ApiError> {
        self.begin("rename").await?;
        let mut store = self.store.write().await;
        store.get(p)?;
        if p == self.root {
            return Err(ApiError::Conflict("cannot rename the root".into()));
        }
        let parent = path::parent(p).unwrap_or("/").to_string();
        let target = path::join(&parent, new_name);
        let same = path::file_name(p).eq_ignore_ascii_case(new_name);
        if !same && store.child_names(&parent).contains(&new_name.to_lowercase()) {
            return Err(ApiError::Conflict(format!("\"{}\" already exists", new_name)));
        }
        store.relocate(p, &target, false);
        Ok(())
    }

    async fn delete(&self, paths: &[String]) -> Result<(), ApiError> {
        self.begin("delete").await?;
        let mut store = self.store.write().await;
        for p in paths {
            store.get(p)?;
            if *p == self.root {
                return Err(ApiError::Conflict("cannot delete the root".into()));
            }
        }
        for p in paths {
            for key in store.subtree(p) {
                store.nodes.remove(&key);
            }
        }
        Ok(())
    }

    async fn transfer(
        &self,
        paths: &[String],
        dest: &str,
        mode: TransferMode,
    ) -> Result<(), ApiError> {
        self.begin(mode.label()).await?;
        let mut store = self.store.write().await;
        store.folder(dest)?;
        for p in paths {
            let node = store.get(p)?;
            if node.dto.kind == ItemKind::Folder && path::is_within(dest, p) {
                return Err(ApiError::Conflict(format!(
                    "cannot {} a folder into itself",
                    mode.label().to_lowercase()
                )));
            }
        }
        let paths = path::outermost(paths);
        // Moved items leave before anything is placed, so none can land on another's key.
        let detached: Vec<(String, Vec<(String, Node)>)> = match mode {
            TransferMode::Move => paths.iter().map(|p| (p.clone(), store.detach(p))).collect(),
            TransferMode::Copy => Vec::new(),
        };
        let mut taken = store.child_names(dest);
        match mode {
            TransferMode::Copy => {
                for p in &paths {
                    let name = unique_name(path::file_name(p), &taken);
                    taken.push(name.to_lowercase());
                    store.relocate(p, &path::join(dest, &name), true);
                }
            }
            TransferMode::Move => {
                for (p, nodes) in detached {
                    let name = unique_name(path::file_name(&p), &taken);
                    taken.push(name.to_lowercase());
                    store.attach(&p, &path::join(dest, &name), nodes);
                }
            }
        }
        Ok(())
    }

    async fn add_comment(&self, p: &str, text: &str) -> Result<(), ApiError> {
        self.begin("comment").await?;
        let mut store = self.store.write().await;
        store.get(p)?;
        if let Some(node) = store.nodes.get_mut(p) {
            node.comments.push(text.to_string());
            node.dto.comment_count = node.comments.len();
        }
        Ok(())
    }

    async fn change_icon(&self, p: &str, icon: Option<&str>) -> Result<(), ApiError> {
        self.begin("change icon").await?;
        let mut store = self.store.write().await;
        store.folder(p)?;
        if let Some(node) = store.nodes.get_mut(p) {
            node.dto.icon = icon.map(str::to_string);
        }
        Ok(())
    }
}
