//! The REST backend, seen from the browser.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::folder::item::{Expansion, FolderItem, ItemId, ItemKind, Permissions};
use crate::folder::mutation::TransferMode;

/// Folder/file operations offered by the backend.
#[async_trait]
pub trait FolderApi: Send + Sync {
    /// Folders and files directly under `path`.
    async fn list(&self, path: &str) -> Result<Vec<FolderItem>, ApiError>;

    async fn detail(&self, path: &str) -> Result<FolderItem, ApiError>;

    /// Whether `path` names an existing folder.
    async fn exists(&self, path: &str) -> Result<bool, ApiError>;

    /// Folders and files under `path` whose name contains `keyword`.
    async fn search(&self, path: &str, keyword: &str) -> Result<Vec<FolderItem>, ApiError>;

    async fn create_folder(&self, parent: &str, name: &str) -> Result<FolderItem, ApiError>;

    async fn rename(&self, path: &str, new_name: &str) -> Result<(), ApiError>;

    async fn delete(&self, paths: &[String]) -> Result<(), ApiError>;

    async fn transfer(&self, paths: &[String], dest: &str, mode: TransferMode)
        -> Result<(), ApiError>;

    async fn add_comment(&self, path: &str, text: &str) -> Result<(), ApiError>;

    async fn change_icon(&self, path: &str, icon: Option<&str>) -> Result<(), ApiError>;
}

/// Wire shape of a folder or file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comment_count: usize,
}

impl From<ItemDto> for FolderItem {
    fn from(dto: ItemDto) -> Self {
        FolderItem {
            id: ItemId(dto.id),
            name: dto.name,
            kind: dto.kind,
            path: dto.path,
            icon: dto.icon,
            children: None,
            expansion: Expansion::Unloaded,
            permissions: dto.permissions,
            created_at: dto.create_date,
            updated_at: dto.update_date,
            comment_count: dto.comment_count,
        }
    }
}

impl From<&FolderItem> for ItemDto {
    fn from(item: &FolderItem) -> Self {
        ItemDto {
            id: item.id.0.clone(),
            name: item.name.clone(),
            kind: item.kind,
            path: item.path.clone(),
            icon: item.icon.clone(),
            permissions: item.permissions,
            create_date: item.created_at,
            update_date: item.updated_at,
            comment_count: item.comment_count,
        }
    }
}

/// A directory listing or search result: folders and files separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub folders: Vec<ItemDto>,
    #[serde(default)]
    pub files: Vec<ItemDto>,
}

impl Listing {
    /// Files never carry children; folders start unloaded.
    pub fn into_items(self) -> Vec<FolderItem> {
        self.folders
            .into_iter()
            .chain(self.files)
            .map(FolderItem::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_decodes_backend_json() {
        let json = r#"{
            "folders": [
                {"id": "f1", "name": "Acme", "type": "folder", "path": "/Organizations/Acme",
                 "icon": "blue", "permissions": {"canView": true, "canDelete": false},
                 "createDate": "2026-01-05T10:00:00Z"}
            ],
            "files": [
                {"id": "d1", "name": "readme.txt", "type": "file", "path": "/Organizations/readme.txt"}
            ]
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        let items = listing.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, ItemKind::Folder);
        assert_eq!(items[0].icon.as_deref(), Some("blue"));
        assert!(items[0].permissions.can_view);
        assert!(!items[0].permissions.can_delete);
        assert!(items[0].created_at.is_some());
        assert_eq!(items[1].kind, ItemKind::File);
        assert!(items[1].children.is_none());
        assert_eq!(items[1].permissions, Permissions::all());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let listing: Listing = serde_json::from_str("{}").unwrap();
        assert!(listing.into_items().is_empty());
    }
}
