use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{FolderApi, ItemDto, Listing};
use crate::error::ApiError;
use crate::folder::item::FolderItem;
use crate::folder::mutation::TransferMode;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// JSON-over-HTTP client for the folder service.
pub struct HttpFolderApi {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolderBody<'a> {
    parent_path: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenameBody<'a> {
    path: &'a str,
    new_name: &'a str,
}

#[derive(Serialize)]
struct PathsBody<'a> {
    paths: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferBody<'a> {
    paths: &'a [String],
    destination_path: &'a str,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    path: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct IconBody<'a> {
    path: &'a str,
    icon: Option<&'a str>,
}

#[derive(serde::Deserialize)]
struct ExistsReply {
    exists: bool,
}

impl HttpFolderApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        self.client.get(self.url(endpoint))
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client.post(self.url(endpoint))
    }

    fn patch(&self, endpoint: &str) -> RequestBuilder {
        self.client.patch(self.url(endpoint))
    }

    /// Send a request and turn non-success statuses into `ApiError`s.
    async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response, ApiError> {
        debug!(request = what, "sending backend request");
        let response = req.send().await.map_err(|e| {
            warn!(request = what, error = %e, "backend unreachable");
            ApiError::from(e)
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        warn!(request = what, status = status.as_u16(), "backend rejected request");
        Err(status_error(status, what, message))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(req, what).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn status_error(status: StatusCode, what: &str, message: String) -> ApiError {
    let message = if message.is_empty() {
        what.to_string()
    } else {
        message
    };
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl FolderApi for HttpFolderApi {
    async fn list(&self, path: &str) -> Result<Vec<FolderItem>, ApiError> {
        let req = self.get("/folders").query(&[("path", path)]);
        let listing: Listing = self.send_json(req, "list").await?;
        Ok(listing.into_items())
    }

    async fn detail(&self, path: &str) -> Result<FolderItem, ApiError> {
        let req = self.get("/folders/detail").query(&[("path", path)]);
        let dto: ItemDto = self.send_json(req, "detail").await?;
        Ok(dto.into())
    }

    async fn exists(&self, path: &str) -> Result<bool, ApiError> {
        let req = self.get("/folders/exists").query(&[("path", path)]);
        let reply: ExistsReply = self.send_json(req, "exists").await?;
        Ok(reply.exists)
    }

    async fn search(&self, path: &str, keyword: &str) -> Result<Vec<FolderItem>, ApiError> {
        let req = self
            .get("/folders/search")
            .query(&[("path", path), ("keyword", keyword)]);
        let listing: Listing = self.send_json(req, "search").await?;
        Ok(listing.into_items())
    }

    async fn create_folder(&self, parent: &str, name: &str) -> Result<FolderItem, ApiError> {
        let req = self.post("/folders").json(&CreateFolderBody {
            parent_path: parent,
            name,
        });
        let dto: ItemDto = self.send_json(req, "create folder").await?;
        Ok(dto.into())
    }

    async fn rename(&self, path: &str, new_name: &str) -> Result<(), ApiError> {
        let req = self
            .patch("/folders/rename")
            .json(&RenameBody { path, new_name });
        self.send(req, "rename").await.map(|_| ())
    }

    async fn delete(&self, paths: &[String]) -> Result<(), ApiError> {
        let req = self.post("/folders/delete").json(&PathsBody { paths });
        self.send(req, "delete").await.map(|_| ())
    }

    async fn transfer(
        &self,
        paths: &[String],
        dest: &str,
        mode: TransferMode,
    ) -> Result<(), ApiError> {
        let endpoint = match mode {
            TransferMode::Copy => "/folders/copy",
            TransferMode::Move => "/folders/move",
        };
        let req = self.post(endpoint).json(&TransferBody {
            paths,
            destination_path: dest,
        });
        self.send(req, mode.label()).await.map(|_| ())
    }

    async fn add_comment(&self, path: &str, text: &str) -> Result<(), ApiError> {
        let req = self
            .post("/folders/comments")
            .json(&CommentBody { path, text });
        self.send(req, "comment").await.map(|_| ())
    }

    async fn change_icon(&self, path: &str, icon: Option<&str>) -> Result<(), ApiError> {
        let req = self.patch("/folders/icon").json(&IconBody { path, icon });
        self.send(req, "change icon").await.map(|_| ())
    }
}
