//! Runs backend requests off the UI loop and posts the answers back as events.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::FolderApi;
use crate::error::ApiError;
use crate::event::{ApiEvent, Event};
use crate::folder::browser::Fetch;
use crate::folder::item::FolderItem;
use crate::folder::mutation::TransferMode;

/// Which browser a read belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Main,
    /// The destination picker inside the move/copy dialog.
    Picker,
}

/// A write sent to the backend after its local edit was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateFolder { parent: String, name: String },
    Rename { path: String, new_name: String },
    Delete { paths: Vec<String> },
    Transfer { paths: Vec<String>, dest: String, mode: TransferMode },
    Comment { path: String, text: String },
    ChangeIcon { path: String, icon: Option<String> },
}

impl Mutation {
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::CreateFolder { .. } => "Create folder",
            Mutation::Rename { .. } => "Rename",
            Mutation::Delete { .. } => "Delete",
            Mutation::Transfer { mode, .. } => mode.label(),
            Mutation::Comment { .. } => "Comment",
            Mutation::ChangeIcon { .. } => "Change icon",
        }
    }
}

/// Everything the UI asks of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List { target: Target, generation: u64, path: String },
    Children { target: Target, generation: u64, path: String },
    Search { generation: u64, path: String, keyword: String },
    Validate { generation: u64, path: String },
    Detail { path: String },
    Mutate { op: u64, call: Mutation },
}

impl Request {
    /// Wrap a browser fetch for `target`.
    pub fn from_fetch(target: Target, fetch: Fetch) -> Self {
        match fetch {
            Fetch::List { generation, path } => Request::List {
                target,
                generation,
                path,
            },
            Fetch::Children { generation, path } => Request::Children {
                target,
                generation,
                path,
            },
            Fetch::Search {
                generation,
                path,
                keyword,
            } => Request::Search {
                generation,
                path,
                keyword,
            },
            Fetch::Validate { generation, path } => Request::Validate { generation, path },
        }
    }
}

/// Perform one request.
pub async fn execute(api: &dyn FolderApi, request: Request) -> ApiEvent {
    debug!(?request, "executing request");
    match request {
        Request::List {
            target,
            generation,
            path,
        } => {
            let result = api.list(&path).await;
            ApiEvent::Listed {
                target,
                generation,
                path,
                result,
            }
        }
        Request::Children {
            target,
            generation,
            path,
        } => {
            let result = api.list(&path).await;
            ApiEvent::Children {
                target,
                generation,
                path,
                result,
            }
        }
        Request::Search {
            generation,
            path,
            keyword,
        } => ApiEvent::Searched {
            generation,
            result: api.search(&path, &keyword).await,
        },
        Request::Validate { generation, path } => {
            let result = api.exists(&path).await;
            ApiEvent::Validated {
                generation,
                path,
                result,
            }
        }
        Request::Detail { path } => {
            let result = api.detail(&path).await;
            ApiEvent::Detail { path, result }
        }
        Request::Mutate { op, call } => ApiEvent::Mutated {
            op,
            result: mutate(api, call).await,
        },
    }
}

async fn mutate(api: &dyn FolderApi, call: Mutation) -> Result<Option<FolderItem>, ApiError> {
    match call {
        Mutation::CreateFolder { parent, name } => api.create_folder(&parent, &name).await.map(Some),
        Mutation::Rename { path, new_name } => api.rename(&path, &new_name).await.map(|_| None),
        Mutation::Delete { paths } => api.delete(&paths).await.map(|_| None),
        Mutation::Transfer { paths, dest, mode } => {
            api.transfer(&paths, &dest, mode).await.map(|_| None)
        }
        Mutation::Comment { path, text } => api.add_comment(&path, &text).await.map(|_| None),
        Mutation::ChangeIcon { path, icon } => {
            api.change_icon(&path, icon.as_deref()).await.map(|_| None)
        }
    }
}

/// Run `request` on its own task and send the response to the event loop.
pub fn spawn(api: Arc<dyn FolderApi>, request: Request, tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        let response = execute(api.as_ref(), request).await;
        if tx.send(Event::Api(response)).is_err() {
            warn!("event loop gone; dropping backend response");
        }
    });
}
