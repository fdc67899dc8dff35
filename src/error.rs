use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from the terminal or config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Failures reported by the folder backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, TLS).
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The addressed folder or file does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation collides with existing state (duplicate name, bad move).
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Client-side validation failures, shown inline in the open dialog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name is unchanged")]
    UnchangedName,

    #[error("Name cannot contain '/'")]
    InvalidCharacter,

    #[error("\"{0}\" already exists here")]
    DuplicateName(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Cannot move a folder into itself")]
    DestinationInsideSource,

    #[error("Item no longer exists")]
    MissingItem,
}
