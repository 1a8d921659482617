use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{event, Level};

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Email not found")]
    NotFound,
    #[error("Folder not found: {0}")]
    UnknownFolder(String),
    #[error("invalid multipart form {0}")]
    Multipart(#[from] MultipartError),
    #[error("invalid query: {}", .0.body_text())]
    Query(#[from] QueryRejection),
    #[error("invalid request body: {}", .0.body_text())]
    Body(#[from] JsonRejection),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("storage error {0}")]
    Storage(String),
    #[error("web server error {0}")]
    WebServer(String),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::NotFound | Error::UnknownFolder(_) => StatusCode::NOT_FOUND,
            Error::Multipart(_) | Error::Query(_) | Error::Body(_) => StatusCode::BAD_REQUEST,
            Error::Io(_) | Error::Storage(_) | Error::WebServer(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            event!(Level::ERROR, "request failed: {self}");
        } else {
            event!(Level::WARN, "request rejected: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
