use axum::{
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Multipart, Path, Query},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    types::{
        DeleteResponse, Email, EmailPage, Folder, FolderId, ListQuery, MoveRequest, NewEmail,
        ReadUpdate, SendResponse, StarUpdate, DEFAULT_LIMIT,
    },
    AppState, Asset,
};

/// upper bound for a multipart send request, attachments included
const MAX_SEND_BYTES: usize = 25 * 1024 * 1024;

/// `Query` reporting malformed parameters as a JSON error
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(Error))]
struct QueryParams<T>(T);

/// `Json` reporting malformed bodies as a JSON error
#[derive(FromRequest)]
#[from_request(via(Json), rejection(Error))]
struct JsonBody<T>(T);

/// return a page of emails of a folder, newest first
async fn emails_handler(
    QueryParams(query): QueryParams<ListQuery>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<EmailPage>> {
    let folder = match query.folder.as_deref().filter(|f| !f.is_empty()) {
        Some(folder) => folder.parse()?,
        None => FolderId::Inbox,
    };

    let storage = state.read_storage()?;
    let page = storage.list(
        folder,
        query.search.as_deref(),
        query.limit.unwrap_or(DEFAULT_LIMIT),
        query.offset.unwrap_or(0),
    );

    Ok(Json(page))
}

async fn email_handler(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Email>> {
    let email = state.read_storage()?.get(&id)?.clone();

    Ok(Json(email))
}

/// store an outgoing message, attachments are written to disk before the
/// message is added to the sent folder
async fn send_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SendResponse>> {
    let mut new_email = NewEmail::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();

        match name.as_str() {
            "to" => new_email.to = field.text().await?,
            "subject" => new_email.subject = field.text().await?,
            "body" => new_email.body = field.text().await?,
            "attachments" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content = field.bytes().await?;

                // browsers send an empty part for an empty file input
                if file_name.is_empty() && content.is_empty() {
                    continue;
                }

                let stored = state.attachments.store(&file_name, &content).await?;
                new_email.attachments.push(stored);
            }
            other => warn!("ignoring unknown form field {other:?}"),
        }
    }

    let email = state.write_storage()?.send(new_email);

    Ok(Json(SendResponse {
        message: "Email sent successfully".to_owned(),
        email,
    }))
}

async fn read_handler(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(update): JsonBody<ReadUpdate>,
) -> Result<Json<Email>> {
    let email = state.write_storage()?.set_read(&id, update.read)?;

    Ok(Json(email))
}

async fn star_handler(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(update): JsonBody<StarUpdate>,
) -> Result<Json<Email>> {
    let email = state.write_storage()?.set_starred(&id, update.starred)?;

    Ok(Json(email))
}

async fn move_handler(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(request): JsonBody<MoveRequest>,
) -> Result<Json<Email>> {
    // reject unknown folders before touching the mailbox
    let target: FolderId = request.folder.parse()?;
    let email = state.write_storage()?.move_to(&id, target)?;

    Ok(Json(email))
}

/// move a message to the trash, or remove it when it is in the trash already
async fn delete_handler(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<DeleteResponse>> {
    let outcome = state.write_storage()?.delete(&id)?;

    Ok(Json(outcome.into()))
}

async fn folders_handler(Extension(state): Extension<Arc<AppState>>) -> Result<Json<Vec<Folder>>> {
    let folders = state.read_storage()?.folders().to_vec();

    Ok(Json(folders))
}

async fn index(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.index {
        Some(index) => Html(index.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "frontend is not built").into_response(),
    }
}

/// serve the compiled frontend from the binary
async fn static_handler(Path(path): Path<String>) -> Response {
    match Asset::get(&path) {
        Some(file) => (
            [(header::CONTENT_TYPE, file.metadata.mimetype().to_owned())],
            file.data,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub(crate) fn router(app_state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/", get(index))
        .route("/static/*path", get(static_handler))
        .route("/api/emails", get(emails_handler))
        .route(
            "/api/emails/send",
            post(send_handler).layer(DefaultBodyLimit::max(MAX_SEND_BYTES)),
        )
        .route("/api/emails/:id", get(email_handler).delete(delete_handler))
        .route("/api/emails/:id/read", patch(read_handler))
        .route("/api/emails/:id/star", patch(star_handler))
        .route("/api/emails/:id/move", patch(move_handler))
        .route("/api/folders", get(folders_handler))
        .nest_service("/uploads", ServeDir::new(app_state.attachments.directory()));

    let app = if app_state.prefix == "/" {
        router
    } else {
        Router::new().nest(app_state.prefix.as_str(), router)
    };

    app.layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(Extension(app_state))
}

pub(crate) async fn http_server(
    listener: TcpListener,
    app_state: Arc<AppState>,
    token: CancellationToken,
) -> Result<&'static str> {
    let app = router(app_state);
    let addr = listener.local_addr()?;

    info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .map_err(|e| Error::WebServer(e.to_string()))?;

    info!("HTTP server stopped");

    Ok("web server")
}
