use gloo_net::{
    http::{Request, Response},
    Error,
};
use web_sys::FormData;

use crate::types::{
    DeleteResponse, Email, EmailPage, Folder, MoveRequest, ReadUpdate, SendResponse, StarUpdate,
};

pub const PAGE_SIZE: usize = 50;

fn get_base_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default()
        .trim_end_matches('/')
        .to_string()
}

pub fn get_api_path(path: &str) -> String {
    let mut pathname = get_base_path();

    pathname.push_str("/api/");
    pathname.push_str(path);

    pathname
}

/// location of a stored attachment below `base`, the name is percent encoded
/// since stored names may contain `#`, `?` or `%`
pub fn upload_path(base: &str, name: &str) -> String {
    format!("{base}/uploads/{}", urlencoding::encode(name))
}

pub fn get_upload_path(name: &str) -> String {
    upload_path(&get_base_path(), name)
}

/// turn non 2xx responses into errors, the server reports `{ "error": .. }`
async fn check(response: Response) -> Result<Response, Error> {
    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    Err(Error::GlooError(format!("request failed ({status}): {text}")))
}

pub async fn fetch_folders() -> Result<Vec<Folder>, Error> {
    let response = Request::get(&get_api_path("folders")).send().await?;

    check(response).await?.json().await
}

pub async fn fetch_emails(
    folder: &str,
    search: &str,
    offset: usize,
    limit: usize,
) -> Result<EmailPage, Error> {
    let limit = limit.to_string();
    let offset = offset.to_string();
    let mut query = vec![
        ("folder", folder),
        ("limit", limit.as_str()),
        ("offset", offset.as_str()),
    ];

    if !search.is_empty() {
        query.push(("search", search));
    }

    let response = Request::get(&get_api_path("emails"))
        .query(query)
        .send()
        .await?;

    check(response).await?.json().await
}

pub async fn set_read(id: &str, read: bool) -> Result<Email, Error> {
    let response = Request::patch(&get_api_path(&format!("emails/{id}/read")))
        .json(&ReadUpdate { read })?
        .send()
        .await?;

    check(response).await?.json().await
}

pub async fn set_starred(id: &str, starred: bool) -> Result<Email, Error> {
    let response = Request::patch(&get_api_path(&format!("emails/{id}/star")))
        .json(&StarUpdate { starred })?
        .send()
        .await?;

    check(response).await?.json().await
}

pub async fn move_email(id: &str, folder: &str) -> Result<Email, Error> {
    let response = Request::patch(&get_api_path(&format!("emails/{id}/move")))
        .json(&MoveRequest { folder })?
        .send()
        .await?;

    check(response).await?.json().await
}

pub async fn delete_email(id: &str) -> Result<DeleteResponse, Error> {
    let response = Request::delete(&get_api_path(&format!("emails/{id}")))
        .send()
        .await?;

    check(response).await?.json().await
}

/// multipart form with `to`, `subject`, `body` and `attachments`
pub async fn send_email(form: FormData) -> Result<SendResponse, Error> {
    let response = Request::post(&get_api_path("emails/send"))
        .body(form)?
        .send()
        .await?;

    check(response).await?.json().await
}
