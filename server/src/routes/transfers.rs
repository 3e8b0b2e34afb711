use lan_share::notify::revoke_transfer;
use lan_share::{Category, FilePayload, Transfer};
use rocket::form::{Form, FromForm};
use rocket::fs::TempFile;
use rocket::http::uri::Host;
use rocket::http::{CookieJar, Status};
use rocket::serde::json::{self, Json};
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::download::FileDownload;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(FromForm)]
pub struct UploadForm<'r> {
    files: Vec<TempFile<'r>>,
    category: Option<String>,
    pin: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFile {
    pub id: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: String,
    pub token: String,
    pub category: Category,
    pub category_label: &'static str,
    pub requires_pin: bool,
    pub share_url: String,
    pub files: Vec<SharedFile>,
}

impl UploadResponse {
    /// `host` is the request's `Host` header; without one the share link is
    /// left relative.
    pub fn new(transfer: &Transfer, host: Option<&Host<'_>>) -> Self {
        let files = transfer
            .files
            .iter()
            .map(|f| SharedFile {
                id: f.id.clone(),
                name: f.name.clone(),
                mime: f.mime.clone(),
                size: f.size,
                url: format!(
                    "/file?id={}&token={}&file={}",
                    transfer.id, transfer.token, f.id
                ),
            })
            .collect();

        Self {
            id: transfer.id.clone(),
            token: transfer.token.clone(),
            category: transfer.category,
            category_label: transfer.category.label(),
            requires_pin: transfer.requires_pin(),
            share_url: share_url(transfer, host),
            files,
        }
    }
}

fn share_url(transfer: &Transfer, host: Option<&Host<'_>>) -> String {
    let path = format!("/meta?id={}&token={}", transfer.id, transfer.token);
    match host {
        Some(host) => format!("http://{}{}", host, path),
        None => path,
    }
}

#[derive(Debug, Serialize)]
pub struct MetaFile {
    pub id: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub category: Category,
    pub requires_pin: bool,
    pub files: Vec<MetaFile>,
}

#[post("/uploadFile", data = "<form>")]
pub async fn upload(
    form: Form<UploadForm<'_>>,
    host: Option<&Host<'_>>,
    state: &State<AppState>,
) -> Result<Json<UploadResponse>, ApiError> {
    let UploadForm {
        files,
        category,
        pin,
    } = form.into_inner();

    if files.is_empty() {
        return Err(ApiError::bad_request("please attach at least one file"));
    }

    let mut payloads = Vec::with_capacity(files.len());
    for file in &files {
        let name = file
            .raw_name()
            .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
            .unwrap_or_default();
        let mime = file.content_type().map(|ct| ct.to_string()).unwrap_or_default();
        let content = file.open().await.map_err(|e| {
            warn!(error = %e, "unable to read uploaded file");
            ApiError::bad_request("unable to read file")
        })?;
        payloads.push(FilePayload::new(name, mime, content));
    }

    let category = Category::normalize(category.as_deref().unwrap_or_default());
    let transfer = state
        .store
        .save_files(category, pin.as_deref().unwrap_or_default(), payloads)
        .await
        .map_err(ApiError::from_upload)?;

    Ok(Json(UploadResponse::new(&transfer, host)))
}

#[get("/meta?<id>&<token>")]
pub async fn meta(
    id: Option<&str>,
    token: Option<&str>,
    cookies: &CookieJar<'_>,
    state: &State<AppState>,
) -> Result<Json<MetaResponse>, ApiError> {
    let transfer = state.transfer(id, token).await?;
    state.require_pin(cookies, &transfer)?;

    let files = transfer
        .files
        .iter()
        .map(|f| MetaFile {
            id: f.id.clone(),
            name: f.name.clone(),
            mime: f.mime.clone(),
            size: f.size,
        })
        .collect();

    Ok(Json(MetaResponse {
        category: transfer.category,
        requires_pin: transfer.requires_pin(),
        files,
    }))
}

#[get("/file?<id>&<token>&<file>")]
pub async fn file(
    id: Option<&str>,
    token: Option<&str>,
    file: Option<&str>,
    cookies: &CookieJar<'_>,
    state: &State<AppState>,
) -> Result<FileDownload, ApiError> {
    let transfer = state.transfer(id, token).await?;
    state.require_pin(cookies, &transfer)?;

    let stored = transfer
        .find_file(file.unwrap_or_default())
        .ok_or_else(|| ApiError::not_found("file not found"))?;

    // the transfer may have expired between authorization and open
    let body = tokio::fs::File::open(&stored.path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::not_found("transfer not found")
        } else {
            warn!(file_id = %stored.id, error = %e, "stored file unavailable");
            ApiError::internal("file unavailable")
        }
    })?;

    Ok(FileDownload::new(body, stored))
}

#[derive(FromForm)]
pub struct UnlockForm<'r> {
    id: Option<&'r str>,
    token: Option<&'r str>,
    pin: Option<&'r str>,
}

/// Exchanges a correct PIN for an access cookie. A wrong PIN is a 403 the
/// client can retry.
#[post("/unlock", data = "<form>")]
pub async fn unlock(
    form: Form<UnlockForm<'_>>,
    cookies: &CookieJar<'_>,
    state: &State<AppState>,
) -> Result<Status, ApiError> {
    let transfer = state.transfer(form.id, form.token).await?;
    if !state.validate_pin(form.pin.unwrap_or_default(), &transfer) {
        return Err(ApiError::forbidden("invalid pin"));
    }

    state.grant_pin_access(cookies, &transfer);
    Ok(Status::NoContent)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeRequest {
    transfer_id: String,
    token: String,
}

#[post("/api/transfers/revoke", data = "<request>")]
pub async fn revoke(
    request: Result<Json<RevokeRequest>, json::Error<'_>>,
    state: &State<AppState>,
) -> Result<Status, ApiError> {
    let request = request.map_err(|_| ApiError::bad_request("invalid payload"))?;
    revoke_transfer(&state.store, &state.registry, &request.transfer_id, &request.token).await?;
    Ok(Status::NoContent)
}
