use lan_share::notify::notify_device;
use lan_share::{Device, PendingTransfer};
use rocket::http::Status;
use rocket::serde::json::{self, Json};
use rocket::{get, post, Responder, State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    #[serde(default)]
    device_id: String,
    #[serde(default)]
    transfer_id: String,
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    #[serde(default)]
    device_id: String,
    #[serde(default)]
    transfer_id: String,
}

#[derive(Responder)]
pub enum PendingReply {
    Found(Json<PendingTransfer>),
    #[response(status = 204)]
    Empty(()),
}

#[get("/api/devices")]
pub async fn list(state: &State<AppState>) -> Json<Vec<Device>> {
    Json(state.registry.list().await)
}

#[post("/api/devices/register", data = "<request>")]
pub async fn register(
    request: Result<Json<RegisterRequest>, json::Error<'_>>,
    state: &State<AppState>,
) -> Result<Json<Device>, ApiError> {
    let request = request.map_err(|_| ApiError::bad_request("invalid payload"))?;
    let device = state.registry.upsert(&request.id, &request.name).await?;
    Ok(Json(device))
}

#[post("/api/devices/notify", data = "<request>")]
pub async fn notify(
    request: Result<Json<NotifyRequest>, json::Error<'_>>,
    state: &State<AppState>,
) -> Result<Status, ApiError> {
    let request = request.map_err(|_| ApiError::bad_request("invalid payload"))?;
    notify_device(
        &state.store,
        &state.registry,
        &request.device_id,
        &request.transfer_id,
        &request.token,
    )
    .await?;
    Ok(Status::NoContent)
}

#[get("/api/devices/pending?<id>")]
pub async fn pending(id: Option<&str>, state: &State<AppState>) -> Result<PendingReply, ApiError> {
    let id = id.unwrap_or_default().trim();
    if id.is_empty() {
        return Err(ApiError::bad_request("missing device id"));
    }

    match state.registry.pending(id).await? {
        Some(pending) => Ok(PendingReply::Found(Json(pending))),
        None => Ok(PendingReply::Empty(())),
    }
}

#[post("/api/devices/clear", data = "<request>")]
pub async fn clear(
    request: Result<Json<ClearRequest>, json::Error<'_>>,
    state: &State<AppState>,
) -> Result<Status, ApiError> {
    let request = request.map_err(|_| ApiError::bad_request("invalid payload"))?;
    if request.device_id.is_empty() {
        return Err(ApiError::bad_request("missing device id"));
    }

    state
        .registry
        .clear(&request.device_id, &request.transfer_id)
        .await;
    Ok(Status::NoContent)
}
