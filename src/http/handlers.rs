use crate::http::{ApiError, ApiJson, ApiQuery, AppState, ClientSettings};
use crate::workflow::{MessageId, Prompt};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct LaunchRequest {
    pub launch: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub message_id: Option<String>,
}

impl MessageQuery {
    pub fn message_id(&self) -> Result<MessageId, ApiError> {
        self.message_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(MessageId::parse)
            .ok_or_else(|| ApiError::BadRequest("missing `message_id` query parameter".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub msg: Value,
}

#[derive(Debug, Deserialize)]
pub struct DrawingRequest {
    #[serde(default)]
    pub data: Value,
}

pub const UPLOAD_FIELD: &str = "file";

/// GET /settings
pub async fn client_settings(State(state): State<AppState>) -> Json<ClientSettings> {
    Json(state.client.clone())
}

/// POST /launch
pub async fn launch(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LaunchRequest>,
) -> Result<Json<Prompt>, ApiError> {
    let dispatcher = state.dispatcher.clone();
    run_blocking(move || dispatcher.launch(&request.launch))
        .await
        .map(Json)
}

/// POST /reply?message_id=
pub async fn reply(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MessageQuery>,
    ApiJson(request): ApiJson<ReplyRequest>,
) -> Result<Json<Prompt>, ApiError> {
    let message_id = query.message_id()?;
    let dispatcher = state.dispatcher.clone();
    run_blocking(move || dispatcher.dispatch_message(&message_id, request.msg))
        .await
        .map(Json)
}

/// POST /file?message_id=
pub async fn file(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MessageQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prompt>, ApiError> {
    let message_id = query.message_id()?;
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .and_then(upload_file_name)
            .ok_or_else(|| ApiError::BadRequest("upload is missing a file name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) = upload.ok_or_else(|| {
        ApiError::BadRequest(format!("multipart field `{UPLOAD_FIELD}` is missing"))
    })?;

    let dispatcher = state.dispatcher.clone();
    run_blocking(move || dispatcher.dispatch_upload(&message_id, &file_name, &bytes))
        .await
        .map(Json)
}

/// POST /drawing?message_id=
pub async fn drawing(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MessageQuery>,
    ApiJson(request): ApiJson<DrawingRequest>,
) -> Result<Json<Prompt>, ApiError> {
    let message_id = query.message_id()?;
    let dispatcher = state.dispatcher.clone();
    run_blocking(move || dispatcher.dispatch_drawing(&message_id, &request.data))
        .await
        .map(Json)
}

/// Final path component of a client-supplied file name.
pub fn upload_file_name(raw: &str) -> Option<String> {
    let name = Path::new(raw.rsplit(['/', '\\']).next().unwrap_or(raw))
        .file_name()?
        .to_str()?;
    Some(name.to_string())
}

async fn run_blocking<F>(work: F) -> Result<Prompt, ApiError>
where
    F: FnOnce() -> Result<Prompt, crate::router::DispatchError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("dispatch task failed: {e}")))?
        .map_err(ApiError::from)
}
