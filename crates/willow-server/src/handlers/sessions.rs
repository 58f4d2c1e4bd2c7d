//! 会话 CRUD 处理器

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;

use willow_session::{MessageDraft, SessionRecord, SessionSummary};

use crate::error::ApiError;
use crate::state::AppState;

/// 创建会话请求
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// 批量保存消息请求
#[derive(Debug, Deserialize)]
pub struct ReplaceMessagesRequest {
    pub messages: Vec<MessageDraft>,
}

/// GET /api/sessions - 会话列表（不含消息），按最近更新排序
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let summaries = state.store.list_summaries().await?;
    Ok(Json(summaries))
}

/// POST /api/sessions - 新建会话
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionRecord>), ApiError> {
    let record = state
        .store
        .create(req.title.as_deref().unwrap_or(""), req.model.as_deref())
        .await?;

    tracing::info!("Created session {} ({})", record.id, record.title);
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/sessions/:id - 会话详情（含消息）
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionRecord>, ApiError> {
    let record = state.store.get(&session_id).await?;
    Ok(Json(record))
}

/// DELETE /api/sessions/:id - 删除会话（幂等）
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete(&session_id).await?;
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/sessions/:id/messages - 整体替换消息列表（流结束后保存）
pub async fn replace_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<ReplaceMessagesRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let messages = req
        .messages
        .into_iter()
        .map(MessageDraft::normalize)
        .collect();

    state.store.replace_messages(&session_id, messages).await?;
    Ok(Json(json!({ "ok": true })))
}
