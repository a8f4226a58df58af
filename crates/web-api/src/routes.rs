use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use application::{JoinRequest, JoinedParticipant, PostMessageRequest};
use domain::{ChatMessage, MessageId, Participant};

use crate::{error::ApiError, state::AppState};

/// 调用方身份头；未认证的纯字符串。
const IDENTITY_HEADER: &str = "User";

#[derive(Debug, Deserialize)]
struct ListMessagesQuery {
    limit: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/participants", post(join).get(list_participants))
        .route("/status", post(heartbeat))
        .route("/messages", post(post_message).get(list_messages))
        .route("/messages/{id}", put(edit_message).delete(delete_message))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 身份头缺失或不可读时当作空身份，由下游检查产生对应失败。
fn identity(headers: &HeaderMap) -> String {
    headers
        .get(IDENTITY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

async fn join(
    State(state): State<AppState>,
    Json(payload): Json<JoinRequest>,
) -> Result<(StatusCode, Json<JoinedParticipant>), ApiError> {
    let joined = state.participant_service.join(payload).await?;
    Ok((StatusCode::CREATED, Json(joined)))
}

async fn list_participants(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Participant>>), ApiError> {
    let participants = state.participant_service.list().await?;
    Ok((StatusCode::CREATED, Json(participants)))
}

async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state
        .participant_service
        .heartbeat(&identity(&headers))
        .await?;
    Ok(StatusCode::OK)
}

async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let message = state
        .message_service
        .post(&identity(&headers), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state
        .message_service
        .list_for(&identity(&headers), query.limit)
        .await?;
    Ok(Json(messages))
}

async fn edit_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<PostMessageRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let message = state
        .message_service
        .edit(MessageId::from(id), &identity(&headers), payload)
        .await?;
    Ok(Json(message))
}

async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state
        .message_service
        .delete(MessageId::from(id), &identity(&headers))
        .await?;
    Ok(StatusCode::OK)
}
