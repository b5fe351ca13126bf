use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use application::{MessageDto, NewMessageInput, ParticipantDto, RegisterParticipantInput};
use domain::{DomainError, FieldError, MessageLimit};

use crate::{error::ApiError, identity::Identity, state::AppState};

#[derive(Debug, Deserialize)]
struct MessagesQuery {
    limit: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/participants", post(register_participant).get(list_participants))
        .route("/messages", post(post_message).get(get_messages))
        .route("/status", post(heartbeat))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn register_participant(
    State(state): State<AppState>,
    payload: Result<Json<RegisterParticipantInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ParticipantDto>), ApiError> {
    let Json(input) = payload?;
    let participant = state.participant_service.register(input).await?;

    Ok((StatusCode::CREATED, Json(ParticipantDto::from(&participant))))
}

async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantDto>>, ApiError> {
    let participants = state.participant_service.list().await?;
    Ok(Json(participants.iter().map(ParticipantDto::from).collect()))
}

async fn post_message(
    State(state): State<AppState>,
    Identity(sender): Identity,
    payload: Result<Json<NewMessageInput>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let sender = sender.ok_or_else(missing_identity)?;
    let Json(input) = payload?;
    let message = state.message_service.post(&sender, input).await?;

    Ok((StatusCode::CREATED, Json(MessageDto::from(&message))))
}

async fn get_messages(
    State(state): State<AppState>,
    Identity(requester): Identity,
    query: Result<Query<MessagesQuery>, QueryRejection>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let requester = requester.ok_or_else(missing_identity)?;
    let Query(query) = query?;
    let limit = query
        .limit
        .as_deref()
        .map(MessageLimit::parse)
        .transpose()?;

    let messages = state.message_service.query(&requester, limit).await?;
    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}

async fn heartbeat(
    State(state): State<AppState>,
    Identity(name): Identity,
) -> Result<StatusCode, ApiError> {
    // 没有身份头等同于未知参与者
    let name = name.ok_or_else(|| ApiError::from(DomainError::participant_not_found("")))?;
    state.participant_service.heartbeat(&name).await?;
    Ok(StatusCode::OK)
}

fn missing_identity() -> ApiError {
    DomainError::validation(vec![FieldError::new("user", "header is required")]).into()
}
