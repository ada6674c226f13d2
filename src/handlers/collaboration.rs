// src/handlers/collaboration.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::collaboration::{
        CollaborationMessage, CollaborationMilestone, CreateMilestonePayload, MilestoneListing, PostMessagePayload,
        UpdateMilestonePayload,
    },
};

// GET /api/invitations/{id}/milestones
#[utoipa::path(
    get,
    path = "/api/invitations/{id}/milestones",
    tag = "Collaboration",
    params(("id" = Uuid, Path, description = "ID do convite")),
    responses((status = 200, description = "Marcos e progresso", body = MilestoneListing)),
    security(("api_jwt" = []))
)]
pub async fn list_milestones(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(invitation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = app_state
        .collaboration_service
        .list_milestones(&user, invitation_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listing)))
}

// POST /api/invitations/{id}/milestones
#[utoipa::path(
    post,
    path = "/api/invitations/{id}/milestones",
    tag = "Collaboration",
    params(("id" = Uuid, Path, description = "ID do convite")),
    request_body = CreateMilestonePayload,
    responses((status = 201, description = "Marco criado", body = CollaborationMilestone)),
    security(("api_jwt" = []))
)]
pub async fn create_milestone(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(invitation_id): Path<Uuid>,
    Json(payload): Json<CreateMilestonePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let milestone = app_state
        .collaboration_service
        .create_milestone(&user, invitation_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(milestone)))
}

// PUT /api/invitations/{id}/milestones/{milestone_id}
#[utoipa::path(
    put,
    path = "/api/invitations/{id}/milestones/{milestone_id}",
    tag = "Collaboration",
    params(
        ("id" = Uuid, Path, description = "ID do convite"),
        ("milestone_id" = Uuid, Path, description = "ID do marco")
    ),
    request_body = UpdateMilestonePayload,
    responses((status = 200, description = "Marco atualizado", body = CollaborationMilestone)),
    security(("api_jwt" = []))
)]
pub async fn update_milestone(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((invitation_id, milestone_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateMilestonePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let milestone = app_state
        .collaboration_service
        .update_milestone(&user, invitation_id, milestone_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(milestone)))
}

// DELETE /api/invitations/{id}/milestones/{milestone_id}
#[utoipa::path(
    delete,
    path = "/api/invitations/{id}/milestones/{milestone_id}",
    tag = "Collaboration",
    params(
        ("id" = Uuid, Path, description = "ID do convite"),
        ("milestone_id" = Uuid, Path, description = "ID do marco")
    ),
    responses((status = 204, description = "Marco removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_milestone(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((invitation_id, milestone_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .collaboration_service
        .delete_milestone(&user, invitation_id, milestone_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/invitations/{id}/messages
#[utoipa::path(
    get,
    path = "/api/invitations/{id}/messages",
    tag = "Collaboration",
    params(("id" = Uuid, Path, description = "ID do convite")),
    responses((status = 200, description = "Mensagens em ordem cronológica", body = [CollaborationMessage])),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(invitation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .collaboration_service
        .list_messages(&user, invitation_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(messages)))
}

// POST /api/invitations/{id}/messages
#[utoipa::path(
    post,
    path = "/api/invitations/{id}/messages",
    tag = "Collaboration",
    params(("id" = Uuid, Path, description = "ID do convite")),
    request_body = PostMessagePayload,
    responses((status = 201, description = "Mensagem enviada", body = CollaborationMessage)),
    security(("api_jwt" = []))
)]
pub async fn post_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(invitation_id): Path<Uuid>,
    Json(payload): Json<PostMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state
        .collaboration_service
        .post_message(&user, invitation_id, &payload.body)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(message)))
}
