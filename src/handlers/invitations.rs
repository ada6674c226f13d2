// src/handlers/invitations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        listing::Pagination,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        roles::{ClubManager, RequireRole},
    },
    models::invitations::{CreateInvitationPayload, InvitationDetail, InvitationFilter, UpdateInvitationStatusPayload},
};

// GET /api/invitations
#[utoipa::path(
    get,
    path = "/api/invitations",
    tag = "Invitations",
    params(InvitationFilter, Pagination),
    responses(
        (status = 200, description = "Enviados (clube), recebidos (artista) ou todos (admin)"),
        (status = 403, description = "Usuário comum não tem convites")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invitations(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<InvitationFilter>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let invitations = app_state
        .invitation_service
        .list_invitations(&user, &filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invitations)))
}

// POST /api/invitations
#[utoipa::path(
    post,
    path = "/api/invitations",
    tag = "Invitations",
    request_body = CreateInvitationPayload,
    responses(
        (status = 201, description = "Convite enviado", body = InvitationDetail),
        (status = 400, description = "Artista não aprovado ou evento encerrado"),
        (status = 409, description = "Artista já convidado para o evento")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invitation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<ClubManager>,
    Json(payload): Json<CreateInvitationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let invitation = app_state
        .invitation_service
        .create_invitation(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

// GET /api/invitations/{id}
#[utoipa::path(
    get,
    path = "/api/invitations/{id}",
    tag = "Invitations",
    params(("id" = Uuid, Path, description = "ID do convite")),
    responses(
        (status = 200, description = "Convite com progresso", body = InvitationDetail),
        (status = 403, description = "Não participa do convite")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invitation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invitation = app_state
        .invitation_service
        .get_invitation(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invitation)))
}

// PUT /api/invitations/{id}/status
#[utoipa::path(
    put,
    path = "/api/invitations/{id}/status",
    tag = "Invitations",
    params(("id" = Uuid, Path, description = "ID do convite")),
    request_body = UpdateInvitationStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = InvitationDetail),
        (status = 403, description = "Status pertence ao outro lado"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invitation_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvitationStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invitation = app_state
        .invitation_service
        .update_status(&user, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invitation)))
}
