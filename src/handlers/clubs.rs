// src/handlers/clubs.rs

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
    models::clubs::{Club, ClubFilter, CreateClubPayload, UpdateClubPayload},
};

// GET /api/clubs
#[utoipa::path(
    get,
    path = "/api/clubs",
    tag = "Clubs",
    params(ClubFilter, Pagination),
    responses((status = 200, description = "Clubes filtrados e paginados")),
    security(("api_jwt" = []))
)]
pub async fn list_clubs(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ClubFilter>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let clubs = app_state
        .club_service
        .list_clubs(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(clubs)))
}

// POST /api/clubs
#[utoipa::path(
    post,
    path = "/api/clubs",
    tag = "Clubs",
    request_body = CreateClubPayload,
    responses(
        (status = 201, description = "Clube criado", body = Club),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_club(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<ClubManager>,
    Json(payload): Json<CreateClubPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let club = app_state
        .club_service
        .create_club(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(club)))
}

// GET /api/clubs/{id}
#[utoipa::path(
    get,
    path = "/api/clubs/{id}",
    tag = "Clubs",
    params(("id" = Uuid, Path, description = "ID do clube")),
    responses(
        (status = 200, description = "Clube", body = Club),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_club(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let club = app_state
        .club_service
        .get_club(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(club)))
}

// PUT /api/clubs/{id}
#[utoipa::path(
    put,
    path = "/api/clubs/{id}",
    tag = "Clubs",
    params(("id" = Uuid, Path, description = "ID do clube")),
    request_body = UpdateClubPayload,
    responses(
        (status = 200, description = "Clube atualizado", body = Club),
        (status = 403, description = "Clube de outro dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_club(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClubPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let club = app_state
        .club_service
        .update_club(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(club)))
}

// DELETE /api/clubs/{id}
#[utoipa::path(
    delete,
    path = "/api/clubs/{id}",
    tag = "Clubs",
    params(("id" = Uuid, Path, description = "ID do clube")),
    responses(
        (status = 204, description = "Clube removido"),
        (status = 403, description = "Clube de outro dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_club(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .club_service
        .delete_club(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
