// src/handlers/artists.rs

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
        roles::{AdminOnly, ArtistOnly, RequireRole},
    },
    models::{
        artists::{
            Artist, ArtistFilter, CreateArtistPayload, FeatureArtistPayload, UpdateArtistPayload, VerificationStatus,
        },
        auth::User,
    },
};

// GET /api/artists
#[utoipa::path(
    get,
    path = "/api/artists",
    tag = "Artists",
    params(ArtistFilter, Pagination),
    responses((status = 200, description = "Vitrine de artistas (filtros combinados com AND)")),
    security(("api_jwt" = []))
)]
pub async fn list_artists(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ArtistFilter>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let artists = app_state
        .artist_service
        .list_artists(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(artists)))
}

// POST /api/artists
#[utoipa::path(
    post,
    path = "/api/artists",
    tag = "Artists",
    request_body = CreateArtistPayload,
    responses(
        (status = 201, description = "Perfil criado (pendente)", body = Artist),
        (status = 409, description = "Usuário já possui perfil")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_artist(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<ArtistOnly>,
    Json(payload): Json<CreateArtistPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let artist = app_state
        .artist_service
        .create_profile(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(artist)))
}

// GET /api/artists/{id}
#[utoipa::path(
    get,
    path = "/api/artists/{id}",
    tag = "Artists",
    params(("id" = Uuid, Path, description = "ID do artista")),
    responses(
        (status = 200, description = "Artista", body = Artist),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_artist(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let artist = app_state
        .artist_service
        .get_artist(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(artist)))
}

// PUT /api/artists/{id}
#[utoipa::path(
    put,
    path = "/api/artists/{id}",
    tag = "Artists",
    params(("id" = Uuid, Path, description = "ID do artista")),
    request_body = UpdateArtistPayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Artist),
        (status = 403, description = "Perfil de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_artist(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArtistPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let artist = app_state
        .artist_service
        .update_profile(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(artist)))
}

async fn moderate(
    app_state: &AppState,
    locale: &Locale,
    admin: &User,
    id: Uuid,
    next: VerificationStatus,
) -> Result<Artist, ApiError> {
    app_state
        .artist_service
        .set_verification(admin, id, next)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))
}

// POST /api/artists/{id}/approve
#[utoipa::path(
    post,
    path = "/api/artists/{id}/approve",
    tag = "Artists",
    params(("id" = Uuid, Path, description = "ID do artista")),
    responses(
        (status = 200, description = "Artista aprovado", body = Artist),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_artist(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let artist = moderate(&app_state, &locale, &admin, id, VerificationStatus::Approved).await?;
    Ok((StatusCode::OK, Json(artist)))
}

// POST /api/artists/{id}/reject
#[utoipa::path(
    post,
    path = "/api/artists/{id}/reject",
    tag = "Artists",
    params(("id" = Uuid, Path, description = "ID do artista")),
    responses(
        (status = 200, description = "Artista rejeitado", body = Artist),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_artist(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let artist = moderate(&app_state, &locale, &admin, id, VerificationStatus::Rejected).await?;
    Ok((StatusCode::OK, Json(artist)))
}

// PUT /api/artists/{id}/featured
#[utoipa::path(
    put,
    path = "/api/artists/{id}/featured",
    tag = "Artists",
    params(("id" = Uuid, Path, description = "ID do artista")),
    request_body = FeatureArtistPayload,
    responses((status = 200, description = "Destaque alterado", body = Artist)),
    security(("api_jwt" = []))
)]
pub async fn feature_artist(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FeatureArtistPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let artist = app_state
        .artist_service
        .set_featured(id, payload.featured)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(artist)))
}

// POST /api/artists/{id}/follow
#[utoipa::path(
    post,
    path = "/api/artists/{id}/follow",
    tag = "Artists",
    params(("id" = Uuid, Path, description = "ID do artista")),
    responses((status = 200, description = "Seguindo (idempotente)", body = Artist)),
    security(("api_jwt" = []))
)]
pub async fn follow_artist(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let artist = app_state
        .artist_service
        .follow(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(artist)))
}

// DELETE /api/artists/{id}/follow
#[utoipa::path(
    delete,
    path = "/api/artists/{id}/follow",
    tag = "Artists",
    params(("id" = Uuid, Path, description = "ID do artista")),
    responses((status = 200, description = "Deixou de seguir", body = Artist)),
    security(("api_jwt" = []))
)]
pub async fn unfollow_artist(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let artist = app_state
        .artist_service
        .unfollow(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(artist)))
}
