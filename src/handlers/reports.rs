// src/handlers/reports.rs

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
        roles::{AdminOnly, RequireRole},
    },
    models::reports::{CreateReportPayload, Report, ReportFilter, ResolveReportPayload},
};

// POST /api/reports
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "Moderation",
    request_body = CreateReportPayload,
    responses(
        (status = 201, description = "Denúncia registrada", body = Report),
        (status = 404, description = "Alvo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_report(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .report_service
        .create_report(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(report)))
}

// GET /api/admin/reports
#[utoipa::path(
    get,
    path = "/api/admin/reports",
    tag = "Moderation",
    params(ReportFilter, Pagination),
    responses((status = 200, description = "Fila de moderação (mais antigas primeiro)")),
    security(("api_jwt" = []))
)]
pub async fn list_reports(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Query(filter): Query<ReportFilter>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let reports = app_state
        .report_service
        .list_reports(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(reports)))
}

// PUT /api/admin/reports/{id}
#[utoipa::path(
    put,
    path = "/api/admin/reports/{id}",
    tag = "Moderation",
    params(("id" = Uuid, Path, description = "ID da denúncia")),
    request_body = ResolveReportPayload,
    responses(
        (status = 200, description = "Decisão registrada", body = Report),
        (status = 409, description = "Denúncia já encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_report(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(moderator): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveReportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .report_service
        .resolve_report(&moderator, id, payload.status, payload.notes.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}
