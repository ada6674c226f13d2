// src/middleware/club.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

// O nome do nosso cabeçalho HTTP customizado
pub const CLUB_ID_HEADER: &str = "x-club-id";

// O clube sobre o qual a requisição opera (POS, dashboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClubContext(pub Uuid);

impl ClubContext {
    /// Lê o X-Club-ID. Devolve a chave de tradução do erro em caso de falha.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, &'static str> {
        let value = headers.get(CLUB_ID_HEADER).ok_or("club.header_missing")?;
        let value_str = value.to_str().map_err(|_| "club.header_invalid")?;
        let club_id = Uuid::parse_str(value_str.trim()).map_err(|_| "club.header_invalid")?;
        Ok(ClubContext(club_id))
    }
}

impl<S> FromRequestParts<S> for ClubContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // O club_guard já validou e guardou o contexto; sem ele, lemos o cabeçalho.
        if let Some(ctx) = parts.extensions.get::<ClubContext>() {
            return Ok(*ctx);
        }

        ClubContext::from_headers(&parts.headers).map_err(|key| {
            let locale = Locale::from_headers(&parts.headers);
            let store = crate::common::i18n::I18nStore::embedded().unwrap_or_default();
            ApiError {
                status: StatusCode::BAD_REQUEST,
                error: store.translate(&locale.0, key),
                details: None,
            }
        })
    }
}

// Garante que o usuário autenticado administra o clube do cabeçalho.
// Precisa rodar depois do auth_guard.
pub async fn club_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let store = &app_state.i18n_store;

    let ctx = ClubContext::from_headers(request.headers()).map_err(|key| ApiError {
        status: StatusCode::BAD_REQUEST,
        error: store.translate(&locale.0, key),
        details: None,
    })?;

    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, store))?;

    let club = app_state
        .club_service
        .get_club(ctx.0)
        .await
        .map_err(|e| e.to_api_error(&locale, store))?;

    if club.owner_id != user.0.id && !user.0.is_admin() {
        tracing::warn!("Usuário {} tentou operar o clube {}", user.0.id, ctx.0);
        return Err(ApiError {
            status: StatusCode::FORBIDDEN,
            error: store.translate(&locale.0, "club.not_owner"),
            details: None,
        });
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    #[test]
    fn parses_a_valid_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(CLUB_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(ClubContext::from_headers(&headers), Ok(ClubContext(id)));
    }

    #[test]
    fn reports_missing_and_invalid_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(ClubContext::from_headers(&headers), Err("club.header_missing"));

        headers.insert(CLUB_ID_HEADER, HeaderValue::from_static("mesa-12"));
        assert_eq!(ClubContext::from_headers(&headers), Err("club.header_invalid"));
    }

    #[tokio::test]
    async fn extractor_rejects_with_translated_message() {
        let (mut parts, _) = Request::builder()
            .uri("/api/pos/tables")
            .header("accept-language", "pt-BR")
            .body(())
            .unwrap()
            .into_parts();

        let err = ClubContext::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "O cabeçalho X-Club-ID é obrigatório.");
    }

    #[tokio::test]
    async fn extractor_prefers_the_guarded_context() {
        let id = Uuid::new_v4();
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        parts.extensions.insert(ClubContext(id));

        let ctx = ClubContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx, ClubContext(id));
    }
}
