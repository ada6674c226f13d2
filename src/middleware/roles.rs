// src/middleware/roles.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// 1. O Trait que define quais papéis podem passar
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

/// Regra pura, separada do extrator para poder ser testada.
pub fn role_allowed<T: RoleDef>(role: UserRole) -> bool {
    T::allowed().contains(&role)
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !role_allowed::<T>(user.0.role) {
            let roles = T::allowed()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ApiError {
                status: StatusCode::FORBIDDEN,
                error: app_state
                    .i18n_store
                    .format(&locale.0, "auth.role_required", &[("roles", roles)]),
                details: None,
            });
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin] }
}

pub struct ClubManager;
impl RoleDef for ClubManager {
    fn allowed() -> &'static [UserRole] { &[UserRole::Club, UserRole::Admin] }
}

pub struct ArtistOnly;
impl RoleDef for ArtistOnly {
    fn allowed() -> &'static [UserRole] { &[UserRole::Artist] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_admin_and_club_guards() {
        assert!(role_allowed::<AdminOnly>(UserRole::Admin));
        assert!(role_allowed::<ClubManager>(UserRole::Admin));
        assert!(!role_allowed::<ArtistOnly>(UserRole::Admin));
    }

    #[test]
    fn regular_users_are_kept_out() {
        assert!(!role_allowed::<AdminOnly>(UserRole::User));
        assert!(!role_allowed::<ClubManager>(UserRole::User));
        assert!(!role_allowed::<ClubManager>(UserRole::Artist));
        assert!(role_allowed::<ArtistOnly>(UserRole::Artist));
    }
}
