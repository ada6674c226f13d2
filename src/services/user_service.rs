// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Listing, Pagination}},
    db::UserRepository,
    models::auth::{UpdateProfilePayload, User, UserFilter, UserStatus},
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub async fn update_profile(&self, user_id: Uuid, payload: &UpdateProfilePayload) -> Result<User, AppError> {
        self.repo.update_profile(user_id, payload).await
    }

    pub async fn list_users(&self, filter: &UserFilter, page: &Pagination) -> Result<Listing<User>, AppError> {
        let users = self.repo.list_users(filter, page).await?;
        Ok(Listing::new(users, page, filter.order))
    }

    pub async fn set_user_status(&self, admin: &User, user_id: Uuid, status: UserStatus) -> Result<User, AppError> {
        // Um admin não pode se trancar para fora
        if admin.id == user_id && status == UserStatus::Suspended {
            return Err(AppError::BadRequest("Não é possível suspender a própria conta.".into()));
        }

        let user = self.repo.set_status(user_id, status).await?;
        tracing::info!("Admin {} alterou o status do usuário {} para {:?}", admin.id, user_id, status);
        Ok(user)
    }
}
