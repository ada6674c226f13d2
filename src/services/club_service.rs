// src/services/club_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Listing, Pagination}},
    db::ClubRepository,
    models::{
        auth::User,
        clubs::{Club, ClubFilter, CreateClubPayload, UpdateClubPayload},
    },
};

#[derive(Clone)]
pub struct ClubService {
    repo: ClubRepository,
}

impl ClubService {
    pub fn new(repo: ClubRepository) -> Self {
        Self { repo }
    }

    pub async fn create_club(&self, owner: &User, payload: &CreateClubPayload) -> Result<Club, AppError> {
        let club = self.repo.create(owner.id, payload).await?;
        tracing::info!("Clube {} criado por {}", club.id, owner.id);
        Ok(club)
    }

    pub async fn get_club(&self, id: Uuid) -> Result<Club, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Clube".into()))
    }

    /// Clube que o usuário pode administrar (dono ou admin).
    pub async fn get_managed_club(&self, user: &User, id: Uuid) -> Result<Club, AppError> {
        let club = self.get_club(id).await?;
        if club.owner_id != user.id && !user.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(club)
    }

    pub async fn list_clubs(&self, filter: &ClubFilter, page: &Pagination) -> Result<Listing<Club>, AppError> {
        let clubs = self.repo.list(filter, page).await?;
        Ok(Listing::new(clubs, page, filter.order))
    }

    pub async fn update_club(&self, user: &User, id: Uuid, payload: &UpdateClubPayload) -> Result<Club, AppError> {
        self.get_managed_club(user, id).await?;
        self.repo.update(id, payload).await
    }

    pub async fn delete_club(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        self.get_managed_club(user, id).await?;
        self.repo.delete(id).await?;
        tracing::info!("Clube {} removido por {}", id, user.id);
        Ok(())
    }
}
