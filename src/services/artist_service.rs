// src/services/artist_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Listing, Pagination}},
    db::ArtistRepository,
    models::{
        artists::{Artist, ArtistFilter, CreateArtistPayload, UpdateArtistPayload, VerificationStatus},
        auth::User,
    },
};

#[derive(Clone)]
pub struct ArtistService {
    repo: ArtistRepository,
}

impl ArtistService {
    pub fn new(repo: ArtistRepository) -> Self {
        Self { repo }
    }

    pub async fn create_profile(&self, user: &User, payload: &CreateArtistPayload) -> Result<Artist, AppError> {
        let artist = self.repo.create(user.id, payload).await?;
        tracing::info!("Perfil de artista {} criado (pendente de aprovação)", artist.id);
        Ok(artist)
    }

    pub async fn get_artist(&self, id: Uuid) -> Result<Artist, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Artista".into()))
    }

    pub async fn list_artists(&self, filter: &ArtistFilter, page: &Pagination) -> Result<Listing<Artist>, AppError> {
        let artists = self.repo.list(filter, page).await?;
        Ok(Listing::new(artists, page, filter.order))
    }

    pub async fn update_profile(&self, user: &User, id: Uuid, payload: &UpdateArtistPayload) -> Result<Artist, AppError> {
        let artist = self.get_artist(id).await?;
        if artist.user_id != user.id && !user.is_admin() {
            return Err(AppError::Forbidden);
        }
        // A nota é definida pela moderação
        if payload.rating.is_some() && !user.is_admin() {
            return Err(AppError::Forbidden);
        }
        self.repo.update(id, payload).await
    }

    /// Aprovar/rejeitar: o artista troca de aba na listagem de moderação.
    pub async fn set_verification(&self, admin: &User, id: Uuid, next: VerificationStatus) -> Result<Artist, AppError> {
        let artist = self.get_artist(id).await?;
        if !artist.verification_status.can_transition_to(next) {
            return Err(AppError::transition(artist.verification_status, next));
        }

        let artist = self.repo.set_status(id, artist.verification_status, next).await?;
        tracing::info!("Admin {} marcou o artista {} como {}", admin.id, id, next);
        Ok(artist)
    }

    pub async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Artist, AppError> {
        let artist = self.get_artist(id).await?;
        if featured && artist.verification_status != VerificationStatus::Approved {
            return Err(AppError::BadRequest("Somente artistas aprovados podem ser destacados.".into()));
        }
        self.repo.set_featured(id, featured).await
    }

    pub async fn follow(&self, user: &User, id: Uuid) -> Result<Artist, AppError> {
        let artist = self.get_artist(id).await?;
        if artist.user_id == user.id {
            return Err(AppError::BadRequest("Não é possível seguir o próprio perfil.".into()));
        }
        self.repo.follow(id, user.id).await
    }

    pub async fn unfollow(&self, user: &User, id: Uuid) -> Result<Artist, AppError> {
        self.get_artist(id).await?;
        self.repo.unfollow(id, user.id).await
    }
}
