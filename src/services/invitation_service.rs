// src/services/invitation_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Listing, Pagination, SortOrder}},
    db::{
        invitation_repo::{InvitationNames, InvitationScope},
        CollaborationRepository, InvitationRepository,
    },
    models::{
        artists::VerificationStatus,
        auth::{User, UserRole},
        collaboration::progress,
        invitations::{
            CreateInvitationPayload, Invitation, InvitationDetail, InvitationFilter, InvitationSide,
            InvitationStatus,
        },
    },
    services::{artist_service::ArtistService, event_service::EventService},
};

/// Um convite visto por quem tem acesso a ele.
/// `side` é `None` para o admin (observador).
#[derive(Debug)]
pub struct Participation {
    pub invitation: Invitation,
    pub names: InvitationNames,
    pub side: Option<InvitationSide>,
}

pub fn side_of(user: &User, invitation: &Invitation, club_owner_id: Uuid) -> Option<InvitationSide> {
    if invitation.artist_id == user.id {
        Some(InvitationSide::Artist)
    } else if club_owner_id == user.id {
        Some(InvitationSide::Club)
    } else {
        None
    }
}

/// Quem pode levar o convite para `next`.
/// O artista responde, o clube conduz; o admin só age pelo lado do clube.
pub fn can_set_status(side: Option<InvitationSide>, is_admin: bool, next: InvitationStatus) -> bool {
    match (side, next.owner_side()) {
        (Some(side), owner) => side == owner,
        (None, InvitationSide::Club) => is_admin,
        (None, InvitationSide::Artist) => false,
    }
}

#[derive(Clone)]
pub struct InvitationService {
    repo: InvitationRepository,
    collaboration_repo: CollaborationRepository,
    event_service: EventService,
    artist_service: ArtistService,
}

impl InvitationService {
    pub fn new(
        repo: InvitationRepository,
        collaboration_repo: CollaborationRepository,
        event_service: EventService,
        artist_service: ArtistService,
    ) -> Self {
        Self { repo, collaboration_repo, event_service, artist_service }
    }

    pub async fn create_invitation(&self, user: &User, payload: &CreateInvitationPayload) -> Result<InvitationDetail, AppError> {
        let event = self.event_service.get_managed_event(user, payload.event_id).await?;
        if event.status.is_terminal() {
            return Err(AppError::BadRequest(format!("Evento {} não aceita convites.", event.status)));
        }

        let artist = self.artist_service.get_artist(payload.artist_id).await?;
        if artist.verification_status != VerificationStatus::Approved {
            return Err(AppError::BadRequest("O artista ainda não foi aprovado.".into()));
        }

        let invitation = self
            .repo
            .create(event.id, event.club_id, artist.user_id, user.id, payload.fee, payload.message.as_deref())
            .await?;

        tracing::info!("Convite {} enviado ao artista {} (evento {})", invitation.id, artist.id, event.id);
        self.detail(invitation).await
    }

    pub async fn list_invitations(
        &self,
        user: &User,
        filter: &InvitationFilter,
        page: &Pagination,
    ) -> Result<Listing<Invitation>, AppError> {
        let scope = match user.role {
            UserRole::Admin => InvitationScope::All,
            UserRole::Club => InvitationScope::ClubOwner(user.id),
            UserRole::Artist => InvitationScope::Artist(user.id),
            UserRole::User => return Err(AppError::Forbidden),
        };
        let invitations = self.repo.list(scope, filter, page).await?;
        Ok(Listing::new(invitations, page, SortOrder::Desc))
    }

    /// Carrega o convite e confere se o usuário participa dele (ou é admin).
    pub async fn participation(&self, user: &User, id: Uuid) -> Result<Participation, AppError> {
        let invitation = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Convite".into()))?;
        let names = self.repo.find_names(id).await?;

        let side = side_of(user, &invitation, names.club_owner_id);
        if side.is_none() && !user.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(Participation { invitation, names, side })
    }

    pub async fn get_invitation(&self, user: &User, id: Uuid) -> Result<InvitationDetail, AppError> {
        let p = self.participation(user, id).await?;
        self.detail_with(p.invitation, p.names).await
    }

    pub async fn update_status(&self, user: &User, id: Uuid, next: InvitationStatus) -> Result<InvitationDetail, AppError> {
        let p = self.participation(user, id).await?;
        let current = p.invitation.status;

        if !current.can_transition_to(next) {
            return Err(AppError::transition(current, next));
        }
        if !can_set_status(p.side, user.is_admin(), next) {
            return Err(AppError::Forbidden);
        }

        let invitation = self.repo.set_status(id, current, next).await?;
        tracing::info!("Convite {}: {} -> {} (por {})", id, current, next, user.id);
        self.detail_with(invitation, p.names).await
    }

    async fn detail(&self, invitation: Invitation) -> Result<InvitationDetail, AppError> {
        let names = self.repo.find_names(invitation.id).await?;
        self.detail_with(invitation, names).await
    }

    async fn detail_with(&self, invitation: Invitation, names: InvitationNames) -> Result<InvitationDetail, AppError> {
        // Progresso é sempre derivado dos marcos, nunca gravado
        let milestones = self.collaboration_repo.list_milestones(invitation.id).await?;
        Ok(InvitationDetail {
            progress: progress(&milestones),
            invitation,
            event_title: names.event_title,
            club_name: names.club_name,
            artist_name: names.artist_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::auth::UserStatus;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            email: "u@example.com".into(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            avatar_url: None,
            bio: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn invitation(artist_id: Uuid) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            artist_id,
            invited_by: Uuid::new_v4(),
            fee: None,
            message: None,
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn sides_are_resolved_from_artist_and_club_owner() {
        let artist = user(UserRole::Artist);
        let owner = user(UserRole::Club);
        let stranger = user(UserRole::Club);
        let inv = invitation(artist.id);

        assert_eq!(side_of(&artist, &inv, owner.id), Some(InvitationSide::Artist));
        assert_eq!(side_of(&owner, &inv, owner.id), Some(InvitationSide::Club));
        assert_eq!(side_of(&stranger, &inv, owner.id), None);
    }

    #[test]
    fn only_the_owning_side_sets_a_status() {
        use InvitationStatus::*;

        assert!(can_set_status(Some(InvitationSide::Artist), false, Accepted));
        assert!(can_set_status(Some(InvitationSide::Artist), false, Negotiation));
        assert!(!can_set_status(Some(InvitationSide::Artist), false, Confirmed));

        assert!(can_set_status(Some(InvitationSide::Club), false, Confirmed));
        assert!(can_set_status(Some(InvitationSide::Club), false, Cancelled));
        assert!(!can_set_status(Some(InvitationSide::Club), false, Accepted));

        // Admin observa; só intervém do lado do clube
        assert!(can_set_status(None, true, Cancelled));
        assert!(!can_set_status(None, true, Declined));
        assert!(!can_set_status(None, false, Cancelled));
    }
}
