// src/services/collaboration_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CollaborationRepository,
    models::{
        auth::User,
        collaboration::{
            progress, CollaborationMessage, CollaborationMilestone, CreateMilestonePayload, MilestoneListing,
            UpdateMilestonePayload,
        },
        invitations::{InvitationSide, InvitationStatus},
    },
    services::invitation_service::{InvitationService, Participation},
};

/// Escrita: só os dois lados do convite, e enquanto ele não foi encerrado sem acordo.
/// Um convite concluído ainda aceita o fechamento dos marcos.
pub fn check_writable(side: Option<InvitationSide>, status: InvitationStatus) -> Result<(), AppError> {
    if side.is_none() {
        return Err(AppError::Forbidden);
    }
    if status.is_terminal() && status != InvitationStatus::Completed {
        return Err(AppError::BadRequest(format!("Convite {}: colaboração encerrada.", status)));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CollaborationService {
    repo: CollaborationRepository,
    invitation_service: InvitationService,
}

impl CollaborationService {
    pub fn new(repo: CollaborationRepository, invitation_service: InvitationService) -> Self {
        Self { repo, invitation_service }
    }

    async fn writable(&self, user: &User, invitation_id: Uuid) -> Result<Participation, AppError> {
        let p = self.invitation_service.participation(user, invitation_id).await?;
        check_writable(p.side, p.invitation.status)?;
        Ok(p)
    }

    pub async fn list_milestones(&self, user: &User, invitation_id: Uuid) -> Result<MilestoneListing, AppError> {
        self.invitation_service.participation(user, invitation_id).await?;
        let milestones = self.repo.list_milestones(invitation_id).await?;
        Ok(MilestoneListing { progress: progress(&milestones), milestones })
    }

    pub async fn create_milestone(
        &self,
        user: &User,
        invitation_id: Uuid,
        payload: &CreateMilestonePayload,
    ) -> Result<CollaborationMilestone, AppError> {
        self.writable(user, invitation_id).await?;
        self.repo.create_milestone(invitation_id, payload).await
    }

    pub async fn update_milestone(
        &self,
        user: &User,
        invitation_id: Uuid,
        milestone_id: Uuid,
        payload: &UpdateMilestonePayload,
    ) -> Result<CollaborationMilestone, AppError> {
        self.writable(user, invitation_id).await?;
        self.repo.update_milestone(invitation_id, milestone_id, payload).await
    }

    pub async fn delete_milestone(&self, user: &User, invitation_id: Uuid, milestone_id: Uuid) -> Result<(), AppError> {
        self.writable(user, invitation_id).await?;
        self.repo.delete_milestone(invitation_id, milestone_id).await
    }

    pub async fn list_messages(&self, user: &User, invitation_id: Uuid) -> Result<Vec<CollaborationMessage>, AppError> {
        self.invitation_service.participation(user, invitation_id).await?;
        self.repo.list_messages(invitation_id).await
    }

    pub async fn post_message(&self, user: &User, invitation_id: Uuid, body: &str) -> Result<CollaborationMessage, AppError> {
        self.writable(user, invitation_id).await?;
        self.repo.create_message(invitation_id, user.id, body.trim()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{ArtistRepository, ClubRepository, EventRepository, InvitationRepository},
        models::collaboration::{MilestoneStatus, UpdateMilestonePayload},
        services::{artist_service::ArtistService, club_service::ClubService, event_service::EventService},
    };
    use sqlx::PgPool;

    #[test]
    fn only_participants_write_while_the_invitation_is_alive() {
        use InvitationStatus::*;

        assert!(matches!(check_writable(None, Pending), Err(AppError::Forbidden)));
        assert!(check_writable(Some(InvitationSide::Club), Preparation).is_ok());
        assert!(check_writable(Some(InvitationSide::Artist), Negotiation).is_ok());
        assert!(check_writable(Some(InvitationSide::Artist), Completed).is_ok());
        for closed in [Rejected, Declined, Cancelled] {
            assert!(matches!(check_writable(Some(InvitationSide::Club), closed), Err(AppError::BadRequest(_))));
        }
    }

    struct Seed {
        club_owner: User,
        artist: User,
        outsider: User,
        admin: User,
        invitation_id: Uuid,
    }

    async fn user(pool: &PgPool, username: &str, role: &str) -> User {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $1 || '@example.com', 'x', $2::user_role) RETURNING *",
        )
        .bind(username)
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed(pool: &PgPool) -> Seed {
        let club_owner = user(pool, "warehouse", "club").await;
        let artist = user(pool, "nox", "artist").await;
        let outsider = user(pool, "curioso", "user").await;
        let admin = user(pool, "moderacao", "admin").await;

        let club_id: Uuid = sqlx::query_scalar(
            "INSERT INTO clubs (owner_id, name, address, city, capacity) \
             VALUES ($1, 'Warehouse 23', 'Rua Augusta, 1200', 'São Paulo', 800) RETURNING id",
        )
        .bind(club_owner.id)
        .fetch_one(pool)
        .await
        .unwrap();
        let event_id: Uuid = sqlx::query_scalar(
            "INSERT INTO events (club_id, organizer_id, title, starts_at, capacity) \
             VALUES ($1, $2, 'Techno Night', NOW() + INTERVAL '7 days', 500) RETURNING id",
        )
        .bind(club_id)
        .bind(club_owner.id)
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO artists (user_id, stage_name, verification_status) VALUES ($1, 'NOX', 'approved')")
            .bind(artist.id)
            .execute(pool)
            .await
            .unwrap();
        let invitation_id: Uuid = sqlx::query_scalar(
            "INSERT INTO invitations (event_id, club_id, artist_id, invited_by) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(event_id)
        .bind(club_id)
        .bind(artist.id)
        .bind(club_owner.id)
        .fetch_one(pool)
        .await
        .unwrap();

        Seed { club_owner, artist, outsider, admin, invitation_id }
    }

    fn service(pool: &PgPool) -> CollaborationService {
        let club_service = ClubService::new(ClubRepository::new(pool.clone()));
        let event_service = EventService::new(EventRepository::new(pool.clone()), club_service, pool.clone());
        let artist_service = ArtistService::new(ArtistRepository::new(pool.clone()));
        let collaboration_repo = CollaborationRepository::new(pool.clone());
        let invitation_service = InvitationService::new(
            InvitationRepository::new(pool.clone()),
            collaboration_repo.clone(),
            event_service,
            artist_service,
        );
        CollaborationService::new(collaboration_repo, invitation_service)
    }

    fn milestone(title: &str) -> CreateMilestonePayload {
        CreateMilestonePayload { title: title.into(), description: None, due_date: None }
    }

    #[sqlx::test]
    async fn both_sides_build_the_checklist_and_progress_follows(pool: PgPool) {
        let s = seed(&pool).await;
        let svc = service(&pool);

        let rider = svc.create_milestone(&s.club_owner, s.invitation_id, &milestone("Rider técnico")).await.unwrap();
        svc.create_milestone(&s.artist, s.invitation_id, &milestone("Set list")).await.unwrap();

        let listing = svc.list_milestones(&s.artist, s.invitation_id).await.unwrap();
        assert_eq!(listing.milestones.len(), 2);
        assert_eq!(listing.progress, 0);

        let done = UpdateMilestonePayload { title: None, description: None, due_date: None, status: Some(MilestoneStatus::Completed) };
        svc.update_milestone(&s.artist, s.invitation_id, rider.id, &done).await.unwrap();
        assert_eq!(svc.list_milestones(&s.club_owner, s.invitation_id).await.unwrap().progress, 50);

        svc.post_message(&s.artist, s.invitation_id, "  Chego às 22h  ").await.unwrap();
        let thread = svc.list_messages(&s.club_owner, s.invitation_id).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].body, "Chego às 22h");
    }

    #[sqlx::test]
    async fn outsiders_and_admins_cannot_write(pool: PgPool) {
        let s = seed(&pool).await;
        let svc = service(&pool);

        let err = svc.create_milestone(&s.outsider, s.invitation_id, &milestone("Intruso")).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        assert!(matches!(svc.list_messages(&s.outsider, s.invitation_id).await, Err(AppError::Forbidden)));

        // Admin lê, mas não participa da conversa
        assert!(svc.list_messages(&s.admin, s.invitation_id).await.is_ok());
        assert!(matches!(svc.post_message(&s.admin, s.invitation_id, "oi").await, Err(AppError::Forbidden)));
    }

    #[sqlx::test]
    async fn declined_invitation_is_read_only(pool: PgPool) {
        let s = seed(&pool).await;
        let svc = service(&pool);

        sqlx::query("UPDATE invitations SET status = 'declined' WHERE id = $1")
            .bind(s.invitation_id)
            .execute(&pool)
            .await
            .unwrap();

        let err = svc.post_message(&s.artist, s.invitation_id, "Ainda dá?").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(svc.list_messages(&s.artist, s.invitation_id).await.unwrap().is_empty());
    }
}
