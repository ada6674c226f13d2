// src/services/event_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Listing, Pagination}},
    db::EventRepository,
    models::{
        auth::User,
        events::{CreateEventPayload, Event, EventFilter, EventStatus, UpdateEventPayload},
    },
    services::club_service::ClubService,
};

#[derive(Clone)]
pub struct EventService {
    repo: EventRepository,
    club_service: ClubService,
    pool: PgPool,
}

impl EventService {
    pub fn new(repo: EventRepository, club_service: ClubService, pool: PgPool) -> Self {
        Self { repo, club_service, pool }
    }

    pub async fn create_event(&self, user: &User, payload: &CreateEventPayload) -> Result<Event, AppError> {
        self.club_service.get_managed_club(user, payload.club_id).await?;

        let status = payload.status.unwrap_or(EventStatus::Planning);
        if !matches!(status, EventStatus::Planning | EventStatus::Upcoming) {
            return Err(AppError::BadRequest("Um evento nasce em planning ou upcoming.".into()));
        }

        let event = self.repo.create(user.id, payload, status).await?;
        tracing::info!("Evento {} criado no clube {}", event.id, event.club_id);
        Ok(event)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Event, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Evento".into()))
    }

    pub async fn list_events(&self, filter: &EventFilter, page: &Pagination) -> Result<Listing<Event>, AppError> {
        let events = self.repo.list(filter, page).await?;
        Ok(Listing::new(events, page, filter.order))
    }

    /// Evento que o usuário pode administrar (dono do clube ou admin).
    pub async fn get_managed_event(&self, user: &User, id: Uuid) -> Result<Event, AppError> {
        let event = self.get_event(id).await?;
        self.club_service.get_managed_club(user, event.club_id).await?;
        Ok(event)
    }

    pub async fn update_event(&self, user: &User, id: Uuid, payload: &UpdateEventPayload) -> Result<Event, AppError> {
        let event = self.get_managed_event(user, id).await?;
        if event.status.is_terminal() {
            return Err(AppError::BadRequest(format!("Evento {} não pode mais ser editado.", event.status)));
        }
        self.repo.update(id, payload).await
    }

    pub async fn transition_event(&self, user: &User, id: Uuid, next: EventStatus) -> Result<Event, AppError> {
        let event = self.get_managed_event(user, id).await?;
        if !event.status.can_transition_to(next) {
            return Err(AppError::transition(event.status, next));
        }

        let event = self.repo.set_status(id, event.status, next).await?;
        tracing::info!("Evento {} agora está {}", id, next);
        Ok(event)
    }

    pub async fn delete_event(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        self.get_managed_event(user, id).await?;
        self.repo.delete(id).await
    }
}
