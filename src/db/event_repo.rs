// src/db/event_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        listing::{push_order_and_page, search_term, Pagination, WhereClause},
    },
    models::events::{CreateEventPayload, Event, EventFilter, EventStatus, UpdateEventPayload},
};

pub(crate) fn build_list_query<'a>(filter: &EventFilter, page: &Pagination) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM events");
    let mut clause = WhereClause::default();

    if let Some(status) = filter.status {
        clause.and(&mut qb).push("status = ").push_bind(status);
    }
    if let Some(club_id) = filter.club_id {
        clause.and(&mut qb).push("club_id = ").push_bind(club_id);
    }
    if let Some(from) = filter.from {
        clause.and(&mut qb).push("starts_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        clause.and(&mut qb).push("starts_at < ").push_bind(to);
    }
    if let Some(pattern) = search_term(&filter.search) {
        clause
            .and(&mut qb)
            .push("(title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    push_order_and_page(&mut qb, filter.sort_by, filter.order, page);
    qb
}

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        organizer_id: Uuid,
        input: &CreateEventPayload,
        status: EventStatus,
    ) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (club_id, organizer_id, title, description, starts_at, price, capacity, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.club_id)
        .bind(organizer_id)
        .bind(&input.title)
        .bind(input.description.as_deref())
        .bind(input.starts_at)
        .bind(input.price)
        .bind(input.capacity)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Event>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(event)
    }

    pub async fn list(&self, filter: &EventFilter, page: &Pagination) -> Result<Vec<Event>, AppError> {
        let mut qb = build_list_query(filter, page);
        let events = qb.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateEventPayload) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                price = COALESCE($5, price),
                capacity = COALESCE($6, capacity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.description.as_deref())
        .bind(input.starts_at)
        .bind(input.price)
        .bind(input.capacity)
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or_else(|| AppError::ResourceNotFound("Evento".into()))
    }

    // Só grava se o status não mudou desde a leitura (evita corrida entre dois cliques)
    pub async fn set_status(
        &self,
        id: Uuid,
        expected: EventStatus,
        next: EventStatus,
    ) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or_else(|| AppError::transition(expected, next))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::listing::SortOrder;
    use crate::models::events::EventSortField;
    use chrono::{TimeZone, Utc};

    #[test]
    fn date_window_and_status_filters() {
        let filter = EventFilter {
            status: Some(EventStatus::Upcoming),
            from: Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()),
            sort_by: EventSortField::Price,
            order: SortOrder::Desc,
            ..Default::default()
        };
        let qb = build_list_query(&filter, &Pagination::default());
        assert_eq!(
            qb.sql(),
            "SELECT * FROM events WHERE status = $1 AND starts_at >= $2 AND starts_at < $3 \
             ORDER BY price DESC, id ASC LIMIT $4 OFFSET $5"
        );
    }
}
