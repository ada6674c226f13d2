// src/db/invitation_repo.rs

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Pagination, WhereClause}},
    models::invitations::{Invitation, InvitationFilter, InvitationStatus},
};

/// Quais convites o usuário enxerga na listagem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationScope {
    All,
    // Convites enviados pelos clubes deste dono
    ClubOwner(Uuid),
    // Convites recebidos por este artista (ID de usuário)
    Artist(Uuid),
}

// Nomes auxiliares para montar o InvitationDetail
#[derive(Debug, FromRow)]
pub struct InvitationNames {
    pub event_title: String,
    pub club_name: String,
    pub club_owner_id: Uuid,
    pub artist_name: Option<String>,
}

pub(crate) fn build_list_query<'a>(
    scope: InvitationScope,
    filter: &InvitationFilter,
    page: &Pagination,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT i.* FROM invitations i JOIN clubs c ON c.id = i.club_id");
    let mut clause = WhereClause::default();

    match scope {
        InvitationScope::All => {}
        InvitationScope::ClubOwner(owner_id) => {
            clause.and(&mut qb).push("c.owner_id = ").push_bind(owner_id);
        }
        InvitationScope::Artist(user_id) => {
            clause.and(&mut qb).push("i.artist_id = ").push_bind(user_id);
        }
    }
    if let Some(status) = filter.status {
        clause.and(&mut qb).push("i.status = ").push_bind(status);
    }
    if let Some(event_id) = filter.event_id {
        clause.and(&mut qb).push("i.event_id = ").push_bind(event_id);
    }

    qb.push(" ORDER BY i.created_at DESC, i.id ASC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    qb
}

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        event_id: Uuid,
        club_id: Uuid,
        artist_id: Uuid,
        invited_by: Uuid,
        fee: Option<Decimal>,
        message: Option<&str>,
    ) -> Result<Invitation, AppError> {
        sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (event_id, club_id, artist_id, invited_by, fee, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(club_id)
        .bind(artist_id)
        .bind(invited_by)
        .bind(fee)
        .bind(message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "Este artista já foi convidado para o evento."))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitation>, AppError> {
        let invitation = sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invitation)
    }

    pub async fn find_names(&self, id: Uuid) -> Result<InvitationNames, AppError> {
        let names = sqlx::query_as::<_, InvitationNames>(
            r#"
            SELECT
                e.title AS event_title,
                c.name AS club_name,
                c.owner_id AS club_owner_id,
                a.stage_name AS artist_name
            FROM invitations i
            JOIN events e ON e.id = i.event_id
            JOIN clubs c ON c.id = i.club_id
            LEFT JOIN artists a ON a.user_id = i.artist_id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(names)
    }

    pub async fn list(
        &self,
        scope: InvitationScope,
        filter: &InvitationFilter,
        page: &Pagination,
    ) -> Result<Vec<Invitation>, AppError> {
        let mut qb = build_list_query(scope, filter, page);
        let invitations = qb.build_query_as::<Invitation>().fetch_all(&self.pool).await?;
        Ok(invitations)
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        expected: InvitationStatus,
        next: InvitationStatus,
    ) -> Result<Invitation, AppError> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE invitations SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;

        invitation.ok_or_else(|| AppError::transition(expected, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn club_scope_joins_on_the_owner() {
        let qb = build_list_query(
            InvitationScope::ClubOwner(Uuid::nil()),
            &InvitationFilter { status: Some(InvitationStatus::Pending), event_id: None },
            &Pagination::default(),
        );
        assert_eq!(
            qb.sql(),
            "SELECT i.* FROM invitations i JOIN clubs c ON c.id = i.club_id \
             WHERE c.owner_id = $1 AND i.status = $2 \
             ORDER BY i.created_at DESC, i.id ASC LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn admin_scope_has_no_restriction() {
        let qb = build_list_query(InvitationScope::All, &InvitationFilter::default(), &Pagination::default());
        assert!(!qb.sql().contains("WHERE"));
    }
}
