// src/db/club_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        listing::{push_order_and_page, search_term, Pagination, WhereClause},
    },
    models::clubs::{Club, ClubFilter, CreateClubPayload, UpdateClubPayload},
};

pub(crate) fn build_list_query<'a>(filter: &ClubFilter, page: &Pagination) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM clubs");
    let mut clause = WhereClause::default();

    if let Some(city) = filter.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        clause.and(&mut qb).push("lower(city) = lower(").push_bind(city.to_string()).push(")");
    }
    if let Some(feature) = filter.feature.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        clause.and(&mut qb).push_bind(feature.to_string()).push(" = ANY(features)");
    }
    if let Some(owner_id) = filter.owner_id {
        clause.and(&mut qb).push("owner_id = ").push_bind(owner_id);
    }
    if let Some(pattern) = search_term(&filter.search) {
        clause
            .and(&mut qb)
            .push("(name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    push_order_and_page(&mut qb, filter.sort_by, filter.order, page);
    qb
}

#[derive(Clone)]
pub struct ClubRepository {
    pool: PgPool,
}

impl ClubRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: Uuid, input: &CreateClubPayload) -> Result<Club, AppError> {
        let club = sqlx::query_as::<_, Club>(
            r#"
            INSERT INTO clubs (owner_id, name, description, address, city, capacity, opening_hours, features)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(&input.address)
        .bind(&input.city)
        .bind(input.capacity)
        .bind(sqlx::types::Json(&input.opening_hours))
        .bind(&input.features)
        .fetch_one(&self.pool)
        .await?;
        Ok(club)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>, AppError> {
        let club = sqlx::query_as::<_, Club>("SELECT * FROM clubs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(club)
    }

    pub async fn list(&self, filter: &ClubFilter, page: &Pagination) -> Result<Vec<Club>, AppError> {
        let mut qb = build_list_query(filter, page);
        let clubs = qb.build_query_as::<Club>().fetch_all(&self.pool).await?;
        Ok(clubs)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateClubPayload) -> Result<Club, AppError> {
        let club = sqlx::query_as::<_, Club>(
            r#"
            UPDATE clubs SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                capacity = COALESCE($6, capacity),
                opening_hours = COALESCE($7, opening_hours),
                features = COALESCE($8, features),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.address.as_deref())
        .bind(input.city.as_deref())
        .bind(input.capacity)
        .bind(input.opening_hours.as_ref().map(sqlx::types::Json))
        .bind(input.features.clone())
        .fetch_optional(&self.pool)
        .await?;

        club.ok_or_else(|| AppError::ResourceNotFound("Clube".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let affected = sqlx::query("DELETE FROM clubs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AppError::ResourceNotFound("Clube".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_feature_and_search_are_combined() {
        let filter = ClubFilter {
            city: Some("Berlin".into()),
            feature: Some("vip".into()),
            search: Some("bunker".into()),
            ..Default::default()
        };
        let qb = build_list_query(&filter, &Pagination::default());
        assert_eq!(
            qb.sql(),
            "SELECT * FROM clubs WHERE lower(city) = lower($1) AND $2 = ANY(features) \
             AND (name ILIKE $3 OR description ILIKE $4) \
             ORDER BY name ASC, id ASC LIMIT $5 OFFSET $6"
        );
    }
}
