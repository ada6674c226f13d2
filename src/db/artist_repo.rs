// src/db/artist_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        listing::{push_order_and_page, search_term, Pagination, WhereClause},
    },
    models::artists::{Artist, ArtistFilter, CreateArtistPayload, UpdateArtistPayload, VerificationStatus},
};

/// Monta a consulta da vitrine. Cada filtro ativo vira um predicado AND.
pub(crate) fn build_list_query<'a>(filter: &ArtistFilter, page: &Pagination) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM artists");
    let mut clause = WhereClause::default();

    if let Some(status) = filter.status {
        clause.and(&mut qb).push("verification_status = ").push_bind(status);
    }
    if let Some(genre) = filter.genre.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        // Gêneros são comparados sem diferenciar maiúsculas
        clause
            .and(&mut qb)
            .push("EXISTS (SELECT 1 FROM unnest(genres) g WHERE lower(g) = lower(")
            .push_bind(genre.to_string())
            .push("))");
    }
    if let Some(featured) = filter.featured {
        clause.and(&mut qb).push("featured = ").push_bind(featured);
    }
    if let Some(pattern) = search_term(&filter.search) {
        clause
            .and(&mut qb)
            .push("(stage_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR bio ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    push_order_and_page(&mut qb, filter.sort_by, filter.order, page);
    qb
}

#[derive(Clone)]
pub struct ArtistRepository {
    pool: PgPool,
}

impl ArtistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, input: &CreateArtistPayload) -> Result<Artist, AppError> {
        sqlx::query_as::<_, Artist>(
            r#"
            INSERT INTO artists (user_id, stage_name, bio, genres)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&input.stage_name)
        .bind(input.bio.as_deref())
        .bind(&input.genres)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "Este usuário já possui um perfil de artista."))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Artist>, AppError> {
        let artist = sqlx::query_as::<_, Artist>("SELECT * FROM artists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(artist)
    }

    pub async fn list(&self, filter: &ArtistFilter, page: &Pagination) -> Result<Vec<Artist>, AppError> {
        let mut qb = build_list_query(filter, page);
        let artists = qb.build_query_as::<Artist>().fetch_all(&self.pool).await?;
        Ok(artists)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateArtistPayload) -> Result<Artist, AppError> {
        let artist = sqlx::query_as::<_, Artist>(
            r#"
            UPDATE artists SET
                stage_name = COALESCE($2, stage_name),
                bio = COALESCE($3, bio),
                genres = COALESCE($4, genres),
                rating = COALESCE($5, rating),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.stage_name.as_deref())
        .bind(input.bio.as_deref())
        .bind(input.genres.clone())
        .bind(input.rating)
        .fetch_optional(&self.pool)
        .await?;

        artist.ok_or_else(|| AppError::ResourceNotFound("Artista".into()))
    }

    // Grava só se ninguém decidiu antes (dois admins na mesma fila)
    pub async fn set_status(
        &self,
        id: Uuid,
        expected: VerificationStatus,
        next: VerificationStatus,
    ) -> Result<Artist, AppError> {
        let artist = sqlx::query_as::<_, Artist>(
            r#"
            UPDATE artists SET
                verification_status = $3,
                -- Destaque só faz sentido para artistas aprovados
                featured = CASE WHEN $3 = 'approved'::verification_status THEN featured ELSE FALSE END,
                updated_at = NOW()
            WHERE id = $1 AND verification_status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;

        artist.ok_or_else(|| AppError::transition(expected, next))
    }

    pub async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Artist, AppError> {
        let artist = sqlx::query_as::<_, Artist>(
            "UPDATE artists SET featured = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(featured)
        .fetch_one(&self.pool)
        .await?;
        Ok(artist)
    }

    // Seguir/deixar de seguir mantém o contador na mesma transação
    pub async fn follow(&self, artist_id: Uuid, user_id: Uuid) -> Result<Artist, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO artist_followers (artist_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(artist_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let artist = sqlx::query_as::<_, Artist>(
            "UPDATE artists SET followers = followers + $2 WHERE id = $1 RETURNING *",
        )
        .bind(artist_id)
        .bind(inserted as i64)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(artist)
    }

    pub async fn unfollow(&self, artist_id: Uuid, user_id: Uuid) -> Result<Artist, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM artist_followers WHERE artist_id = $1 AND user_id = $2")
            .bind(artist_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let artist = sqlx::query_as::<_, Artist>(
            "UPDATE artists SET followers = GREATEST(followers - $2, 0) WHERE id = $1 RETURNING *",
        )
        .bind(artist_id)
        .bind(removed as i64)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::listing::SortOrder;
    use crate::models::artists::ArtistSortField;

    #[test]
    fn no_filters_means_no_where_clause() {
        let qb = build_list_query(&ArtistFilter::default(), &Pagination::default());
        assert_eq!(
            qb.sql(),
            "SELECT * FROM artists ORDER BY stage_name ASC, id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn active_filters_are_intersected() {
        let filter = ArtistFilter {
            status: Some(VerificationStatus::Approved),
            genre: Some("Techno".into()),
            search: Some("nox".into()),
            sort_by: ArtistSortField::Rating,
            order: SortOrder::Desc,
            ..Default::default()
        };
        let qb = build_list_query(&filter, &Pagination::default());
        assert_eq!(
            qb.sql(),
            "SELECT * FROM artists WHERE verification_status = $1 \
             AND EXISTS (SELECT 1 FROM unnest(genres) g WHERE lower(g) = lower($2)) \
             AND (stage_name ILIKE $3 OR bio ILIKE $4) \
             ORDER BY rating DESC, id ASC LIMIT $5 OFFSET $6"
        );
    }

    #[test]
    fn blank_genre_and_search_are_ignored() {
        let filter = ArtistFilter {
            status: Some(VerificationStatus::Pending),
            genre: Some("  ".into()),
            search: Some("".into()),
            ..Default::default()
        };
        let qb = build_list_query(&filter, &Pagination::default());
        assert!(qb.sql().starts_with("SELECT * FROM artists WHERE verification_status = $1 ORDER BY"));
    }

    #[sqlx::test]
    async fn stale_decision_does_not_overwrite_the_first_one(pool: PgPool) {
        let user_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ('nox', 'nox@example.com', 'x', 'artist') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let id: Uuid = sqlx::query_scalar("INSERT INTO artists (user_id, stage_name) VALUES ($1, 'NOX') RETURNING id")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        let repo = ArtistRepository::new(pool);

        // Os dois admins leram "pending"; só o primeiro grava
        let approved = repo
            .set_status(id, VerificationStatus::Pending, VerificationStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.verification_status, VerificationStatus::Approved);

        let err = repo
            .set_status(id, VerificationStatus::Pending, VerificationStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        let current = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(current.verification_status, VerificationStatus::Approved);
    }
}
