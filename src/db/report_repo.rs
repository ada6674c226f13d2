// src/db/report_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Pagination, WhereClause}},
    models::reports::{CreateReportPayload, Report, ReportFilter, ReportStatus, ReportTarget},
};

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, reporter_id: Uuid, input: &CreateReportPayload) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (reporter_id, target_type, target_id, reason, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(reporter_id)
        .bind(input.target_type)
        .bind(input.target_id)
        .bind(input.reason)
        .bind(input.details.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(report)
    }

    // O alvo precisa existir (usuário ou evento)
    pub async fn target_exists(&self, target_type: ReportTarget, target_id: Uuid) -> Result<bool, AppError> {
        let sql = match target_type {
            ReportTarget::User => "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)",
            ReportTarget::Event => "SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)",
        };
        let (exists,): (bool,) = sqlx::query_as(sql).bind(target_id).fetch_one(&self.pool).await?;
        Ok(exists)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    pub async fn list(&self, filter: &ReportFilter, page: &Pagination) -> Result<Vec<Report>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM reports");
        let mut clause = WhereClause::default();

        if let Some(status) = filter.status {
            clause.and(&mut qb).push("status = ").push_bind(status);
        }
        if let Some(target_type) = filter.target_type {
            clause.and(&mut qb).push("target_type = ").push_bind(target_type);
        }
        qb.push(" ORDER BY created_at ASC, id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let reports = qb.build_query_as::<Report>().fetch_all(&self.pool).await?;
        Ok(reports)
    }

    pub async fn resolve(
        &self,
        id: Uuid,
        expected: ReportStatus,
        next: ReportStatus,
        moderator_id: Uuid,
        notes: Option<&str>,
    ) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports SET
                status = $3,
                moderator_id = $4,
                resolution_notes = COALESCE($5, resolution_notes),
                resolved_at = CASE WHEN $6 THEN NOW() ELSE NULL END
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .bind(moderator_id)
        .bind(notes)
        .bind(next.is_closed())
        .fetch_optional(&self.pool)
        .await?;

        report.ok_or_else(|| AppError::transition(expected, next))
    }
}
