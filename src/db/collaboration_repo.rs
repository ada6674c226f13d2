// src/db/collaboration_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::collaboration::{
        CollaborationMessage, CollaborationMilestone, CreateMilestonePayload, UpdateMilestonePayload,
    },
};

#[derive(Clone)]
pub struct CollaborationRepository {
    pool: PgPool,
}

impl CollaborationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MARCOS
    // =========================================================================

    pub async fn list_milestones(&self, invitation_id: Uuid) -> Result<Vec<CollaborationMilestone>, AppError> {
        let milestones = sqlx::query_as::<_, CollaborationMilestone>(
            r#"
            SELECT * FROM collaboration_milestones
            WHERE invitation_id = $1
            ORDER BY due_date ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(invitation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(milestones)
    }

    pub async fn create_milestone(
        &self,
        invitation_id: Uuid,
        input: &CreateMilestonePayload,
    ) -> Result<CollaborationMilestone, AppError> {
        let milestone = sqlx::query_as::<_, CollaborationMilestone>(
            r#"
            INSERT INTO collaboration_milestones (invitation_id, title, description, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(invitation_id)
        .bind(&input.title)
        .bind(input.description.as_deref())
        .bind(input.due_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(milestone)
    }

    pub async fn update_milestone(
        &self,
        invitation_id: Uuid,
        milestone_id: Uuid,
        input: &UpdateMilestonePayload,
    ) -> Result<CollaborationMilestone, AppError> {
        let milestone = sqlx::query_as::<_, CollaborationMilestone>(
            r#"
            UPDATE collaboration_milestones SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                due_date = COALESCE($5, due_date),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $2 AND invitation_id = $1
            RETURNING *
            "#,
        )
        .bind(invitation_id)
        .bind(milestone_id)
        .bind(input.title.as_deref())
        .bind(input.description.as_deref())
        .bind(input.due_date)
        .bind(input.status)
        .fetch_optional(&self.pool)
        .await?;

        milestone.ok_or_else(|| AppError::ResourceNotFound("Marco".into()))
    }

    pub async fn delete_milestone(&self, invitation_id: Uuid, milestone_id: Uuid) -> Result<(), AppError> {
        let affected = sqlx::query("DELETE FROM collaboration_milestones WHERE id = $2 AND invitation_id = $1")
            .bind(invitation_id)
            .bind(milestone_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AppError::ResourceNotFound("Marco".into()));
        }
        Ok(())
    }

    // =========================================================================
    //  MENSAGENS
    // =========================================================================

    pub async fn list_messages(&self, invitation_id: Uuid) -> Result<Vec<CollaborationMessage>, AppError> {
        let messages = sqlx::query_as::<_, CollaborationMessage>(
            "SELECT * FROM collaboration_messages WHERE invitation_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(invitation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    pub async fn create_message(
        &self,
        invitation_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> Result<CollaborationMessage, AppError> {
        let message = sqlx::query_as::<_, CollaborationMessage>(
            r#"
            INSERT INTO collaboration_messages (invitation_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(invitation_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }
}
