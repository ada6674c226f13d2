// src/models/collaboration.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "milestone_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationMilestone {
    pub id: Uuid,
    pub invitation_id: Uuid,
    #[schema(example = "Enviar rider técnico")]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>, // Data simples (Dia/Mês/Ano)
    pub status: MilestoneStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Percentual de marcos concluídos, arredondado. Sem marcos, 0%.
pub fn progress(milestones: &[CollaborationMilestone]) -> u8 {
    let statuses: Vec<MilestoneStatus> = milestones.iter().map(|m| m.status).collect();
    progress_of(&statuses)
}

pub fn progress_of(statuses: &[MilestoneStatus]) -> u8 {
    let total = statuses.len();
    if total == 0 {
        return 0;
    }
    let completed = statuses
        .iter()
        .filter(|s| **s == MilestoneStatus::Completed)
        .count();
    // Arredondamento "meio para cima" em inteiros
    ((completed * 200 + total) / (2 * total)) as u8
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationMessage {
    pub id: Uuid,
    pub invitation_id: Uuid,
    pub sender_id: Uuid,
    #[schema(example = "Podemos passar o som às 20h?")]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMilestonePayload {
    #[validate(length(min = 1, max = 200, message = "validation.required"))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMilestonePayload {
    #[validate(length(min = 1, max = 200, message = "validation.required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<MilestoneStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostMessagePayload {
    #[validate(length(min = 1, max = 4000, message = "validation.required"))]
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneListing {
    pub milestones: Vec<CollaborationMilestone>,
    pub progress: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use MilestoneStatus::*;

    #[test]
    fn zero_milestones_is_zero_percent() {
        assert_eq!(progress(&[]), 0);
    }

    #[test]
    fn all_completed_is_one_hundred_percent() {
        assert_eq!(progress_of(&[Completed, Completed, Completed]), 100);
    }

    #[test]
    fn partial_progress_is_rounded() {
        assert_eq!(progress_of(&[Completed, Pending]), 50);
        assert_eq!(progress_of(&[Completed, InProgress, Pending]), 33);
        assert_eq!(progress_of(&[Completed, Completed, Pending]), 67);
        assert_eq!(progress_of(&[InProgress, InProgress]), 0);
    }
}
