// src/models/invitations.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invitation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Confirmed,
    Preparation,
    Completed,
    Cancelled,
    Declined,
    Negotiation,
}

/// Quem pode colocar o convite em cada status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationSide {
    Artist,
    Club,
}

impl InvitationStatus {
    pub fn can_transition_to(self, next: InvitationStatus) -> bool {
        use InvitationStatus::*;
        match self {
            Pending => matches!(next, Accepted | Rejected | Declined | Negotiation | Cancelled),
            // Contra-propostas podem ir e voltar
            Negotiation => matches!(next, Accepted | Declined | Cancelled | Negotiation),
            Accepted => matches!(next, Confirmed | Cancelled),
            Confirmed => matches!(next, Preparation | Cancelled),
            Preparation => matches!(next, Completed | Cancelled),
            Completed | Rejected | Declined | Cancelled => false,
        }
    }

    /// O artista responde; o clube conduz a produção.
    pub fn owner_side(self) -> InvitationSide {
        use InvitationStatus::*;
        match self {
            Accepted | Rejected | Declined | Negotiation => InvitationSide::Artist,
            Pending | Confirmed | Preparation | Completed | Cancelled => InvitationSide::Club,
        }
    }

    pub fn is_terminal(self) -> bool {
        use InvitationStatus::*;
        matches!(self, Completed | Rejected | Declined | Cancelled)
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use InvitationStatus::*;
        f.write_str(match self {
            Pending => "pending",
            Accepted => "accepted",
            Rejected => "rejected",
            Confirmed => "confirmed",
            Preparation => "preparation",
            Completed => "completed",
            Cancelled => "cancelled",
            Declined => "declined",
            Negotiation => "negotiation",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    pub event_id: Uuid,
    pub club_id: Uuid,
    // ID de usuário do artista convidado
    pub artist_id: Uuid,
    pub invited_by: Uuid,
    #[schema(example = "1500.00")]
    pub fee: Option<Decimal>,
    pub message: Option<String>,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Convite + progresso derivado dos marcos (nunca gravado)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDetail {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub event_title: String,
    pub club_name: String,
    pub artist_name: Option<String>,
    #[schema(example = 50)]
    pub progress: u8,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationPayload {
    pub event_id: Uuid,
    // ID do perfil de artista (o que aparece na vitrine)
    pub artist_id: Uuid,
    pub fee: Option<Decimal>,
    #[validate(length(max = 2000, message = "validation.required"))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInvitationStatusPayload {
    pub status: InvitationStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct InvitationFilter {
    pub status: Option<InvitationStatus>,
    pub event_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvitationStatus::*;

    const ALL: [InvitationStatus; 9] = [
        Pending, Accepted, Rejected, Confirmed, Preparation, Completed, Cancelled, Declined, Negotiation,
    ];

    #[test]
    fn happy_path_reaches_completed() {
        let path = [Pending, Negotiation, Accepted, Confirmed, Preparation, Completed];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn terminal_statuses_are_final() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn cannot_skip_confirmation() {
        assert!(!Accepted.can_transition_to(Preparation));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Confirmed));
    }

    #[test]
    fn responses_belong_to_the_artist_and_production_to_the_club() {
        assert_eq!(Accepted.owner_side(), InvitationSide::Artist);
        assert_eq!(Negotiation.owner_side(), InvitationSide::Artist);
        assert_eq!(Confirmed.owner_side(), InvitationSide::Club);
        assert_eq!(Cancelled.owner_side(), InvitationSide::Club);
    }
}
