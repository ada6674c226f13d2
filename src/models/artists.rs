// src/models/artists.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::listing::{SortField, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "verification_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    // Moderação: pendente -> aprovado/rejeitado, e o admin pode rever a decisão.
    pub fn can_transition_to(self, next: VerificationStatus) -> bool {
        use VerificationStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Rejected, Approved) | (Approved, Rejected)
        )
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "DJ Nox")]
    pub stage_name: String,
    pub bio: Option<String>,
    #[schema(example = json!(["techno", "house"]))]
    pub genres: Vec<String>,
    #[schema(example = "4.50")]
    pub rating: Decimal,
    #[schema(example = 1200)]
    pub followers: i64,
    pub verification_status: VerificationStatus,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_rating(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::from(5) {
        let mut err = ValidationError::new("range");
        err.message = Some("validation.rating_range".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtistPayload {
    #[validate(length(min = 1, max = 100, message = "validation.required"))]
    pub stage_name: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtistPayload {
    #[validate(length(min = 1, max = 100, message = "validation.required"))]
    pub stage_name: Option<String>,
    pub bio: Option<String>,
    pub genres: Option<Vec<String>>,
    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeatureArtistPayload {
    pub featured: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ArtistSortField {
    #[default]
    StageName,
    Rating,
    Followers,
    CreatedAt,
}

impl SortField for ArtistSortField {
    fn column(self) -> &'static str {
        match self {
            ArtistSortField::StageName => "stage_name",
            ArtistSortField::Rating => "rating",
            ArtistSortField::Followers => "followers",
            ArtistSortField::CreatedAt => "created_at",
        }
    }
}

// Filtros da vitrine de artistas; todos os ativos são combinados com AND.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ArtistFilter {
    pub status: Option<VerificationStatus>,
    pub genre: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: ArtistSortField,
    #[serde(default)]
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;
    use VerificationStatus::*;

    #[test]
    fn approving_moves_a_pending_artist_out_of_pending() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Pending));
    }

    #[test]
    fn moderators_can_revert_a_decision() {
        assert!(Rejected.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn rating_must_stay_between_zero_and_five() {
        assert!(validate_rating(&Decimal::new(45, 1)).is_ok());
        assert!(validate_rating(&Decimal::from(5)).is_ok());
        assert!(validate_rating(&Decimal::new(51, 1)).is_err());
        assert!(validate_rating(&Decimal::from(-1)).is_err());
    }
}
