// src/models/events.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::listing::{SortField, SortOrder};

// Ciclo de vida: planning -> upcoming -> past; planning|upcoming -> cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Planning,
    Upcoming,
    Past,
    Cancelled,
}

impl EventStatus {
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, next),
            (Planning, Upcoming) | (Upcoming, Past) | (Planning, Cancelled) | (Upcoming, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Past | EventStatus::Cancelled)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventStatus::Planning => "planning",
            EventStatus::Upcoming => "upcoming",
            EventStatus::Past => "past",
            EventStatus::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub club_id: Uuid,
    pub organizer_id: Uuid,
    #[schema(example = "Warehouse Techno Night")]
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[schema(example = "60.00")]
    pub price: Decimal,
    #[schema(example = 500)]
    pub capacity: i32,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("validation.non_negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventPayload {
    pub club_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "validation.required"))]
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub price: Decimal,
    #[validate(range(min = 1, message = "validation.positive"))]
    pub capacity: i32,
    // Só "planning" ou "upcoming" fazem sentido na criação
    pub status: Option<EventStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventPayload {
    #[validate(length(min = 1, max = 200, message = "validation.required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 1, message = "validation.positive"))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionEventPayload {
    pub status: EventStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum EventSortField {
    #[default]
    StartsAt,
    Title,
    Price,
}

impl SortField for EventSortField {
    fn column(self) -> &'static str {
        match self {
            EventSortField::StartsAt => "starts_at",
            EventSortField::Title => "title",
            EventSortField::Price => "price",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub club_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: EventSortField,
    #[serde(default)]
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;
    use EventStatus::*;

    #[test]
    fn follows_the_event_lifecycle() {
        assert!(Planning.can_transition_to(Upcoming));
        assert!(Upcoming.can_transition_to(Past));
        assert!(Planning.can_transition_to(Cancelled));
        assert!(Upcoming.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_do_not_move() {
        for next in [Planning, Upcoming, Past, Cancelled] {
            assert!(!Past.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(Past.is_terminal() && Cancelled.is_terminal());
        assert!(!Planning.can_transition_to(Past));
    }
}
