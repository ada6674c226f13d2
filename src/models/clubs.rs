// src/models/clubs.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::listing::{SortField, SortOrder};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Warehouse 23")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "Rua Augusta, 1200")]
    pub address: String,
    #[schema(example = "São Paulo")]
    pub city: String,
    #[schema(example = 800)]
    pub capacity: i32,
    // Dia da semana -> "HH:MM-HH:MM"
    #[schema(value_type = Object, example = json!({"fri": "23:00-06:00", "sat": "23:00-08:00"}))]
    pub opening_hours: serde_json::Value,
    #[schema(example = json!(["vip", "smoking_area"]))]
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

fn is_hhmm(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else {
        return false;
    };
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(h) || !two_digits(m) {
        return false;
    }
    matches!((h.parse::<u8>(), m.parse::<u8>()), (Ok(h), Ok(m)) if h < 24 && m < 60)
}

// Aceita só dias conhecidos e faixas "HH:MM-HH:MM" (pode virar a noite).
fn validate_opening_hours(hours: &BTreeMap<String, String>) -> Result<(), ValidationError> {
    for (day, range) in hours {
        let valid_range = range
            .split_once('-')
            .map(|(open, close)| is_hhmm(open) && is_hhmm(close))
            .unwrap_or(false);
        if !WEEKDAYS.contains(&day.as_str()) || !valid_range {
            let mut err = ValidationError::new("opening_hours");
            err.message = Some("validation.required".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubPayload {
    #[validate(length(min = 1, max = 150, message = "validation.required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "validation.required"))]
    pub city: String,
    #[validate(range(min = 1, message = "validation.positive"))]
    pub capacity: i32,
    #[serde(default)]
    #[validate(custom(function = "validate_opening_hours"))]
    pub opening_hours: BTreeMap<String, String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubPayload {
    #[validate(length(min = 1, max = 150, message = "validation.required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100, message = "validation.required"))]
    pub city: Option<String>,
    #[validate(range(min = 1, message = "validation.positive"))]
    pub capacity: Option<i32>,
    #[validate(custom(function = "validate_opening_hours"))]
    pub opening_hours: Option<BTreeMap<String, String>>,
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ClubSortField {
    #[default]
    Name,
    City,
    Capacity,
    CreatedAt,
}

impl SortField for ClubSortField {
    fn column(self) -> &'static str {
        match self {
            ClubSortField::Name => "name",
            ClubSortField::City => "city",
            ClubSortField::Capacity => "capacity",
            ClubSortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ClubFilter {
    pub city: Option<String>,
    pub feature: Option<String>,
    pub owner_id: Option<Uuid>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: ClubSortField,
    #[serde(default)]
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(d, r)| (d.to_string(), r.to_string())).collect()
    }

    #[test]
    fn accepts_overnight_ranges() {
        assert!(validate_opening_hours(&hours(&[("fri", "23:00-06:00"), ("sat", "22:30-08:00")])).is_ok());
        assert!(validate_opening_hours(&BTreeMap::new()).is_ok());
    }

    #[test]
    fn rejects_unknown_days_and_bad_times() {
        assert!(validate_opening_hours(&hours(&[("friday", "23:00-06:00")])).is_err());
        assert!(validate_opening_hours(&hours(&[("fri", "25:00-06:00")])).is_err());
        assert!(validate_opening_hours(&hours(&[("fri", "23h-06h")])).is_err());
        assert!(validate_opening_hours(&hours(&[("fri", "9:00-18:00")])).is_err());
    }

    #[test]
    fn signs_and_spaces_are_not_digits() {
        assert!(!is_hhmm("+1:00"));
        assert!(!is_hhmm("23:+5"));
        assert!(!is_hhmm(" 1:00"));
        assert!(is_hhmm("01:05"));
        assert!(validate_opening_hours(&hours(&[("fri", "+1:00-06:00")])).is_err());
    }
}
