// src/models/reports.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_target", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportTarget {
    User,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Inappropriate,
    Harassment,
    Fraud,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    // A fila anda para frente; resolvida ou descartada encerra a denúncia.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Pending, Reviewed) | (Pending, Resolved) | (Pending, Dismissed) | (Reviewed, Resolved) | (Reviewed, Dismissed)
        )
    }

    pub fn is_closed(self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Dismissed)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub target_type: ReportTarget,
    pub target_id: Uuid,
    pub reason: ReportReason,
    pub details: Option<String>,
    pub status: ReportStatus,
    pub moderator_id: Option<Uuid>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportPayload {
    pub target_type: ReportTarget,
    pub target_id: Uuid,
    pub reason: ReportReason,
    #[validate(length(max = 2000, message = "validation.required"))]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReportPayload {
    pub status: ReportStatus,
    #[validate(length(max = 2000, message = "validation.required"))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub target_type: Option<ReportTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReportStatus::*;

    #[test]
    fn closed_reports_cannot_be_reopened() {
        for next in [Pending, Reviewed, Resolved, Dismissed] {
            assert!(!Resolved.can_transition_to(next));
            assert!(!Dismissed.can_transition_to(next));
        }
    }

    #[test]
    fn pending_reports_can_be_triaged() {
        assert!(Pending.can_transition_to(Reviewed));
        assert!(Reviewed.can_transition_to(Resolved));
        assert!(Pending.can_transition_to(Dismissed));
        assert!(!Reviewed.can_transition_to(Pending));
    }

    #[test]
    fn only_final_decisions_stamp_resolved_at() {
        assert!(Resolved.is_closed());
        assert!(Dismissed.is_closed());
        assert!(!Reviewed.is_closed());
        assert!(!Pending.is_closed());
    }
}
