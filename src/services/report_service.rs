// src/services/report_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Listing, Pagination, SortOrder}},
    db::ReportRepository,
    models::{
        auth::User,
        reports::{CreateReportPayload, Report, ReportFilter, ReportStatus, ReportTarget},
    },
};

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    pub async fn create_report(&self, reporter: &User, payload: &CreateReportPayload) -> Result<Report, AppError> {
        if payload.target_type == ReportTarget::User && payload.target_id == reporter.id {
            return Err(AppError::BadRequest("Não é possível denunciar a si mesmo.".into()));
        }
        if !self.repo.target_exists(payload.target_type, payload.target_id).await? {
            return Err(AppError::ResourceNotFound("Alvo da denúncia".into()));
        }

        let report = self.repo.create(reporter.id, payload).await?;
        tracing::info!("Denúncia {} registrada contra {:?} {}", report.id, report.target_type, report.target_id);
        Ok(report)
    }

    pub async fn list_reports(&self, filter: &ReportFilter, page: &Pagination) -> Result<Listing<Report>, AppError> {
        let reports = self.repo.list(filter, page).await?;
        Ok(Listing::new(reports, page, SortOrder::Asc))
    }

    pub async fn resolve_report(
        &self,
        moderator: &User,
        id: Uuid,
        next: ReportStatus,
        notes: Option<&str>,
    ) -> Result<Report, AppError> {
        let report = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Denúncia".into()))?;

        if !report.status.can_transition_to(next) {
            return Err(AppError::transition(report.status, next));
        }

        let report = self.repo.resolve(id, report.status, next, moderator.id, notes).await?;
        tracing::info!("Moderador {} marcou a denúncia {} como {}", moderator.id, id, next);
        Ok(report)
    }
}
