// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        ArtistRepository, ClubRepository, CollaborationRepository, DashboardRepository, EventRepository,
        InvitationRepository, PosRepository, ReportRepository, UserRepository,
    },
    services::{
        artist_service::ArtistService, auth::AuthService, club_service::ClubService,
        collaboration_service::CollaborationService, dashboard_service::DashboardService,
        event_service::EventService, invitation_service::InvitationService, pos_service::PosService,
        receipt_service::ReceiptService, report_service::ReportService, user_service::UserService,
    },
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_FONTS_DIR: &str = "./fonts";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub fonts_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado do ambiente real para poder ser testado
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR inválido (esperado host:porta)")?;

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let fonts_dir = lookup("FONTS_DIR").unwrap_or_else(|| DEFAULT_FONTS_DIR.to_string()).into();

        Ok(Self { database_url, jwt_secret, bind_addr, db_max_connections, fonts_dir })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub user_service: UserService,
    pub artist_service: ArtistService,
    pub club_service: ClubService,
    pub event_service: EventService,
    pub invitation_service: InvitationService,
    pub collaboration_service: CollaborationService,
    pub pos_service: PosService,
    pub receipt_service: ReceiptService,
    pub report_service: ReportService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = I18nStore::embedded()?;

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let artist_repo = ArtistRepository::new(db_pool.clone());
        let club_repo = ClubRepository::new(db_pool.clone());
        let event_repo = EventRepository::new(db_pool.clone());
        let invitation_repo = InvitationRepository::new(db_pool.clone());
        let collaboration_repo = CollaborationRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let user_service = UserService::new(user_repo);
        let artist_service = ArtistService::new(artist_repo);
        let club_service = ClubService::new(club_repo);
        let event_service = EventService::new(event_repo, club_service.clone(), db_pool.clone());
        let invitation_service = InvitationService::new(
            invitation_repo,
            collaboration_repo.clone(),
            event_service.clone(),
            artist_service.clone(),
        );
        let collaboration_service = CollaborationService::new(collaboration_repo, invitation_service.clone());
        let pos_service = PosService::new(PosRepository::new());
        let receipt_service = ReceiptService::new(config.fonts_dir.clone());
        let report_service = ReportService::new(report_repo);
        let dashboard_service = DashboardService::new(DashboardRepository::new());

        Ok(Self {
            db_pool,
            i18n_store: Arc::new(i18n_store),
            auth_service,
            user_service,
            artist_service,
            club_service,
            event_service,
            invitation_service,
            collaboration_service,
            pos_service,
            receipt_service,
            report_service,
            dashboard_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/nightlife"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.db_max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.fonts_dir, PathBuf::from(DEFAULT_FONTS_DIR));
    }

    #[test]
    fn required_and_malformed_values_fail() {
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", "s")])).is_err());
        assert!(Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/nightlife"),
            ("JWT_SECRET", "s"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]))
        .is_err());
    }
}
