// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::{auth::auth_guard, club::club_guard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Sem configuração válida a aplicação não sobe
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr;
    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Vitrine aberta: qualquer um navega por artistas, clubes e eventos
    let public_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/artists", get(handlers::artists::list_artists))
        .route("/artists/{id}", get(handlers::artists::get_artist))
        .route("/clubs", get(handlers::clubs::list_clubs))
        .route("/clubs/{id}", get(handlers::clubs::get_club))
        .route("/events", get(handlers::events::list_events))
        .route("/events/{id}", get(handlers::events::get_event));

    let protected_routes = Router::new()
        .route(
            "/users/me",
            get(handlers::auth::get_me).put(handlers::auth::update_me),
        )
        // Artistas
        .route("/artists", post(handlers::artists::create_artist))
        .route("/artists/{id}", put(handlers::artists::update_artist))
        .route("/artists/{id}/approve", post(handlers::artists::approve_artist))
        .route("/artists/{id}/reject", post(handlers::artists::reject_artist))
        .route("/artists/{id}/featured", put(handlers::artists::feature_artist))
        .route(
            "/artists/{id}/follow",
            post(handlers::artists::follow_artist).delete(handlers::artists::unfollow_artist),
        )
        // Clubes e eventos
        .route("/clubs", post(handlers::clubs::create_club))
        .route(
            "/clubs/{id}",
            put(handlers::clubs::update_club).delete(handlers::clubs::delete_club),
        )
        .route("/events", post(handlers::events::create_event))
        .route(
            "/events/{id}",
            put(handlers::events::update_event).delete(handlers::events::delete_event),
        )
        .route("/events/{id}/status", put(handlers::events::transition_event))
        // Convites e colaboração
        .route(
            "/invitations",
            get(handlers::invitations::list_invitations).post(handlers::invitations::create_invitation),
        )
        .route("/invitations/{id}", get(handlers::invitations::get_invitation))
        .route("/invitations/{id}/status", put(handlers::invitations::update_invitation_status))
        .route(
            "/invitations/{id}/milestones",
            get(handlers::collaboration::list_milestones).post(handlers::collaboration::create_milestone),
        )
        .route(
            "/invitations/{id}/milestones/{milestone_id}",
            put(handlers::collaboration::update_milestone).delete(handlers::collaboration::delete_milestone),
        )
        .route(
            "/invitations/{id}/messages",
            get(handlers::collaboration::list_messages).post(handlers::collaboration::post_message),
        )
        // Moderação
        .route("/reports", post(handlers::reports::create_report))
        .route("/admin/reports", get(handlers::reports::list_reports))
        .route("/admin/reports/{id}", put(handlers::reports::resolve_report))
        .route("/admin/users", get(handlers::users::list_users))
        .route("/admin/users/{id}/status", put(handlers::users::set_user_status))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // POS e dashboard: auth_guard roda primeiro, depois o club_guard confere o X-Club-ID
    let pos_routes = Router::new()
        .route(
            "/categories",
            post(handlers::pos::create_category).get(handlers::pos::list_categories),
        )
        .route(
            "/products",
            post(handlers::pos::create_product).get(handlers::pos::list_products),
        )
        .route("/products/{id}", put(handlers::pos::update_product))
        .route(
            "/tables",
            post(handlers::pos::create_table).get(handlers::pos::list_tables),
        )
        .route(
            "/tables/{id}",
            put(handlers::pos::update_table).delete(handlers::pos::delete_table),
        )
        .route("/tables/{id}/reserve", post(handlers::pos::reserve_table))
        .route("/tables/{id}/release", post(handlers::pos::release_table))
        .route(
            "/orders",
            post(handlers::pos::open_order).get(handlers::pos::list_orders),
        )
        .route("/orders/{id}", get(handlers::pos::get_order))
        .route("/orders/{id}/items", put(handlers::pos::replace_order_items))
        .route("/orders/{id}/status", put(handlers::pos::update_order_status))
        .route("/orders/{id}/checkout", post(handlers::pos::checkout))
        .route("/orders/{id}/cancel", post(handlers::pos::cancel_order))
        .route("/orders/{id}/receipt", get(handlers::pos::order_receipt));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/top-products", get(handlers::dashboard::get_top_products));

    let club_routes = Router::new()
        .nest("/pos", pos_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), club_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(club_routes);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
