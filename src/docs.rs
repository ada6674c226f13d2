// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth / Users ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::update_me,

        // --- Admin ---
        handlers::users::list_users,
        handlers::users::set_user_status,

        // --- Artists ---
        handlers::artists::list_artists,
        handlers::artists::create_artist,
        handlers::artists::get_artist,
        handlers::artists::update_artist,
        handlers::artists::approve_artist,
        handlers::artists::reject_artist,
        handlers::artists::feature_artist,
        handlers::artists::follow_artist,
        handlers::artists::unfollow_artist,

        // --- Clubs ---
        handlers::clubs::list_clubs,
        handlers::clubs::create_club,
        handlers::clubs::get_club,
        handlers::clubs::update_club,
        handlers::clubs::delete_club,

        // --- Events ---
        handlers::events::list_events,
        handlers::events::create_event,
        handlers::events::get_event,
        handlers::events::update_event,
        handlers::events::transition_event,
        handlers::events::delete_event,

        // --- Invitations ---
        handlers::invitations::list_invitations,
        handlers::invitations::create_invitation,
        handlers::invitations::get_invitation,
        handlers::invitations::update_invitation_status,

        // --- Collaboration ---
        handlers::collaboration::list_milestones,
        handlers::collaboration::create_milestone,
        handlers::collaboration::update_milestone,
        handlers::collaboration::delete_milestone,
        handlers::collaboration::list_messages,
        handlers::collaboration::post_message,

        // --- POS ---
        handlers::pos::create_category,
        handlers::pos::list_categories,
        handlers::pos::create_product,
        handlers::pos::list_products,
        handlers::pos::update_product,
        handlers::pos::create_table,
        handlers::pos::list_tables,
        handlers::pos::update_table,
        handlers::pos::delete_table,
        handlers::pos::reserve_table,
        handlers::pos::release_table,
        handlers::pos::open_order,
        handlers::pos::list_orders,
        handlers::pos::get_order,
        handlers::pos::replace_order_items,
        handlers::pos::update_order_status,
        handlers::pos::checkout,
        handlers::pos::cancel_order,
        handlers::pos::order_receipt,

        // --- Moderation ---
        handlers::reports::create_report,
        handlers::reports::list_reports,
        handlers::reports::resolve_report,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_top_products,
    ),
    components(
        schemas(
            common::listing::SortOrder,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::UserStatus,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,
            models::auth::SetUserStatusPayload,

            // --- Artists ---
            models::artists::VerificationStatus,
            models::artists::Artist,
            models::artists::CreateArtistPayload,
            models::artists::UpdateArtistPayload,
            models::artists::FeatureArtistPayload,

            // --- Clubs ---
            models::clubs::Club,
            models::clubs::CreateClubPayload,
            models::clubs::UpdateClubPayload,

            // --- Events ---
            models::events::EventStatus,
            models::events::Event,
            models::events::CreateEventPayload,
            models::events::UpdateEventPayload,
            models::events::TransitionEventPayload,

            // --- Invitations / Collaboration ---
            models::invitations::InvitationStatus,
            models::invitations::Invitation,
            models::invitations::InvitationDetail,
            models::invitations::CreateInvitationPayload,
            models::invitations::UpdateInvitationStatusPayload,
            models::collaboration::MilestoneStatus,
            models::collaboration::CollaborationMilestone,
            models::collaboration::CollaborationMessage,
            models::collaboration::CreateMilestonePayload,
            models::collaboration::UpdateMilestonePayload,
            models::collaboration::PostMessagePayload,
            models::collaboration::MilestoneListing,

            // --- POS ---
            models::pos::TableStatus,
            models::pos::OrderStatus,
            models::pos::Category,
            models::pos::Product,
            models::pos::PosTable,
            models::pos::Order,
            models::pos::OrderItem,
            models::pos::OrderItemDetail,
            models::pos::OrderDetail,
            models::pos::OrderLine,
            models::pos::CreateCategoryPayload,
            models::pos::CreateProductPayload,
            models::pos::UpdateProductPayload,
            models::pos::CreateTablePayload,
            models::pos::UpdateTablePayload,
            models::pos::OpenOrderPayload,
            models::pos::ReplaceItemsPayload,
            models::pos::UpdateOrderStatusPayload,

            // --- Moderation ---
            models::reports::ReportTarget,
            models::reports::ReportReason,
            models::reports::ReportStatus,
            models::reports::Report,
            models::reports::CreateReportPayload,
            models::reports::ResolveReportPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::TopProductEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro e login"),
        (name = "Users", description = "Perfil do usuário logado"),
        (name = "Admin", description = "Gestão de usuários pela administração"),
        (name = "Artists", description = "Perfis, verificação e seguidores de artistas"),
        (name = "Clubs", description = "Casas noturnas"),
        (name = "Events", description = "Eventos e seu ciclo de vida"),
        (name = "Invitations", description = "Convites de clubes para artistas"),
        (name = "Collaboration", description = "Marcos e mensagens de um convite"),
        (name = "POS", description = "Ponto de venda: catálogo, mesas e pedidos (exige X-Club-ID)"),
        (name = "Moderation", description = "Denúncias e moderação"),
        (name = "Dashboard", description = "Indicadores da noite (exige X-Club-ID)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_area_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/artists/{id}/approve",
            "/api/invitations/{id}/milestones/{milestone_id}",
            "/api/pos/orders/{id}/checkout",
            "/api/pos/orders/{id}/receipt",
            "/api/admin/reports/{id}",
            "/api/dashboard/summary",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota ausente: {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
