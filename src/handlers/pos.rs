// src/handlers/pos.rs
//
// Todas as rotas daqui passam pelo club_guard: o X-Club-ID já foi validado
// e o usuário administra o clube. Cada handler abre a transação RLS do clube.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_club_transaction,
        error::{ApiError, AppError},
        listing::Pagination,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, club::ClubContext, i18n::Locale},
    models::pos::{
        Category, CreateCategoryPayload, CreateProductPayload, CreateTablePayload, OpenOrderPayload, OrderDetail,
        OrderFilter, PosTable, Product, ProductFilter, ReplaceItemsPayload, TableFilter, UpdateOrderStatusPayload,
        UpdateProductPayload, UpdateTablePayload,
    },
};

// =========================================================================
//  CATEGORIAS
// =========================================================================

#[utoipa::path(
    post,
    path = "/api/pos/categories",
    tag = "POS",
    request_body = CreateCategoryPayload,
    params(("x-club-id" = Uuid, Header, description = "ID do clube")),
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Nome repetido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let category = app_state
        .pos_service
        .create_category(&mut *tx, club.0, &payload.name)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/api/pos/categories",
    tag = "POS",
    params(("x-club-id" = Uuid, Header, description = "ID do clube")),
    responses((status = 200, description = "Categorias do clube", body = [Category])),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let categories = app_state.pos_service.list_categories(&mut *tx).await.map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(categories)))
}

// =========================================================================
//  PRODUTOS
// =========================================================================

#[utoipa::path(
    post,
    path = "/api/pos/products",
    tag = "POS",
    request_body = CreateProductPayload,
    params(("x-club-id" = Uuid, Header, description = "ID do clube")),
    responses((status = 201, description = "Produto criado", body = Product)),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let product = app_state
        .pos_service
        .create_product(&mut *tx, club.0, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/pos/products",
    tag = "POS",
    params(ProductFilter, ("x-club-id" = Uuid, Header, description = "ID do clube")),
    responses((status = 200, description = "Produtos do clube", body = [Product])),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let products = app_state.pos_service.list_products(&mut *tx, &filter).await.map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    put,
    path = "/api/pos/products/{id}",
    tag = "POS",
    request_body = UpdateProductPayload,
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses((status = 200, description = "Produto atualizado", body = Product)),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let product = app_state
        .pos_service
        .update_product(&mut *tx, id, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(product)))
}

// =========================================================================
//  MESAS
// =========================================================================

#[utoipa::path(
    post,
    path = "/api/pos/tables",
    tag = "POS",
    request_body = CreateTablePayload,
    params(("x-club-id" = Uuid, Header, description = "ID do clube")),
    responses(
        (status = 201, description = "Mesa criada", body = PosTable),
        (status = 409, description = "Número já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_table(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Json(payload): Json<CreateTablePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let table = app_state
        .pos_service
        .create_table(&mut *tx, club.0, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::CREATED, Json(table)))
}

#[utoipa::path(
    get,
    path = "/api/pos/tables",
    tag = "POS",
    params(TableFilter, ("x-club-id" = Uuid, Header, description = "ID do clube")),
    responses((status = 200, description = "Mapa de mesas", body = [PosTable])),
    security(("api_jwt" = []))
)]
pub async fn list_tables(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Query(filter): Query<TableFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let tables = app_state.pos_service.list_tables(&mut *tx, &filter).await.map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(tables)))
}

#[utoipa::path(
    put,
    path = "/api/pos/tables/{id}",
    tag = "POS",
    request_body = UpdateTablePayload,
    params(
        ("id" = Uuid, Path, description = "ID da mesa"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses((status = 200, description = "Mesa atualizada", body = PosTable)),
    security(("api_jwt" = []))
)]
pub async fn update_table(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTablePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let table = app_state
        .pos_service
        .update_table(&mut *tx, id, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(table)))
}

#[utoipa::path(
    delete,
    path = "/api/pos/tables/{id}",
    tag = "POS",
    params(
        ("id" = Uuid, Path, description = "ID da mesa"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses(
        (status = 204, description = "Mesa removida"),
        (status = 409, description = "Mesa ocupada ou reservada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_table(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    app_state.pos_service.delete_table(&mut *tx, id).await.map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn set_reservation(
    app_state: &AppState,
    locale: &Locale,
    user: &AuthenticatedUser,
    club: &ClubContext,
    table_id: Uuid,
    reserved: bool,
) -> Result<PosTable, ApiError> {
    let to_api = |e: AppError| e.to_api_error(locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(app_state, club, user).await.map_err(to_api)?;
    let table = app_state
        .pos_service
        .set_reservation(&mut *tx, table_id, reserved)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;
    Ok(table)
}

#[utoipa::path(
    post,
    path = "/api/pos/tables/{id}/reserve",
    tag = "POS",
    params(
        ("id" = Uuid, Path, description = "ID da mesa"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses(
        (status = 200, description = "Mesa reservada", body = PosTable),
        (status = 409, description = "Mesa indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn reserve_table(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let table = set_reservation(&app_state, &locale, &user, &club, id, true).await?;
    Ok((StatusCode::OK, Json(table)))
}

#[utoipa::path(
    post,
    path = "/api/pos/tables/{id}/release",
    tag = "POS",
    params(
        ("id" = Uuid, Path, description = "ID da mesa"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses((status = 200, description = "Reserva desfeita", body = PosTable)),
    security(("api_jwt" = []))
)]
pub async fn release_table(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let table = set_reservation(&app_state, &locale, &user, &club, id, false).await?;
    Ok((StatusCode::OK, Json(table)))
}

// =========================================================================
//  PEDIDOS
// =========================================================================

#[utoipa::path(
    post,
    path = "/api/pos/orders",
    tag = "POS",
    request_body = OpenOrderPayload,
    params(("x-club-id" = Uuid, Header, description = "ID do clube")),
    responses(
        (status = 201, description = "Pedido aberto e mesa ocupada", body = OrderDetail),
        (status = 409, description = "Mesa indisponível ou estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Json(payload): Json<OpenOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let order = app_state
        .pos_service
        .open_order(&mut *tx, club.0, user.0.id, payload.table_id, &payload.items)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/pos/orders",
    tag = "POS",
    params(OrderFilter, Pagination, ("x-club-id" = Uuid, Header, description = "ID do clube")),
    responses((status = 200, description = "Pedidos do clube, mais recentes primeiro")),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Query(filter): Query<OrderFilter>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let orders = app_state
        .pos_service
        .list_orders(&mut *tx, &filter, &page)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(orders)))
}

#[utoipa::path(
    get,
    path = "/api/pos/orders/{id}",
    tag = "POS",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses(
        (status = 200, description = "Pedido com itens", body = OrderDetail),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let order = app_state.pos_service.get_order(&mut *tx, id).await.map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    put,
    path = "/api/pos/orders/{id}/items",
    tag = "POS",
    request_body = ReplaceItemsPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses(
        (status = 200, description = "Itens sincronizados e total recalculado", body = OrderDetail),
        (status = 409, description = "Pedido fechado ou estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_order_items(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplaceItemsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    payload.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let order = app_state
        .pos_service
        .replace_order_items(&mut *tx, club.0, id, &payload.items)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    put,
    path = "/api/pos/orders/{id}/status",
    tag = "POS",
    request_body = UpdateOrderStatusPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses(
        (status = 200, description = "Status alterado", body = OrderDetail),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let order = app_state
        .pos_service
        .update_order_status(&mut *tx, id, payload.status)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/pos/orders/{id}/checkout",
    tag = "POS",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses(
        (status = 200, description = "Conta fechada e mesa liberada", body = OrderDetail),
        (status = 409, description = "Pedido já encerrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn checkout(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let order = app_state.pos_service.checkout(&mut *tx, id).await.map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/pos/orders/{id}/cancel",
    tag = "POS",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses(
        (status = 200, description = "Pedido cancelado, estoque devolvido", body = OrderDetail),
        (status = 409, description = "Pedido já encerrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let order = app_state.pos_service.cancel_order(&mut *tx, id).await.map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/pos/orders/{id}/receipt",
    tag = "POS",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-club-id" = Uuid, Header, description = "ID do clube")
    ),
    responses(
        (status = 200, description = "Recibo em PDF", content_type = "application/pdf"),
        (status = 400, description = "Pedido não concluído")
    ),
    security(("api_jwt" = []))
)]
pub async fn order_receipt(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    club: ClubContext,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_club_transaction(&app_state, &club, &user).await.map_err(to_api)?;
    let order = app_state.pos_service.get_order(&mut *tx, id).await.map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    let venue = app_state.club_service.get_club(club.0).await.map_err(to_api)?;
    let pdf_bytes = app_state.receipt_service.render(&venue.name, &order).map_err(to_api)?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"recibo_{}.pdf\"", id)),
    ];

    Ok((headers, pdf_bytes).into_response())
}
