// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// 1. Resumo da noite (os cards do topo do POS)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub sales_today: Decimal,      // Pedidos fechados hoje
    pub open_orders: i64,          // Pedidos pendentes ou em preparo
    pub occupied_tables: i64,      // Mesas ocupadas agora
    pub total_tables: i64,
    pub upcoming_events: i64,      // Eventos futuros do clube
}

// 2. Curva ABC (Top Produtos)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProductEntry {
    pub product_name: String,
    pub total_quantity: Option<i64>,
    pub total_revenue: Option<Decimal>,
}
