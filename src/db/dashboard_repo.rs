// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{DashboardSummary, TopProductEntry},
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // 1. Resumo da noite
    pub async fn get_summary<'e, E>(&self, executor: E, club_id: Uuid) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Savepoint dentro da transação do clube: leituras consistentes entre si
        let mut tx = executor.begin().await?;

        let (sales_today,): (Option<Decimal>,) = sqlx::query_as(
            r#"
            SELECT SUM(total) FROM orders
            WHERE status = 'completed' AND closed_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let (open_orders,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM orders WHERE status IN ('pending', 'processing')",
        )
        .fetch_one(&mut *tx)
        .await?;

        let (occupied_tables, total_tables): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = 'occupied'), COUNT(*) FROM pos_tables",
        )
        .fetch_one(&mut *tx)
        .await?;

        // events não tem RLS, filtra pelo clube explicitamente
        let (upcoming_events,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM events
            WHERE club_id = $1 AND status IN ('planning', 'upcoming') AND starts_at >= NOW()
            "#,
        )
        .bind(club_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            sales_today: sales_today.unwrap_or(Decimal::ZERO),
            open_orders,
            occupied_tables,
            total_tables,
            upcoming_events,
        })
    }

    // 2. Top 5 produtos por faturamento (pedidos concluídos)
    pub async fn get_top_products<'e, E>(&self, executor: E) -> Result<Vec<TopProductEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let data = sqlx::query_as::<_, TopProductEntry>(
            r#"
            SELECT
                p.name AS product_name,
                SUM(oi.quantity)::BIGINT AS total_quantity,
                SUM(oi.subtotal) AS total_revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE o.status = 'completed'
            GROUP BY p.id, p.name
            ORDER BY total_revenue DESC
            LIMIT 5
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(data)
    }
}
