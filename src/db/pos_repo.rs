// src/db/pos_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Pagination, WhereClause}},
    models::pos::{
        Category, CreateProductPayload, CreateTablePayload, Order, OrderFilter, OrderItem,
        OrderItemDetail, OrderStatus, PosTable, Product, ProductFilter, TableFilter, TableStatus,
        UpdateProductPayload, UpdateTablePayload,
    },
};

// Todas as consultas abaixo rodam dentro da transação do clube (RLS por app.club_id).
// Os INSERTs ainda gravam club_id explicitamente, a política confere o valor.

pub(crate) fn build_table_query<'a>(filter: &TableFilter) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM pos_tables");
    let mut clause = WhereClause::default();

    if let Some(area) = filter.area.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        clause.and(&mut qb).push("lower(area) = lower(").push_bind(area.to_string()).push(")");
    }
    if let Some(status) = filter.status {
        clause.and(&mut qb).push("status = ").push_bind(status);
    }
    qb.push(" ORDER BY number ASC");
    qb
}

pub(crate) fn build_product_query<'a>(filter: &ProductFilter) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products");
    let mut clause = WhereClause::default();

    if let Some(category_id) = filter.category_id {
        clause.and(&mut qb).push("category_id = ").push_bind(category_id);
    }
    if let Some(active) = filter.active {
        clause.and(&mut qb).push("is_active = ").push_bind(active);
    }
    qb.push(" ORDER BY name ASC");
    qb
}

pub(crate) fn build_order_query<'a>(filter: &OrderFilter, page: &Pagination) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM orders");
    let mut clause = WhereClause::default();

    if let Some(status) = filter.status {
        clause.and(&mut qb).push("status = ").push_bind(status);
    }
    if let Some(table_id) = filter.table_id {
        clause.and(&mut qb).push("table_id = ").push_bind(table_id);
    }
    qb.push(" ORDER BY opened_at DESC, id ASC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    qb
}

// Sem pool próprio: o executor é sempre a transação aberta pelo serviço
#[derive(Clone, Default)]
pub struct PosRepository;

impl PosRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CATEGORIAS & PRODUTOS
    // =========================================================================

    pub async fn create_category<'e, E>(&self, executor: E, club_id: Uuid, name: &str) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (club_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(club_id)
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "Já existe uma categoria com este nome."))
    }

    pub async fn list_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(categories)
    }

    pub async fn find_category<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(category)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        club_id: Uuid,
        input: &CreateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (club_id, category_id, name, price, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(club_id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn list_products<'e, E>(&self, executor: E, filter: &ProductFilter) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = build_product_query(filter);
        let products = qb.build_query_as::<Product>().fetch_all(executor).await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.name.as_deref())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.is_active)
        .fetch_optional(executor)
        .await?;

        product.ok_or_else(|| AppError::ResourceNotFound("Produto".into()))
    }

    /// Aplica `delta` ao estoque (positivo consome, negativo devolve).
    /// Retorna `None` se o produto não existe ou se o estoque ficaria negativo.
    pub async fn adjust_stock<'e, E>(&self, executor: E, product_id: Uuid, delta: i32) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock - $2 >= 0
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    // =========================================================================
    //  MESAS
    // =========================================================================

    pub async fn create_table<'e, E>(&self, executor: E, club_id: Uuid, input: &CreateTablePayload) -> Result<PosTable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PosTable>(
            r#"
            INSERT INTO pos_tables (club_id, number, area, capacity)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(club_id)
        .bind(input.number)
        .bind(&input.area)
        .bind(input.capacity)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "Já existe uma mesa com este número."))
    }

    pub async fn list_tables<'e, E>(&self, executor: E, filter: &TableFilter) -> Result<Vec<PosTable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = build_table_query(filter);
        let tables = qb.build_query_as::<PosTable>().fetch_all(executor).await?;
        Ok(tables)
    }

    pub async fn find_table<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<PosTable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let table = sqlx::query_as::<_, PosTable>("SELECT * FROM pos_tables WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(table)
    }

    // Trava a linha da mesa até o fim da transação
    pub async fn lock_table<'e, E>(&self, executor: E, id: Uuid) -> Result<PosTable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let table = sqlx::query_as::<_, PosTable>("SELECT * FROM pos_tables WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        table.ok_or_else(|| AppError::ResourceNotFound("Mesa".into()))
    }

    pub async fn update_table<'e, E>(&self, executor: E, id: Uuid, input: &UpdateTablePayload) -> Result<PosTable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let table = sqlx::query_as::<_, PosTable>(
            r#"
            UPDATE pos_tables SET
                number = COALESCE($2, number),
                area = COALESCE($3, area),
                capacity = COALESCE($4, capacity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.number)
        .bind(input.area.as_deref())
        .bind(input.capacity)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "Já existe uma mesa com este número."))?;

        table.ok_or_else(|| AppError::ResourceNotFound("Mesa".into()))
    }

    pub async fn set_table_state<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: TableStatus,
        current_order_id: Option<Uuid>,
    ) -> Result<PosTable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let table = sqlx::query_as::<_, PosTable>(
            r#"
            UPDATE pos_tables SET status = $2, current_order_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(current_order_id)
        .fetch_one(executor)
        .await?;
        Ok(table)
    }

    // Pedidos antigos continuam apontando para a mesa
    pub async fn table_has_orders<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE table_id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    pub async fn delete_table<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM pos_tables WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  PEDIDOS
    // =========================================================================

    pub async fn create_order<'e, E>(&self, executor: E, club_id: Uuid, table_id: Uuid, opened_by: Uuid) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (club_id, table_id, opened_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(club_id)
        .bind(table_id)
        .bind(opened_by)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn find_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn lock_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        order.ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))
    }

    pub async fn list_orders<'e, E>(&self, executor: E, filter: &OrderFilter, page: &Pagination) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = build_order_query(filter, page);
        let orders = qb.build_query_as::<Order>().fetch_all(executor).await?;
        Ok(orders)
    }

    pub async fn list_items<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list_item_details<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<OrderItemDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.*, p.name AS product_name
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.created_at ASC, oi.id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        club_id: Uuid,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (club_id, order_id, product_id, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $4 * $5)
            RETURNING *
            "#,
        )
        .bind(club_id)
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    // O preço unitário gravado na abertura da linha é mantido
    pub async fn update_item_quantity<'e, E>(&self, executor: E, item_id: Uuid, quantity: i32) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            UPDATE order_items SET quantity = $2, subtotal = $2 * unit_price
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, item_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(item_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn recalculate_order_total<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET
                total = (SELECT COALESCE(SUM(subtotal), 0) FROM order_items WHERE order_id = $1),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn set_order_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: OrderStatus,
        closed_at: Option<DateTime<Utc>>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $2, closed_at = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(closed_at)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_filters_keep_number_order() {
        let filter = TableFilter { area: Some("Pista".into()), status: Some(TableStatus::Available) };
        assert_eq!(
            build_table_query(&filter).sql(),
            "SELECT * FROM pos_tables WHERE lower(area) = lower($1) AND status = $2 ORDER BY number ASC"
        );
        assert_eq!(
            build_table_query(&TableFilter::default()).sql(),
            "SELECT * FROM pos_tables ORDER BY number ASC"
        );
    }

    #[test]
    fn product_filters() {
        let filter = ProductFilter { category_id: None, active: Some(true) };
        assert_eq!(
            build_product_query(&filter).sql(),
            "SELECT * FROM products WHERE is_active = $1 ORDER BY name ASC"
        );
    }

    #[test]
    fn order_listing_is_paged_newest_first() {
        let filter = OrderFilter { status: Some(OrderStatus::Pending), table_id: Some(Uuid::nil()) };
        assert_eq!(
            build_order_query(&filter, &Pagination::default()).sql(),
            "SELECT * FROM orders WHERE status = $1 AND table_id = $2 \
             ORDER BY opened_at DESC, id ASC LIMIT $3 OFFSET $4"
        );
    }
}
