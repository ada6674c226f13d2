// src/services/pos_service.rs
//
// Ponto de venda: mesas, pedidos e estoque andam juntos na mesma transação.

use chrono::Utc;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, listing::{Listing, Pagination, SortOrder}},
    db::PosRepository,
    models::pos::{
        diff_items, Category, CreateProductPayload, CreateTablePayload, ItemChange, ItemDiff, Order, OrderDetail,
        OrderFilter, OrderLine, OrderStatus, PosTable, Product, ProductFilter, TableFilter, TableStatus,
        UpdateProductPayload, UpdateTablePayload,
    },
};

#[derive(Clone)]
pub struct PosService {
    repo: PosRepository,
}

impl PosService {
    pub fn new(repo: PosRepository) -> Self {
        Self { repo }
    }

    // --- CATÁLOGO ---

    pub async fn create_category<'e, E>(&self, executor: E, club_id: Uuid, name: &str) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_category(executor, club_id, name.trim()).await
    }

    pub async fn list_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_categories(executor).await
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        club_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.ensure_category(&mut *tx, payload.category_id).await?;
        let product = self.repo.create_product(&mut *tx, club_id, payload).await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn list_products<'e, E>(&self, executor: E, filter: &ProductFilter) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_products(executor, filter).await
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.ensure_category(&mut *tx, payload.category_id).await?;
        let product = self.repo.update_product(&mut *tx, product_id, payload).await?;

        tx.commit().await?;
        Ok(product)
    }

    // --- MESAS ---

    pub async fn create_table<'e, E>(&self, executor: E, club_id: Uuid, payload: &CreateTablePayload) -> Result<PosTable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_table(executor, club_id, payload).await
    }

    pub async fn list_tables<'e, E>(&self, executor: E, filter: &TableFilter) -> Result<Vec<PosTable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_tables(executor, filter).await
    }

    pub async fn update_table<'e, E>(
        &self,
        executor: E,
        table_id: Uuid,
        payload: &UpdateTablePayload,
    ) -> Result<PosTable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_table(executor, table_id, payload).await
    }

    pub async fn delete_table<'e, E>(&self, executor: E, table_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let table = self.repo.lock_table(&mut *tx, table_id).await?;
        if table.status != TableStatus::Available {
            return Err(AppError::TableUnavailable(table.number));
        }
        if self.repo.table_has_orders(&mut *tx, table_id).await? {
            return Err(AppError::TableHasHistory(table.number));
        }
        self.repo.delete_table(&mut *tx, table_id).await?;

        tx.commit().await?;
        tracing::info!("Mesa {} removida", table.number);
        Ok(())
    }

    /// Reserva (available -> reserved) ou libera (reserved -> available) uma mesa.
    /// Mesas ocupadas só mudam pelo ciclo do pedido.
    pub async fn set_reservation<'e, E>(&self, executor: E, table_id: Uuid, reserved: bool) -> Result<PosTable, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let table = self.repo.lock_table(&mut *tx, table_id).await?;
        let next = if reserved { TableStatus::Reserved } else { TableStatus::Available };
        if table.status == TableStatus::Occupied {
            return Err(AppError::TableUnavailable(table.number));
        }
        if !table.status.can_transition_to(next) {
            return Err(AppError::transition(table.status, next));
        }

        let table = self.repo.set_table_state(&mut *tx, table_id, next, None).await?;
        tx.commit().await?;

        tracing::info!("Mesa {} agora está {}", table.number, table.status);
        Ok(table)
    }

    // --- PEDIDOS ---

    pub async fn open_order<'e, E>(
        &self,
        executor: E,
        club_id: Uuid,
        opened_by: Uuid,
        table_id: Uuid,
        lines: &[OrderLine],
    ) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. A mesa fica travada até o commit: dois caixas não abrem pedido na mesma mesa
        let table = self.repo.lock_table(&mut *tx, table_id).await?;
        if table.current_order_id.is_some() || !table.status.can_transition_to(TableStatus::Occupied) {
            return Err(AppError::TableUnavailable(table.number));
        }

        // 2. Pedido + itens (baixa de estoque)
        let order = self.repo.create_order(&mut *tx, club_id, table_id, opened_by).await?;
        let diff = diff_items(&[], lines);
        self.apply_diff(&mut *tx, club_id, order.id, &diff).await?;
        let order = self.repo.recalculate_order_total(&mut *tx, order.id).await?;

        // 3. Ocupa a mesa
        self.repo
            .set_table_state(&mut *tx, table_id, TableStatus::Occupied, Some(order.id))
            .await?;

        let detail = self.load_detail(&mut *tx, order).await?;
        tx.commit().await?;

        tracing::info!("Pedido {} aberto na mesa {} ({} itens)", detail.order.id, table.number, detail.items.len());
        Ok(detail)
    }

    pub async fn get_order<'e, E>(&self, executor: E, order_id: Uuid) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .repo
            .find_order(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;
        let detail = self.load_detail(&mut *tx, order).await?;

        tx.commit().await?;
        Ok(detail)
    }

    pub async fn list_orders<'e, E>(
        &self,
        executor: E,
        filter: &OrderFilter,
        page: &Pagination,
    ) -> Result<Listing<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = self.repo.list_orders(executor, filter, page).await?;
        Ok(Listing::new(orders, page, SortOrder::Desc))
    }

    /// Troca a lista de itens do pedido pela lista desejada.
    pub async fn replace_order_items<'e, E>(
        &self,
        executor: E,
        club_id: Uuid,
        order_id: Uuid,
        lines: &[OrderLine],
    ) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self.repo.lock_order(&mut *tx, order_id).await?;
        if !order.status.is_open() {
            return Err(AppError::OrderClosed);
        }

        let existing = self.repo.list_items(&mut *tx, order_id).await?;
        let diff = diff_items(&existing, lines);
        if diff.is_empty() {
            let detail = self.load_detail(&mut *tx, order).await?;
            tx.commit().await?;
            return Ok(detail);
        }

        self.apply_diff(&mut *tx, club_id, order_id, &diff).await?;
        let order = self.repo.recalculate_order_total(&mut *tx, order_id).await?;

        let detail = self.load_detail(&mut *tx, order).await?;
        tx.commit().await?;

        tracing::info!(
            "Pedido {}: +{} ~{} -{} linhas, total {}",
            order_id,
            diff.create.len(),
            diff.update.len(),
            diff.delete.len(),
            detail.order.total
        );
        Ok(detail)
    }

    pub async fn update_order_status<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self.repo.lock_order(&mut *tx, order_id).await?;
        if !order.status.can_transition_to(next) {
            return Err(AppError::transition(order.status, next));
        }

        let order = match next {
            OrderStatus::Completed | OrderStatus::Cancelled => self.close_order(&mut *tx, &order, next).await?,
            _ => self.repo.set_order_status(&mut *tx, order_id, next, None).await?,
        };

        let detail = self.load_detail(&mut *tx, order).await?;
        tx.commit().await?;

        tracing::info!("Pedido {} agora está {}", order_id, next);
        Ok(detail)
    }

    /// Fecha a conta: conclui o pedido e libera a mesa.
    pub async fn checkout<'e, E>(&self, executor: E, order_id: Uuid) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.update_order_status(executor, order_id, OrderStatus::Completed).await
    }

    /// Cancela o pedido, devolve o estoque e libera a mesa.
    pub async fn cancel_order<'e, E>(&self, executor: E, order_id: Uuid) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.update_order_status(executor, order_id, OrderStatus::Cancelled).await
    }

    // --- INTERNOS ---

    // Travas sempre na ordem pedido -> mesa -> produtos (por id), igual ao open_order e ao apply_diff
    async fn close_order(&self, conn: &mut PgConnection, order: &Order, next: OrderStatus) -> Result<Order, AppError> {
        let table = self.repo.lock_table(&mut *conn, order.table_id).await?;

        if next == OrderStatus::Cancelled {
            let mut items = self.repo.list_items(&mut *conn, order.id).await?;
            items.sort_by_key(|i| i.product_id);
            for item in items {
                self.repo
                    .adjust_stock(&mut *conn, item.product_id, -item.quantity)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))?;
            }
        }

        let closed = self
            .repo
            .set_order_status(&mut *conn, order.id, next, Some(Utc::now()))
            .await?;

        // Só solta a mesa se ela ainda aponta para este pedido
        if table.current_order_id == Some(order.id) {
            self.repo
                .set_table_state(&mut *conn, table.id, TableStatus::Available, None)
                .await?;
        }

        Ok(closed)
    }

    async fn apply_diff(&self, conn: &mut PgConnection, club_id: Uuid, order_id: Uuid, diff: &ItemDiff) -> Result<(), AppError> {
        // Ordem fixa por produto: duas transações nunca travam o estoque em ordem inversa
        let mut changes: Vec<&ItemChange> = diff.changes().collect();
        changes.sort_by_key(|c| c.product_id);

        for change in changes {
            let product = self.move_stock(&mut *conn, change).await?;

            match (change.item_id, change.new_quantity) {
                (None, qty) => {
                    if !product.is_active {
                        return Err(AppError::BadRequest(format!("Produto {} está inativo.", product.name)));
                    }
                    self.repo
                        .insert_item(&mut *conn, club_id, order_id, product.id, qty, product.price)
                        .await?;
                }
                (Some(item_id), 0) => self.repo.delete_item(&mut *conn, item_id).await?,
                (Some(item_id), qty) => {
                    self.repo.update_item_quantity(&mut *conn, item_id, qty).await?;
                }
            }
        }
        Ok(())
    }

    // Baixa (ou devolve) o estoque da linha. Falta de estoque derruba a transação inteira.
    async fn move_stock(&self, conn: &mut PgConnection, change: &ItemChange) -> Result<Product, AppError> {
        if let Some(product) = self
            .repo
            .adjust_stock(&mut *conn, change.product_id, change.stock_delta())
            .await?
        {
            return Ok(product);
        }

        match self.repo.find_product(&mut *conn, change.product_id).await? {
            Some(product) => Err(AppError::InsufficientStock(product.name)),
            None => Err(AppError::ResourceNotFound("Produto".into())),
        }
    }

    // Categoria de outro clube some pelo RLS e cai no mesmo 404
    async fn ensure_category(&self, conn: &mut PgConnection, category_id: Option<Uuid>) -> Result<(), AppError> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        self.repo
            .find_category(&mut *conn, category_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::ResourceNotFound("Categoria".into()))
    }

    async fn load_detail(&self, conn: &mut PgConnection, order: Order) -> Result<OrderDetail, AppError> {
        let table = self
            .repo
            .find_table(&mut *conn, order.table_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Mesa".into()))?;
        let items = self.repo.list_item_details(&mut *conn, order.id).await?;

        Ok(OrderDetail { order, table_number: table.number, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::db_utils::set_rls_scope;
    use rust_decimal::Decimal;
    use sqlx::{PgPool, Transaction};

    struct Club {
        id: Uuid,
        owner_id: Uuid,
    }

    async fn seed_club(pool: &PgPool, name: &str) -> Club {
        let owner_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $1 || '@example.com', 'x', 'club') RETURNING id",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO clubs (owner_id, name, address, city, capacity) \
             VALUES ($1, $2, 'Rua Augusta, 1200', 'São Paulo', 800) RETURNING id",
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
        Club { id, owner_id }
    }

    async fn scoped(pool: &PgPool, club: &Club) -> Transaction<'static, Postgres> {
        let mut tx = pool.begin().await.unwrap();
        set_rls_scope(&mut tx, club.id, club.owner_id).await.unwrap();
        tx
    }

    async fn product(svc: &PosService, pool: &PgPool, club: &Club, name: &str, price: i64, stock: i32) -> Product {
        let mut tx = scoped(pool, club).await;
        let payload = CreateProductPayload { category_id: None, name: name.into(), price: Decimal::from(price), stock };
        let p = svc.create_product(&mut *tx, club.id, &payload).await.unwrap();
        tx.commit().await.unwrap();
        p
    }

    async fn table(svc: &PosService, pool: &PgPool, club: &Club, number: i32) -> PosTable {
        let mut tx = scoped(pool, club).await;
        let payload = CreateTablePayload { number, area: "Pista".into(), capacity: 4 };
        let t = svc.create_table(&mut *tx, club.id, &payload).await.unwrap();
        tx.commit().await.unwrap();
        t
    }

    async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
        sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn table_state(pool: &PgPool, table_id: Uuid) -> (TableStatus, Option<Uuid>) {
        sqlx::query_as("SELECT status, current_order_id FROM pos_tables WHERE id = $1")
            .bind(table_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn line(product: &Product, quantity: i32) -> OrderLine {
        OrderLine { product_id: product.id, quantity }
    }

    async fn open(svc: &PosService, pool: &PgPool, club: &Club, table_id: Uuid, lines: &[OrderLine]) -> Result<OrderDetail, AppError> {
        let mut tx = scoped(pool, club).await;
        let detail = svc.open_order(&mut *tx, club.id, club.owner_id, table_id, lines).await?;
        tx.commit().await?;
        Ok(detail)
    }

    #[sqlx::test]
    async fn opening_an_order_takes_stock_and_occupies_the_table(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let gin = product(&svc, &pool, &club, "Gin tônica", 30, 10).await;
        let water = product(&svc, &pool, &club, "Água", 5, 10).await;
        let mesa = table(&svc, &pool, &club, 1).await;

        let detail = open(&svc, &pool, &club, mesa.id, &[line(&gin, 2), line(&water, 3)]).await.unwrap();

        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.order.total, Decimal::from(75));
        assert_eq!(detail.table_number, 1);
        assert_eq!(detail.items.len(), 2);
        assert_eq!(stock_of(&pool, gin.id).await, 8);
        assert_eq!(stock_of(&pool, water.id).await, 7);
        assert_eq!(table_state(&pool, mesa.id).await, (TableStatus::Occupied, Some(detail.order.id)));

        // Mesa ocupada não recebe um segundo pedido
        let err = open(&svc, &pool, &club, mesa.id, &[line(&water, 1)]).await.unwrap_err();
        assert!(matches!(err, AppError::TableUnavailable(1)));
        assert_eq!(stock_of(&pool, water.id).await, 7);
    }

    #[sqlx::test]
    async fn missing_stock_rolls_back_the_whole_order(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let gin = product(&svc, &pool, &club, "Gin tônica", 30, 10).await;
        let champagne = product(&svc, &pool, &club, "Champagne", 400, 1).await;
        let mesa = table(&svc, &pool, &club, 7).await;

        let err = open(&svc, &pool, &club, mesa.id, &[line(&gin, 2), line(&champagne, 2)]).await.unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock(name) if name == "Champagne"));
        assert_eq!(stock_of(&pool, gin.id).await, 10);
        assert_eq!(stock_of(&pool, champagne.id).await, 1);
        assert_eq!(table_state(&pool, mesa.id).await, (TableStatus::Available, None));
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(&pool).await.unwrap();
        assert_eq!(orders, 0);
    }

    #[sqlx::test]
    async fn replacing_items_moves_only_the_difference(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let gin = product(&svc, &pool, &club, "Gin tônica", 30, 10).await;
        let water = product(&svc, &pool, &club, "Água", 5, 10).await;
        let beer = product(&svc, &pool, &club, "Cerveja", 12, 10).await;
        let mesa = table(&svc, &pool, &club, 2).await;
        let order = open(&svc, &pool, &club, mesa.id, &[line(&gin, 2), line(&water, 3)]).await.unwrap().order;

        let mut tx = scoped(&pool, &club).await;
        let detail = svc
            .replace_order_items(&mut *tx, club.id, order.id, &[line(&gin, 1), line(&beer, 4)])
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(detail.order.total, Decimal::from(78));
        assert_eq!(detail.items.len(), 2);
        assert_eq!(stock_of(&pool, gin.id).await, 9);
        assert_eq!(stock_of(&pool, water.id).await, 10);
        assert_eq!(stock_of(&pool, beer.id).await, 6);

        // Pedir mais do que tem não mexe em nada
        let mut tx = scoped(&pool, &club).await;
        let err = svc
            .replace_order_items(&mut *tx, club.id, order.id, &[line(&gin, 1), line(&beer, 20)])
            .await
            .unwrap_err();
        drop(tx);
        assert!(matches!(err, AppError::InsufficientStock(_)));
        assert_eq!(stock_of(&pool, beer.id).await, 6);
    }

    #[sqlx::test]
    async fn checkout_frees_the_table_and_closes_the_order(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let gin = product(&svc, &pool, &club, "Gin tônica", 30, 10).await;
        let mesa = table(&svc, &pool, &club, 3).await;
        let order = open(&svc, &pool, &club, mesa.id, &[line(&gin, 2)]).await.unwrap().order;

        let mut tx = scoped(&pool, &club).await;
        let detail = svc.checkout(&mut *tx, order.id).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(detail.order.status, OrderStatus::Completed);
        assert!(detail.order.closed_at.is_some());
        assert_eq!(stock_of(&pool, gin.id).await, 8);
        assert_eq!(table_state(&pool, mesa.id).await, (TableStatus::Available, None));

        let mut tx = scoped(&pool, &club).await;
        let err = svc.replace_order_items(&mut *tx, club.id, order.id, &[line(&gin, 5)]).await.unwrap_err();
        assert!(matches!(err, AppError::OrderClosed));
        let err = svc.cancel_order(&mut *tx, order.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        // A mesa livre aceita um pedido novo
        drop(tx);
        assert!(open(&svc, &pool, &club, mesa.id, &[line(&gin, 1)]).await.is_ok());
    }

    #[sqlx::test]
    async fn cancel_returns_stock_and_frees_the_table(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let gin = product(&svc, &pool, &club, "Gin tônica", 30, 10).await;
        let water = product(&svc, &pool, &club, "Água", 5, 10).await;
        let mesa = table(&svc, &pool, &club, 4).await;
        let order = open(&svc, &pool, &club, mesa.id, &[line(&gin, 2), line(&water, 3)]).await.unwrap().order;

        let mut tx = scoped(&pool, &club).await;
        let detail = svc.cancel_order(&mut *tx, order.id).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(detail.order.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&pool, gin.id).await, 10);
        assert_eq!(stock_of(&pool, water.id).await, 10);
        assert_eq!(table_state(&pool, mesa.id).await, (TableStatus::Available, None));
    }

    #[sqlx::test]
    async fn reservation_only_touches_free_tables(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let gin = product(&svc, &pool, &club, "Gin tônica", 30, 10).await;
        let vip = table(&svc, &pool, &club, 10).await;
        let pista = table(&svc, &pool, &club, 11).await;

        let mut tx = scoped(&pool, &club).await;
        let reserved = svc.set_reservation(&mut *tx, vip.id, true).await.unwrap();
        assert_eq!(reserved.status, TableStatus::Reserved);
        let released = svc.set_reservation(&mut *tx, vip.id, false).await.unwrap();
        assert_eq!(released.status, TableStatus::Available);
        tx.commit().await.unwrap();

        open(&svc, &pool, &club, pista.id, &[line(&gin, 1)]).await.unwrap();
        let mut tx = scoped(&pool, &club).await;
        for reserve in [true, false] {
            let err = svc.set_reservation(&mut *tx, pista.id, reserve).await.unwrap_err();
            assert!(matches!(err, AppError::TableUnavailable(11)));
        }
    }

    #[sqlx::test]
    async fn tables_with_order_history_are_not_deleted(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let gin = product(&svc, &pool, &club, "Gin tônica", 30, 10).await;
        let used = table(&svc, &pool, &club, 5).await;
        let fresh = table(&svc, &pool, &club, 6).await;

        let order = open(&svc, &pool, &club, used.id, &[line(&gin, 1)]).await.unwrap().order;
        let mut tx = scoped(&pool, &club).await;
        svc.checkout(&mut *tx, order.id).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = scoped(&pool, &club).await;
        let err = svc.delete_table(&mut *tx, used.id).await.unwrap_err();
        assert!(matches!(err, AppError::TableHasHistory(5)));
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);

        svc.delete_table(&mut *tx, fresh.id).await.unwrap();
        tx.commit().await.unwrap();

        let left: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM pos_tables").fetch_all(&pool).await.unwrap();
        assert_eq!(left, vec![used.id]);
    }

    #[sqlx::test]
    async fn products_only_take_categories_of_their_own_club(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let rival = seed_club(&pool, "rival").await;

        let mut tx = scoped(&pool, &rival).await;
        let foreign = svc.create_category(&mut *tx, rival.id, "Destilados").await.unwrap();
        tx.commit().await.unwrap();

        let mut payload = CreateProductPayload {
            category_id: Some(Uuid::new_v4()),
            name: "Gin tônica".into(),
            price: Decimal::from(30),
            stock: 10,
        };
        let mut tx = scoped(&pool, &club).await;
        let err = svc.create_product(&mut *tx, club.id, &payload).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(ref what) if what == "Categoria"));
        drop(tx);

        // A conexão de teste é superusuário e ignora RLS; a aplicação roda com um papel comum
        sqlx::query(
            "DO $$ BEGIN CREATE ROLE nightlife_pos NOLOGIN; \
             EXCEPTION WHEN duplicate_object OR unique_violation THEN NULL; END $$",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public TO nightlife_pos")
            .execute(&pool)
            .await
            .unwrap();

        payload.category_id = Some(foreign.id);
        let mut tx = scoped(&pool, &club).await;
        sqlx::query("SET LOCAL ROLE nightlife_pos").execute(&mut *tx).await.unwrap();
        let err = svc.create_product(&mut *tx, club.id, &payload).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(ref what) if what == "Categoria"));

        let update = UpdateProductPayload { category_id: Some(foreign.id), ..Default::default() };
        let own = svc.create_product(&mut *tx, club.id, &CreateProductPayload { category_id: None, ..payload }).await.unwrap();
        let err = svc.update_product(&mut *tx, own.id, &update).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(ref what) if what == "Categoria"));
    }

    #[sqlx::test]
    async fn cancel_and_edit_over_the_same_products_do_not_deadlock(pool: PgPool) {
        let svc = PosService::new(PosRepository::new());
        let club = seed_club(&pool, "warehouse").await;
        let mut products = Vec::new();
        for name in ["Gin tônica", "Água", "Cerveja", "Energético"] {
            products.push(product(&svc, &pool, &club, name, 10, 1_000).await);
        }

        for round in 0..10 {
            let t1 = table(&svc, &pool, &club, 100 + round * 2).await;
            let t2 = table(&svc, &pool, &club, 101 + round * 2).await;
            // Ordens opostas de propósito: a trava segue o id do produto, não a lista
            let forward: Vec<OrderLine> = products.iter().map(|p| line(p, 1)).collect();
            let backward: Vec<OrderLine> = products.iter().rev().map(|p| line(p, 1)).collect();
            let o1 = open(&svc, &pool, &club, t1.id, &forward).await.unwrap().order;
            let o2 = open(&svc, &pool, &club, t2.id, &backward).await.unwrap().order;

            let cancel = async {
                let mut tx = scoped(&pool, &club).await;
                svc.cancel_order(&mut *tx, o1.id).await?;
                tx.commit().await?;
                Ok::<_, AppError>(())
            };
            let edit = async {
                let mut tx = scoped(&pool, &club).await;
                let more: Vec<OrderLine> = products.iter().rev().map(|p| line(p, 2)).collect();
                svc.replace_order_items(&mut *tx, club.id, o2.id, &more).await?;
                tx.commit().await?;
                Ok::<_, AppError>(())
            };

            let (cancelled, edited) = tokio::join!(cancel, edit);
            cancelled.unwrap();
            edited.unwrap();
        }

        // 10 rodadas: o1 devolveu tudo, o2 ficou com 2 de cada
        for p in &products {
            assert_eq!(stock_of(&pool, p.id).await, 1_000 - 20);
        }
    }
}
