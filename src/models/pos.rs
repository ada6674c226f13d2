// src/models/pos.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "table_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
}

impl TableStatus {
    // available <-> reserved, (available|reserved) -> occupied -> available
    pub fn can_transition_to(self, next: TableStatus) -> bool {
        use TableStatus::*;
        matches!(
            (self, next),
            (Available, Reserved)
                | (Reserved, Available)
                | (Available, Occupied)
                | (Reserved, Occupied)
                | (Occupied, Available)
        )
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                // Fechamento direto no caixa
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }

    /// Pedido ainda prende a mesa
    pub fn is_open(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        })
    }
}

// --- Catálogo ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(ignore)]
    pub club_id: Uuid,
    #[schema(example = "Drinks")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub club_id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "Gin Tônica")]
    pub name: String,
    #[schema(example = "32.00")]
    pub price: Decimal,
    #[schema(example = 48)]
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Salão ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PosTable {
    pub id: Uuid,
    #[schema(ignore)]
    pub club_id: Uuid,
    #[schema(example = 12)]
    pub number: i32,
    #[schema(example = "Mezanino")]
    pub area: String,
    #[schema(example = 6)]
    pub capacity: i32,
    pub status: TableStatus,
    pub current_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Pedidos ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(ignore)]
    pub club_id: Uuid,
    pub table_id: Uuid,
    pub status: OrderStatus,
    #[schema(example = "150.50")]
    pub total: Decimal,
    pub opened_by: Uuid,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub club_id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "32.00")]
    pub unit_price: Decimal,
    #[schema(example = "64.00")]
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: OrderItem,
    pub product_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub table_number: i32,
    pub items: Vec<OrderItemDetail>,
}

// --- Diff de itens (o que o caixa quer vs. o que está gravado) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemChange {
    pub product_id: Uuid,
    pub item_id: Option<Uuid>,
    pub old_quantity: i32,
    pub new_quantity: i32,
}

impl ItemChange {
    /// Positivo: consome estoque. Negativo: devolve.
    pub fn stock_delta(&self) -> i32 {
        self.new_quantity - self.old_quantity
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ItemDiff {
    pub create: Vec<ItemChange>,
    pub update: Vec<ItemChange>,
    pub delete: Vec<ItemChange>,
}

impl ItemDiff {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    pub fn changes(&self) -> impl Iterator<Item = &ItemChange> {
        self.create.iter().chain(self.update.iter()).chain(self.delete.iter())
    }
}

/// Compara os itens gravados com a lista desejada (por produto).
/// Quantidade 0 na lista desejada equivale a remover a linha.
pub fn diff_items(existing: &[OrderItem], desired: &[OrderLine]) -> ItemDiff {
    let current: HashMap<Uuid, &OrderItem> = existing.iter().map(|i| (i.product_id, i)).collect();
    let wanted: HashMap<Uuid, i32> = desired
        .iter()
        .filter(|l| l.quantity > 0)
        .map(|l| (l.product_id, l.quantity))
        .collect();

    let mut diff = ItemDiff::default();

    for line in desired.iter().filter(|l| l.quantity > 0) {
        match current.get(&line.product_id) {
            None => diff.create.push(ItemChange {
                product_id: line.product_id,
                item_id: None,
                old_quantity: 0,
                new_quantity: line.quantity,
            }),
            Some(item) if item.quantity != line.quantity => diff.update.push(ItemChange {
                product_id: line.product_id,
                item_id: Some(item.id),
                old_quantity: item.quantity,
                new_quantity: line.quantity,
            }),
            Some(_) => {}
        }
    }

    for item in existing {
        if !wanted.contains_key(&item.product_id) {
            diff.delete.push(ItemChange {
                product_id: item.product_id,
                item_id: Some(item.id),
                old_quantity: item.quantity,
                new_quantity: 0,
            });
        }
    }

    diff
}

fn validate_lines(lines: &[OrderLine]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for line in lines {
        if line.quantity < 0 {
            let mut err = ValidationError::new("range");
            err.message = Some("validation.non_negative".into());
            return Err(err);
        }
        if !seen.insert(line.product_id) {
            let mut err = ValidationError::new("duplicated_product");
            err.message = Some("validation.duplicated_product".into());
            return Err(err);
        }
    }
    Ok(())
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("validation.non_negative".into());
        return Err(err);
    }
    Ok(())
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 100, message = "validation.required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 150, message = "validation.required"))]
    pub name: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    #[validate(range(min = 0, message = "validation.non_negative"))]
    #[serde(default)]
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 150, message = "validation.required"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "validation.non_negative"))]
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTablePayload {
    #[validate(range(min = 1, message = "validation.positive"))]
    pub number: i32,
    #[validate(length(min = 1, max = 100, message = "validation.required"))]
    pub area: String,
    #[validate(range(min = 1, message = "validation.positive"))]
    pub capacity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTablePayload {
    #[validate(range(min = 1, message = "validation.positive"))]
    pub number: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "validation.required"))]
    pub area: Option<String>,
    #[validate(range(min = 1, message = "validation.positive"))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrderPayload {
    pub table_id: Uuid,
    #[serde(default)]
    #[validate(custom(function = "validate_lines"))]
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplaceItemsPayload {
    #[validate(custom(function = "validate_lines"))]
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct TableFilter {
    pub area: Option<String>,
    pub status: Option<TableStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: Uuid, quantity: i32, price: i64) -> OrderItem {
        let unit_price = Decimal::from(price);
        OrderItem {
            id: Uuid::new_v4(),
            club_id: Uuid::nil(),
            order_id: Uuid::nil(),
            product_id,
            quantity,
            unit_price,
            subtotal: Decimal::from(quantity) * unit_price,
            created_at: Utc::now(),
        }
    }

    fn line(product_id: Uuid, quantity: i32) -> OrderLine {
        OrderLine { product_id, quantity }
    }

    #[test]
    fn diff_creates_updates_and_deletes_by_product() {
        let (gin, beer, water, soda) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let existing = vec![item(gin, 2, 30), item(beer, 3, 15), item(water, 1, 5)];
        let desired = vec![line(gin, 2), line(beer, 1), line(soda, 4)];

        let diff = diff_items(&existing, &desired);

        assert_eq!(diff.create.len(), 1);
        assert_eq!(diff.create[0].product_id, soda);
        assert_eq!(diff.create[0].stock_delta(), 4);

        assert_eq!(diff.update.len(), 1);
        assert_eq!(diff.update[0].item_id, Some(existing[1].id));
        assert_eq!(diff.update[0].stock_delta(), -2);

        assert_eq!(diff.delete.len(), 1);
        assert_eq!(diff.delete[0].product_id, water);
        assert_eq!(diff.delete[0].stock_delta(), -1);
    }

    #[test]
    fn zero_quantity_removes_the_line() {
        let gin = Uuid::new_v4();
        let existing = vec![item(gin, 2, 30)];
        let diff = diff_items(&existing, &[line(gin, 0)]);
        assert!(diff.create.is_empty() && diff.update.is_empty());
        assert_eq!(diff.delete.len(), 1);
    }

    #[test]
    fn identical_lists_produce_no_changes() {
        let gin = Uuid::new_v4();
        let existing = vec![item(gin, 2, 30)];
        assert!(diff_items(&existing, &[line(gin, 2)]).is_empty());
        assert!(diff_items(&[], &[]).is_empty());
    }

    #[test]
    fn duplicated_products_are_rejected() {
        let gin = Uuid::new_v4();
        assert!(validate_lines(&[line(gin, 1), line(Uuid::new_v4(), 2)]).is_ok());
        assert!(validate_lines(&[line(gin, 1), line(gin, 2)]).is_err());
        assert!(validate_lines(&[line(gin, -1)]).is_err());
    }

    #[test]
    fn table_and_order_state_machines() {
        use OrderStatus::*;
        use TableStatus::*;

        assert!(Available.can_transition_to(Occupied));
        assert!(Reserved.can_transition_to(Occupied));
        assert!(Occupied.can_transition_to(Available));
        assert!(!Occupied.can_transition_to(Reserved));

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(Processing.is_open() && !Completed.is_open());
    }
}
