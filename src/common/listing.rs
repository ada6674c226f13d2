// src/common/listing.rs
//
// Peças compartilhadas pelas listagens (filtro, ordenação e paginação).

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Clicar de novo na mesma coluna inverte a direção.
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Campo ordenável de uma listagem. Só colunas da lista branca chegam no SQL.
pub trait SortField: Copy + Default {
    fn column(self) -> &'static str;
}

/// Monta o `WHERE a AND b AND c` sem se preocupar com qual predicado vem primeiro.
#[derive(Debug, Default)]
pub struct WhereClause {
    started: bool,
}

impl WhereClause {
    pub fn and<'q, 'a>(&mut self, qb: &'q mut QueryBuilder<'a, Postgres>) -> &'q mut QueryBuilder<'a, Postgres> {
        qb.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
        qb
    }
}

/// Padrão ILIKE com os curingas do usuário escapados.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Devolve o termo de busca só se ele tiver conteúdo.
pub fn search_term(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern)
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page.unwrap_or(1).max(1) - 1) * self.limit()
    }
}

/// Fecha a query com ORDER BY (+ desempate por id) e LIMIT/OFFSET.
pub fn push_order_and_page<F: SortField>(
    qb: &mut QueryBuilder<'_, Postgres>,
    field: F,
    order: SortOrder,
    page: &Pagination,
) {
    qb.push(" ORDER BY ")
        .push(field.column())
        .push(" ")
        .push(order.as_sql())
        .push(", id ASC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

/// Envelope das listagens. `toggleOrder` é a direção a pedir se a mesma coluna for clicada de novo.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub order: SortOrder,
    pub toggle_order: SortOrder,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, page: &Pagination, order: SortOrder) -> Self {
        Self {
            items,
            page: page.page.unwrap_or(1).max(1),
            per_page: page.limit(),
            order,
            toggle_order: order.toggle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, Default)]
    struct ByName;

    impl SortField for ByName {
        fn column(self) -> &'static str {
            "name"
        }
    }

    #[test]
    fn toggling_twice_returns_to_the_original_order() {
        assert_eq!(SortOrder::Asc.toggle(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.toggle(), SortOrder::Asc);
        assert_eq!(SortOrder::Asc.toggle().toggle(), SortOrder::Asc);
    }

    #[test]
    fn listing_reports_the_next_order() {
        let listing = Listing::new(vec![1, 2], &Pagination::default(), SortOrder::Desc);
        assert_eq!(listing.order, SortOrder::Desc);
        assert_eq!(listing.toggle_order, SortOrder::Asc);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" techno "), "%techno%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(search_term(&Some("   ".into())), None);
        assert_eq!(search_term(&None), None);
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { page: Some(3), per_page: Some(500) };
        assert_eq!(p.limit(), MAX_PER_PAGE);
        assert_eq!(p.offset(), 200);

        let p = Pagination { page: Some(0), per_page: Some(0) };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn where_clause_joins_predicates_with_and() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM t");
        let mut filter = WhereClause::default();
        filter.and(&mut qb).push("a = ").push_bind(1_i32);
        filter.and(&mut qb).push("b = ").push_bind(2_i32);
        push_order_and_page(&mut qb, ByName, SortOrder::Desc, &Pagination::default());

        assert_eq!(
            qb.sql(),
            "SELECT * FROM t WHERE a = $1 AND b = $2 ORDER BY name DESC, id ASC LIMIT $3 OFFSET $4"
        );
    }
}
