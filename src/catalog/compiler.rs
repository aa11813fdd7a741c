//! # Filter Compiler
//!
//! Turns a [`FilterRequest`] into a [`QueryPlan`]. Pure: no I/O and no
//! error path.
//!
//! Emission order is fixed: search, category (id wins over name), min
//! price, max price, in-stock. Placeholder ordinals follow that order.

use super::plan::{Direction, OrderBy, Predicate, QueryPlan, SortColumn};
use super::request::{FilterRequest, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Compile a filter request into an executable plan
pub fn compile(req: &FilterRequest) -> QueryPlan {
    let mut predicates = Vec::new();

    if let Some(search) = present(req.search.as_deref()) {
        predicates.push(Predicate::Search {
            pattern: format!("%{}%", search.to_lowercase()),
        });
    }

    match (
        req.category_id.filter(|id| *id > 0),
        present(req.category_name.as_deref()),
    ) {
        (Some(id), _) => predicates.push(Predicate::CategoryId(id)),
        (None, Some(name)) => predicates.push(Predicate::CategoryName(name.to_lowercase())),
        (None, None) => {}
    }

    if let Some(min) = req.min_price.filter(|p| valid_price(*p)) {
        predicates.push(Predicate::MinPrice(min));
    }
    if let Some(max) = req.max_price.filter(|p| valid_price(*p)) {
        predicates.push(Predicate::MaxPrice(max));
    }

    if req.in_stock {
        predicates.push(Predicate::InStock);
    }

    let page = req.page.filter(|p| *p >= 1).unwrap_or(1);
    let page_size = req
        .page_size
        .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
        .unwrap_or(DEFAULT_PAGE_SIZE);

    QueryPlan {
        predicates,
        order: resolve_order(SortOrder::resolve(req.sort.as_deref())),
        limit: page_size,
        offset: (page - 1).saturating_mul(page_size),
        page,
    }
}

/// Fixed sort whitelist; the only source of ORDER BY columns
pub fn resolve_order(sort: SortOrder) -> OrderBy {
    let (column, direction) = match sort {
        SortOrder::PriceAsc => (SortColumn::Price, Direction::Asc),
        SortOrder::PriceDesc => (SortColumn::Price, Direction::Desc),
        SortOrder::NameAsc => (SortColumn::Name, Direction::Asc),
        SortOrder::NameDesc => (SortColumn::Name, Direction::Desc),
    };
    OrderBy { column, direction }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}
