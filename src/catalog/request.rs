//! # Filter Request
//!
//! Client-supplied listing parameters, parsed leniently.
//!
//! A malformed optional value (an unparsable number, a negative price, a
//! non-positive category id) is treated as "filter absent". One bad filter
//! never fails the whole listing.

use std::collections::HashMap;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: i64 = 24;

/// Largest accepted page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Accepted sort orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    /// Resolve a raw sort value; anything unrecognized is `PriceAsc`
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("price_asc") => SortOrder::PriceAsc,
            Some("price_desc") => SortOrder::PriceDesc,
            Some("name_asc") => SortOrder::NameAsc,
            Some("name_desc") => SortOrder::NameDesc,
            _ => SortOrder::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
        }
    }
}

/// Input to the filter compiler
///
/// `sort`, `page` and `page_size` are kept as received; the compiler owns
/// their resolution so that every construction path gets the same whitelist
/// and clamping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: bool,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl FilterRequest {
    /// Parse the query-string parameters of a listing request
    ///
    /// Recognized keys: `search`, `category`, `category_id`, `min_price`,
    /// `max_price`, `in_stock`, `sort`, `page`, `page_size`. Unknown keys are
    /// ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        FilterRequest {
            search: get("search").map(str::to_string),
            category_id: get("category_id").and_then(parse_category_id),
            category_name: get("category").map(str::to_string),
            min_price: get("min_price").and_then(parse_price),
            max_price: get("max_price").and_then(parse_price),
            in_stock: get("in_stock").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            sort: get("sort").map(str::to_string),
            page: get("page").and_then(|v| v.parse().ok()),
            page_size: get("page_size").and_then(|v| v.parse().ok()),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category_id(mut self, id: i64) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn with_category_name(mut self, name: impl Into<String>) -> Self {
        self.category_name = Some(name.into());
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn in_stock_only(mut self) -> Self {
        self.in_stock = true;
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_page(mut self, page: i64, page_size: i64) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }
}

/// Category keys are positive integers
pub(crate) fn parse_category_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Prices are finite and non-negative
pub(crate) fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}
