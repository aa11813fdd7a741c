//! # Query Plan
//!
//! Typed predicate fragments, the resolved ordering, and pagination bounds.
//!
//! A fragment is a closed enum variant: its SQL text is a fixed string with
//! positional placeholders, and every user-derived value travels only as a
//! [`BoundValue`]. There is no constructor that accepts SQL text, so a
//! literal can never be interpolated into a statement.
//!
//! The count and page statements are both rendered from the same
//! [`QueryPlan::filter_clause`], so they always filter identically; the page
//! statement only appends ORDER BY and the two trailing LIMIT/OFFSET
//! parameters.

use std::fmt;

/// Joined relation every catalog statement reads from
pub const CATALOG_FROM: &str =
    "FROM products p LEFT JOIN categories c ON c.id = p.category_id";

/// Columns of a catalog page, in `CatalogItem` order
pub const CATALOG_PROJECTION: &str = "SELECT \
CAST(p.id AS BIGINT) AS id, \
p.available AS available, \
p.name AS name, \
COALESCE(p.description, '') AS description, \
CAST(p.price AS DOUBLE PRECISION) AS price, \
CAST(COALESCE(p.category_id, 0) AS BIGINT) AS category_id, \
COALESCE(c.name, '') AS category, \
COALESCE((SELECT pi.image_url FROM product_images pi WHERE pi.product_id = p.id ORDER BY pi.id LIMIT 1), '') AS url, \
NULLIF(p.buy_url, '') AS buy_url";

/// A value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::Text(s) => write!(f, "{:?}", s),
            BoundValue::Int(i) => write!(f, "{}", i),
            BoundValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// One WHERE clause paired with its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring match on name OR description.
    /// `pattern` is already lower-cased and wrapped in `%…%`; it is bound
    /// twice, once per column.
    Search { pattern: String },

    /// Exact match on the numeric category key
    CategoryId(i64),

    /// Case-insensitive exact match on the joined category name.
    /// `name` is already lower-cased.
    CategoryName(String),

    /// Inclusive lower price bound
    MinPrice(f64),

    /// Inclusive upper price bound
    MaxPrice(f64),

    /// Available products only; carries no parameter
    InStock,
}

impl Predicate {
    /// Render this fragment, claiming placeholder ordinals from `next`
    fn render(&self, next: &mut Placeholders) -> String {
        match self {
            Predicate::Search { .. } => {
                let name = next.claim();
                let description = next.claim();
                format!(
                    "(LOWER(p.name) LIKE {} OR LOWER(p.description) LIKE {})",
                    name, description
                )
            }
            Predicate::CategoryId(_) => format!("p.category_id = {}", next.claim()),
            Predicate::CategoryName(_) => format!("LOWER(c.name) = {}", next.claim()),
            Predicate::MinPrice(_) => format!("p.price >= {}", next.claim()),
            Predicate::MaxPrice(_) => format!("p.price <= {}", next.claim()),
            Predicate::InStock => "p.available = TRUE".to_string(),
        }
    }

    /// Parameters in the order this fragment's placeholders appear
    pub fn params(&self) -> Vec<BoundValue> {
        match self {
            Predicate::Search { pattern } => vec![
                BoundValue::Text(pattern.clone()),
                BoundValue::Text(pattern.clone()),
            ],
            Predicate::CategoryId(id) => vec![BoundValue::Int(*id)],
            Predicate::CategoryName(name) => vec![BoundValue::Text(name.clone())],
            Predicate::MinPrice(price) | Predicate::MaxPrice(price) => {
                vec![BoundValue::Float(*price)]
            }
            Predicate::InStock => Vec::new(),
        }
    }
}

/// Sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Price,
    Name,
}

impl SortColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::Price => "p.price",
            SortColumn::Name => "p.name",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Resolved ORDER BY
///
/// `p.id ASC` is always appended as a tiebreaker so that page boundaries
/// are stable when several rows share a price or a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: SortColumn,
    pub direction: Direction,
}

impl OrderBy {
    pub fn to_sql(&self) -> String {
        format!(
            "ORDER BY {} {}, p.id ASC",
            self.column.as_sql(),
            self.direction.as_sql()
        )
    }
}

/// A rendered statement ready for a positional-parameter driver
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<BoundValue>,
}

/// Compiled listing query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub order: OrderBy,
    pub limit: i64,
    pub offset: i64,
    /// 1-based page the offset was derived from
    pub page: i64,
}

impl QueryPlan {
    /// WHERE clause and its parameters, shared by count and page statements
    pub fn filter_clause(&self) -> (String, Vec<BoundValue>) {
        let mut next = Placeholders::default();
        let mut clauses = Vec::with_capacity(self.predicates.len());
        let mut params = Vec::new();

        for predicate in &self.predicates {
            clauses.push(predicate.render(&mut next));
            params.extend(predicate.params());
        }

        debug_assert_eq!(next.claimed(), params.len());

        if clauses.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), params)
        }
    }

    /// `SELECT COUNT(*)` over the filtered set
    pub fn count_statement(&self) -> Statement {
        let (filter, params) = self.filter_clause();
        Statement {
            sql: format!("SELECT COUNT(*) {}{}", CATALOG_FROM, filter),
            params,
        }
    }

    /// Page selection; LIMIT and OFFSET are the final two parameters
    pub fn page_statement(&self) -> Statement {
        let (filter, mut params) = self.filter_clause();
        let limit = params.len() + 1;
        let offset = params.len() + 2;
        params.push(BoundValue::Int(self.limit));
        params.push(BoundValue::Int(self.offset));

        Statement {
            sql: format!(
                "{} {}{} {} LIMIT ${} OFFSET ${}",
                CATALOG_PROJECTION,
                CATALOG_FROM,
                filter,
                self.order.to_sql(),
                limit,
                offset
            ),
            params,
        }
    }
}

/// Hands out `$1`, `$2`, … in emission order
#[derive(Debug, Default)]
struct Placeholders {
    count: usize,
}

impl Placeholders {
    fn claim(&mut self) -> String {
        self.count += 1;
        format!("${}", self.count)
    }

    fn claimed(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(predicates: Vec<Predicate>) -> QueryPlan {
        QueryPlan {
            predicates,
            order: OrderBy {
                column: SortColumn::Price,
                direction: Direction::Asc,
            },
            limit: 24,
            offset: 0,
            page: 1,
        }
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        let count = plan(vec![]).count_statement();
        assert_eq!(
            count.sql,
            "SELECT COUNT(*) FROM products p LEFT JOIN categories c ON c.id = p.category_id"
        );
        assert!(count.params.is_empty());
    }

    #[test]
    fn test_placeholders_follow_emission_order() {
        let p = plan(vec![
            Predicate::Search {
                pattern: "%tea%".to_string(),
            },
            Predicate::CategoryId(4),
            Predicate::InStock,
            Predicate::MaxPrice(20.0),
        ]);
        let (clause, params) = p.filter_clause();

        assert_eq!(
            clause,
            " WHERE (LOWER(p.name) LIKE $1 OR LOWER(p.description) LIKE $2) \
AND p.category_id = $3 AND p.available = TRUE AND p.price <= $4"
        );
        assert_eq!(
            params,
            vec![
                BoundValue::Text("%tea%".into()),
                BoundValue::Text("%tea%".into()),
                BoundValue::Int(4),
                BoundValue::Float(20.0),
            ]
        );
    }

    #[test]
    fn test_page_statement_appends_limit_offset_last() {
        let mut p = plan(vec![Predicate::MinPrice(5.0), Predicate::MaxPrice(9.0)]);
        p.limit = 10;
        p.offset = 30;
        let page = p.page_statement();

        assert!(page.sql.ends_with("ORDER BY p.price ASC, p.id ASC LIMIT $3 OFFSET $4"));
        assert_eq!(&page.params[2..], &[BoundValue::Int(10), BoundValue::Int(30)]);
    }

    #[test]
    fn test_count_and_page_share_filter() {
        let p = plan(vec![
            Predicate::CategoryName("tea".into()),
            Predicate::MinPrice(1.5),
        ]);
        let count = p.count_statement();
        let page = p.page_statement();
        let (clause, params) = p.filter_clause();

        assert!(count.sql.ends_with(&clause));
        assert!(page.sql.contains(&format!("{} ORDER BY", clause)));
        assert_eq!(count.params, params);
        assert_eq!(&page.params[..params.len()], params.as_slice());
        assert_eq!(page.params.len(), params.len() + 2);
    }

    #[test]
    fn test_order_by_rendering() {
        let order = OrderBy {
            column: SortColumn::Name,
            direction: Direction::Desc,
        };
        assert_eq!(order.to_sql(), "ORDER BY p.name DESC, p.id ASC");
    }
}
