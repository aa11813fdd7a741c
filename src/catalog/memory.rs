//! # In-Memory Catalog Store
//!
//! Evaluates compiled predicates directly against rows held in memory.
//! Mirrors the relational backend's semantics (LEFT JOIN on category,
//! first image by id, LIKE wildcards, stable id tiebreak) so listings
//! behave the same without a database.
//!
//! Name ordering compares case-folded names first, approximating a
//! linguistic database collation; it is not a full ICU/glibc collation,
//! so accents and punctuation may order differently than in PostgreSQL.

use std::cmp::Ordering;
use std::sync::RwLock;

use async_trait::async_trait;

use super::errors::{CatalogError, CatalogResult};
use super::model::{CatalogItem, Category, NewProduct};
use super::plan::{Direction, Predicate, QueryPlan, SortColumn};
use super::store::CatalogStore;

#[derive(Debug, Clone)]
struct ProductRow {
    id: i64,
    product: NewProduct,
}

#[derive(Debug, Clone)]
struct ImageRow {
    id: i64,
    product_id: i64,
    url: String,
}

#[derive(Debug, Default)]
struct Tables {
    products: Vec<ProductRow>,
    categories: Vec<Category>,
    images: Vec<ImageRow>,
    next_product_id: i64,
    next_category_id: i64,
    next_image_id: i64,
}

impl Tables {
    fn category_name(&self, id: Option<i64>) -> Option<&str> {
        let id = id?;
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    fn primary_image(&self, product_id: i64) -> Option<&str> {
        self.images
            .iter()
            .filter(|i| i.product_id == product_id)
            .min_by_key(|i| i.id)
            .map(|i| i.url.as_str())
    }

    fn matches(&self, row: &ProductRow, predicate: &Predicate) -> bool {
        let p = &row.product;
        match predicate {
            Predicate::Search { pattern } => {
                like_match(&p.name.to_lowercase(), pattern)
                    || like_match(&p.description.to_lowercase(), pattern)
            }
            Predicate::CategoryId(id) => p.category_key() == Some(*id),
            Predicate::CategoryName(name) => self
                .category_name(p.category_key())
                .is_some_and(|c| c.to_lowercase() == *name),
            Predicate::MinPrice(min) => p.price >= *min,
            Predicate::MaxPrice(max) => p.price <= *max,
            Predicate::InStock => p.available,
        }
    }

    fn filtered(&self, plan: &QueryPlan) -> Vec<&ProductRow> {
        self.products
            .iter()
            .filter(|row| plan.predicates.iter().all(|pred| self.matches(row, pred)))
            .collect()
    }

    fn to_item(&self, row: &ProductRow) -> CatalogItem {
        row.product.to_item(
            row.id,
            self.category_name(row.product.category_key())
                .unwrap_or_default()
                .to_string(),
            self.primary_image(row.id).unwrap_or_default().to_string(),
        )
    }
}

/// Catalog store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CatalogResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| CatalogError::retrieval("catalog lock poisoned"))
    }

    fn write(&self) -> CatalogResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| CatalogError::retrieval("catalog lock poisoned"))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn count(&self, plan: &QueryPlan) -> CatalogResult<i64> {
        let tables = self.read()?;
        Ok(tables.filtered(plan).len() as i64)
    }

    async fn fetch_page(&self, plan: &QueryPlan) -> CatalogResult<Vec<CatalogItem>> {
        let tables = self.read()?;
        let mut rows = tables.filtered(plan);

        rows.sort_by(|a, b| {
            let primary = match plan.order.column {
                SortColumn::Price => a
                    .product
                    .price
                    .partial_cmp(&b.product.price)
                    .unwrap_or(Ordering::Equal),
                SortColumn::Name => name_order(&a.product.name, &b.product.name),
            };
            let primary = match plan.order.direction {
                Direction::Asc => primary,
                Direction::Desc => primary.reverse(),
            };
            primary.then(a.id.cmp(&b.id))
        });

        let offset = usize::try_from(plan.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(plan.limit).unwrap_or(0);

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| tables.to_item(row))
            .collect())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let tables = self.read()?;
        let mut categories = tables.categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn category_name(&self, id: i64) -> CatalogResult<Option<String>> {
        let tables = self.read()?;
        Ok(tables.category_name(Some(id)).map(str::to_string))
    }

    async fn create_category(&self, name: &str) -> CatalogResult<i64> {
        let mut tables = self.write()?;
        tables.next_category_id += 1;
        let id = tables.next_category_id;
        tables.categories.push(Category {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn delete_category(&self, id: i64) -> CatalogResult<()> {
        let mut tables = self.write()?;
        tables.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn create_product(&self, product: &NewProduct) -> CatalogResult<i64> {
        let mut tables = self.write()?;
        tables.next_product_id += 1;
        let id = tables.next_product_id;
        tables.products.push(ProductRow {
            id,
            product: product.clone(),
        });
        Ok(id)
    }

    async fn update_product(&self, id: i64, product: &NewProduct) -> CatalogResult<()> {
        let mut tables = self.write()?;
        let row = tables
            .products
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(CatalogError::NotFound)?;
        row.product = product.clone();
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> CatalogResult<()> {
        let mut tables = self.write()?;
        tables.products.retain(|row| row.id != id);
        tables.images.retain(|img| img.product_id != id);
        Ok(())
    }

    async fn attach_image(&self, product_id: i64, url: &str) -> CatalogResult<()> {
        let mut tables = self.write()?;
        if tables
            .images
            .iter()
            .any(|img| img.product_id == product_id && img.url == url)
        {
            return Ok(());
        }
        tables.next_image_id += 1;
        let id = tables.next_image_id;
        tables.images.push(ImageRow {
            id,
            product_id,
            url: url.to_string(),
        });
        Ok(())
    }
}

/// Case-insensitive first, raw bytes to break ties
fn name_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// SQL LIKE matching: `%` is any sequence, `_` any single character
fn like_match(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut v, mut p) = (0, 0);
    // Position of the last `%` seen and the value index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while v < value.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, v));
                p += 1;
            }
            Some('_') => {
                p += 1;
                v += 1;
            }
            Some(c) if *c == value[v] => {
                p += 1;
                v += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    v = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
