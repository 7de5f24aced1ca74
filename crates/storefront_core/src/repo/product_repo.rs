//! Product repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Price edits refresh `last_update`; bulk inventory updates do not.
//! - Bulk writes touch only the ids they are given.

use crate::model::money::Money;
use crate::model::product::{NewProduct, Product, ProductId};
use crate::repo::{id_values, now_epoch_ms, placeholders, to_u32, RepoError, RepoResult};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

/// Bound parameters per bulk statement, well under SQLite's variable limit.
pub(crate) const IDS_PER_STATEMENT: usize = 500;

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    title,
    slug,
    description,
    unit_price,
    inventory,
    last_update,
    collection_id
FROM products";

/// Repository interface for products.
pub trait ProductRepository {
    fn create_product(&self, product: &NewProduct) -> RepoResult<ProductId>;
    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    /// Sets one product's price; used by list-editable saves.
    fn set_unit_price(&self, id: ProductId, unit_price: Money) -> RepoResult<()>;
    /// Sets `inventory = 0` for every given id in one transaction.
    ///
    /// Returns the number of rows updated.
    fn clear_inventory(&self, ids: &[ProductId]) -> RepoResult<usize>;
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create_product(&self, product: &NewProduct) -> RepoResult<ProductId> {
        product.validate()?;

        self.conn.execute(
            "INSERT INTO products (
                title,
                slug,
                description,
                unit_price,
                inventory,
                last_update,
                collection_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                product.title.trim(),
                product.effective_slug(),
                product.description.as_deref(),
                product.unit_price.cents(),
                i64::from(product.inventory),
                now_epoch_ms(),
                product.collection_id,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let product = self
            .conn
            .query_row(&format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"), [id], |row| {
                Ok(parse_product_row(row, ""))
            })
            .optional()?;
        product.transpose()
    }

    fn set_unit_price(&self, id: ProductId, unit_price: Money) -> RepoResult<()> {
        crate::model::require_min("product", "unit_price", unit_price.cents(), 0)?;
        let changed = self.conn.execute(
            "UPDATE products
             SET unit_price = ?1, last_update = ?2
             WHERE id = ?3;",
            params![unit_price.cents(), now_epoch_ms(), id],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn clear_inventory(&self, ids: &[ProductId]) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        for chunk in ids.chunks(IDS_PER_STATEMENT) {
            let sql = format!(
                "UPDATE products SET inventory = 0 WHERE id IN ({});",
                placeholders(chunk.len())
            );
            changed += tx.execute(&sql, params_from_iter(id_values(chunk)))?;
        }
        tx.commit()?;
        Ok(changed)
    }
}

/// Parses product columns named `{prefix}id`, `{prefix}title`, ...
pub(crate) fn parse_product_row(row: &Row<'_>, prefix: &str) -> RepoResult<Product> {
    let column = |name: &str| format!("{prefix}{name}");
    let inventory: i64 = row.get(column("inventory").as_str())?;
    let product = Product {
        id: row.get(column("id").as_str())?,
        title: row.get(column("title").as_str())?,
        slug: row.get(column("slug").as_str())?,
        description: row.get(column("description").as_str())?,
        unit_price: Money::from_cents(row.get(column("unit_price").as_str())?),
        inventory: to_u32("products.inventory", inventory)?,
        last_update: row.get(column("last_update").as_str())?,
        collection_id: row.get(column("collection_id").as_str())?,
    };
    product.validate()?;
    Ok(product)
}

fn not_found(id: ProductId) -> RepoError {
    RepoError::NotFound {
        model: "product",
        id,
    }
}
