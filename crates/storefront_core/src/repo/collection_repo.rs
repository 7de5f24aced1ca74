//! Collection repository contracts and SQLite implementation.

use crate::model::collection::{Collection, CollectionId, NewCollection};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Row};

const COLLECTION_SELECT_SQL: &str = "SELECT id, title, featured_product_id FROM collections";

/// Repository interface for collections.
pub trait CollectionRepository {
    fn create_collection(&self, collection: &NewCollection) -> RepoResult<CollectionId>;
    /// Lists every collection sorted by title.
    fn list_collections(&self) -> RepoResult<Vec<Collection>>;
}

/// SQLite-backed collection repository.
pub struct SqliteCollectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollectionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CollectionRepository for SqliteCollectionRepository<'_> {
    fn create_collection(&self, collection: &NewCollection) -> RepoResult<CollectionId> {
        collection.validate()?;
        self.conn.execute(
            "INSERT INTO collections (title, featured_product_id) VALUES (?1, ?2);",
            params![collection.title.trim(), collection.featured_product_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_collections(&self) -> RepoResult<Vec<Collection>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COLLECTION_SELECT_SQL} ORDER BY title COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut collections = Vec::new();
        while let Some(row) = rows.next()? {
            collections.push(parse_collection_row(row)?);
        }
        Ok(collections)
    }
}

fn parse_collection_row(row: &Row<'_>) -> RepoResult<Collection> {
    let collection = Collection {
        id: row.get("id")?,
        title: row.get("title")?,
        featured_product_id: row.get("featured_product_id")?,
    };
    collection.validate()?;
    Ok(collection)
}
