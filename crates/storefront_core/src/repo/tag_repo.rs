//! Tag repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Tag labels are unique; `ensure_tag` reuses an existing label
//!   case-insensitively.
//! - A record carries a given tag at most once.

use crate::model::tag::{normalize_label, Tag, TagId, TaggedItem};
use crate::model::ModelValidationError;
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for tags and tagged-item links.
pub trait TagRepository {
    /// Returns the id of the tag with `label`, creating it when absent.
    fn ensure_tag(&self, label: &str) -> RepoResult<TagId>;
    /// Attaches a tag to `(content_type, object_id)`; repeated calls are no-ops.
    fn tag_object(&self, tag_id: TagId, content_type: &str, object_id: i64) -> RepoResult<()>;
    fn untag_object(&self, tag_id: TagId, content_type: &str, object_id: i64)
        -> RepoResult<bool>;
    /// Lists tags attached to one record, sorted by label.
    fn tags_for_object(&self, content_type: &str, object_id: i64)
        -> RepoResult<Vec<TaggedItem>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn ensure_tag(&self, label: &str) -> RepoResult<TagId> {
        let label = normalize_label(label).ok_or(ModelValidationError::BlankField {
            model: "tag",
            field: "label",
        })?;

        let existing: Option<TagId> = self
            .conn
            .query_row(
                "SELECT id FROM tags WHERE label = ?1 COLLATE NOCASE;",
                [label.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn
            .execute("INSERT INTO tags (label) VALUES (?1);", [label.as_str()])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn tag_object(&self, tag_id: TagId, content_type: &str, object_id: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO tagged_items (tag_id, content_type, object_id)
             VALUES (?1, ?2, ?3);",
            params![tag_id, content_type, object_id],
        )?;
        Ok(())
    }

    fn untag_object(
        &self,
        tag_id: TagId,
        content_type: &str,
        object_id: i64,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM tagged_items
             WHERE tag_id = ?1 AND content_type = ?2 AND object_id = ?3;",
            params![tag_id, content_type, object_id],
        )?;
        Ok(changed > 0)
    }

    fn tags_for_object(
        &self,
        content_type: &str,
        object_id: i64,
    ) -> RepoResult<Vec<TaggedItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                ti.id AS id,
                ti.content_type AS content_type,
                ti.object_id AS object_id,
                t.id AS tag_id,
                t.label AS tag_label
             FROM tagged_items ti
             INNER JOIN tags t ON t.id = ti.tag_id
             WHERE ti.content_type = ?1
               AND ti.object_id = ?2
             ORDER BY t.label COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query(params![content_type, object_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_tagged_item_row(row)?);
        }
        Ok(items)
    }
}

fn parse_tagged_item_row(row: &Row<'_>) -> RepoResult<TaggedItem> {
    let tag = Tag {
        id: row.get("tag_id")?,
        label: row.get("tag_label")?,
    };
    tag.validate()?;
    Ok(TaggedItem {
        id: row.get("id")?,
        tag,
        content_type: row.get("content_type")?,
        object_id: row.get("object_id")?,
    })
}
