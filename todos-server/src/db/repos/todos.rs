//! Todo repository
//!
//! Documents live in `todos (id TEXT PRIMARY KEY, doc JSONB)`. The stored body
//! never contains `id`; reads merge it back in from the key column.

use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use super::DbError;
use crate::config::TODO_COLLECTION;
use crate::db::setup::DEEP_MERGE_FN;
use crate::models::{Document, WriteResult};

/// Todo repository bound to one connection
pub struct TodoRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> TodoRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Fetch the whole collection.
    pub async fn list(&mut self) -> Result<Vec<Document>, DbError> {
        let sql = format!(
            r#"
            SELECT doc || jsonb_build_object('id', id) AS doc
            FROM "{TODO_COLLECTION}"
            ORDER BY id
            "#
        );
        let rows: Vec<Json<Document>> = sqlx::query_scalar(&sql)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    /// Insert a document under a freshly generated id, returning the id.
    ///
    /// `doc` must already be stripped of any `id` key.
    pub async fn insert(&mut self, doc: &Document) -> Result<String, DbError> {
        let id = Uuid::new_v4().to_string();
        let sql = format!(r#"INSERT INTO "{TODO_COLLECTION}" (id, doc) VALUES ($1, $2)"#);

        sqlx::query(&sql)
            .bind(&id)
            .bind(Json(doc))
            .execute(&mut *self.conn)
            .await?;

        tracing::debug!(%id, "todo inserted");
        Ok(id)
    }

    /// Fetch one document; `None` when the id is absent.
    pub async fn get(&mut self, id: &str) -> Result<Option<Document>, DbError> {
        let sql = format!(
            r#"
            SELECT doc || jsonb_build_object('id', id) AS doc
            FROM "{TODO_COLLECTION}"
            WHERE id = $1
            "#
        );
        let row: Option<Json<Document>> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(row.map(|Json(doc)| doc))
    }

    /// Overwrite the whole document body.
    ///
    /// Single statement: the CTE locks the target row, the UPDATE only fires
    /// when the body actually differs, and the outer SELECT reports both counts.
    pub async fn replace(&mut self, id: &str, doc: &Document) -> Result<WriteResult, DbError> {
        let sql = format!(
            r#"
            WITH target AS (
                SELECT id, doc FROM "{TODO_COLLECTION}" WHERE id = $1 FOR UPDATE
            ),
            changed AS (
                UPDATE "{TODO_COLLECTION}" t SET doc = $2::jsonb
                FROM target
                WHERE t.id = target.id AND target.doc IS DISTINCT FROM $2::jsonb
                RETURNING t.id
            )
            SELECT
                (SELECT COUNT(*) FROM target) AS matched,
                (SELECT COUNT(*) FROM changed) AS changed
            "#
        );
        let (matched, changed): (i64, i64) = sqlx::query_as(&sql)
            .bind(id)
            .bind(Json(doc))
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(WriteResult::from_modify(matched, changed))
    }

    /// Merge `patch` into the stored document.
    ///
    /// Objects present on both sides are merged key by key at every depth;
    /// any other value in `patch` overwrites. Keys `patch` does not mention,
    /// nested ones included, are kept.
    pub async fn update(&mut self, id: &str, patch: &Document) -> Result<WriteResult, DbError> {
        let sql = format!(
            r#"
            WITH target AS (
                SELECT id, doc, {DEEP_MERGE_FN}(doc, $2::jsonb) AS merged
                FROM "{TODO_COLLECTION}" WHERE id = $1 FOR UPDATE
            ),
            changed AS (
                UPDATE "{TODO_COLLECTION}" t SET doc = target.merged
                FROM target
                WHERE t.id = target.id AND target.doc IS DISTINCT FROM target.merged
                RETURNING t.id
            )
            SELECT
                (SELECT COUNT(*) FROM target) AS matched,
                (SELECT COUNT(*) FROM changed) AS changed
            "#
        );
        let (matched, changed): (i64, i64) = sqlx::query_as(&sql)
            .bind(id)
            .bind(Json(patch))
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(WriteResult::from_modify(matched, changed))
    }

    /// Remove a document.
    pub async fn delete(&mut self, id: &str) -> Result<WriteResult, DbError> {
        let sql = format!(r#"DELETE FROM "{TODO_COLLECTION}" WHERE id = $1"#);
        let deleted = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *self.conn)
            .await?
            .rows_affected();

        Ok(if deleted == 0 {
            WriteResult::skipped()
        } else {
            WriteResult::deleted()
        })
    }
}
