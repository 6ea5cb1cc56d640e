//! Idempotent creation of the todo database and collection
//!
//! Setup uses plain connections instead of the pool: the pool targets
//! `TODO_DB`, which may not exist yet.

use sqlx::{Connection, PgConnection};

use super::DbError;
use crate::config::{DbConfig, TODO_COLLECTION, TODO_DB};

/// SQLSTATE for `duplicate_database`
const DUPLICATE_DATABASE: &str = "42P04";

/// SQL function used by partial updates to merge a patch into a document
pub const DEEP_MERGE_FN: &str = "todos_deep_merge";

/// Recursive merge: objects on both sides merge key by key, anything else
/// takes the patch value. plpgsql so the self-reference resolves at call time.
const DEEP_MERGE_DDL: &str = r#"
CREATE OR REPLACE FUNCTION todos_deep_merge(base jsonb, patch jsonb)
RETURNS jsonb
LANGUAGE plpgsql IMMUTABLE
AS $$
BEGIN
    IF jsonb_typeof(base) = 'object' AND jsonb_typeof(patch) = 'object' THEN
        RETURN (
            SELECT COALESCE(
                jsonb_object_agg(
                    COALESCE(b.key, p.key),
                    CASE
                        WHEN b.value IS NULL THEN p.value
                        WHEN p.value IS NULL THEN b.value
                        ELSE todos_deep_merge(b.value, p.value)
                    END
                ),
                '{}'::jsonb
            )
            FROM jsonb_each(base) AS b
            FULL JOIN jsonb_each(patch) AS p ON b.key = p.key
        );
    END IF;
    RETURN patch;
END
$$
"#;

/// What a setup run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The database or the collection was missing and has been created
    Created,
    /// Both already existed; nothing changed
    AlreadyExists,
}

impl SetupOutcome {
    /// Message shown to the operator after setup
    pub fn message(self) -> &'static str {
        match self {
            Self::Created => "Database setup completed. Now run the app without --setup.",
            Self::AlreadyExists => "App database already exists. Run the app without --setup.",
        }
    }
}

/// Create `TODO_DB` and its `TODO_COLLECTION` table if absent.
///
/// Every connection opened here is closed again, whether or not the
/// statements on it succeeded.
pub async fn run(config: &DbConfig) -> crate::Result<SetupOutcome> {
    let mut conn = PgConnection::connect_with(&config.maintenance_options()).await?;
    let database = create_database(&mut conn).await;
    close(conn).await;
    let database_created = database?;

    let mut conn = PgConnection::connect_with(&config.connect_options()).await?;
    let collection = match create_collection(&mut conn).await {
        // Replaced on every run so existing databases pick it up too
        Ok(created) => create_merge_function(&mut conn).await.map(|()| created),
        Err(e) => Err(e),
    };
    close(conn).await;
    let collection_created = collection?;

    tracing::info!(
        database = TODO_DB,
        collection = TODO_COLLECTION,
        database_created,
        collection_created,
        "setup finished"
    );

    Ok(if database_created || collection_created {
        SetupOutcome::Created
    } else {
        SetupOutcome::AlreadyExists
    })
}

async fn create_database(conn: &mut PgConnection) -> Result<bool, DbError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(TODO_DB)
            .fetch_one(&mut *conn)
            .await?;
    if exists {
        return Ok(false);
    }

    // Identifiers cannot be bound; TODO_DB is a constant
    let statement = format!("CREATE DATABASE \"{TODO_DB}\"");
    match sqlx::query(&statement).execute(&mut *conn).await {
        Ok(_) => Ok(true),
        // Lost a race with a concurrent setup
        Err(e) if is_duplicate_database(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn create_collection(conn: &mut PgConnection) -> Result<bool, DbError> {
    let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
        .bind(TODO_COLLECTION)
        .fetch_one(&mut *conn)
        .await?;
    if exists {
        return Ok(false);
    }

    let statement = format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{TODO_COLLECTION}" (
            id TEXT PRIMARY KEY,
            doc JSONB NOT NULL DEFAULT '{{}}'::jsonb
        )
        "#
    );
    sqlx::query(&statement).execute(&mut *conn).await?;
    Ok(true)
}

async fn create_merge_function(conn: &mut PgConnection) -> Result<(), DbError> {
    sqlx::query(DEEP_MERGE_DDL).execute(&mut *conn).await?;
    Ok(())
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!("failed to close setup connection: {}", e);
    }
}

fn is_duplicate_database(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(DUPLICATE_DATABASE)
    )
}
