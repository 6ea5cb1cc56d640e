//! Todo endpoints
//!
//! Each handler issues exactly one repository call on the request's own
//! connection. Missing ids are not errors: reads answer `null`, writes answer
//! a result with `skipped: 1`.

use std::sync::Arc;

use axum::{extract::Path, routing::get, Json, Router};

use crate::db::repos::TodoRepo;
use crate::http::error::ApiError;
use crate::http::extractors::DbConn;
use crate::http::server::AppState;
use crate::models::{strip_id, Created, Document, WriteResult};

/// GET /todos - list the whole collection
async fn list_todos(DbConn(mut conn): DbConn) -> Result<Json<Vec<Document>>, ApiError> {
    let todos = TodoRepo::new(&mut conn).list().await?;
    Ok(Json(todos))
}

/// POST /todos - insert a document, returning its generated id
async fn create_todo(
    DbConn(mut conn): DbConn,
    Json(doc): Json<Document>,
) -> Result<Json<Created>, ApiError> {
    let id = TodoRepo::new(&mut conn).insert(&strip_id(doc)).await?;
    Ok(Json(Created { id }))
}

/// GET /todos/{id} - fetch one document, `null` when absent
async fn get_todo(
    DbConn(mut conn): DbConn,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    let todo = TodoRepo::new(&mut conn).get(&id).await?;
    Ok(Json(todo))
}

/// PUT /todos/{id} - replace the whole document
async fn replace_todo(
    DbConn(mut conn): DbConn,
    Path(id): Path<String>,
    Json(doc): Json<Document>,
) -> Result<Json<WriteResult>, ApiError> {
    let result = TodoRepo::new(&mut conn).replace(&id, &strip_id(doc)).await?;
    Ok(Json(result))
}

/// PATCH /todos/{id} - merge fields into the document
async fn patch_todo(
    DbConn(mut conn): DbConn,
    Path(id): Path<String>,
    Json(patch): Json<Document>,
) -> Result<Json<WriteResult>, ApiError> {
    let result = TodoRepo::new(&mut conn).update(&id, &strip_id(patch)).await?;
    Ok(Json(result))
}

/// DELETE /todos/{id} - remove the document
async fn delete_todo(
    DbConn(mut conn): DbConn,
    Path(id): Path<String>,
) -> Result<Json<WriteResult>, ApiError> {
    let result = TodoRepo::new(&mut conn).delete(&id).await?;
    Ok(Json(result))
}

/// Todo routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(replace_todo)
                .patch(patch_todo)
                .delete(delete_todo),
        )
}
