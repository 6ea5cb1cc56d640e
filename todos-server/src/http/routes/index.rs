//! Index page

use axum::{response::Html, routing::get, Router};

const INDEX_HTML: &str = include_str!("../../../templates/todo.html");

/// GET /
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Index routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(index))
}
