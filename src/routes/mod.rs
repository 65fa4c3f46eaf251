pub mod assets;
pub mod posts;
pub mod session;
pub mod social;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Uploads are buffered in memory; photos need more than axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// The full dispatch table. Literal segments win over captures, so
/// `/users` or `/new` never reach the `/{handle}` profile route.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/assets/{*path}", get(assets::serve))
        .route("/image/{*path}", get(assets::serve_upload))
        .merge(posts::router())
        .merge(session::router())
        .merge(users::router())
        .merge(social::router())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
