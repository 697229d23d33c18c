//! Router assembly: auth, users, uploads, generic entity CRUD, liveness.
//!
//! Static segments (/auth, /users, /upload, /images) take precedence over
//! the generic /:path_segment entity routes.

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, entity, media, users};
use crate::state::AppState;

async fn root() -> &'static str {
    "civicms is running"
}

/// Parse the configured origin; None means the layer falls back to
/// permissive, which is only acceptable in development.
fn parse_allowed_origin(allowed_origin: Option<&str>) -> Option<HeaderValue> {
    allowed_origin.and_then(|o| o.parse::<HeaderValue>().ok())
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);
    match parse_allowed_origin(allowed_origin) {
        Some(origin) => layer.allow_origin(origin),
        None => {
            tracing::warn!(
                configured = ?allowed_origin,
                "CORS_ORIGIN unset or invalid; allowing any origin"
            );
            layer.allow_origin(Any)
        }
    }
}

pub fn build_router(state: AppState, allowed_origin: Option<&str>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/auth/login", post(auth::login))
        .route("/auth/change-password", post(auth::change_password))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id", delete(users::delete_user))
        .route("/upload", post(media::upload))
        .route("/images/", get(media::serve_missing_name))
        .route("/images/:filename", get(media::serve))
        .route("/:path_segment", get(entity::list).post(entity::create))
        .route(
            "/:path_segment/:id",
            get(entity::read).put(entity::update).delete(entity::delete),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origin))
        .with_state(state)
}
