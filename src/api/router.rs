//! Doctors HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Stored avatar images are served as static files under `/Upload/`.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::{AppConfig, MAX_AVATAR_BYTES};

/// Room for the text fields and multipart framing around the largest avatar.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the doctors router for `config`.
pub fn doctors_router(config: &AppConfig) -> Router {
    build_router(ApiContext::new(config))
}

/// Build router from a pre-constructed `ApiContext`.
pub fn build_router(ctx: ApiContext) -> Router {
    let uploads = ServeDir::new(ctx.avatars.root().join("Upload"));

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let doctors = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/doctors", get(endpoints::doctors::list))
        .route(
            "/doctors/create",
            get(endpoints::doctors::create_form).post(endpoints::doctors::create),
        )
        .route("/doctors/:id", get(endpoints::doctors::details))
        .route(
            "/doctors/edit/:id",
            get(endpoints::doctors::edit_form).post(endpoints::doctors::edit),
        )
        .route(
            "/doctors/delete/:id",
            get(endpoints::doctors::delete_confirm).post(endpoints::doctors::delete),
        )
        .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + FORM_OVERHEAD_BYTES))
        .with_state(ctx);

    Router::new()
        .merge(doctors)
        .nest_service("/Upload", uploads)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}
