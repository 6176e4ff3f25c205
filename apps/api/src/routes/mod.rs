pub mod account;
pub mod health;
pub mod templates;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::auth::handlers as auth;
use crate::generation::handlers as generation;
use crate::previews::{handlers as previews, PREVIEW_MAX_BODY_BYTES, PUBLIC_PREFIX};
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let preview_files = ServeDir::new(state.previews.dir());

    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/auth/signup", post(auth::handle_signup))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/logout", post(auth::handle_logout))
        .route("/me", get(account::handle_me))
        .route(
            "/settings",
            get(account::handle_get_settings).post(account::handle_update_settings),
        )
        .route("/templates", get(templates::handle_list_templates))
        // Resumes
        .route(
            "/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route(
            "/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_replace_resume)
                .patch(resumes::handle_patch_template)
                .delete(resumes::handle_delete_resume),
        )
        // Preview cache
        .route("/preview-check", get(previews::handle_preview_check))
        .route("/preview-delete", delete(previews::handle_preview_delete))
        .route(
            "/preview-save",
            post(previews::handle_preview_save)
                .layer(DefaultBodyLimit::max(PREVIEW_MAX_BODY_BYTES)),
        )
        .nest_service(PUBLIC_PREFIX, preview_files)
        // AI drafting
        .route(
            "/generate-resume-content",
            post(generation::handle_generate_content),
        )
        .route("/generate-resume", post(generation::handle_generate_sample))
        .with_state(state)
}
