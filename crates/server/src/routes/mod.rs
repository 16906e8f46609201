//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                           - Liveness
//! GET  /health/ready                     - Readiness (store ping)
//!
//! # Auth
//! POST   /api/auth/signup                - Salon signup (creates the salon)
//! POST   /api/auth/login                 - Password login
//! POST   /api/auth/logout                - End session
//! GET    /api/auth/session               - Current user or null
//!
//! # Account (any logged-in user)
//! PATCH  /api/user/profile               - Name, email, avatar
//! PATCH  /api/user/password              - Change password
//!
//! # Admin
//! GET    /api/salons                     - All salons
//! POST   /api/salons                     - Create salon
//! GET    /api/salons/{id}                - Salon detail
//! PATCH  /api/salons/{id}                - Update salon (incl. credits)
//! DELETE /api/salons/{id}                - Delete salon
//! GET    /api/salons/slug/{slug}         - By slug (admins, or own operators)
//!
//! # Salon self-service
//! GET    /api/salon                      - Own salon
//! POST   /api/salon/hairstyles           - Add style-library photo (multipart)
//! DELETE /api/salon/hairstyles/{id}      - Remove style-library photo
//! PATCH  /api/salon/settings             - Served audience
//!
//! # Images
//! POST   /api/images                     - Upload client photo (multipart)
//! GET    /api/images                     - Own images
//! GET    /api/images/{id}                - Image detail
//! DELETE /api/images/{id}                - Delete image
//!
//! # Generations
//! POST   /api/generations                - Prompt or style-reference preview
//! POST   /api/generations/style-transfer - Style transfer (hair salons)
//! GET    /api/generations                - History, newest first
//! GET    /api/generations/{id}           - One generation
//! ```

pub mod auth;
pub mod extract;
pub mod generations;
pub mod health;
pub mod images;
pub mod salon;
pub mod salons;
pub mod user;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::current_session))
}

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", patch(user::update_profile))
        .route("/password", patch(user::change_password))
}

/// Create the admin salon routes router.
pub fn salons_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(salons::index).post(salons::create))
        .route(
            "/{id}",
            get(salons::show)
                .patch(salons::update)
                .delete(salons::delete),
        )
        .route("/slug/{slug}", get(salons::show_by_slug))
}

/// Create the salon self-service routes router.
pub fn salon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(salon::show))
        .route(
            "/hairstyles",
            post(salon::add_hairstyle).layer(images::upload_body_limit()),
        )
        .route("/hairstyles/{id}", delete(salon::delete_hairstyle))
        .route("/settings", patch(salon::update_settings))
}

/// Create the image routes router.
pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(images::upload)
                .layer(images::upload_body_limit())
                .get(images::index),
        )
        .route("/{id}", get(images::show).delete(images::delete))
}

/// Create the generation routes router.
pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(generations::create).get(generations::index))
        .route("/style-transfer", post(generations::style_transfer))
        .route("/{id}", get(generations::show))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes())
        .nest("/api/user", user_routes())
        .nest("/api/salons", salons_routes())
        .nest("/api/salon", salon_routes())
        .nest("/api/images", image_routes())
        .nest("/api/generations", generation_routes())
}
