// Library exports for the service binary, the console client and tests
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Extension, Router,
};

use config::Config;
use middleware::auth::OperatorToken;
use services::{announcements::AnnouncementService, changes::ChangeFeed};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub announcements: Arc<AnnouncementService>,
    pub changes: ChangeFeed,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        let changes = ChangeFeed::new();
        Self {
            config,
            announcements: Arc::new(AnnouncementService::new(changes.clone())),
            changes,
        }
    }
}

/// Build the service router: REST surface plus the change channel.
pub fn router(state: &AppState) -> Router {
    let token = OperatorToken(state.config.operator_token.clone());

    Router::new()
        .route("/health", get(routes::health::health_check))
        // Announcements
        .route(
            "/announcements",
            get(routes::announcements::list_announcements)
                .post(routes::announcements::create_announcement),
        )
        .route(
            "/announcements/{id}",
            delete(routes::announcements::delete_announcement),
        )
        // Change-notification channel
        .route("/announcements/ws", get(routes::websocket::ws_handler))
        .layer(Extension(token))
        .with_state(state.clone())
}
