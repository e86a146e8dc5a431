pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod views;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{session_middleware, AuthService, MemorySessionStore, TokenIssuer};
pub use db::{DbOperations, MemoryUserStore, User, UserStore};
pub use views::{JsonRenderer, Renderer};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Registers every route on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use auth::handlers::{login, login_form, logout, sign_up, sign_up_form};

    cfg.route("/health", web::get().to(health_check))
        .route("/signup", web::get().to(sign_up_form))
        .route("/signup", web::post().to(sign_up))
        .route("/login", web::get().to(login_form))
        .route("/login", web::post().to(login))
        .route("/logout", web::post().to(logout));
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_service: Arc<AuthService>,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    /// Connects to Postgres when `database.url` is set, otherwise keeps users in memory.
    pub async fn new(config: Settings) -> Result<Self> {
        let users: Arc<dyn UserStore> = match &config.database.url {
            Some(url) => {
                let db = DbOperations::new_with_options(
                    url,
                    config.database.max_connections,
                    Duration::from_secs(5),
                )
                .await?;
                db.migrate().await?;
                info!("Connected to user database");
                Arc::new(db)
            }
            None => {
                info!("No database configured, storing users in memory");
                Arc::new(MemoryUserStore::new())
            }
        };

        Ok(Self::with_user_store(config, users))
    }

    pub fn in_memory(config: Settings) -> Self {
        Self::with_user_store(config, Arc::new(MemoryUserStore::new()))
    }

    pub fn with_user_store(config: Settings, users: Arc<dyn UserStore>) -> Self {
        let tokens = TokenIssuer::from_config(&config.auth);
        Self {
            config: Arc::new(config),
            auth_service: Arc::new(AuthService::new(users, tokens)),
            renderer: Arc::new(JsonRenderer),
        }
    }
}
