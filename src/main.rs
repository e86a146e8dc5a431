use actix_web::cookie::Key;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use session_auth_server::{configure, session_middleware, AppError, AppState, MemorySessionStore, Settings};
use std::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[actix_web::main]
async fn main() -> session_auth_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully ({})", config.environment);

    if config.auth.jwt_secret.is_empty() {
        warn!("No token signing secret configured; logins will fail until APP_AUTH__JWT_SECRET or PRIVATE_KEY is set");
    }

    let state = web::Data::new(AppState::new(config.clone()).await?);

    // One store and one cookie key shared by every worker
    let sessions = MemorySessionStore::new();
    let session_key = Key::generate();
    let auth_config = config.auth.clone();

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Listening on http://{}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(sessions.clone(), session_key.clone(), &auth_config))
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
