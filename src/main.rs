mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::{str::FromStr, sync::Arc};

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum_extra::extract::cookie::Key;
use config::Config;
use db::{userdb::UserExt, DBClient};
use dotenv::dotenv;
use routes::create_router;
use service::{
    notification_service::{NotificationQueue, NotificationWorker},
    quote_service::QuoteService,
    settings_service::SettingsService,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::{mail::sendmail::build_mailer, models::usermodel::UserRole, utils::password};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub settings: SettingsService,
    pub quotes: QuoteService,
    pub notifications: NotificationQueue,
    pub cookie_key: Key,
}

/// Creates the first admin when the users table is empty and seed
/// credentials are configured.
async fn seed_admin(db_client: &DBClient, config: &Config) -> Result<(), String> {
    let (Some(email), Some(seed_password)) = (&config.admin_seed_email, &config.admin_seed_password)
    else {
        return Ok(());
    };

    let user_count = db_client.get_user_count().await.map_err(|e| e.to_string())?;
    if user_count > 0 {
        return Ok(());
    }

    let hashed_password = password::hash(seed_password).map_err(|e| e.to_string())?;
    let user = db_client
        .save_user("Admin", email.as_str(), hashed_password.as_str(), UserRole::Admin)
        .await
        .map_err(|e| e.to_string())?;

    tracing::info!("Seeded admin user {}", user.email);
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| LevelFilter::from_str(&level).ok())
        .unwrap_or(LevelFilter::DEBUG);

    tracing_subscriber::fmt().with_max_level(log_level).init();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run database migrations: {:?}", err);
        std::process::exit(1);
    }

    let cookie_key = match Key::try_from(config.cookie_secret.as_bytes()) {
        Ok(key) => key,
        Err(_) => {
            tracing::error!("COOKIE_SECRET must be at least 64 bytes long");
            std::process::exit(1);
        }
    };

    let db_client = Arc::new(DBClient::new(pool));

    if let Err(err) = seed_admin(&db_client, &config).await {
        tracing::error!("Failed to seed admin user: {}", err);
    }

    let settings = SettingsService::new(db_client.clone(), config.admin_email.clone());
    let quotes = QuoteService::new(db_client.clone());

    let (notifications, receiver) = NotificationQueue::new(config.notification_queue_size);
    let worker = NotificationWorker::new(
        receiver,
        build_mailer(&config),
        db_client.clone(),
        settings.clone(),
        config.app_url.clone(),
    );
    tokio::spawn(worker.run());

    let app_state = AppState {
        env: config.clone(),
        db_client,
        settings,
        quotes,
        notifications,
        cookie_key,
    };

    let app = create_router(Arc::new(app_state)).layer(cors_layer(&config.cors_origins));

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("Server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
    }
}
