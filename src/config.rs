// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub cookie_secret: String,
    pub port: u16,
    pub upload_dir: String,
    pub cors_origins: Vec<String>,
    // Notification recipients and transports
    pub admin_email: Option<String>,
    pub from_email: String,
    pub resend_api_key: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_username: String,
    pub smtp_password: String,
    pub notification_queue_size: usize,
    // First admin account, created only when the users table is empty
    pub admin_seed_email: Option<String>,
    pub admin_seed_password: Option<String>,
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let cookie_secret = std::env::var("COOKIE_SECRET").expect("COOKIE_SECRET must be set");

        let jwt_maxage = std::env::var("JWT_MAXAGE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);
        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));
        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".to_string());

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        // Email service configurations (with defaults)
        let from_email = std::env::var("FROM_EMAIL")
            .unwrap_or_else(|_| "Homesite <noreply@localhost>".to_string());
        let smtp_username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
        let notification_queue_size = std::env::var("NOTIFICATION_QUEUE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(256);

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage,
            cookie_secret,
            port,
            upload_dir,
            cors_origins,
            admin_email: optional_var("ADMIN_EMAIL"),
            from_email,
            resend_api_key: optional_var("RESEND_API_KEY"),
            smtp_host: optional_var("SMTP_HOST"),
            smtp_username,
            smtp_password,
            notification_queue_size,
            admin_seed_email: optional_var("ADMIN_SEED_EMAIL"),
            admin_seed_password: optional_var("ADMIN_SEED_PASSWORD"),
        }
    }
}
