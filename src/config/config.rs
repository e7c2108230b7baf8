use std::path::PathBuf;

use crate::database::db::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_pool_size: u32,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub cors_origin: String,
    pub whatsapp_cs: String,
}

fn required(key: &str) -> Result<String, AppError> {
    std::env::var(key).map_err(|_| AppError::ConfigError(format!("{} must be set", key)))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::ConfigError(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn init() -> Result<Config, AppError> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let db_pool_size = parsed("DB_POOL_SIZE", 10u32)?;
        let host = optional("HOST", "0.0.0.0");
        let port = parsed("PORT", 8000u16)?;
        let upload_dir = PathBuf::from(optional("UPLOAD_DIR", "storage/app/public"));
        let cors_origin = optional("CORS_ORIGIN", "http://localhost:3000");
        let whatsapp_cs = optional("WHATSAPP_CS", "+6281234567890");

        Ok(Config {
            database_url,
            db_pool_size,
            jwt_secret,
            host,
            port,
            upload_dir,
            cors_origin,
            whatsapp_cs,
        })
    }
}
