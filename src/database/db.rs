use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, PoolError, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde_json::json;

use super::content_db::ContentImpl;
use super::loan_db::LoanImpl;
use super::profile_db::ProfileImpl;
use super::user_db::UserImpl;
use super::wallet_db::WalletImpl;
use crate::config::config::Config;
use crate::helpers::validation_helpers::FieldErrors;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DBPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DBConnection = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("identity verification is required before applying for a loan")]
    ProfileNotVerified,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("a profile already exists for this user")]
    ProfileExists,
    #[error("cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
    #[error("authentication required")]
    Unauthenticated,
    #[error("email address is not verified")]
    EmailNotVerified,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database connection error: {0}")]
    DbConnectionError(#[from] PoolError),
    #[error("database error: {0}")]
    DieselError(#[from] DieselError),
    #[error("migration error: {0}")]
    MigrationError(String),
    #[error("storage error: {0}")]
    StorageError(#[from] std::io::Error),
    #[error("malformed upload: {0}")]
    MultipartError(String),
    #[error("serialization error: {0}")]
    SerializationError(String),
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("blocking task was cancelled")]
    BlockingError(#[from] BlockingError),
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.add(field, message);
        AppError::Validation(errors)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InsufficientBalance => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::ProfileNotVerified | AppError::EmailNotVerified => StatusCode::FORBIDDEN,
            AppError::InvalidTransition { .. } | AppError::ProfileExists => StatusCode::CONFLICT,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MultipartError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {}", self);
            return HttpResponse::build(status).json(json!({
                "status": "error",
                "message": "Internal server error"
            }));
        }

        match self {
            AppError::Validation(errors) => HttpResponse::build(status).json(json!({
                "status": "error",
                "message": self.to_string(),
                "errors": errors
            })),
            _ => HttpResponse::build(status).json(json!({
                "status": "error",
                "message": self.to_string()
            })),
        }
    }
}

/// Name of the unique constraint a failed insert/update tripped, if any.
pub fn violated_unique_constraint(e: &DieselError) -> Option<&str> {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            info.constraint_name()
        }
        _ => None,
    }
}

pub trait DbAccess {
    fn conn(&self) -> Result<DBConnection, PoolError>;
}

/// Everything the request handlers need from a store.
pub trait Repository:
    UserImpl + ProfileImpl + LoanImpl + WalletImpl + ContentImpl + Send + Sync
{
}

impl<T> Repository for T where
    T: UserImpl + ProfileImpl + LoanImpl + WalletImpl + ContentImpl + Send + Sync
{
}

#[derive(Clone)]
pub struct Database {
    pub pool: DBPool,
}

impl Database {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let manager = ConnectionManager::<PgConnection>::new(config.database_url.clone());

        let pool = r2d2::Pool::builder()
            .max_size(config.db_pool_size)
            .build(manager)?;

        Ok(Database { pool })
    }

    pub fn run_migrations(&self) -> Result<(), AppError> {
        let mut conn = self.conn()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::MigrationError(e.to_string()))?;

        for migration in applied {
            log::info!("Applied migration {}", migration);
        }
        Ok(())
    }
}

impl DbAccess for Database {
    fn conn(&self) -> Result<DBConnection, PoolError> {
        self.pool.get()
    }
}
