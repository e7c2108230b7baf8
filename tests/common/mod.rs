//! Shared Postgres fixture. Tests using it are skipped unless `DATABASE_URL`
//! points at a database the migrations may run against.

use std::sync::Arc;

use diesel::prelude::*;
use once_cell::sync::OnceCell;
use pinjamanku::{
    config::config::Config,
    database::db::{Database, DbAccess},
    models::schema::{faq_articles, users, wallets},
};
use rust_decimal::Decimal;
use uuid::Uuid;

static DATABASE: OnceCell<Option<Arc<Database>>> = OnceCell::new();

fn connect() -> Option<Arc<Database>> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let config = Config {
        database_url,
        db_pool_size: 16,
        jwt_secret: "unused".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir: std::env::temp_dir(),
        cors_origin: "http://localhost:3000".to_string(),
        whatsapp_cs: "+6281234567890".to_string(),
    };

    let db = Database::new(&config).expect("connecting to DATABASE_URL");
    db.run_migrations().expect("running migrations");
    Some(Arc::new(db))
}

/// Rows created through a fixture are removed when it is dropped, so tests
/// can share one database and run in parallel.
pub struct Fixture {
    pub db: Arc<Database>,
    users: Vec<Uuid>,
    faq_categories: Vec<String>,
}

impl Fixture {
    pub fn new() -> Option<Self> {
        let db = DATABASE.get_or_init(connect).clone();
        if db.is_none() {
            eprintln!("DATABASE_URL is not set; skipping Postgres test");
        }
        db.map(|db| Fixture {
            db,
            users: Vec::new(),
            faq_categories: Vec::new(),
        })
    }

    pub fn insert_user(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        diesel::insert_into(users::table)
            .values((
                users::id.eq(id),
                users::name.eq(name),
                users::email.eq(format!("{}@example.com", id.simple())),
                users::verified.eq(true),
            ))
            .execute(&mut self.db.conn().unwrap())
            .unwrap();
        self.users.push(id);
        id
    }

    /// Credits `amount` to the user's wallet, keeping the ledger identity.
    pub fn fund_wallet(&self, owner: Uuid, amount: i64) {
        let amount = Decimal::from(amount);
        diesel::update(wallets::table.filter(wallets::user_id.eq(owner)))
            .set((
                wallets::balance.eq(amount),
                wallets::total_received.eq(amount),
                wallets::total_withdrawn.eq(Decimal::ZERO),
            ))
            .execute(&mut self.db.conn().unwrap())
            .unwrap();
    }

    /// A category name no other test uses.
    pub fn faq_category(&mut self) -> String {
        let category = format!("cat-{}", &Uuid::new_v4().simple().to_string()[..12]);
        self.faq_categories.push(category.clone());
        category
    }

    pub fn insert_faq(&self, title: &str, category: &str, active: bool, sort: i32) {
        diesel::insert_into(faq_articles::table)
            .values((
                faq_articles::id.eq(Uuid::new_v4()),
                faq_articles::title.eq(title),
                faq_articles::content.eq("..."),
                faq_articles::category.eq(category),
                faq_articles::is_active.eq(active),
                faq_articles::sort_order.eq(sort),
            ))
            .execute(&mut self.db.conn().unwrap())
            .unwrap();
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let Ok(mut conn) = self.db.conn() else {
            return;
        };
        // Profiles, loans, wallets and withdrawals cascade from users.
        let _ = diesel::delete(users::table.filter(users::id.eq_any(self.users.clone())))
            .execute(&mut conn);
        let _ = diesel::delete(
            faq_articles::table.filter(faq_articles::category.eq_any(self.faq_categories.clone())),
        )
        .execute(&mut conn);
    }
}

/// Random digits, for values that must be unique across runs.
pub fn digits(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        out.push_str(&Uuid::new_v4().as_u128().to_string());
    }
    out.truncate(len);
    out
}
