pub mod content_db;
pub mod db;
pub mod loan_db;
pub mod memory_db;
pub mod profile_db;
pub mod user_db;
pub mod wallet_db;
