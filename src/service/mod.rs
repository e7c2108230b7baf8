pub mod content_service;
pub mod loan_service;
pub mod profile_service;
pub mod storage;
pub mod wallet_service;
