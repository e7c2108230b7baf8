pub mod models;
pub mod response;
pub mod schema;
pub mod status;
