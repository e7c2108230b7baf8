pub mod form_helpers;
pub mod models;
pub mod multipart_helpers;
pub mod page_helpers;
pub mod validation_helpers;
