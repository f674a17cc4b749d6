pub mod accounts;
pub mod reviews;
