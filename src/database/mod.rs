//! # Database
//!
//! PostgreSQL pool management and SQLSTATE constants for the task store.
//!
//! - [`connection`] - pool creation with bounded startup retry, embedded migrations
//! - [`error_codes`] - SQLSTATE codes used to classify driver errors

pub mod connection;
pub mod error_codes;

pub use connection::{DatabaseConnection, MIGRATOR};
pub use error_codes::PgErrorCode;
