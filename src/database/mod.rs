/*!
 * Database module for the persistent translation cache.
 *
 * Translations are stored in SQLite keyed by a hash of the locked source
 * text and the target locale, so they survive across runs.
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
