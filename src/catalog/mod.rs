/*!
 * Product catalog persistence.
 *
 * Two stores implement the same contract:
 * - MySQL for the shop database
 * - SQLite for local catalogs and tests
 */

pub mod connection;
pub mod models;
pub mod mysql;
pub mod schema;
pub mod sqlite;
pub mod store;

// Re-export main types
pub use models::{AttributeIds, AttributeKind, AttributeValue, FlatTranslation, Product, UpsertOutcome, UpsertStrategy};
pub use mysql::MySqlProductStore;
pub use sqlite::SqliteProductStore;
pub use store::{DryRunStore, ProductStore, TableNames};
