/*!
 * # catalog-translator
 *
 * Translates the descriptive text of an e-commerce product catalog from a
 * source locale into a list of target locales and writes the results back.
 *
 * ## Features
 *
 * - Reads the source-locale snapshot from the product flat table
 * - Translates `description` and `short_description` with Google Cloud Translation
 * - Updates the flat table and upserts the EAV attribute-value rows
 * - MySQL/MariaDB and SQLite stores
 * - Dry runs, bounded retries and per-item failure isolation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration file, environment overrides and validation
 * - `catalog`: Product models and the store contract:
 *   - `catalog::mysql`: MySQL store
 *   - `catalog::sqlite`: SQLite store
 *   - `catalog::store`: Store trait and dry-run wrapper
 * - `providers`: Translation service clients:
 *   - `providers::google`: Google Cloud Translation v3
 *   - `providers::mock`: Deterministic translator for tests
 * - `translation`: Field translation and the run orchestrator
 * - `app_controller`: Main application controller
 * - `locale_utils`: Locale parsing and service codes
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod errors;
pub mod locale_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions};
pub use catalog::{AttributeIds, Product, ProductStore};
pub use errors::{AppError, DataAccessError, FetchError, ProviderError, TranslationError};
pub use locale_utils::{locales_match, to_service_code};
pub use translation::{RunReport, TranslationOrchestrator};
