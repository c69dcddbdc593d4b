/*!
 * Storage contract for the product catalog.
 *
 * A store owns both persisted shapes: the flat per-locale product table and
 * the normalized attribute-value table. Each call is its own unit of work;
 * nothing spans calls, so partially completed (product, locale) pairs are
 * possible and expected.
 */

use async_trait::async_trait;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

use super::models::{AttributeValue, FlatTranslation, Product, UpsertOutcome, UpsertStrategy};
use crate::errors::DataAccessError;

/// Read and write access to the product catalog
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Short backend name for log lines
    fn backend(&self) -> &'static str;

    /// How attribute values are written
    fn upsert_strategy(&self) -> UpsertStrategy;

    /// Check that the database is reachable
    async fn ping(&self) -> Result<(), DataAccessError>;

    /// Load every flat-table row in the given locale
    async fn fetch_source_products(&self, source_locale: &str) -> Result<Vec<Product>, DataAccessError>;

    /// Update the (sku, locale) row of the flat table.
    ///
    /// Returns the number of rows affected. Zero means no row exists for the
    /// target locale, which is not an error: those rows are provisioned
    /// elsewhere.
    async fn update_flat_translation(&self, translation: &FlatTranslation) -> Result<u64, DataAccessError>;

    /// Write one attribute value, keeping at most one row per
    /// (product_id, attribute_id, locale)
    async fn upsert_attribute_value(&self, value: &AttributeValue) -> Result<UpsertOutcome, DataAccessError>;

    /// Whether the flat table has a row for (sku, locale)
    async fn flat_row_exists(&self, sku: &str, locale: &str) -> Result<bool, DataAccessError>;

    /// Whether an attribute row exists for the value's (product_id, attribute_id, locale)
    async fn attribute_value_exists(&self, value: &AttributeValue) -> Result<bool, DataAccessError>;
}

/// Names of the two catalog tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Flat per-locale product table
    pub flat: String,
    /// Attribute-value table
    pub attribute_values: String,
}

impl TableNames {
    /// Create table names, rejecting anything that is not a plain identifier
    pub fn new(flat: impl Into<String>, attribute_values: impl Into<String>) -> Result<Self, DataAccessError> {
        let names = Self {
            flat: flat.into(),
            attribute_values: attribute_values.into(),
        };
        for name in [&names.flat, &names.attribute_values] {
            if !is_valid_identifier(name) {
                return Err(DataAccessError::query(
                    "validate table name",
                    format!("'{}' is not a valid table name", name),
                ));
            }
        }
        Ok(names)
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            flat: "trrc_product_flat".to_string(),
            attribute_values: "trrc_product_attribute_values".to_string(),
        }
    }
}

/// Table names are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    name.len() <= 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A write that a dry run would have performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedWrite {
    /// Flat-table update
    Flat(FlatTranslation),
    /// Attribute-value upsert
    Attribute(AttributeValue),
}

/// Store wrapper that reads from the inner store and only logs writes
pub struct DryRunStore {
    inner: Arc<dyn ProductStore>,
    writes: Mutex<Vec<RecordedWrite>>,
}

impl DryRunStore {
    /// Wrap a store so that no write reaches it
    pub fn new(inner: Arc<dyn ProductStore>) -> Self {
        Self {
            inner,
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Writes that were intercepted so far
    pub fn recorded_writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl ProductStore for DryRunStore {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    fn upsert_strategy(&self) -> UpsertStrategy {
        self.inner.upsert_strategy()
    }

    async fn ping(&self) -> Result<(), DataAccessError> {
        self.inner.ping().await
    }

    async fn fetch_source_products(&self, source_locale: &str) -> Result<Vec<Product>, DataAccessError> {
        self.inner.fetch_source_products(source_locale).await
    }

    /// Reports what the inner store would report: zero rows when the
    /// target-locale row is absent
    async fn update_flat_translation(&self, translation: &FlatTranslation) -> Result<u64, DataAccessError> {
        if !self.inner.flat_row_exists(&translation.sku, &translation.locale).await? {
            info!(
                "[dry-run] no flat row for sku={} locale={}, nothing to update",
                translation.sku, translation.locale
            );
            return Ok(0);
        }

        info!(
            "[dry-run] would update flat row sku={} locale={}: description={:?} short_description={:?}",
            translation.sku, translation.locale, translation.description, translation.short_description
        );
        self.writes.lock().push(RecordedWrite::Flat(translation.clone()));
        Ok(1)
    }

    async fn upsert_attribute_value(&self, value: &AttributeValue) -> Result<UpsertOutcome, DataAccessError> {
        if self.inner.upsert_strategy() == UpsertStrategy::CheckThenUpdate
            && !self.inner.attribute_value_exists(value).await?
        {
            info!(
                "[dry-run] no attribute row product_id={} attribute_id={} locale={}, nothing to update",
                value.product_id, value.attribute_id, value.locale
            );
            return Ok(UpsertOutcome::SkippedMissing);
        }

        info!(
            "[dry-run] would upsert attribute product_id={} attribute_id={} locale={} channel={:?}",
            value.product_id, value.attribute_id, value.locale, value.channel
        );
        self.writes.lock().push(RecordedWrite::Attribute(value.clone()));
        Ok(UpsertOutcome::Written)
    }

    async fn flat_row_exists(&self, sku: &str, locale: &str) -> Result<bool, DataAccessError> {
        self.inner.flat_row_exists(sku, locale).await
    }

    async fn attribute_value_exists(&self, value: &AttributeValue) -> Result<bool, DataAccessError> {
        self.inner.attribute_value_exists(value).await
    }
}
