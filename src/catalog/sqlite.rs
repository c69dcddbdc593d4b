/*!
 * SQLite-backed product store.
 *
 * Used for local catalogs and as a real-SQL store in tests. The statements
 * mirror the MySQL store; only placeholder and conflict syntax differ.
 */

use async_trait::async_trait;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::{AttributeValue, FlatTranslation, Product, UpsertOutcome, UpsertStrategy};
use super::store::{ProductStore, TableNames};
use crate::errors::DataAccessError;

/// Current contents of one flat-table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    /// Product sku
    pub sku: String,
    /// Row locale
    pub locale: String,
    /// Name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Short description
    pub short_description: Option<String>,
}

/// Product store on a SQLite database
#[derive(Clone)]
pub struct SqliteProductStore {
    db: DatabaseConnection,
    tables: TableNames,
    strategy: UpsertStrategy,
}

impl SqliteProductStore {
    /// Create a store on an open connection
    pub fn new(db: DatabaseConnection, tables: TableNames, strategy: UpsertStrategy) -> Self {
        Self { db, tables, strategy }
    }

    /// Open a store on a database file
    pub fn open<P: AsRef<Path>>(
        path: P,
        tables: TableNames,
        strategy: UpsertStrategy,
    ) -> Result<Self, DataAccessError> {
        let db = DatabaseConnection::open(path, &tables)?;
        Ok(Self::new(db, tables, strategy))
    }

    /// Create a store on an in-memory database
    pub fn in_memory(tables: TableNames, strategy: UpsertStrategy) -> Result<Self, DataAccessError> {
        let db = DatabaseConnection::open_in_memory(&tables)?;
        Ok(Self::new(db, tables, strategy))
    }

    /// Insert a flat-table row, e.g. to provision a locale or seed a catalog
    pub fn insert_flat_row(&self, product: &Product) -> Result<(), DataAccessError> {
        let sql = format!(
            "INSERT INTO {} (sku, product_id, locale, channel, name, description, short_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            self.tables.flat
        );
        self.db.execute(|conn| {
            conn.execute(
                &sql,
                params![
                    product.sku,
                    product.product_id,
                    product.locale,
                    product.channel,
                    product.name,
                    product.description,
                    product.short_description,
                ],
            )
            .map_err(|e| DataAccessError::query("insert flat row", e))?;
            Ok(())
        })
    }

    /// Insert an attribute row without conflict handling
    pub fn insert_attribute_row(&self, value: &AttributeValue) -> Result<(), DataAccessError> {
        let sql = format!(
            "INSERT INTO {} (product_id, attribute_id, locale, channel, text_value) VALUES (?1, ?2, ?3, ?4, ?5)",
            self.tables.attribute_values
        );
        self.db.execute(|conn| {
            conn.execute(
                &sql,
                params![value.product_id, value.attribute_id, value.locale, value.channel, value.text_value],
            )
            .map_err(|e| DataAccessError::query("insert attribute row", e))?;
            Ok(())
        })
    }

    /// Read one flat-table row
    pub fn flat_row(&self, sku: &str, locale: &str) -> Result<Option<FlatRow>, DataAccessError> {
        let sql = format!(
            "SELECT sku, locale, name, description, short_description FROM {} WHERE sku = ?1 AND locale = ?2",
            self.tables.flat
        );
        self.db.execute(|conn| {
            conn.query_row(&sql, params![sku, locale], |row| {
                Ok(FlatRow {
                    sku: row.get(0)?,
                    locale: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    short_description: row.get(4)?,
                })
            })
            .optional()
            .map_err(|e| DataAccessError::query("read flat row", e))
        })
    }

    /// All attribute rows of a product, ordered by attribute and locale
    pub fn attribute_values(&self, product_id: i64) -> Result<Vec<AttributeValue>, DataAccessError> {
        let sql = format!(
            "SELECT product_id, attribute_id, locale, channel, text_value FROM {}
             WHERE product_id = ?1 ORDER BY attribute_id, locale",
            self.tables.attribute_values
        );
        self.db.execute(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([product_id], |row| {
                Ok(AttributeValue {
                    product_id: row.get(0)?,
                    attribute_id: row.get(1)?,
                    locale: row.get(2)?,
                    channel: row.get(3)?,
                    text_value: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                })
            })?;
            let mut values = Vec::new();
            for value in rows {
                values.push(value?);
            }
            Ok(values)
        })
    }

    /// Total number of attribute rows
    pub fn attribute_value_count(&self) -> Result<i64, DataAccessError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.tables.attribute_values);
        self.db
            .execute(|conn| conn.query_row(&sql, [], |row| row.get(0)).map_err(DataAccessError::from))
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn upsert_strategy(&self) -> UpsertStrategy {
        self.strategy
    }

    async fn ping(&self) -> Result<(), DataAccessError> {
        self.db
            .execute_async(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                    .map_err(|e| DataAccessError::Connection(e.to_string()))?;
                Ok(())
            })
            .await
    }

    async fn fetch_source_products(&self, source_locale: &str) -> Result<Vec<Product>, DataAccessError> {
        let sql = format!(
            "SELECT sku, product_id, name, description, short_description, channel, locale
             FROM {} WHERE locale = ?1 ORDER BY product_id, sku",
            self.tables.flat
        );
        let source_locale = source_locale.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn
                    .prepare(&sql)
                    .map_err(|e| DataAccessError::query("fetch source products", e))?;
                let rows = stmt
                    .query_map([&source_locale], |row| {
                        Ok(Product {
                            sku: row.get(0)?,
                            product_id: row.get(1)?,
                            name: row.get(2)?,
                            description: row.get(3)?,
                            short_description: row.get(4)?,
                            channel: row.get(5)?,
                            locale: row.get(6)?,
                        })
                    })
                    .map_err(|e| DataAccessError::query("fetch source products", e))?;

                let mut products = Vec::new();
                for product in rows {
                    products.push(product?);
                }
                debug!("Fetched {} products in locale {}", products.len(), source_locale);
                Ok(products)
            })
            .await
    }

    async fn update_flat_translation(&self, translation: &FlatTranslation) -> Result<u64, DataAccessError> {
        let sql = format!(
            "UPDATE {} SET name = COALESCE(?1, name), description = ?2, short_description = ?3
             WHERE sku = ?4 AND locale = ?5",
            self.tables.flat
        );
        let translation = translation.clone();

        self.db
            .execute_async(move |conn| {
                let affected = conn
                    .execute(
                        &sql,
                        params![
                            translation.name,
                            translation.description,
                            translation.short_description,
                            translation.sku,
                            translation.locale,
                        ],
                    )
                    .map_err(|e| DataAccessError::query("update flat translation", e))?;
                Ok(affected as u64)
            })
            .await
    }

    async fn upsert_attribute_value(&self, value: &AttributeValue) -> Result<UpsertOutcome, DataAccessError> {
        let table = self.tables.attribute_values.clone();
        let strategy = self.strategy;
        let value = value.clone();

        self.db
            .execute_async(move |conn| match strategy {
                UpsertStrategy::Atomic => {
                    let sql = format!(
                        "INSERT INTO {} (product_id, attribute_id, locale, channel, text_value)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         ON CONFLICT (product_id, attribute_id, locale)
                         DO UPDATE SET text_value = excluded.text_value, channel = excluded.channel",
                        table
                    );
                    conn.execute(
                        &sql,
                        params![value.product_id, value.attribute_id, value.locale, value.channel, value.text_value],
                    )
                    .map_err(|e| DataAccessError::query("upsert attribute value", e))?;
                    Ok(UpsertOutcome::Written)
                }
                UpsertStrategy::CheckThenUpdate => {
                    if !attribute_row_exists(conn, &table, &value)? {
                        return Ok(UpsertOutcome::SkippedMissing);
                    }

                    conn.execute(
                        &format!(
                            "UPDATE {} SET text_value = ?1, channel = ?2
                             WHERE product_id = ?3 AND attribute_id = ?4 AND locale = ?5",
                            table
                        ),
                        params![value.text_value, value.channel, value.product_id, value.attribute_id, value.locale],
                    )
                    .map_err(|e| DataAccessError::query("update attribute value", e))?;
                    Ok(UpsertOutcome::Written)
                }
            })
            .await
    }

    async fn flat_row_exists(&self, sku: &str, locale: &str) -> Result<bool, DataAccessError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE sku = ?1 AND locale = ?2", self.tables.flat);
        let (sku, locale) = (sku.to_string(), locale.to_string());

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn
                    .query_row(&sql, params![sku, locale], |row| row.get(0))
                    .map_err(|e| DataAccessError::query("check flat row", e))?;
                Ok(count > 0)
            })
            .await
    }

    async fn attribute_value_exists(&self, value: &AttributeValue) -> Result<bool, DataAccessError> {
        let table = self.tables.attribute_values.clone();
        let value = value.clone();

        self.db
            .execute_async(move |conn| attribute_row_exists(conn, &table, &value))
            .await
    }
}

fn attribute_row_exists(conn: &Connection, table: &str, value: &AttributeValue) -> Result<bool, DataAccessError> {
    let count: i64 = conn
        .query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE product_id = ?1 AND attribute_id = ?2 AND locale = ?3",
                table
            ),
            params![value.product_id, value.attribute_id, value.locale],
            |row| row.get(0),
        )
        .map_err(|e| DataAccessError::query("check attribute value", e))?;
    Ok(count > 0)
}
