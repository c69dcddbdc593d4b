/*!
 * MySQL-backed product store.
 *
 * This is the production store. The pool is built from discrete credential
 * components; the schema is owned by the shop and is never migrated here.
 */

use async_trait::async_trait;
use log::{LevelFilter, debug, info};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{ConnectOptions, Row};
use std::time::Duration;

use super::models::{AttributeValue, FlatTranslation, Product, UpsertOutcome, UpsertStrategy};
use super::store::{ProductStore, TableNames};
use crate::app_config::DatabaseConfig;
use crate::errors::DataAccessError;

/// Product store on a MySQL connection pool
#[derive(Clone)]
pub struct MySqlProductStore {
    pool: MySqlPool,
    tables: TableNames,
    strategy: UpsertStrategy,
}

impl MySqlProductStore {
    /// Create a store on an existing pool
    pub fn new(pool: MySqlPool, tables: TableNames, strategy: UpsertStrategy) -> Self {
        Self { pool, tables, strategy }
    }

    /// Connect to the database described by the config.
    ///
    /// With `log_statements` every SQL statement is logged at debug level.
    pub async fn connect(config: &DatabaseConfig, log_statements: bool) -> Result<Self, DataAccessError> {
        info!("Connecting to MySQL at {}", config.display_url());

        let options = connect_options(config, log_statements);
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect_with(options)
            .await
            .map_err(|e| DataAccessError::Connection(format!("Could not connect to database: {}", e)))?;

        Ok(Self::new(pool, config.table_names()?, config.upsert_strategy))
    }

    fn map_product(row: &MySqlRow) -> Result<Product, DataAccessError> {
        Ok(Product {
            sku: row.try_get("sku")?,
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            short_description: row.try_get("short_description")?,
            channel: row.try_get("channel")?,
            locale: row.try_get("locale")?,
        })
    }
}

/// Build connection options from the credential components
pub fn connect_options(config: &DatabaseConfig, log_statements: bool) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name);

    if log_statements {
        options.log_statements(LevelFilter::Debug)
    } else {
        options.disable_statement_logging()
    }
}

#[async_trait]
impl ProductStore for MySqlProductStore {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    fn upsert_strategy(&self) -> UpsertStrategy {
        self.strategy
    }

    async fn ping(&self) -> Result<(), DataAccessError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DataAccessError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn fetch_source_products(&self, source_locale: &str) -> Result<Vec<Product>, DataAccessError> {
        let sql = format!(
            "SELECT sku, CAST(product_id AS SIGNED) AS product_id, name, description, short_description, channel, locale
             FROM `{}` WHERE locale = ? ORDER BY product_id, sku",
            self.tables.flat
        );

        let rows = sqlx::query(&sql)
            .bind(source_locale)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DataAccessError::query("fetch source products", e))?;

        let products = rows.iter().map(Self::map_product).collect::<Result<Vec<_>, _>>()?;
        debug!("Fetched {} products in locale {}", products.len(), source_locale);
        Ok(products)
    }

    async fn update_flat_translation(&self, translation: &FlatTranslation) -> Result<u64, DataAccessError> {
        let sql = format!(
            "UPDATE `{}` SET name = COALESCE(?, name), description = ?, short_description = ?
             WHERE sku = ? AND locale = ?",
            self.tables.flat
        );

        let result = sqlx::query(&sql)
            .bind(translation.name.as_deref())
            .bind(&translation.description)
            .bind(&translation.short_description)
            .bind(&translation.sku)
            .bind(&translation.locale)
            .execute(&self.pool)
            .await
            .map_err(|e| DataAccessError::query("update flat translation", e))?;

        Ok(result.rows_affected())
    }

    async fn upsert_attribute_value(&self, value: &AttributeValue) -> Result<UpsertOutcome, DataAccessError> {
        let table = &self.tables.attribute_values;

        match self.strategy {
            UpsertStrategy::Atomic => {
                // MariaDB has no `AS new` row alias, so VALUES() stays
                let sql = format!(
                    "INSERT INTO `{}` (product_id, attribute_id, locale, channel, text_value)
                     VALUES (?, ?, ?, ?, ?)
                     ON DUPLICATE KEY UPDATE text_value = VALUES(text_value), channel = VALUES(channel)",
                    table
                );
                sqlx::query(&sql)
                    .bind(value.product_id)
                    .bind(value.attribute_id)
                    .bind(&value.locale)
                    .bind(value.channel.as_deref())
                    .bind(&value.text_value)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| DataAccessError::query("upsert attribute value", e))?;
                Ok(UpsertOutcome::Written)
            }
            UpsertStrategy::CheckThenUpdate => {
                if !self.attribute_value_exists(value).await? {
                    return Ok(UpsertOutcome::SkippedMissing);
                }

                sqlx::query(&format!(
                    "UPDATE `{}` SET text_value = ?, channel = ?
                     WHERE product_id = ? AND attribute_id = ? AND locale = ?",
                    table
                ))
                .bind(&value.text_value)
                .bind(value.channel.as_deref())
                .bind(value.product_id)
                .bind(value.attribute_id)
                .bind(&value.locale)
                .execute(&self.pool)
                .await
                .map_err(|e| DataAccessError::query("update attribute value", e))?;
                Ok(UpsertOutcome::Written)
            }
        }
    }

    async fn flat_row_exists(&self, sku: &str, locale: &str) -> Result<bool, DataAccessError> {
        let count: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) FROM `{}` WHERE sku = ? AND locale = ?",
            self.tables.flat
        ))
        .bind(sku)
        .bind(locale)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DataAccessError::query("check flat row", e))?
        .try_get(0)?;
        Ok(count > 0)
    }

    async fn attribute_value_exists(&self, value: &AttributeValue) -> Result<bool, DataAccessError> {
        let count: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) FROM `{}` WHERE product_id = ? AND attribute_id = ? AND locale = ?",
            self.tables.attribute_values
        ))
        .bind(value.product_id)
        .bind(value.attribute_id)
        .bind(&value.locale)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DataAccessError::query("check attribute value", e))?
        .try_get(0)?;
        Ok(count > 0)
    }
}
