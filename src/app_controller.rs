use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, DatabaseDriver, TranslationProvider};
use crate::catalog::models::Product;
use crate::catalog::mysql::MySqlProductStore;
use crate::catalog::sqlite::SqliteProductStore;
use crate::catalog::store::{DryRunStore, ProductStore};
use crate::errors::FetchError;
use crate::providers::Translator;
use crate::providers::google::GoogleTranslate;
use crate::translation::{RetryPolicy, RunReport, TranslationClient, TranslationOrchestrator};

// @module: Application controller for catalog translation runs

/// Options of a single run that do not belong in the config file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Translate but only log the writes
    pub dry_run: bool,
    /// Process at most this many products
    pub limit: Option<usize>,
    /// Log every SQL statement
    pub debug: bool,
    /// Draw a progress bar
    pub show_progress: bool,
}

/// Main application controller for catalog translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Per-run options
    options: RunOptions,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config, options: RunOptions) -> Self {
        Self { config, options }
    }

    /// The configuration this controller runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connect to the configured store and translator, then run
    pub async fn run(&self) -> Result<RunReport> {
        let store = self.connect_store().await?;
        let translator = self.build_translator()?;
        self.run_with(store, translator).await
    }

    /// Run against an already built store and translator
    pub async fn run_with(&self, store: Arc<dyn ProductStore>, translator: Arc<dyn Translator>) -> Result<RunReport> {
        let start_time = Instant::now();

        store
            .ping()
            .await
            .with_context(|| format!("Failed to reach {} database", store.backend()))?;
        info!("Successfully connected to database ({})", store.backend());

        let mut products = self.fetch_products(store.as_ref()).await?;
        if let Some(limit) = self.options.limit {
            if products.len() > limit {
                info!("Limiting run to {} of {} products", limit, products.len());
                products.truncate(limit);
            }
        }

        if products.is_empty() {
            warn!("No products found in source locale {}", self.config.source_locale);
        }

        let store: Arc<dyn ProductStore> = if self.options.dry_run {
            info!("Dry run: no changes will be written");
            Arc::new(DryRunStore::new(store))
        } else {
            store
        };

        let client = TranslationClient::new(translator, RetryPolicy::from(&self.config.translation));
        let mut orchestrator = TranslationOrchestrator::new(store, client, self.config.attributes);

        let progress_bar = self.options.show_progress.then(|| Self::progress_bar(products.len() as u64));
        if let Some(progress_bar) = &progress_bar {
            orchestrator = orchestrator.with_progress(progress_bar.clone());
        }

        let report = orchestrator
            .run(&products, &self.config.source_locale, &self.config.target_locales)
            .await;

        if let Some(progress_bar) = progress_bar {
            progress_bar.finish_and_clear();
        }

        info!("{}", report.summary());
        info!("Finished in {}", Self::format_duration(start_time.elapsed()));

        Ok(report)
    }

    /// Fetch the source products; any failure here ends the run
    async fn fetch_products(&self, store: &dyn ProductStore) -> Result<Vec<Product>, FetchError> {
        let products = store
            .fetch_source_products(&self.config.source_locale)
            .await
            .map_err(|source| FetchError {
                locale: self.config.source_locale.clone(),
                source,
            })?;
        debug!("Fetched {} products in {}", products.len(), self.config.source_locale);
        Ok(products)
    }

    /// Open the store selected by the database driver
    async fn connect_store(&self) -> Result<Arc<dyn ProductStore>> {
        let database = &self.config.database;

        let store: Arc<dyn ProductStore> = match database.driver {
            DatabaseDriver::MySql => Arc::new(MySqlProductStore::connect(database, self.options.debug).await?),
            DatabaseDriver::Sqlite => Arc::new(SqliteProductStore::open(
                &database.sqlite_path,
                database.table_names()?,
                database.upsert_strategy,
            )?),
        };

        Ok(store)
    }

    /// Build the configured translation provider
    fn build_translator(&self) -> Result<Arc<dyn Translator>> {
        let translator: Arc<dyn Translator> = match self.config.translation.provider {
            TranslationProvider::Google => Arc::new(GoogleTranslate::from_config(&self.config.translation)?),
        };
        debug!("Using {} translator", self.config.translation.provider.display_name());
        Ok(translator)
    }

    fn progress_bar(len: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} products ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=> "));
        progress_bar
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
