/*!
 * Translation orchestrator.
 *
 * Drives the products x target locales loop. For each pair the description
 * and the short description are translated first; only when both succeed
 * are the three writes issued (flat row, description attribute, short
 * description attribute). Every failure is logged and the loop moves on.
 */

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::client::TranslationClient;
use crate::catalog::models::{AttributeIds, AttributeKind, AttributeValue, FlatTranslation, Product, UpsertOutcome};
use crate::catalog::store::ProductStore;
use crate::errors::TranslationError;
use crate::locale_utils;

/// Stage at which a unit of work failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// A source field was absent or blank
    MissingSource,
    /// The translation service failed or returned nothing
    Translation,
    /// The flat-table update failed
    FlatWrite,
    /// An attribute-value upsert failed
    AttributeWrite,
}

/// Context of a failure, enough to reconcile it by hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Product sku
    pub sku: String,
    /// Product surrogate key
    pub product_id: i64,
    /// Target locale
    pub locale: String,
    /// Attribute id, for attribute writes and field failures
    pub attribute_id: Option<i64>,
    /// Where it failed
    pub stage: FailureStage,
    /// Error message
    pub message: String,
}

/// Counters for one run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Unique id of the run, included in log lines
    pub run_id: String,
    /// Start of the run
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration
    pub duration: Duration,
    /// Products processed
    pub products: usize,
    /// (product, locale) pairs attempted
    pub pairs_attempted: usize,
    /// Pairs where both fields were translated
    pub pairs_translated: usize,
    /// Pairs skipped because a source field was missing
    pub pairs_missing_source: usize,
    /// Pairs skipped because translation failed
    pub pairs_translation_failed: usize,
    /// Flat rows updated
    pub flat_updated: usize,
    /// Flat updates that matched no target-locale row
    pub flat_missing: usize,
    /// Attribute rows inserted or overwritten
    pub attributes_written: usize,
    /// Attribute writes skipped because the row did not exist
    pub attributes_missing: usize,
    /// Failed writes of either kind
    pub write_failures: usize,
    /// Every recorded failure
    pub failures: Vec<FailureRecord>,
}

impl RunReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
            products: 0,
            pairs_attempted: 0,
            pairs_translated: 0,
            pairs_missing_source: 0,
            pairs_translation_failed: 0,
            flat_updated: 0,
            flat_missing: 0,
            attributes_written: 0,
            attributes_missing: 0,
            write_failures: 0,
            failures: Vec::new(),
        }
    }

    /// Whether any unit of work failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Pairs that were skipped without any write
    pub fn pairs_skipped(&self) -> usize {
        self.pairs_missing_source + self.pairs_translation_failed
    }

    /// Generate a summary of the run
    pub fn summary(&self) -> String {
        format!(
            "Run {} summary:\n\
             Products: {}\n\
             Locale pairs: {} attempted, {} translated, {} skipped ({} missing source, {} translation failures)\n\
             Flat rows: {} updated, {} without target row\n\
             Attribute values: {} written, {} without existing row\n\
             Write failures: {}\n\
             Elapsed: {:.2}s",
            self.run_id,
            self.products,
            self.pairs_attempted,
            self.pairs_translated,
            self.pairs_skipped(),
            self.pairs_missing_source,
            self.pairs_translation_failed,
            self.flat_updated,
            self.flat_missing,
            self.attributes_written,
            self.attributes_missing,
            self.write_failures,
            self.duration.as_secs_f64()
        )
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Fans products out across target locales and persists the results
pub struct TranslationOrchestrator {
    store: Arc<dyn ProductStore>,
    client: TranslationClient,
    attributes: AttributeIds,
    progress: Option<ProgressBar>,
}

impl TranslationOrchestrator {
    /// Create an orchestrator
    pub fn new(store: Arc<dyn ProductStore>, client: TranslationClient, attributes: AttributeIds) -> Self {
        Self {
            store,
            client,
            attributes,
            progress: None,
        }
    }

    /// Advance the given progress bar once per product
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Translate every product into every target locale, in order.
    ///
    /// Never fails: per-item failures are logged and recorded in the report.
    pub async fn run(&self, products: &[Product], source_locale: &str, target_locales: &[String]) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::new();

        info!(
            "Run {}: translating {} products from {} into [{}] with {}",
            report.run_id,
            products.len(),
            source_locale,
            target_locales.join(", "),
            self.client.translator_name()
        );

        for product in products {
            report.products += 1;
            if let Some(progress) = &self.progress {
                progress.set_message(product.sku.clone());
            }

            for target_locale in target_locales {
                if locale_utils::locales_match(source_locale, target_locale) {
                    warn!("Skipping target locale {}: same as source locale", target_locale);
                    continue;
                }
                self.process_pair(product, source_locale, target_locale, &mut report).await;
            }

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }

        report.duration = start.elapsed();
        report
    }

    /// Translate and persist one (product, locale) pair
    async fn process_pair(&self, product: &Product, source_locale: &str, target_locale: &str, report: &mut RunReport) {
        report.pairs_attempted += 1;

        let description = match self
            .translate(product, AttributeKind::Description, source_locale, target_locale, report)
            .await
        {
            Some(text) => text,
            None => return,
        };
        let short_description = match self
            .translate(product, AttributeKind::ShortDescription, source_locale, target_locale, report)
            .await
        {
            Some(text) => text,
            None => return,
        };

        report.pairs_translated += 1;
        debug!("Translated sku={} into {}", product.sku, target_locale);

        let flat = FlatTranslation {
            sku: product.sku.clone(),
            locale: target_locale.to_string(),
            name: product.name.clone(),
            description: description.clone(),
            short_description: short_description.clone(),
        };
        match self.store.update_flat_translation(&flat).await {
            Ok(0) => {
                info!(
                    "No flat row for sku={} locale={}, nothing updated",
                    product.sku, target_locale
                );
                report.flat_missing += 1;
            }
            Ok(_) => report.flat_updated += 1,
            Err(e) => {
                error!(
                    "Flat update failed for sku={} product_id={} locale={}: {}",
                    product.sku, product.product_id, target_locale, e
                );
                report.write_failures += 1;
                report.failures.push(FailureRecord {
                    sku: product.sku.clone(),
                    product_id: product.product_id,
                    locale: target_locale.to_string(),
                    attribute_id: None,
                    stage: FailureStage::FlatWrite,
                    message: e.to_string(),
                });
            }
        }

        for (kind, text) in [
            (AttributeKind::Description, description),
            (AttributeKind::ShortDescription, short_description),
        ] {
            let value = AttributeValue {
                product_id: product.product_id,
                attribute_id: self.attributes.id_of(kind),
                locale: target_locale.to_string(),
                channel: product.channel.clone(),
                text_value: text,
            };
            match self.store.upsert_attribute_value(&value).await {
                Ok(UpsertOutcome::Written) => report.attributes_written += 1,
                Ok(UpsertOutcome::SkippedMissing) => {
                    warn!(
                        "No attribute row for product_id={} attribute_id={} locale={}, skipped",
                        value.product_id, value.attribute_id, value.locale
                    );
                    report.attributes_missing += 1;
                }
                Err(e) => {
                    error!(
                        "Attribute upsert failed for sku={} product_id={} attribute_id={} locale={}: {}",
                        product.sku, value.product_id, value.attribute_id, value.locale, e
                    );
                    report.write_failures += 1;
                    report.failures.push(FailureRecord {
                        sku: product.sku.clone(),
                        product_id: product.product_id,
                        locale: value.locale,
                        attribute_id: Some(value.attribute_id),
                        stage: FailureStage::AttributeWrite,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Translate one field, recording the failure that skips the pair
    async fn translate(
        &self,
        product: &Product,
        kind: AttributeKind,
        source_locale: &str,
        target_locale: &str,
        report: &mut RunReport,
    ) -> Option<String> {
        match self.client.translate_field(product, kind, source_locale, target_locale).await {
            Ok(text) => Some(text),
            Err(e) => {
                let stage = match e {
                    TranslationError::MissingSource { .. } => {
                        report.pairs_missing_source += 1;
                        FailureStage::MissingSource
                    }
                    _ => {
                        report.pairs_translation_failed += 1;
                        FailureStage::Translation
                    }
                };
                warn!(
                    "Skipping sku={} product_id={} locale={}: {} ({})",
                    product.sku, product.product_id, target_locale, e, kind
                );
                report.failures.push(FailureRecord {
                    sku: product.sku.clone(),
                    product_id: product.product_id,
                    locale: target_locale.to_string(),
                    attribute_id: Some(self.attributes.id_of(kind)),
                    stage,
                    message: e.to_string(),
                });
                None
            }
        }
    }
}
