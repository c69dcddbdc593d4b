/*!
 * Full app lifecycle tests: config file, controller, store and translator
 */

use std::sync::Arc;
use async_trait::async_trait;

use catalog_translator::app_config::Config;
use catalog_translator::app_controller::{Controller, RunOptions};
use catalog_translator::catalog::{
    FlatTranslation, Product, ProductStore, SqliteProductStore, TableNames, UpsertOutcome, UpsertStrategy,
};
use catalog_translator::catalog::models::AttributeValue;
use catalog_translator::errors::{DataAccessError, FetchError};

use crate::common::{self, mock_providers};

/// Store whose reads always fail
struct UnreachableStore {
    fail_ping: bool,
}

#[async_trait]
impl ProductStore for UnreachableStore {
    fn backend(&self) -> &'static str {
        "unreachable"
    }

    fn upsert_strategy(&self) -> UpsertStrategy {
        UpsertStrategy::Atomic
    }

    async fn ping(&self) -> Result<(), DataAccessError> {
        if self.fail_ping {
            Err(DataAccessError::Connection("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    async fn fetch_source_products(&self, _source_locale: &str) -> Result<Vec<Product>, DataAccessError> {
        Err(DataAccessError::Query {
            operation: "fetch source products",
            message: "table does not exist".to_string(),
        })
    }

    async fn update_flat_translation(&self, _translation: &FlatTranslation) -> Result<u64, DataAccessError> {
        unreachable!("no writes without products")
    }

    async fn upsert_attribute_value(&self, _value: &AttributeValue) -> Result<UpsertOutcome, DataAccessError> {
        unreachable!("no writes without products")
    }

    async fn flat_row_exists(&self, _sku: &str, _locale: &str) -> Result<bool, DataAccessError> {
        unreachable!("no writes without products")
    }

    async fn attribute_value_exists(&self, _value: &AttributeValue) -> Result<bool, DataAccessError> {
        unreachable!("no writes without products")
    }
}

#[tokio::test]
async fn test_controller_runWith_shouldTranslateSeededCatalog() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::sqlite_config(&temp_dir.path().join("catalog.db"));
    let store = Arc::new(
        SqliteProductStore::open(&config.database.sqlite_path, TableNames::default(), config.database.upsert_strategy)
            .unwrap(),
    );
    common::seed_catalog(&store, &[common::chair("nl")], &["en", "fr"]).unwrap();

    let controller = Controller::with_config(config, RunOptions::default());
    let report = controller
        .run_with(store.clone(), mock_providers::identity_translator())
        .await
        .unwrap();

    assert_eq!(report.products, 1);
    assert_eq!(report.flat_updated, 2);
    assert_eq!(report.attributes_written, 4);
    assert_eq!(store.attribute_value_count().unwrap(), 4);
}

#[tokio::test]
async fn test_controller_run_withSqliteDriver_shouldOpenConfiguredFile() {
    let temp_dir = common::create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("shop").join("catalog.db");
    let mut config = common::sqlite_config(&db_path);
    // Nothing to translate, so the translator is never contacted
    config.translation.endpoint = "http://127.0.0.1:9".to_string();

    let report = Controller::with_config(config, RunOptions::default()).run().await.unwrap();

    assert_eq!(report.products, 0);
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_controller_runWith_withLimit_shouldProcessFirstProducts() {
    let store = common::memory_store(Default::default());
    let products = vec![
        common::product("A", 1, Some("Een."), Some("E.")),
        common::product("B", 2, Some("Twee."), Some("T.")),
        common::product("C", 3, Some("Drie."), Some("D.")),
    ];
    common::seed_catalog(&store, &products, &["en"]).unwrap();

    let mut config = common::sqlite_config(&std::path::PathBuf::from(":memory:"));
    config.target_locales = common::locales(&["en"]);
    let options = RunOptions {
        limit: Some(2),
        ..RunOptions::default()
    };

    let report = Controller::with_config(config, options)
        .run_with(store.clone(), mock_providers::identity_translator())
        .await
        .unwrap();

    assert_eq!(report.products, 2);
    assert_eq!(store.flat_row("C", "en").unwrap().unwrap().description.as_deref(), Some("untranslated"));
    assert_eq!(store.flat_row("B", "en").unwrap().unwrap().description.as_deref(), Some("[en]Twee."));
}

#[tokio::test]
async fn test_controller_runWith_withDryRun_shouldLeaveStoreUnchanged() {
    let store = common::memory_store(Default::default());
    common::seed_catalog(&store, &[common::chair("nl")], &["en", "fr"]).unwrap();
    let config = common::sqlite_config(&std::path::PathBuf::from(":memory:"));
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let report = Controller::with_config(config, options)
        .run_with(store.clone(), mock_providers::identity_translator())
        .await
        .unwrap();

    assert_eq!(report.pairs_translated, 2);
    assert_eq!(store.attribute_value_count().unwrap(), 0);
}

#[tokio::test]
async fn test_controller_runWith_withFetchFailure_shouldAbort() {
    common::init_logging();
    let config = common::sqlite_config(&std::path::PathBuf::from(":memory:"));
    let translator = mock_providers::identity_translator();

    let result = Controller::with_config(config, RunOptions::default())
        .run_with(Arc::new(UnreachableStore { fail_ping: false }), translator.clone())
        .await;

    let error = result.unwrap_err();
    let fetch_error = error.downcast_ref::<FetchError>().expect("fetch error");
    assert_eq!(fetch_error.locale, "nl");
    assert_eq!(translator.request_count(), 0);
}

#[tokio::test]
async fn test_controller_runWith_withPingFailure_shouldAbort() {
    let config = common::sqlite_config(&std::path::PathBuf::from(":memory:"));

    let result = Controller::with_config(config, RunOptions::default())
        .run_with(
            Arc::new(UnreachableStore { fail_ping: true }),
            mock_providers::identity_translator(),
        )
        .await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("connection refused"));
}

#[test]
fn test_config_loadOrCreate_thenValidate_shouldRoundTripThroughFile() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let (config, created) = Config::load_or_create(&path).unwrap();
    assert!(created);
    assert!(path.exists());
    // Default file has no credentials yet
    assert!(config.validate().is_err());

    let valid = common::sqlite_config(&temp_dir.path().join("catalog.db"));
    std::fs::write(&path, serde_json::to_string_pretty(&valid).unwrap()).unwrap();

    let (loaded, created) = Config::load_or_create(&path).unwrap();
    assert!(!created);
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded.target_locales, valid.target_locales);
}
