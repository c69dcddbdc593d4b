/*!
 * Translation of catalog products.
 *
 * - `client`: field-level translation with retry and input/output guards
 * - `orchestrator`: products x locales loop and persistence policy
 */

pub use self::client::{RetryPolicy, TranslationClient};
pub use self::orchestrator::{FailureRecord, FailureStage, RunReport, TranslationOrchestrator};

pub mod client;
pub mod orchestrator;
