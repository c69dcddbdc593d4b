/*!
 * Catalog entity models.
 *
 * These structures map onto the flat product table and the
 * attribute-value table, plus the values routed between them.
 */

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Translatable product attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Product name (carried through untranslated)
    Name,
    /// Long description
    Description,
    /// Short description
    ShortDescription,
}

impl AttributeKind {
    /// Column name in the flat table
    pub fn column(&self) -> &'static str {
        match self {
            AttributeKind::Name => "name",
            AttributeKind::Description => "description",
            AttributeKind::ShortDescription => "short_description",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

impl std::str::FromStr for AttributeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(AttributeKind::Name),
            "description" => Ok(AttributeKind::Description),
            "short_description" => Ok(AttributeKind::ShortDescription),
            _ => Err(anyhow!("Invalid attribute: {}", s)),
        }
    }
}

/// Attribute ids of the translatable fields in the attribute-value table.
///
/// Fixed at configuration time and handed to the store and the orchestrator
/// when they are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeIds {
    /// Attribute id of `name`
    #[serde(default = "default_name_attribute_id")]
    pub name: i64,
    /// Attribute id of `description`
    #[serde(default = "default_description_attribute_id")]
    pub description: i64,
    /// Attribute id of `short_description`
    #[serde(default = "default_short_description_attribute_id")]
    pub short_description: i64,
}

impl AttributeIds {
    /// Attribute id for the given kind
    pub fn id_of(&self, kind: AttributeKind) -> i64 {
        match kind {
            AttributeKind::Name => self.name,
            AttributeKind::Description => self.description,
            AttributeKind::ShortDescription => self.short_description,
        }
    }

    /// Whether every attribute has its own id
    pub fn are_distinct(&self) -> bool {
        self.name != self.description
            && self.name != self.short_description
            && self.description != self.short_description
    }
}

impl Default for AttributeIds {
    fn default() -> Self {
        Self {
            name: default_name_attribute_id(),
            description: default_description_attribute_id(),
            short_description: default_short_description_attribute_id(),
        }
    }
}

fn default_name_attribute_id() -> i64 {
    2
}

fn default_description_attribute_id() -> i64 {
    10
}

fn default_short_description_attribute_id() -> i64 {
    9
}

/// One catalog item in the source locale, as fetched for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier, unique per locale
    pub sku: String,
    /// Surrogate key used by the attribute-value table
    pub product_id: i64,
    /// Product name
    pub name: Option<String>,
    /// Long description
    pub description: Option<String>,
    /// Short description
    pub short_description: Option<String>,
    /// Sales channel tag
    pub channel: Option<String>,
    /// Source locale code
    pub locale: String,
}

impl Product {
    /// Source text of a translatable field
    pub fn field(&self, kind: AttributeKind) -> Option<&str> {
        match kind {
            AttributeKind::Name => self.name.as_deref(),
            AttributeKind::Description => self.description.as_deref(),
            AttributeKind::ShortDescription => self.short_description.as_deref(),
        }
    }
}

/// Values written to a target-locale row of the flat table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTranslation {
    /// Product sku
    pub sku: String,
    /// Target locale of the row
    pub locale: String,
    /// Source name, carried through untranslated
    pub name: Option<String>,
    /// Translated description
    pub description: String,
    /// Translated short description
    pub short_description: String,
}

/// One row of the attribute-value table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    /// Product surrogate key
    pub product_id: i64,
    /// Attribute id
    pub attribute_id: i64,
    /// Target locale
    pub locale: String,
    /// Sales channel, copied from the source product
    pub channel: Option<String>,
    /// Translated text
    pub text_value: String,
}

/// Result of an attribute-value upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The row was inserted or overwritten
    Written,
    /// No row existed and the strategy does not insert
    SkippedMissing,
}

/// How attribute values are deduplicated on write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStrategy {
    /// Insert, overwriting `text_value` and `channel` on key conflict
    #[default]
    Atomic,
    /// Look the row up, update it if present, skip otherwise.
    /// Only safe when a single writer touches the table.
    CheckThenUpdate,
}

impl fmt::Display for UpsertStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertStrategy::Atomic => write!(f, "atomic"),
            UpsertStrategy::CheckThenUpdate => write!(f, "check_then_update"),
        }
    }
}
