//! Configuration data parsed from the media server.
//!
//! This module holds everything the form is built from:
//!
//! - [`schema`] - the item/section catalog from `/config.xml`
//! - [`values`] - the current value snapshot from `method=config`
//! - [`stats`] - config path and writability from `method=stats`
//! - [`item`] - individual item definitions
//! - [`prefs`] - client preferences persisted between sessions
//!
//! Registries are replaced wholesale on every load, never merged.

/// Individual configuration item definitions.
pub mod item;

/// Client preferences with expiry.
pub mod prefs;

/// Schema catalog parsed from `/config.xml`.
pub mod schema;

/// Server stats relevant to editing.
pub mod stats;

/// Current configuration values.
pub mod values;

pub use item::{ItemKind, ItemSchema, SchemaFault, SelectItem, SelectOption, TextItem};
pub use prefs::PreferenceStore;
pub use schema::{SchemaRegistry, SectionSchema};
pub use stats::ServerStats;
pub use values::{ValueEntry, ValueStore};
