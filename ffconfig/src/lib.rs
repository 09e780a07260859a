//! # ffconfig
//!
//! Schema-driven configuration form engine for the Firefly media server.
//!
//! The server describes its settings in `/config.xml` (sections of text and
//! select items, some repeated, some advanced) and reports current values
//! over its XML-RPC endpoint. `ffconfig` turns the two into an editable
//! form model, tracks repeated field groups and the advanced/basic
//! visibility tier, and writes edits back in a single update.
//!
//! ## Features
//!
//! - Strictly ordered load: schema, then stats, then values
//! - Closed item kinds (text, select), checked at the parse boundary
//! - Repeated groups that never shrink below one instance
//! - Cancel restores the loaded snapshot exactly
//! - Read-only mode when the server's config file is not writable
//! - A Cursive terminal editor on top of the form model
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ffconfig::{FormController, HttpService, PreferenceStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = HttpService::new("http://localhost:3689", None)?;
//! let prefs = PreferenceStore::load(".ffconfig.toml")?;
//! let mut controller = FormController::new(service, prefs);
//! controller.load().await?;
//!
//! for block in controller.form().unwrap().blocks() {
//!     println!("{}", block.item_id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Schema, values, stats and preferences
//! - [`form`] - Form model, rendering, groups and the controller
//! - [`service`] - Transport to the media server
//! - [`run`] - Terminal editor runner
//! - [`ui`] - Cursive views and handlers

#[macro_use]
extern crate log;

/// Schema, value, stats and preference data.
pub mod data;

/// Error types.
pub mod error;

/// The form engine.
pub mod form;

/// Terminal editor runner.
pub mod run;

/// Transport to the media server.
pub mod service;

/// Cursive views and event handlers.
pub mod ui;

/// Minimal XML element tree.
pub mod xml;

pub use data::{PreferenceStore, SchemaRegistry, ValueStore};
pub use error::{FormError, TransportError};
pub use form::{FormController, FormState};
pub use run::*;
pub use service::{ConfigService, HttpService, MemoryService};
