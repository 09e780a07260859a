//! Cursive views for a rendered [`Form`](crate::form::Form).
//!
//! The form model is the source of truth: every callback goes through the
//! [`FormController`](crate::form::FormController) stored as Cursive user
//! data, and structural changes rebuild the layer from the model.

/// Form layer construction.
pub mod view;

/// Global and button event handlers.
pub mod handlers;

use crate::form::FormController;

/// What the user asked for when the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Quit,
    /// Leave the loop so the update can be awaited, then come back.
    Save,
}

/// Cursive user data for one pass of the event loop.
pub struct TuiState<S> {
    pub controller: FormController<S>,
    pub intent: Intent,
    /// Result of the previous save, shown above the form.
    pub status: Option<String>,
}

pub use handlers::{handle_quit, handle_save, handle_toggle_advanced};
