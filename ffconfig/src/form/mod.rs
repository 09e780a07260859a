//! The form engine.
//!
//! - [`tree`] - the rendered form model front-ends draw from
//! - [`render`] - builds item blocks from schema items and values
//! - [`group`] - add/remove lifecycle of repeated instances
//! - [`controller`] - load sequence, edits, Save, Cancel, advanced toggle
//! - [`update`] - serialization of the form into an update request

pub mod controller;
pub mod group;
pub mod render;
pub mod tree;
pub mod update;

pub use controller::{FormController, FormState, READ_ONLY_WARNING, SERVER_SECTION};
pub use group::GroupManager;
pub use render::RenderContext;
pub use tree::{
    ActionBar, Affordance, ControlGroup, Form, FormAction, GroupInstance, InputControl, ItemBlock,
    ItemBody, Platform, SectionBlock, SelectControl,
};
pub use update::UpdateRequest;
