//! Navigation menus.
//!
//! Modules publish nested menu trees; they are flattened on receipt, stored
//! per node, and rebuilt per caller:
//! - [`flatten_menu`] turns a published tree into storable definitions
//! - [`compose_menu`] filters and orders stored definitions into a tree

mod compose;
mod flatten;

pub use compose::{MenuNode, compose_menu};
pub use flatten::flatten_menu;
