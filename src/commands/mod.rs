//! Command handler layer.
//!
//! ## Files
//! - `catalog.rs`: validate/resolve/show/list (read-only).
//! - `publish.rs`: publish/promote/mirror (the single writer).
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate catalog logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod catalog;
pub mod publish;

pub use catalog::handle_catalog_commands;
pub use publish::handle_publish_commands;
