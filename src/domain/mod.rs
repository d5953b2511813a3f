//! Shared data model layer.
//!
//! ## Files
//! - `constants.rs`: layout names and required-key sets.
//! - `layout.rs`: version directory naming rules.
//! - `documents.rs`: metadata, feature schema and index records plus shape checks.
//! - `models.rs`: selectors, descriptors, reports and output envelopes.
//!
//! ## Rule of thumb
//! Domain types are data-only: no filesystem side effects.
//!
//! ## Compatibility note
//! Report structs are the `--json` output schema; keep `docs/contracts/*` in sync.

pub mod constants;
pub mod documents;
pub mod layout;
pub mod models;
