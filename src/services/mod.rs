//! Service layer containing catalog logic and side-effect helpers.
//!
//! ## Service map
//! - `store.rs`: `CatalogStore` accessor trait + local filesystem store.
//! - `reader.rs`: version resolution and metadata loading (fail-fast).
//! - `validator.rs`: catalog-wide audit (collect-all).
//! - `loader.rs`: artifact loading used by strict validation.
//! - `publish.rs`: staged, atomic publishing and latest promotion.
//! - `mirror.rs`: git commit + primary/secondary push.
//! - `config.rs`: `modelzoo.toml` + environment overrides.
//! - `storage.rs`: document parsing/rendering, atomic writes, digests.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - Reader and validator only see `CatalogStore`.
//! - Only `publish.rs` writes into `models/`.
//! - Keep command handlers thin; delegate to services.

pub mod config;
pub mod loader;
pub mod mirror;
pub mod output;
pub mod publish;
pub mod reader;
pub mod storage;
pub mod store;
pub mod validator;
