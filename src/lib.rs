//! Git-backed model zoo.
//!
//! A catalog lives under `<root>/models/<model>/` with one immutable `v<N>/`
//! directory per version (artifact, metadata, feature schema) and an
//! `index.<fmt>` naming every version and the current latest.
//!
//! ```no_run
//! use modelzoo::{CatalogReader, VersionSelector};
//!
//! let reader = CatalogReader::open("/srv/modelzoo");
//! let dir = reader.get_model_path("uc_power_model", VersionSelector::Latest)?;
//! let meta = reader.load_model_metadata("uc_power_model", 2)?;
//! # let _ = (dir, meta);
//! # Ok::<(), modelzoo::CatalogError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod domain;
pub mod error;
pub mod services;

pub use cli::*;
pub use domain::constants::*;
pub use domain::documents::*;
pub use domain::layout::*;
pub use domain::models::*;
pub use error::CatalogError;
pub use services::config::*;
pub use services::loader::*;
pub use services::mirror::*;
pub use services::output::*;
pub use services::publish::*;
pub use services::reader::{get_model_path, load_model_metadata, CatalogReader};
pub use services::storage::*;
pub use services::store::*;
pub use services::validator::*;
