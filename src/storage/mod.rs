//! Storage layer module.
//!
//! Byte sinks for export output and the trait-based catalog holding the
//! working set of issuer definitions.

pub mod factory;
pub mod memory;
pub mod sink;
pub mod traits;

pub use factory::create_catalog;
pub use memory::MemoryCatalog;
pub use sink::{ByteSink, FileSink, MemorySink};
pub use traits::{CatalogStore, DynCatalog};
