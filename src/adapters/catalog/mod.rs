//! YAML pool catalogs: parsing, the bundled default and a file-backed store.

pub mod yaml_pool_store;

pub use yaml_pool_store::{default_catalog, parse_catalog, read_catalog, YamlPoolStore, DEFAULT_CATALOG};
