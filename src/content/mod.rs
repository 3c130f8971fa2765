//! Bundled-content loading.

pub mod catalog;

pub use catalog::{
    Catalog, CatalogError, CatalogItem, ReloadCoordinator, install_catalog, load_catalog,
};
