pub mod catalog;

pub use catalog::{CatalogData, CatalogStore, StoreError};
