#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;

pub use catalog::{parse_catalog_json, starter_catalog};
pub use repository::{
    CompletionRepository, GestureCatalog, InMemoryRepository, Storage, StorageError,
};
