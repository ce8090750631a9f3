pub mod catalog_store;
pub mod storage;

pub use catalog_store::{Card, CatalogStore};
pub use storage::{FlagStorage, JsonFileStorage, MemoryStorage};
