pub mod data_dir;
pub mod error;
pub mod json_bridge;
pub mod schema;
pub mod store;

pub use data_dir::{CONFIG_FILE, DataDir, default_base_dir};
pub use error::{Result, StoreError};
pub use json_bridge::SpacePersistence;
pub use store::Store;
