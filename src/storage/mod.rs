pub mod bulk;
pub mod client;
pub mod ddl;
pub mod layout;
pub mod sync;

pub use bulk::{BulkLoader, DEFAULT_CHUNK_SIZE};
pub use client::{DbClient, DbRow};
pub use layout::{ColumnLayout, StorageLayout, TableLayout};
pub use sync::SchemaSynchronizer;
