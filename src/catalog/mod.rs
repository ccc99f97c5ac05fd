pub mod error;
mod discover;

pub use discover::{timestamp_from_name, PartitionScheme, SnapshotCatalog, SnapshotFile};
