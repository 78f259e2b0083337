//! Virtual file system over sealed blocks.
//!
//! Provides a directory tree, file contents and per-node metadata, all
//! persisted in encrypted form through the storage layer.

mod index;
mod path;
mod shared;
mod store;
mod transfer;
mod types;

pub use index::Index;
pub use path::VfsPath;
pub use shared::SharedStore;
pub use store::{HealthReport, Store, StoreInfo, StoreState};
pub use types::{DirEntry, EntryKind, Node, NodeId, NodeInfo, NodeKind, ROOT_NODE_ID};
