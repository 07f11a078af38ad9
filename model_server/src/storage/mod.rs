mod error;
mod fs;
mod handle;
mod memory;
mod store;

pub use error::{Result, StorageErr};
pub use fs::FsStore;
pub use handle::{ArtifactStore, Loaded};
pub use memory::MemoryStore;
pub use store::{Restored, Store};
