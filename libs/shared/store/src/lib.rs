pub mod collection;
pub mod directory;

pub use collection::{Collection, StoreError};
pub use directory::DirectoryStore;
