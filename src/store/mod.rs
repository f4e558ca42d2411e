//! Repositories for users, groups, policies and their relations
//!
//! The APIs only talk to the traits in this module; [`MemoryRepo`] is the
//! bundled implementation.

mod error;
mod memory;
mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryRepo;
pub use traits::{GroupRepo, PolicyRepo, Repo, UserRepo};
