//! Persistence primitives.

mod atomic_file;
mod file_storage_repository;
mod memory_storage_repository;

pub use atomic_file::{AtomicFile, AtomicFileError, FileFormat};
pub use file_storage_repository::FileStorageRepository;
pub use memory_storage_repository::InMemoryStorageRepository;
