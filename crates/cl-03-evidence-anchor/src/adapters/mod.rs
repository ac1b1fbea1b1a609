//! Adapters for the evidence anchor's outbound ports.

pub mod local_file_store;

pub use local_file_store::LocalFileStore;
