//! # Component Container
//!
//! Configuration and dependency injection for every ledger component.

pub mod components;
pub mod config;

pub use components::{LedgerBackend, LedgerComponents};
pub use config::{
    AccessConfig, BackendConfig, ConfigError, LedgerConfig, LedgerMode, SchedulerConfig,
    SignerKey, SlaConfig, StorageConfig,
};
