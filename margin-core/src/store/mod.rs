//! Key/value storage behind the lead cache.
//!
//! Backends implement [`LeadStore`] and expose a [`StoreFactory`] so the
//! front end can pick one by name from configuration.

mod factory;
mod lead_store;
mod memory;

pub use factory::{StoreConfig, StoreFactory, StoreRegistry};
pub use lead_store::{LeadStore, StoreError};
pub use memory::{MemoryLeadStore, MemoryStoreFactory};
