pub mod calculations;
pub mod lead;
pub mod models;
pub mod parse;
pub mod store;
pub mod tracking;
pub mod wizard;

pub use calculations::compute_audit;
pub use lead::LeadCache;
pub use models::*;
pub use store::{LeadStore, StoreConfig, StoreError, StoreFactory, StoreRegistry};
