pub mod factory;
pub mod store;

pub use factory::SqliteStoreFactory;
pub use store::SqliteLeadStore;
