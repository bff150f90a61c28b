pub mod app;
pub mod config;
pub mod funnel;
pub mod logging;
pub mod render;
pub mod repl;
pub mod timer;
pub mod webhook;

pub use funnel::{Funnel, FunnelEvent, Update};
