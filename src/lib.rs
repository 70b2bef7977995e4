pub mod backend;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod notify;
pub mod session;

pub use material_sync_common as common;
