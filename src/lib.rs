pub mod cli;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod errors;
pub mod vault;

pub use engine::{EngineState, VaultEngine};
pub use errors::{Result, VaultError};
