//! Command implementations.

pub mod algorithms;
pub mod config;
pub mod generate;
pub mod salt;
pub mod validate;

pub use algorithms::run_algorithms;
pub use config::run_config;
pub use generate::run_generate;
pub use salt::run_salt;
pub use validate::run_validate;
