//! # kc-core
//!
//! Configuration and error handling shared by the pairwise mapper crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::{Config, LoggingConfig, PairwiseSettings};
pub use error::{Error, Result};
