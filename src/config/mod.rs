//! # Configuration Module
//!
//! Configuration structures, layered resolution and validation for the
//! staging client.

pub mod config;

pub use config::{ConfigOverrides, FileConfig, StagerConfig};
