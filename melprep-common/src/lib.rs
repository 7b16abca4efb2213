//! # melprep Common Library
//!
//! Shared code for the melprep workspace:
//! - Error types
//! - TOML configuration loading, validation and data folder resolution
//! - Output directory layout and bootstrap

pub mod config;
pub mod error;
pub mod layout;

pub use config::TomlConfig;
pub use error::{Error, Result};
pub use layout::OutputLayout;
