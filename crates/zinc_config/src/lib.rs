//! Parsing and validation of `zinc.toml` configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`ZincConfig`] with rebasing rules, split plans and anonymizer settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve_split_plan, ResolvedPartition, SplitPlan};
pub use types::*;
