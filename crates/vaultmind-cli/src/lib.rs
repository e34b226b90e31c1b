//! # vaultmind-cli
//!
//! Support code for the `vaultmind` binary: loading a markdown vault from
//! disk and reading the combined configuration file.

pub mod config;
pub mod vault;

pub use config::AppConfig;
pub use vault::{parse_note, split_front_matter, Vault};
