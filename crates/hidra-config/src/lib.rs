// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! # Hidra Configuration
//!
//! Type-safe, immutable configuration snapshot for a Hidra `World`, loaded
//! from an optional TOML file with environment-variable overrides. Mirrors
//! the layering the teacher workspace uses in `feagi-config`, minus the CLI
//! override layer (the CLI assembler is out of this core's scope).
//!
//! ## Usage
//!
//! ```rust
//! use hidra_config::Config;
//!
//! let config = Config::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod types;
pub mod validation;

#[cfg(feature = "std")]
pub mod loader;

pub use types::Config;
pub use validation::ConfigValidationError;

#[cfg(feature = "std")]
pub use loader::{apply_environment_overrides, load_config};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[cfg(feature = "std")]
    #[error("config file not found: {0}")]
    FileNotFound(String),

    #[cfg(feature = "std")]
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "std")]
    #[error("invalid TOML syntax: {0}")]
    Parse(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ConfigValidationError),
}
