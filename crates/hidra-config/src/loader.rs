// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! TOML file + environment variable loading, mirroring
//! `feagi_config::loader::{load_config, apply_environment_overrides}`.

use crate::types::Config;
use crate::ConfigError;
use std::path::Path;

/// Load a `Config` from an optional TOML file, apply environment overrides,
/// then validate. `path = None` yields `Config::default()` before overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConfigError::FileNotFound(p.display().to_string())
                } else {
                    ConfigError::Io(e)
                }
            })?;
            toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        }
        None => Config::default(),
    };

    apply_environment_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Apply `HIDRA_*` environment variable overrides in place.
///
/// Only a handful of hot-path knobs are override-able this way, matching
/// the teacher's approach of overriding host/port/timeout style values
/// rather than every field.
pub fn apply_environment_overrides(config: &mut Config) {
    if let Some(v) = env_f32("HIDRA_METABOLIC_TAX_PER_TICK") {
        config.metabolic_tax_per_tick = v;
    }
    if let Some(v) = env_bool("HIDRA_DETERMINISTIC") {
        config.deterministic = v;
    }
    if let Some(v) = env_u64("HIDRA_SEED0") {
        config.seed0 = v;
    }
    if let Some(v) = env_u64("HIDRA_SEED1") {
        config.seed1 = v;
    }
    if let Some(v) = env_bool("HIDRA_METRICS_ENABLED") {
        config.metrics_enabled = v;
    }
    if let Some(v) = env_u64("HIDRA_METRICS_COLLECTION_INTERVAL") {
        config.metrics_collection_interval = v;
    }
}

fn env_f32(key: &str) -> Option<f32> {
    std::env::var(key).ok()?.parse().ok()
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}

fn env_bool(key: &str) -> Option<bool> {
    let v = std::env::var(key).ok()?;
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

pub fn find_config_file(candidates: &[&Path]) -> Option<std::path::PathBuf> {
    candidates.iter().find(|p| p.exists()).map(|p| p.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_file_errors() {
        let err = load_config(Some(Path::new("/nonexistent/hidra.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn loads_partial_toml_with_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "deterministic = false\nseed0 = 7\nseed1 = 9").unwrap();
        let config = load_config(Some(f.path())).unwrap();
        assert!(!config.deterministic);
        assert_eq!(config.seed0, 7);
        assert_eq!(config.seed1, 9);
        // Untouched fields keep their defaults.
        assert_eq!(config.competition_radius, Config::default().competition_radius);
    }

    #[test]
    fn env_override_wins_over_file() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        std::env::set_var("HIDRA_SEED0", "42");
        let mut config = Config::default();
        apply_environment_overrides(&mut config);
        assert_eq!(config.seed0, 42);
        std::env::remove_var("HIDRA_SEED0");
    }
}
