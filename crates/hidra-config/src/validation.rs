// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Validation rules for `Config`, in the style of `feagi-config::validation`.

use crate::types::Config;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("metrics_collection_interval must be > 0 when metrics_enabled is true")]
    ZeroMetricsInterval,

    #[error("metrics_ring_capacity must be > 0 when metrics_enabled is true")]
    ZeroMetricsCapacity,

    #[error("system_gene_count must be >= 4 (Genesis, Gestation, Mitosis, Apoptosis)")]
    TooFewSystemGenes,

    #[error("user_lvar_writable_limit must be <= {max} (total lvar slots)", max = hidra_types::LVAR_COUNT)]
    WritableLimitOutOfRange,

    #[error("default_gene_fuel must be > 0")]
    ZeroGeneFuel,

    #[error("default_decay_rate must be in [0, 1]")]
    DecayRateOutOfRange,

    #[error("default_threshold_recovery_rate must be in [0, 1]")]
    RecoveryRateOutOfRange,

    #[error("competition_radius must be > 0")]
    NonPositiveRadius,
}

pub fn validate_config(config: &Config) -> Result<(), ConfigValidationError> {
    if config.metrics_enabled && config.metrics_collection_interval == 0 {
        return Err(ConfigValidationError::ZeroMetricsInterval);
    }
    if config.metrics_enabled && config.metrics_ring_capacity == 0 {
        return Err(ConfigValidationError::ZeroMetricsCapacity);
    }
    if config.system_gene_count < 4 {
        return Err(ConfigValidationError::TooFewSystemGenes);
    }
    if config.user_lvar_writable_limit > hidra_types::LVAR_COUNT {
        return Err(ConfigValidationError::WritableLimitOutOfRange);
    }
    if config.default_gene_fuel == 0 {
        return Err(ConfigValidationError::ZeroGeneFuel);
    }
    if !(0.0..=1.0).contains(&config.default_decay_rate) {
        return Err(ConfigValidationError::DecayRateOutOfRange);
    }
    if !(0.0..=1.0).contains(&config.default_threshold_recovery_rate) {
        return Err(ConfigValidationError::RecoveryRateOutOfRange);
    }
    if config.competition_radius <= 0.0 {
        return Err(ConfigValidationError::NonPositiveRadius);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_metrics_interval_rejected_only_when_enabled() {
        let mut c = Config::default();
        c.metrics_collection_interval = 0;
        assert!(c.validate().is_ok());
        c.metrics_enabled = true;
        assert_eq!(c.validate(), Err(ConfigValidationError::ZeroMetricsInterval));
    }

    #[test]
    fn too_few_system_genes_rejected() {
        let mut c = Config::default();
        c.system_gene_count = 1;
        assert_eq!(c.validate(), Err(ConfigValidationError::TooFewSystemGenes));
    }
}
