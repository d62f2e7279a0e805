use std::env;

use splitnet_domain::Money;

use crate::error::ConfigError;

pub const MIN_TRANSFER_ENV: &str = "SPLITNET_MIN_TRANSFER";
pub const CURRENCY_SCALE_ENV: &str = "SPLITNET_CURRENCY_SCALE";

/// Largest number of decimal places whose minor units still fit an `i64` amount.
const MAX_CURRENCY_SCALE: u32 = 18;

/// Host-tunable settlement parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementConfig {
    /// Settlements below this many minor units are not emitted.
    pub min_transfer: Money,
    /// Decimal places of one major unit (2 for cents). Display only.
    pub currency_scale: u32,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            min_transfer: Money::from_i64(1),
            currency_scale: 2,
        }
    }
}

impl SettlementConfig {
    /// Reads the configuration from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MIN_TRANSFER_ENV) {
            let value = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|value| *value >= 1)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: MIN_TRANSFER_ENV,
                    value: raw.clone(),
                })?;
            config.min_transfer = Money::from_i64(value);
        }

        if let Some(raw) = lookup(CURRENCY_SCALE_ENV) {
            let scale = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: CURRENCY_SCALE_ENV,
                    value: raw.clone(),
                })?;
            if scale > MAX_CURRENCY_SCALE {
                return Err(ConfigError::OutOfRange {
                    key: CURRENCY_SCALE_ENV,
                    max: MAX_CURRENCY_SCALE,
                    found: scale,
                });
            }
            config.currency_scale = scale;
        }

        tracing::debug!(
            min_transfer = %config.min_transfer,
            currency_scale = config.currency_scale,
            "Loaded settlement configuration"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = SettlementConfig::from_lookup(lookup_from(&[])).expect("defaults are valid");

        assert_eq!(config, SettlementConfig::default());
        assert_eq!(config.min_transfer, Money::from_i64(1));
    }

    #[test]
    fn reads_both_keys() {
        let config = SettlementConfig::from_lookup(lookup_from(&[
            (MIN_TRANSFER_ENV, "100"),
            (CURRENCY_SCALE_ENV, " 0 "),
        ]))
        .expect("valid configuration");

        assert_eq!(config.min_transfer, Money::from_i64(100));
        assert_eq!(config.currency_scale, 0);
    }

    #[rstest]
    #[case::zero_floor(MIN_TRANSFER_ENV, "0")]
    #[case::negative_floor(MIN_TRANSFER_ENV, "-5")]
    #[case::text_floor(MIN_TRANSFER_ENV, "one")]
    #[case::negative_scale(CURRENCY_SCALE_ENV, "-1")]
    fn rejects_invalid_values(#[case] key: &'static str, #[case] value: &str) {
        let result = SettlementConfig::from_lookup(lookup_from(&[(key, value)]));

        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                key,
                value: value.to_string(),
            })
        );
    }

    #[test]
    fn rejects_scale_beyond_i64_precision() {
        let result = SettlementConfig::from_lookup(lookup_from(&[(CURRENCY_SCALE_ENV, "19")]));

        assert_eq!(
            result,
            Err(ConfigError::OutOfRange {
                key: CURRENCY_SCALE_ENV,
                max: 18,
                found: 19,
            })
        );
    }
}
