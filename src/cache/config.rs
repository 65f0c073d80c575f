//! Cache configuration.
//!
//! Controls the apartment read cache via the `[cache]` section of
//! `apartments.toml`.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECONDS: u64 = 3600;
const DEFAULT_LOCATIONS_TTL_SECONDS: u64 = 3600;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false reads bypass the cache and nothing is written to it.
    pub enabled: bool,
    /// TTL for entity and listing entries.
    pub default_ttl_seconds: u64,
    /// TTL for the popular-locations entry.
    pub locations_ttl_seconds: u64,
    /// Period of the expired-entry sweep.
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            locations_ttl_seconds: DEFAULT_LOCATIONS_TTL_SECONDS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            default_ttl_seconds: settings.default_ttl_seconds.get(),
            locations_ttl_seconds: settings.locations_ttl_seconds.get(),
            sweep_interval_seconds: settings.sweep_interval_seconds.get(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds.max(1))
    }

    pub fn locations_ttl(&self) -> Duration {
        Duration::from_secs(self.locations_ttl_seconds.max(1))
    }

    /// Sweep period, clamped to at least one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.default_ttl(), Duration::from_secs(3600));
        assert_eq!(config.locations_ttl(), Duration::from_secs(3600));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn zero_durations_clamp_to_one_second() {
        let config = CacheConfig {
            default_ttl_seconds: 0,
            sweep_interval_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.default_ttl(), Duration::from_secs(1));
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    fn locations_ttl_is_independent_of_default_ttl() {
        let config = CacheConfig {
            default_ttl_seconds: 60,
            ..Default::default()
        };
        assert_eq!(config.default_ttl(), Duration::from_secs(60));
        assert_eq!(config.locations_ttl(), Duration::from_secs(3600));
    }
}
