//! Lifecycle configuration

use serde::{Deserialize, Serialize};

use crate::{LifecycleError, LifecycleResult};

/// Timing of the spin lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Minimum time spent in Accelerating before stop is allowed (s)
    #[serde(default = "default_min_spin_secs")]
    pub min_spin_secs: f32,
}

fn default_min_spin_secs() -> f32 {
    3.0
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            min_spin_secs: default_min_spin_secs(),
        }
    }
}

impl LifecycleConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> LifecycleResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LifecycleResult<()> {
        if !self.min_spin_secs.is_finite() || self.min_spin_secs <= 0.0 {
            return Err(LifecycleError::InvalidConfig(format!(
                "min_spin_secs must be positive and finite, got {}",
                self.min_spin_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dwell() {
        assert_eq!(LifecycleConfig::default().min_spin_secs, 3.0);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(LifecycleConfig::from_json("{}").unwrap().min_spin_secs, 3.0);
        assert_eq!(
            LifecycleConfig::from_json(r#"{ "min_spin_secs": 1.5 }"#)
                .unwrap()
                .min_spin_secs,
            1.5
        );
        assert!(LifecycleConfig::from_json(r#"{ "min_spin_secs": 0.0 }"#).is_err());
        assert!(matches!(
            LifecycleConfig::from_json("[]"),
            Err(LifecycleError::JsonError(_))
        ));
    }
}
