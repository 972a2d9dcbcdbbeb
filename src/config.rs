use crate::error::{KalmanError, Result};
use serde::{Deserialize, Serialize};

/* -----------------------------------------------------------------------------
 * KalmanFilterConfig
 * ----------------------------------------------------------------------------- */

/// Noise weights and time step of the constant-velocity box model.
///
/// Motion and observation uncertainty are chosen relative to the current
/// box height, these weights scale that relation. The defaults are shared by
/// every object class; callers with per-class motion can keep one config per
/// class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanFilterConfig {
    /// Weight applied to the height for position/shape standard deviations.
    pub std_weight_position: f32,
    /// Weight applied to the height for velocity standard deviations.
    pub std_weight_velocity: f32,
    /// Frame step used in the transition matrix.
    pub dt: f32,
}

impl Default for KalmanFilterConfig {
    fn default() -> Self {
        Self {
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
            dt: 1.0,
        }
    }
}

impl KalmanFilterConfig {
    pub fn new(std_weight_position: f32, std_weight_velocity: f32) -> Self {
        Self {
            std_weight_position,
            std_weight_velocity,
            ..Self::default()
        }
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("std_weight_position", self.std_weight_position),
            ("std_weight_velocity", self.std_weight_velocity),
            ("dt", self.dt),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(KalmanError::InvalidConfig(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let config = KalmanFilterConfig::default();
        assert_eq!(config.std_weight_position, 0.05);
        assert_eq!(config.std_weight_velocity, 0.00625);
        assert_eq!(config.dt, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = KalmanFilterConfig::new(0.0, 1.0 / 160.0);
        assert!(matches!(
            config.validate(),
            Err(KalmanError::InvalidConfig(_))
        ));

        let config = KalmanFilterConfig::default().with_dt(f32::NAN);
        assert!(matches!(
            config.validate(),
            Err(KalmanError::InvalidConfig(_))
        ));

        let config = KalmanFilterConfig::new(1.0 / 20.0, -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: KalmanFilterConfig =
            serde_json::from_str(r#"{ "std_weight_position": 0.1 }"#).unwrap();
        assert_eq!(config.std_weight_position, 0.1);
        assert_eq!(config.std_weight_velocity, 1.0 / 160.0);
        assert_eq!(config.dt, 1.0);
    }
}
