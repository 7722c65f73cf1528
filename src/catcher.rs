use serde::{Deserialize, Serialize};

use crate::constants::{
    CATCHER_HALF_WIDTH_DEFAULT, CATCHER_HALF_WIDTH_MAX, CLOCK_RATE_DEFAULT, DASH_SPEED_DEFAULT,
};
use crate::error::{CatcherField, ChartError};

/// Physical catcher parameters, supplied by the caller per run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatcherConfig {
    /// Normalized distance per real millisecond while dashing.
    pub dash_speed: f64,
    /// Half of the catcher's catch width, in normalized units.
    pub half_width: f64,
    /// Playback rate; chart time runs this many times faster than real time.
    pub clock_rate: f64,
}

impl Default for CatcherConfig {
    fn default() -> Self {
        Self {
            dash_speed: DASH_SPEED_DEFAULT,
            half_width: CATCHER_HALF_WIDTH_DEFAULT,
            clock_rate: CLOCK_RATE_DEFAULT,
        }
    }
}

impl CatcherConfig {
    pub fn new(dash_speed: f64, half_width: f64) -> Self {
        Self {
            dash_speed,
            half_width,
            clock_rate: CLOCK_RATE_DEFAULT,
        }
    }

    pub fn with_clock_rate(mut self, clock_rate: f64) -> Self {
        self.clock_rate = clock_rate;
        self
    }

    /// Dash speed per chart millisecond.
    #[inline]
    pub fn effective_dash_speed(&self) -> f64 {
        self.dash_speed / self.clock_rate
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if !self.dash_speed.is_finite() || self.dash_speed <= 0.0 {
            return Err(ChartError::InvalidCatcher {
                field: CatcherField::DashSpeed,
                value: self.dash_speed,
            });
        }
        if !self.clock_rate.is_finite() || self.clock_rate <= 0.0 {
            return Err(ChartError::InvalidCatcher {
                field: CatcherField::ClockRate,
                value: self.clock_rate,
            });
        }
        if !(0.0..=CATCHER_HALF_WIDTH_MAX).contains(&self.half_width) {
            return Err(ChartError::InvalidCatcher {
                field: CatcherField::HalfWidth,
                value: self.half_width,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(CatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn clock_rate_scales_dash_speed() {
        let config = CatcherConfig::new(0.003, 0.1).with_clock_rate(1.5);
        assert!((config.effective_dash_speed() - 0.002).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_parameters() {
        let err = CatcherConfig::new(0.0, 0.1).validate().unwrap_err();
        assert!(matches!(
            err,
            ChartError::InvalidCatcher {
                field: CatcherField::DashSpeed,
                ..
            }
        ));
        let err = CatcherConfig::new(0.01, 0.7).validate().unwrap_err();
        assert!(matches!(
            err,
            ChartError::InvalidCatcher {
                field: CatcherField::HalfWidth,
                ..
            }
        ));
        let err = CatcherConfig::new(0.01, f64::NAN).validate().unwrap_err();
        assert!(matches!(
            err,
            ChartError::InvalidCatcher {
                field: CatcherField::HalfWidth,
                ..
            }
        ));
        let err = CatcherConfig::default()
            .with_clock_rate(-1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ChartError::InvalidCatcher {
                field: CatcherField::ClockRate,
                ..
            }
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: CatcherConfig =
            serde_json::from_str(r#"{"half_width":0.1}"#).expect("config should parse");
        assert_eq!(config.half_width, 0.1);
        assert_eq!(config.dash_speed, DASH_SPEED_DEFAULT);
        assert_eq!(config.clock_rate, CLOCK_RATE_DEFAULT);
    }
}
