//! Tunables for the petal field and the copy buttons.
//!
//! The petal config can be overridden per page through a JSON blob in the
//! canvas element's `data-petal-config` attribute. Keys are camelCase and
//! any key left out keeps its default, so `{"maxPetals": 80}` is valid.

use serde::{Deserialize, Serialize};

use crate::error::{PetalError, Result};

/// Closed interval `[min, max]`, written as a two element array in JSON.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span(pub f64, pub f64);

impl Span {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.0 && value <= self.1
    }

    /// Uniform sample from the span.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        self.0 + rng.f64() * (self.1 - self.0)
    }

    fn is_ordered(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.0 <= self.1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PetalConfig {
    /// Static asset path of the petal sprite.
    pub sprite_src: String,
    /// Petals per viewport height of content.
    pub base_density: usize,
    /// Hard cap on the petal count regardless of page length.
    pub max_petals: usize,
    /// Upper bound on the device pixel ratio used for the backing buffer.
    pub max_device_scale: f64,
    /// Horizontal spawn overhang, spawn ceiling and bottom exit margin.
    pub spawn_margin: f64,
    /// How far a petal may drift sideways past either edge before recycling.
    pub exit_margin_x: f64,
    pub size: Span,
    pub speed_x: Span,
    pub speed_y: Span,
    pub opacity: Span,
    pub rotation_speed: Span,
    pub sway_speed: Span,
    pub sway_amount: Span,
}

impl Default for PetalConfig {
    fn default() -> Self {
        Self {
            sprite_src: "/images/flor-de-sakura.png".to_string(),
            base_density: 60,
            max_petals: 120,
            max_device_scale: 2.0,
            spawn_margin: 100.0,
            exit_margin_x: 200.0,
            size: Span(25.0, 45.0),
            speed_x: Span(-0.1, 0.1),
            speed_y: Span(0.2, 0.6),
            opacity: Span(0.5, 0.9),
            rotation_speed: Span(-0.003, 0.003),
            sway_speed: Span(0.005, 0.015),
            sway_amount: Span(0.2, 0.5),
        }
    }
}

impl PetalConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let spans = [
            self.size,
            self.speed_x,
            self.speed_y,
            self.opacity,
            self.rotation_speed,
            self.sway_speed,
            self.sway_amount,
        ];
        if spans.iter().any(|s| !s.is_ordered()) {
            return Err(PetalError::InvalidConfig("every range needs min <= max"));
        }
        if self.opacity.min() < 0.0 || self.opacity.max() > 1.0 {
            return Err(PetalError::InvalidConfig("opacity must stay within [0, 1]"));
        }
        if self.base_density == 0 {
            return Err(PetalError::InvalidConfig("baseDensity must be positive"));
        }
        if self.max_petals < self.base_density {
            return Err(PetalError::InvalidConfig("maxPetals must be >= baseDensity"));
        }
        if self.max_device_scale.is_nan() || self.max_device_scale < 1.0 {
            return Err(PetalError::InvalidConfig("maxDeviceScale must be >= 1"));
        }
        if self.sprite_src.is_empty() {
            return Err(PetalError::InvalidConfig("spriteSrc is empty"));
        }
        Ok(())
    }
}

/// Copy button behavior. Per-button `data-phone` overrides `phone`.
#[derive(Clone, Debug, PartialEq)]
pub struct CopyConfig {
    pub phone: String,
    pub success_text: String,
    pub feedback_ms: u32,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            phone: "947620202".to_string(),
            success_text: "¡Copiado!".to_string(),
            feedback_ms: 6000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PetalConfig::from_json(r#"{"maxPetals": 90, "size": [10, 20]}"#).unwrap();
        assert_eq!(config.max_petals, 90);
        assert_eq!(config.size, Span(10.0, 20.0));
        assert_eq!(config.base_density, 60);
        assert_eq!(config.sprite_src, "/images/flor-de-sakura.png");
    }

    #[test]
    fn margins_use_their_documented_keys() {
        let config =
            PetalConfig::from_json(r#"{"spawnMargin": 80, "exitMarginX": 150}"#).unwrap();
        assert_eq!(config.spawn_margin, 80.0);
        assert_eq!(config.exit_margin_x, 150.0);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = PetalConfig::from_json(r#"{"speedY": [0.6, 0.2]}"#).unwrap_err();
        assert!(matches!(err, PetalError::InvalidConfig(_)));
    }

    #[test]
    fn cap_below_base_is_rejected() {
        let err = PetalConfig::from_json(r#"{"baseDensity": 60, "maxPetals": 30}"#).unwrap_err();
        assert!(matches!(err, PetalError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PetalConfig::from_json("{maxPetals:").unwrap_err();
        assert!(matches!(err, PetalError::ConfigParse(_)));
    }

    #[test]
    fn span_sample_stays_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        let span = Span(-0.003, 0.003);
        for _ in 0..1000 {
            assert!(span.contains(span.sample(&mut rng)));
        }
    }
}
