use std::f64::consts::TAU;

use crate::config::{PetalConfig, Span};

/// One falling petal, in logical (CSS pixel) units.
///
/// Petals are never dropped once spawned; leaving the field re-rolls every
/// attribute in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Petal {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub opacity: f64,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub sway_phase: f64,
    pub sway_speed: f64,
    pub sway_amount: f64,
}

impl Petal {
    pub fn spawn(rng: &mut fastrand::Rng, width: f64, height: f64, config: &PetalConfig) -> Self {
        let mut petal = Self {
            x: 0.0,
            y: 0.0,
            size: 0.0,
            speed_x: 0.0,
            speed_y: 0.0,
            opacity: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            sway_phase: 0.0,
            sway_speed: 0.0,
            sway_amount: 0.0,
        };
        petal.reset(rng, width, height, config);
        petal
    }

    /// Place the petal somewhere above the visible field, staggered over half
    /// the field height so the set doesn't arrive as one sheet.
    pub fn reset(&mut self, rng: &mut fastrand::Rng, width: f64, height: f64, config: &PetalConfig) {
        let margin = config.spawn_margin;
        self.x = Span(-margin, width + margin).sample(rng);
        self.y = Span(-height * 0.5, -margin).sample(rng);
        self.size = config.size.sample(rng);
        self.speed_y = config.speed_y.sample(rng);
        self.speed_x = config.speed_x.sample(rng);
        self.opacity = config.opacity.sample(rng);
        self.rotation = Span(0.0, TAU).sample(rng);
        self.rotation_speed = config.rotation_speed.sample(rng);
        self.sway_phase = Span(0.0, TAU).sample(rng);
        self.sway_speed = config.sway_speed.sample(rng);
        self.sway_amount = config.sway_amount.sample(rng);
    }

    /// Advance one frame. Returns true when the petal left the field and was
    /// recycled.
    pub fn update(&mut self, rng: &mut fastrand::Rng, width: f64, height: f64, config: &PetalConfig) -> bool {
        self.y += self.speed_y;
        self.x += self.speed_x;

        self.sway_phase += self.sway_speed;
        self.x += self.sway_phase.sin() * self.sway_amount;

        self.rotation += self.rotation_speed;

        if self.is_outside(width, height, config) {
            self.reset(rng, width, height, config);
            return true;
        }
        false
    }

    pub fn is_outside(&self, width: f64, height: f64, config: &PetalConfig) -> bool {
        self.y > height + config.spawn_margin
            || self.x < -config.exit_margin_x
            || self.x > width + config.exit_margin_x
    }
}
