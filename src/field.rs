use crate::config::PetalConfig;
use crate::petal::Petal;

/// Number of petals for a page: `base` per viewport of content, never fewer
/// than `base` and never more than the configured cap.
pub fn target_count(page_height: f64, viewport_height: f64, config: &PetalConfig) -> usize {
    let base = config.base_density;
    if viewport_height.is_nan() || viewport_height <= 0.0 || !page_height.is_finite() {
        return base;
    }
    let screens = (page_height / viewport_height).ceil().max(0.0) as usize;
    base.saturating_mul(screens).min(config.max_petals).max(base)
}

/// The live petal set plus the random source used to (re)spawn it.
pub struct PetalField {
    petals: Vec<Petal>,
    rng: fastrand::Rng,
}

impl PetalField {
    pub fn new(seed: u64) -> Self {
        Self {
            petals: Vec::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Replace the whole set with `count` fresh petals.
    pub fn populate(&mut self, count: usize, width: f64, height: f64, config: &PetalConfig) {
        self.petals.clear();
        self.petals.reserve(count);
        for _ in 0..count {
            self.petals.push(Petal::spawn(&mut self.rng, width, height, config));
        }
    }

    pub fn clear(&mut self) {
        self.petals.clear();
    }

    /// Advance every petal one frame; returns how many were recycled.
    pub fn step(&mut self, width: f64, height: f64, config: &PetalConfig) -> usize {
        let mut recycled = 0;
        for petal in &mut self.petals {
            if petal.update(&mut self.rng, width, height, config) {
                recycled += 1;
            }
        }
        recycled
    }

    pub fn petals(&self) -> &[Petal] {
        &self.petals
    }

    pub fn len(&self) -> usize {
        self.petals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.petals.is_empty()
    }
}
