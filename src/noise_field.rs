//! seeded, spatially coherent scalar field used to assign materials
use bevy::math::IVec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// One octave of the density field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    /// sample spacing in cycles per cell
    pub frequency: f64,
    pub weight: f64,
}

/// Anything that yields a density in `[-1, 1]` for a cell.
pub trait ScalarField {
    fn sample(&self, x: f64, y: f64) -> f64;

    /// density at the centre of a grid cell
    fn sample_cell(&self, cell: IVec2) -> f64 {
        self.sample(cell.x as f64 + 0.5, cell.y as f64 + 0.5)
    }
}

/// Weighted sum of Perlin octaves, each seeded from the level seed.
pub struct NoiseField {
    octaves: Vec<(Perlin, Octave)>,
    total_weight: f64,
}

impl NoiseField {
    pub fn new(seed: u64, octaves: &[Octave]) -> Self {
        let base = fold_seed(seed);
        let octaves: Vec<_> = octaves
            .iter()
            .enumerate()
            .map(|(i, o)| (Perlin::new(base.wrapping_add(i as u32 * 7919)), *o))
            .collect();
        let total_weight = octaves.iter().map(|(_, o)| o.weight.abs()).sum();
        Self {
            octaves,
            total_weight,
        }
    }
}

impl ScalarField for NoiseField {
    fn sample(&self, x: f64, y: f64) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        let sum: f64 = self
            .octaves
            .iter()
            .map(|(perlin, o)| perlin.get([x * o.frequency, y * o.frequency]) * o.weight)
            .sum();
        (sum / self.total_weight).clamp(-1.0, 1.0)
    }
}

/// Single‑octave convenience: `noise(seed, x, y)`.
pub fn noise(seed: u64, x: f64, y: f64) -> f64 {
    Perlin::new(fold_seed(seed)).get([x, y]).clamp(-1.0, 1.0)
}

/// Perlin takes a 32‑bit seed; mix both halves so high bits still matter.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
