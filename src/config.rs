//! read‑only level configuration, loadable from RON
use std::path::Path;

use bevy::math::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConfigError, GenerationError};
use crate::noise_field::Octave;
use crate::terrain::Material;
use crate::tools::ToolCatalog;

/// Density cut points: below `empty` ⇒ Empty, below `dirt` ⇒ Dirt,
/// below `rock` ⇒ Rock, otherwise Metal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub empty: f64,
    pub dirt: f64,
    pub rock: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            empty: -0.3,
            dirt: 0.0,
            rock: 0.4,
        }
    }
}

impl Thresholds {
    pub fn classify(&self, density: f64) -> Material {
        if density < self.empty {
            Material::Empty
        } else if density < self.dirt {
            Material::Dirt
        } else if density < self.rock {
            Material::Rock
        } else {
            Material::Metal
        }
    }

    fn is_ascending(&self) -> bool {
        self.empty <= self.dirt && self.dirt <= self.rock
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub octaves: Vec<Octave>,
    pub thresholds: Thresholds,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: vec![
                Octave { frequency: 0.08, weight: 1.0 },
                Octave { frequency: 0.16, weight: 0.5 },
                Octave { frequency: 0.32, weight: 0.25 },
            ],
            thresholds: Thresholds::default(),
        }
    }
}

/// How the start and goal cells are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    Fixed { start: (i32, i32), goal: (i32, i32) },
    /// start near the top‑left corner, goal near the bottom‑right
    Corners { margin: i32 },
    /// seeded random cells at least `min_distance` apart when possible,
    /// kept `inset` cells away from the border
    Random { min_distance: f32 },
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Corners {
            margin: CORNER_MARGIN,
        }
    }
}

impl Placement {
    /// Picks (start, goal). The result is not validated here.
    pub fn resolve(
        &self,
        width: usize,
        height: usize,
        inset: i32,
        rng: &mut impl Rng,
    ) -> (IVec2, IVec2) {
        let (w, h) = (width as i32, height as i32);
        match *self {
            Placement::Fixed { start, goal } => (IVec2::from(start), IVec2::from(goal)),
            Placement::Corners { margin } => {
                let mx = margin.clamp(0, w / 4);
                let my = margin.clamp(0, h / 4);
                (IVec2::new(mx, my), IVec2::new(w - 1 - mx, h - 1 - my))
            }
            Placement::Random { min_distance } => {
                let start = random_cell(w, h, inset, rng);
                let mut goal = random_cell(w, h, inset, rng);
                for _ in 0..16 {
                    if goal.as_vec2().distance(start.as_vec2()) >= min_distance {
                        break;
                    }
                    goal = random_cell(w, h, inset, rng);
                }
                (start, goal)
            }
        }
    }
}

/// the inset shrinks on grids too small to honour it
fn random_cell(w: i32, h: i32, inset: i32, rng: &mut impl Rng) -> IVec2 {
    let ix = inset.clamp(0, (w - 1).max(0) / 2);
    let iy = inset.clamp(0, (h - 1).max(0) / 2);
    IVec2::new(
        rng.gen_range(ix..(w - ix).max(ix + 1)),
        rng.gen_range(iy..(h - iy).max(iy + 1)),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub worm_radius: f32,
    pub walk_speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub terminal_velocity: f32,
    pub ground_friction: f32,
    pub air_drag: f32,
    pub max_step_height: f32,
    pub contact_tolerance: f32,
    pub max_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            worm_radius: WORM_RADIUS,
            walk_speed: WALK_SPEED,
            gravity: GRAVITY,
            jump_speed: JUMP_SPEED,
            terminal_velocity: TERMINAL_VELOCITY,
            ground_friction: GROUND_FRICTION,
            air_drag: AIR_DRAG,
            max_step_height: MAX_STEP_HEIGHT,
            contact_tolerance: CONTACT_TOLERANCE,
            max_dt: MAX_TICK_DT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    pub starting_gas: u32,
    pub max_gas: u32,
    pub starting_dynamite: u32,
    pub max_battery: f32,
    /// battery units per second
    pub battery_recharge: f32,
    pub min_laser_charge: f32,
    pub rapid_fire_window: f32,
    pub rapid_fire_limit: u32,
    pub laser_cooldown: f32,
    /// nothing is ever spent
    pub unlimited: bool,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            starting_gas: STARTING_GAS,
            max_gas: MAX_GAS,
            starting_dynamite: STARTING_DYNAMITE,
            max_battery: MAX_BATTERY,
            battery_recharge: BATTERY_RECHARGE,
            min_laser_charge: MIN_LASER_CHARGE,
            rapid_fire_window: RAPID_FIRE_WINDOW,
            rapid_fire_limit: RAPID_FIRE_LIMIT,
            laser_cooldown: LASER_COOLDOWN,
            unlimited: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub gas_bottles: usize,
    pub dynamite_sticks: usize,
    pub gas_per_bottle: u32,
    /// minimum Chebyshev gap between two items, in cells
    pub spacing: i32,
    pub attempts: usize,
    /// fraction of the height above which nothing is placed
    pub min_depth: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            gas_bottles: GAS_BOTTLES,
            dynamite_sticks: DYNAMITE_STICKS,
            gas_per_bottle: GAS_BOTTLE_AMOUNT,
            spacing: PICKUP_SPACING,
            attempts: PICKUP_ATTEMPTS,
            min_depth: PICKUP_MIN_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: usize,
    pub height: usize,
    /// pixels per cell; only the render layer reads it
    pub tile_size: f32,
    pub noise: NoiseConfig,
    pub sky_fraction: f32,
    pub cavity_radius: f32,
    pub goal_radius: f32,
    pub placement: Placement,
    pub max_attempts: u32,
    pub tools: ToolCatalog,
    pub physics: PhysicsConfig,
    pub supplies: SupplyConfig,
    pub pickups: PickupConfig,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: LEVEL_WIDTH,
            height: LEVEL_HEIGHT,
            tile_size: TILE_SIZE,
            noise: NoiseConfig::default(),
            sky_fraction: 0.0,
            cavity_radius: CAVITY_RADIUS,
            goal_radius: GOAL_RADIUS,
            placement: Placement::default(),
            max_attempts: MAX_GENERATION_ATTEMPTS,
            tools: ToolCatalog::default(),
            physics: PhysicsConfig::default(),
            supplies: SupplyConfig::default(),
            pickups: PickupConfig::default(),
        }
    }
}

impl LevelConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// Cells a random anchor keeps from the border so the worm fits.
    pub fn anchor_inset(&self) -> i32 {
        self.physics.worm_radius.max(0.0).ceil() as i32 + 1
    }

    pub fn sky_rows(&self) -> usize {
        (self.height as f32 * self.sky_fraction.clamp(0.0, 1.0)) as usize
    }

    /// Checks that do not depend on the seed.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.width == 0 || self.height == 0 {
            return Err(GenerationError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        let t = self.noise.thresholds;
        if !t.is_ascending() {
            return Err(GenerationError::InvalidThresholds {
                empty: t.empty,
                dirt: t.dirt,
                rock: t.rock,
            });
        }
        // every cell centred within the cavity is cleared, so the worm fits
        // once the cavity reaches past its radius by half a cell diagonal
        let needed = self.physics.worm_radius + std::f32::consts::FRAC_1_SQRT_2;
        if self.cavity_radius < needed {
            return Err(GenerationError::CavityTooSmall {
                cavity: self.cavity_radius,
                needed,
            });
        }
        let weight: f64 = self.noise.octaves.iter().map(|o| o.weight.abs()).sum();
        if weight <= 0.0 {
            return Err(GenerationError::NoOctaves);
        }
        // the sky ground line is always dirt, so it has to be covered too
        if let Some(m) = Material::SOLIDS.into_iter().find(|m| !self.tools.covers(*m)) {
            return Err(GenerationError::UncoveredMaterial(m));
        }
        Ok(())
    }
}
