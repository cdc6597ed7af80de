//! default tunables; every value here can be overridden through `LevelConfig`
//!
//! Core geometry is in cell units (1.0 == one grid cell). The physics values
//! are the classic pixel constants divided by the 8‑pixel tile.
use bevy::prelude::*;

/// -------- tiles & level size --------
pub const TILE_SIZE: f32 = 8.0;
pub const LEVEL_WIDTH: usize = 120;
pub const LEVEL_HEIGHT: usize = 60;

/// -------- generation --------
pub const CAVITY_RADIUS: f32 = 3.0;
pub const GOAL_RADIUS: f32 = 3.0;
pub const CORNER_MARGIN: i32 = 6;
pub const MAX_GENERATION_ATTEMPTS: u32 = 8;
/// seed offset between consecutive levels of one session
pub const LEVEL_SEED_STRIDE: u64 = 0x9E37_79B9;

/// -------- worm phys --------
pub const WORM_RADIUS: f32 = 1.5;
pub const WALK_SPEED: f32 = 12.5;
pub const GRAVITY: f32 = 50.0;
pub const JUMP_SPEED: f32 = 31.25;
pub const TERMINAL_VELOCITY: f32 = 37.5;
pub const GROUND_FRICTION: f32 = 0.8;
pub const AIR_DRAG: f32 = 0.95;
pub const MAX_STEP_HEIGHT: f32 = 1.0;
pub const CONTACT_TOLERANCE: f32 = 1.0e-3;
pub const MAX_TICK_DT: f32 = 0.1;
pub const COLLISION_STEPS: i32 = 4;

/// -------- supplies --------
pub const STARTING_GAS: u32 = 100;
pub const MAX_GAS: u32 = 200;
pub const STARTING_DYNAMITE: u32 = 10;
pub const MAX_BATTERY: f32 = 100.0;
pub const BATTERY_RECHARGE: f32 = 10.0;
pub const MIN_LASER_CHARGE: f32 = 10.0;
pub const RAPID_FIRE_WINDOW: f32 = 2.0;
pub const RAPID_FIRE_LIMIT: u32 = 10;
pub const LASER_COOLDOWN: f32 = 5.0;

/// -------- pickups --------
pub const GAS_BOTTLES: usize = 12;
pub const DYNAMITE_STICKS: usize = 8;
pub const GAS_BOTTLE_AMOUNT: u32 = 50;
pub const PICKUP_SPACING: i32 = 10;
pub const PICKUP_ATTEMPTS: usize = 2000;
pub const PICKUP_MIN_DEPTH: f32 = 0.4;

/// -------- colours (render only) --------
pub const DIRT_COLOR: Color = Color::srgb(0.55, 0.27, 0.07);
pub const ROCK_COLOR: Color = Color::srgb(0.50, 0.50, 0.50);
pub const METAL_COLOR: Color = Color::srgb(0.25, 0.25, 0.25);
pub const WORM_COLOR: Color = Color::srgb(0.63, 0.32, 0.18);
pub const GOAL_COLOR: Color = Color::srgb(0.55, 0.2, 0.9);
pub const GAS_COLOR: Color = Color::srgb(0.0, 0.59, 1.0);
pub const STICK_COLOR: Color = Color::srgb(0.78, 0.0, 0.0);

/// -------- tile colour variation --------
pub const COLOR_NOISE_SCALE: f64 = 0.15;
pub const COLOR_VARIATION_LEVELS: u32 = 4;
pub const COLOR_VARIATION_STRENGTH: f32 = 0.12;

/// -------- aiming --------
/// radians per second while W / S is held
pub const AIM_TURN_RATE: f32 = 2.5;
/// cells in front of the worm where keyboard tool use lands
pub const AIM_DISTANCE: f32 = 2.5;
