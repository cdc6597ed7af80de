//! terrain core for a worm‑digging game
//!
//! The core (`terrain`, `tools`, `dig`, `worm`, `session`) is plain Rust in
//! cell units and runs without an `App`. `plugin` wraps it for Bevy, while
//! `render`, `input` and `camera` hold the windowed systems.

pub mod camera;
pub mod components;
pub mod config;
pub mod constants;
pub mod dig;
pub mod error;
pub mod input;
pub mod noise_field;
pub mod pickups;
pub mod plugin;
pub mod render;
pub mod session;
pub mod supplies;
pub mod terrain;
pub mod tools;
pub mod worm;

pub use config::LevelConfig;
pub use dig::apply_tool;
pub use error::{ConfigError, GenerationError, SessionError, SpawnError};
pub use plugin::{DiggerPlugin, LevelStarted, TerrainChanged};
pub use session::{Session, TickReport, WormCommand};
pub use terrain::{generate_level, generate_level_with_retries, Level, Material, TerrainGrid};
pub use tools::{Tool, ToolCatalog, ToolKind, ToolShape};
pub use worm::{resolve_movement, Worm};
