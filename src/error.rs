use std::path::PathBuf;

use bevy::math::IVec2;
use thiserror::Error;

use crate::terrain::Material;

/// Which of the two anchor cells a placement error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Goal,
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::Start => f.write_str("start"),
            Anchor::Goal => f.write_str("goal"),
        }
    }
}

/// Errors raised while building a level.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("level grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("noise thresholds must be ascending, got ({empty}, {dirt}, {rock})")]
    InvalidThresholds { empty: f64, dirt: f64, rock: f64 },

    #[error("noise config needs at least one octave with positive total weight")]
    NoOctaves,

    #[error("no tool in the catalog can destroy {0:?}")]
    UncoveredMaterial(Material),

    #[error("{role} cell ({}, {}) lies outside the grid", cell.x, cell.y)]
    OutOfBounds { role: Anchor, cell: IVec2 },

    #[error("cavity radius {cavity} cannot hold the worm, needs at least {needed}")]
    CavityTooSmall { cavity: f32, needed: f32 },

    #[error("worm does not fit at start cell ({}, {})", cell.x, cell.y)]
    StartBlocked { cell: IVec2 },

    #[error("start and goal coincide at ({}, {})", cell.x, cell.y)]
    Coincident { cell: IVec2 },

    #[error("level generation failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Placement failures can be fixed by another seed; config errors cannot.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::OutOfBounds { .. }
                | GenerationError::Coincident { .. }
                | GenerationError::StartBlocked { .. }
        )
    }
}

/// Errors raised when placing the worm into a grid.
#[derive(Debug, Error, PartialEq)]
pub enum SpawnError {
    #[error("spawn cell ({}, {}) lies outside the grid", cell.x, cell.y)]
    OutOfBounds { cell: IVec2 },

    #[error("spawn cell ({}, {}) overlaps solid terrain", cell.x, cell.y)]
    Blocked { cell: IVec2 },
}

/// Errors raised while reading a level config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Errors raised by the game coordinator.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}
