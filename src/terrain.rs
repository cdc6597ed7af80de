//! material grid, level generation & grid helpers
use bevy::log::{info, warn};
use bevy::math::{IVec2, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{LevelConfig, Thresholds};
use crate::error::{Anchor, GenerationError};
use crate::noise_field::{NoiseField, ScalarField};
use crate::pickups::Pickups;

/// helper conversions between cell space (row‑0 = top, y down) and
/// Bevy world space (y up, `tile_size` pixels per cell)
pub fn cell_to_world(grid_h: usize, tile_size: f32, p: Vec2) -> Vec2 {
    Vec2::new(p.x * tile_size, (grid_h as f32 - p.y) * tile_size)
}
pub fn world_to_cell(grid_h: usize, tile_size: f32, w: Vec2) -> Vec2 {
    Vec2::new(w.x / tile_size, grid_h as f32 - w.y / tile_size)
}

/// -------- materials --------
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Material {
    #[default]
    Empty = 0,
    Dirt = 1,
    Rock = 2,
    Metal = 3,
}

impl Material {
    pub const SOLIDS: [Material; 3] = [Material::Dirt, Material::Rock, Material::Metal];

    /// 0 for `Empty`, rising with toughness
    pub fn hardness(self) -> u8 {
        self as u8
    }

    pub fn is_solid(self) -> bool {
        self != Material::Empty
    }
}

/// -------- grid --------
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    cells: Vec<Material>,
}

impl TerrainGrid {
    /// all‑`Empty` grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Material::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    #[inline]
    fn idx(&self, cell: IVec2) -> usize {
        cell.y as usize * self.width + cell.x as usize
    }

    /// `None` outside the grid
    pub fn material_at(&self, cell: IVec2) -> Option<Material> {
        self.in_bounds(cell).then(|| self.cells[self.idx(cell)])
    }

    /// shortcut used by physics; out‑of‑bounds is treated as solid
    pub fn is_solid(&self, cell: IVec2) -> bool {
        self.material_at(cell).map_or(true, Material::is_solid)
    }

    /// Writes a cell and returns the previous material. Writes outside the
    /// grid are dropped and return `None`.
    pub fn set(&mut self, cell: IVec2, material: Material) -> Option<Material> {
        if !self.in_bounds(cell) {
            return None;
        }
        let idx = self.idx(cell);
        Some(std::mem::replace(&mut self.cells[idx], material))
    }

    /// Force every in‑bounds cell whose centre lies within `radius` of the
    /// centre of `center` to `Empty`.
    pub fn carve_cavity(&mut self, center: IVec2, radius: f32) {
        let r = radius.ceil() as i32;
        let origin = cell_center(center);
        for dy in -r..=r {
            for dx in -r..=r {
                let cell = center + IVec2::new(dx, dy);
                if cell_center(cell).distance(origin) <= radius {
                    self.set(cell, Material::Empty);
                }
            }
        }
    }

    /// (cell, material) in row‑major order
    pub fn cells(&self) -> impl Iterator<Item = (IVec2, Material)> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, m)| (IVec2::new((i % w) as i32, (i / w) as i32), *m))
    }

    pub fn count(&self, material: Material) -> usize {
        self.cells.iter().filter(|m| **m == material).count()
    }

    /// Does a circle overlap any solid (or out‑of‑bounds) cell?
    pub fn circle_overlaps_solid(&self, center: Vec2, radius: f32) -> bool {
        if radius <= 0.0 {
            return self.is_solid(cell_of(center));
        }
        let min = (center - Vec2::splat(radius)).floor().as_ivec2();
        let max = (center + Vec2::splat(radius)).floor().as_ivec2();
        let r2 = radius * radius;
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let cell = IVec2::new(x, y);
                if !self.is_solid(cell) {
                    continue;
                }
                let lo = cell.as_vec2();
                let closest = center.clamp(lo, lo + Vec2::ONE);
                if closest.distance_squared(center) < r2 {
                    return true;
                }
            }
        }
        false
    }
}

pub fn cell_center(cell: IVec2) -> Vec2 {
    cell.as_vec2() + Vec2::splat(0.5)
}

pub fn cell_of(p: Vec2) -> IVec2 {
    p.floor().as_ivec2()
}

/* ---------- generation ---------- */

/// One generated level: grid plus the anchors and loose items on it.
#[derive(Debug, Clone)]
pub struct Level {
    pub grid: TerrainGrid,
    pub start: IVec2,
    pub goal: IVec2,
    pub pickups: Pickups,
    pub seed: u64,
}

/// Fill every cell from the density field, mapping density through the
/// thresholds. Rows above `sky_rows` stay `Empty` and the row at
/// `sky_rows` becomes a `Dirt` ground line.
pub fn fill_from_field(
    grid: &mut TerrainGrid,
    field: &impl ScalarField,
    thresholds: &Thresholds,
    sky_rows: usize,
) {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = IVec2::new(x as i32, y as i32);
            let material = if y < sky_rows {
                Material::Empty
            } else if sky_rows > 0 && y == sky_rows {
                Material::Dirt
            } else {
                thresholds.classify(field.sample_cell(cell))
            };
            grid.set(cell, material);
        }
    }
}

/// Build a level for exactly this seed.
pub fn generate_level(config: &LevelConfig, seed: u64) -> Result<Level, GenerationError> {
    config.validate()?;

    let (width, height) = (config.width, config.height);
    let mut rng = StdRng::seed_from_u64(seed);
    let (start, goal) = config
        .placement
        .resolve(width, height, config.anchor_inset(), &mut rng);

    let bounds = TerrainGrid::new(width, height);
    if !bounds.in_bounds(start) {
        return Err(GenerationError::OutOfBounds {
            role: Anchor::Start,
            cell: start,
        });
    }
    if !bounds.in_bounds(goal) {
        return Err(GenerationError::OutOfBounds {
            role: Anchor::Goal,
            cell: goal,
        });
    }
    if start == goal {
        return Err(GenerationError::Coincident { cell: start });
    }

    let mut grid = bounds;
    let field = NoiseField::new(seed, &config.noise.octaves);
    let sky_rows = config.sky_rows();
    fill_from_field(&mut grid, &field, &config.noise.thresholds, sky_rows);

    grid.carve_cavity(start, config.cavity_radius);
    grid.carve_cavity(goal, config.cavity_radius);
    // the cavity is clipped at the border, which is solid
    if grid.circle_overlaps_solid(cell_center(start), config.physics.worm_radius) {
        return Err(GenerationError::StartBlocked { cell: start });
    }

    let min_row = sky_rows.max((height as f32 * config.pickups.min_depth) as usize);
    let pickups = Pickups::scatter(&grid, &config.pickups, min_row, &mut rng);

    info!(
        "generated {}x{} level (seed {}): dirt {} rock {} metal {} pickups {}",
        width,
        height,
        seed,
        grid.count(Material::Dirt),
        grid.count(Material::Rock),
        grid.count(Material::Metal),
        pickups.len()
    );

    Ok(Level {
        grid,
        start,
        goal,
        pickups,
        seed,
    })
}

/// Build a level, moving on to a derived seed whenever placement fails.
pub fn generate_level_with_retries(
    config: &LevelConfig,
    seed: u64,
) -> Result<Level, GenerationError> {
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        let attempt_seed = seed.wrapping_add(attempt as u64);
        match generate_level(config, attempt_seed) {
            Ok(level) => return Ok(level),
            Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                warn!("level attempt {} (seed {}) failed: {}", attempt + 1, attempt_seed, e);
                attempt += 1;
            }
            Err(e) if e.is_retryable() => {
                return Err(GenerationError::RetriesExhausted {
                    attempts,
                    last: Box::new(e),
                })
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Placement;

    struct Flat(f64);
    impl ScalarField for Flat {
        fn sample(&self, _: f64, _: f64) -> f64 {
            self.0
        }
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            empty: -0.3,
            dirt: 0.0,
            rock: 0.4,
        }
    }

    #[test]
    fn hardness_order() {
        assert!(Material::Empty < Material::Dirt);
        assert!(Material::Dirt < Material::Rock);
        assert!(Material::Rock < Material::Metal);
        assert_eq!(Material::Metal.hardness(), 3);
    }

    #[test]
    fn out_of_bounds_reads_solid_and_writes_drop() {
        let mut grid = TerrainGrid::new(4, 3);
        assert_eq!(grid.material_at(IVec2::new(4, 0)), None);
        assert!(grid.is_solid(IVec2::new(-1, 1)));
        assert!(!grid.is_solid(IVec2::new(1, 1)));
        assert_eq!(grid.set(IVec2::new(0, 3), Material::Rock), None);
        assert_eq!(grid.set(IVec2::new(3, 2), Material::Rock), Some(Material::Empty));
        assert_eq!(grid.material_at(IVec2::new(3, 2)), Some(Material::Rock));
    }

    #[test]
    fn thresholds_map_density_bands() {
        for (density, expected) in [
            (-0.9, Material::Empty),
            (-0.1, Material::Dirt),
            (0.2, Material::Rock),
            (0.7, Material::Metal),
        ] {
            let mut grid = TerrainGrid::new(3, 3);
            fill_from_field(&mut grid, &Flat(density), &thresholds(), 0);
            assert_eq!(grid.count(expected), 9, "density {density}");
        }
    }

    #[test]
    fn sky_band_and_ground_line() {
        let mut grid = TerrainGrid::new(5, 6);
        fill_from_field(&mut grid, &Flat(0.9), &thresholds(), 2);
        for x in 0..5 {
            assert_eq!(grid.material_at(IVec2::new(x, 0)), Some(Material::Empty));
            assert_eq!(grid.material_at(IVec2::new(x, 1)), Some(Material::Empty));
            assert_eq!(grid.material_at(IVec2::new(x, 2)), Some(Material::Dirt));
            assert_eq!(grid.material_at(IVec2::new(x, 3)), Some(Material::Metal));
        }
    }

    #[test]
    fn cavity_clears_disc_and_clips_at_edges() {
        let mut grid = TerrainGrid::new(8, 8);
        fill_from_field(&mut grid, &Flat(0.9), &thresholds(), 0);
        grid.carve_cavity(IVec2::new(0, 0), 2.0);
        assert_eq!(grid.material_at(IVec2::new(0, 0)), Some(Material::Empty));
        assert_eq!(grid.material_at(IVec2::new(2, 0)), Some(Material::Empty));
        assert_eq!(grid.material_at(IVec2::new(2, 2)), Some(Material::Metal));
        assert_eq!(grid.material_at(IVec2::new(3, 0)), Some(Material::Metal));
    }

    #[test]
    fn circle_overlap_uses_cell_boxes() {
        let mut grid = TerrainGrid::new(10, 10);
        grid.set(IVec2::new(5, 5), Material::Rock);
        assert!(grid.circle_overlaps_solid(Vec2::new(4.5, 5.5), 1.0));
        assert!(!grid.circle_overlaps_solid(Vec2::new(3.9, 5.5), 1.0));
        // corner distance is sqrt(0.5) ≈ 0.707
        assert!(!grid.circle_overlaps_solid(Vec2::new(4.5, 4.5), 0.7));
        assert!(grid.circle_overlaps_solid(Vec2::new(4.5, 4.5), 0.71));
        // grid border counts as wall
        assert!(grid.circle_overlaps_solid(Vec2::new(0.5, 5.0), 0.6));
    }

    #[test]
    fn world_conversion_round_trips() {
        let p = Vec2::new(3.25, 7.5);
        let w = cell_to_world(20, 8.0, p);
        assert_eq!(w, Vec2::new(26.0, 100.0));
        assert_eq!(world_to_cell(20, 8.0, w), p);
    }

    #[test]
    fn fixed_placement_outside_grid_is_rejected() {
        let config = LevelConfig {
            width: 10,
            height: 10,
            placement: Placement::Fixed {
                start: (2, 2),
                goal: (12, 2),
            },
            ..LevelConfig::default()
        };
        let err = generate_level(&config, 1).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::OutOfBounds {
                role: Anchor::Goal,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn coincident_anchors_exhaust_retries() {
        let config = LevelConfig {
            width: 10,
            height: 10,
            max_attempts: 3,
            placement: Placement::Fixed {
                start: (4, 4),
                goal: (4, 4),
            },
            ..LevelConfig::default()
        };
        match generate_level_with_retries(&config, 7) {
            Err(GenerationError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, GenerationError::Coincident { .. }));
            }
            other => panic!("expected exhausted retries, got {other:?}"),
        }
    }

    #[test]
    fn start_on_the_border_is_blocked_and_retried() {
        let config = LevelConfig {
            width: 20,
            height: 20,
            max_attempts: 2,
            placement: Placement::Fixed {
                start: (0, 10),
                goal: (15, 15),
            },
            ..LevelConfig::default()
        };
        let err = generate_level(&config, 4).unwrap_err();
        assert!(matches!(err, GenerationError::StartBlocked { .. }));
        assert!(err.is_retryable());
        assert!(matches!(
            generate_level_with_retries(&config, 4),
            Err(GenerationError::RetriesExhausted { attempts: 2, .. })
        ));
    }

    #[test]
    fn random_anchors_always_fit_the_worm() {
        let config = LevelConfig {
            width: 50,
            height: 50,
            placement: Placement::Random { min_distance: 10.0 },
            ..LevelConfig::default()
        };
        for seed in 0..100 {
            let level = generate_level(&config, seed).unwrap();
            let start = cell_center(level.start);
            assert!(!level.grid.circle_overlaps_solid(start, config.physics.worm_radius));
        }
    }

    #[test]
    fn config_errors_are_not_retried() {
        let config = LevelConfig {
            width: 0,
            ..LevelConfig::default()
        };
        assert!(matches!(
            generate_level_with_retries(&config, 1),
            Err(GenerationError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn anchors_are_empty_after_generation() {
        let config = LevelConfig {
            width: 50,
            height: 50,
            ..LevelConfig::default()
        };
        for seed in 0..20 {
            let level = generate_level(&config, seed).unwrap();
            assert_eq!(level.grid.material_at(level.start), Some(Material::Empty));
            assert_eq!(level.grid.material_at(level.goal), Some(Material::Empty));
        }
    }
}
