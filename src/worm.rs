//! worm state, forces and the axis‑separated collision resolver
use bevy::math::{IVec2, Vec2};

use crate::config::PhysicsConfig;
use crate::constants::COLLISION_STEPS;
use crate::error::SpawnError;
use crate::terrain::{cell_center, TerrainGrid};

/// Per‑axis outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisState {
    #[default]
    Free,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResult {
    pub x: AxisState,
    pub y: AxisState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Worm {
    /// centre in cell units
    pub position: Vec2,
    /// cells per second, y down
    pub velocity: Vec2,
    pub radius: f32,
    pub tool_index: usize,
    /// unit vector
    pub aim: Vec2,
    /// -1 left, +1 right
    pub facing: f32,
    pub grounded: bool,
}

impl Worm {
    /// Place a worm at the centre of `cell`. The spot must be inside the
    /// grid and clear of solid terrain.
    pub fn spawn(grid: &TerrainGrid, cell: IVec2, radius: f32) -> Result<Self, SpawnError> {
        if !grid.in_bounds(cell) {
            return Err(SpawnError::OutOfBounds { cell });
        }
        let position = cell_center(cell);
        if grid.circle_overlaps_solid(position, radius) {
            return Err(SpawnError::Blocked { cell });
        }
        Ok(Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            tool_index: 0,
            aim: Vec2::X,
            facing: 1.0,
            grounded: false,
        })
    }

    /// Zero vectors are ignored.
    pub fn aim_at(&mut self, direction: Vec2) {
        if let Some(dir) = direction.try_normalize() {
            self.aim = dir;
        }
    }

    pub fn select_next_tool(&mut self, tool_count: usize) {
        if tool_count > 0 {
            self.tool_index = (self.tool_index + 1) % tool_count;
        }
    }

    /// Horizontal walk intent in `[-1, 1]`; 0 lets friction take over.
    /// Turning around mirrors the aim.
    pub fn walk(&mut self, input: f32, physics: &PhysicsConfig) {
        let input = input.clamp(-1.0, 1.0);
        if input != 0.0 {
            self.velocity.x = input * physics.walk_speed;
            let facing = input.signum();
            if facing != self.facing {
                self.facing = facing;
                self.aim.x = -self.aim.x;
            }
        } else if self.grounded {
            self.velocity.x *= physics.ground_friction;
        } else {
            self.velocity.x *= physics.air_drag;
        }
    }

    pub fn jump(&mut self, physics: &PhysicsConfig) {
        if self.grounded {
            self.velocity.y = -physics.jump_speed;
            self.grounded = false;
        }
    }

    pub fn apply_gravity(&mut self, dt: f32, physics: &PhysicsConfig) {
        self.velocity.y = (self.velocity.y + physics.gravity * dt).min(physics.terminal_velocity);
    }

    fn overlaps(&self, grid: &TerrainGrid, p: Vec2, physics: &PhysicsConfig) -> bool {
        grid.circle_overlaps_solid(p, self.radius - physics.contact_tolerance)
    }
}

/// Last free value between `free` and `blocked` along one axis.
fn contact(free: f32, blocked: f32, mut is_free: impl FnMut(f32) -> bool) -> f32 {
    let (mut lo, mut hi) = (free, blocked);
    for _ in 0..12 {
        let mid = (lo + hi) * 0.5;
        if is_free(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Advance the worm by its velocity over `dt`, resolving x then y in
/// sub‑steps. Only non‑overlapping positions are ever committed, so the
/// collision circle (shrunk by the contact tolerance) never ends a tick
/// inside solid terrain.
pub fn resolve_movement(
    worm: &mut Worm,
    grid: &TerrainGrid,
    dt: f32,
    physics: &PhysicsConfig,
) -> MoveResult {
    let mut result = MoveResult::default();
    let dt = dt.clamp(0.0, physics.max_dt);
    if dt == 0.0 {
        return result;
    }

    if worm.overlaps(grid, worm.position, physics) && !unstick(worm, grid, physics) {
        worm.velocity = Vec2::ZERO;
        return MoveResult {
            x: AxisState::Blocked,
            y: AxisState::Blocked,
        };
    }

    /* ---- enough sub‑steps that no step crosses half a radius ---- */
    let travel = worm.velocity.abs().max_element() * dt;
    let max_step = (worm.radius * 0.5).max(0.1);
    let steps = COLLISION_STEPS.max((travel / max_step).ceil() as i32);
    let step_dt = dt / steps as f32;

    let was_grounded = worm.grounded;
    worm.grounded = false;

    for _ in 0..steps {
        /* ---------- horizontal pass ---------- */
        if worm.velocity.x != 0.0 {
            let y = worm.position.y;
            let new_x = worm.position.x + worm.velocity.x * step_dt;
            if !worm.overlaps(grid, Vec2::new(new_x, y), physics) {
                worm.position.x = new_x;
            } else if (worm.grounded || was_grounded) && step_up(worm, grid, new_x, physics) {
                // climbed a ledge, keep walking
            } else {
                let old_x = worm.position.x;
                worm.position.x = contact(old_x, new_x, |x| !worm.overlaps(grid, Vec2::new(x, y), physics));
                worm.velocity.x = 0.0;
                result.x = AxisState::Blocked;
            }
        }

        /* ---------- vertical pass ---------- */
        if worm.velocity.y != 0.0 {
            let x = worm.position.x;
            let new_y = worm.position.y + worm.velocity.y * step_dt;
            if !worm.overlaps(grid, Vec2::new(x, new_y), physics) {
                worm.position.y = new_y;
            } else {
                let old_y = worm.position.y;
                worm.position.y = contact(old_y, new_y, |y| !worm.overlaps(grid, Vec2::new(x, y), physics));
                if worm.velocity.y > 0.0 {
                    worm.grounded = true;
                }
                worm.velocity.y = 0.0;
                result.y = AxisState::Blocked;
            }
        }
    }
    result
}

/// one‑ledge auto‑step: lift by at most `max_step_height` and move on
fn step_up(worm: &mut Worm, grid: &TerrainGrid, new_x: f32, physics: &PhysicsConfig) -> bool {
    if physics.max_step_height <= 0.0 || worm.velocity.y < 0.0 {
        return false;
    }
    let lifted = worm.position.y - physics.max_step_height;
    let clear_above = !worm.overlaps(grid, Vec2::new(worm.position.x, lifted), physics);
    let clear_ahead = !worm.overlaps(grid, Vec2::new(new_x, lifted), physics);
    if !(clear_above && clear_ahead) {
        return false;
    }
    // settle back down onto the ledge
    let settled = contact(lifted, worm.position.y, |y| {
        !worm.overlaps(grid, Vec2::new(new_x, y), physics)
    });
    worm.position = Vec2::new(new_x, settled);
    worm.grounded = true;
    true
}

/// Push a worm that starts inside terrain straight up to the nearest free spot.
fn unstick(worm: &mut Worm, grid: &TerrainGrid, physics: &PhysicsConfig) -> bool {
    let limit = (worm.radius * 8.0).ceil() as i32;
    for i in 1..=limit {
        let p = worm.position - Vec2::new(0.0, i as f32 * 0.25);
        if !worm.overlaps(grid, p, physics) {
            worm.position = p;
            return true;
        }
    }
    false
}
