//! game coordinator: one level, one worm, one strictly ordered tick
//!
//! Each tick runs `commands → digging → movement → pickups → win check`.
//! The grid is only written during the digging phase, so movement always
//! reads a settled grid.
use bevy::log::{debug, info};
use bevy::math::{IVec2, Vec2};
use bevy::prelude::{Event, Resource};

use crate::config::LevelConfig;
use crate::constants::LEVEL_SEED_STRIDE;
use crate::dig::apply_tool;
use crate::error::SessionError;
use crate::pickups::PickupKind;
use crate::supplies::{Supplies, ToolRejection};
use crate::terrain::{cell_center, generate_level_with_retries, Level, TerrainGrid};
use crate::tools::{Tool, ToolShape};
use crate::worm::{resolve_movement, MoveResult, Worm};

/// Abstract player commands, already translated from raw input.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum WormCommand {
    /// walk intent in `[-1, 1]`, held until the next `Move`
    Move { horizontal: f32 },
    Jump,
    Aim(Vec2),
    /// `direction` falls back to the worm's aim for line tools
    UseTool { at: Vec2, direction: Option<Vec2> },
    SelectNextTool,
}

/// A fused tool use waiting to go off.
#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
    pub position: Vec2,
    pub fuse: f32,
    tool: Tool,
    direction: Option<Vec2>,
}

/// What happened during one tick, for redraw and effects upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// cells turned `Empty`, sorted row‑major, no duplicates
    pub changed: Vec<IVec2>,
    pub collected: Vec<PickupKind>,
    pub rejected: Vec<ToolRejection>,
    pub detonations: usize,
    pub movement: MoveResult,
    pub reached_goal: bool,
}

#[derive(Resource, Debug)]
pub struct Session {
    config: LevelConfig,
    level: Level,
    worm: Worm,
    supplies: Supplies,
    charges: Vec<Charge>,
    walk_input: f32,
    level_number: u32,
    complete: bool,
}

impl Session {
    pub fn new(config: LevelConfig, seed: u64) -> Result<Self, SessionError> {
        let level = generate_level_with_retries(&config, seed)?;
        let worm = Worm::spawn(&level.grid, level.start, config.physics.worm_radius)?;
        let supplies = Supplies::new(config.supplies);
        info!("level 1 ready, start {:?} goal {:?}", level.start, level.goal);
        Ok(Self {
            config,
            level,
            worm,
            supplies,
            charges: Vec::new(),
            walk_input: 0.0,
            level_number: 1,
            complete: false,
        })
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.level.grid
    }

    pub fn worm(&self) -> &Worm {
        &self.worm
    }

    pub fn supplies(&self) -> &Supplies {
        &self.supplies
    }

    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn current_tool(&self) -> Option<&Tool> {
        self.config.tools.get(self.worm.tool_index)
    }

    /// Run one frame. A completed level ignores further ticks until
    /// [`Session::next_level`].
    pub fn tick(&mut self, dt: f32, commands: impl IntoIterator<Item = WormCommand>) -> TickReport {
        let mut report = TickReport::default();
        if self.complete {
            return report;
        }
        let dt = dt.max(0.0);
        let physics = self.config.physics;

        /* ---- input ---- */
        let mut uses = Vec::new();
        for command in commands {
            match command {
                WormCommand::Move { horizontal } => self.walk_input = horizontal,
                WormCommand::Jump => self.worm.jump(&physics),
                WormCommand::Aim(direction) => self.worm.aim_at(direction),
                WormCommand::SelectNextTool => self.worm.select_next_tool(self.config.tools.len()),
                WormCommand::UseTool { at, direction } => uses.push((at, direction)),
            }
        }

        /* ---- digging ---- */
        self.supplies.recharge(dt);
        for (at, direction) in uses {
            if let Err(reason) = self.use_tool(at, direction, &mut report.changed) {
                debug!("tool use rejected: {:?}", reason);
                report.rejected.push(reason);
            }
        }
        report.detonations = self.burn_fuses(dt, &mut report.changed);
        report.changed.sort_by_key(|c| (c.y, c.x));
        report.changed.dedup();

        /* ---- movement ---- */
        self.worm.walk(self.walk_input, &physics);
        self.worm.apply_gravity(dt.min(physics.max_dt), &physics);
        report.movement = resolve_movement(&mut self.worm, &self.level.grid, dt, &physics);

        /* ---- pickups ---- */
        for (cell, kind) in self.level.pickups.collect_near(self.worm.position, self.worm.radius) {
            debug!("picked up {:?} at {:?}", kind, cell);
            self.supplies.absorb(kind, &self.config.pickups);
            report.collected.push(kind);
        }

        /* ---- win check ---- */
        let goal = cell_center(self.level.goal);
        if self.worm.position.distance(goal) <= self.config.goal_radius {
            info!("level {} complete", self.level_number);
            self.complete = true;
            report.reached_goal = true;
        }
        report
    }

    fn use_tool(
        &mut self,
        at: Vec2,
        direction: Option<Vec2>,
        changed: &mut Vec<IVec2>,
    ) -> Result<(), ToolRejection> {
        let Some(tool) = self.config.tools.get(self.worm.tool_index).cloned() else {
            return Ok(());
        };
        if let Some(reach) = tool.reach {
            if at.distance(self.worm.position) > reach {
                return Err(ToolRejection::OutOfReach);
            }
        }
        self.supplies.spend(&tool.cost)?;

        let direction = match tool.shape {
            ToolShape::Line { .. } => direction.or(Some(self.worm.aim)),
            ToolShape::Circle { .. } => direction,
        };
        if tool.fuse > 0.0 {
            self.charges.push(Charge {
                position: at,
                fuse: tool.fuse,
                tool,
                direction,
            });
        } else {
            changed.extend(apply_tool(&mut self.level.grid, &tool, at, direction));
        }
        Ok(())
    }

    fn burn_fuses(&mut self, dt: f32, changed: &mut Vec<IVec2>) -> usize {
        let mut detonated = 0;
        let grid = &mut self.level.grid;
        self.charges.retain_mut(|charge| {
            charge.fuse -= dt;
            if charge.fuse > 0.0 {
                return true;
            }
            changed.extend(apply_tool(grid, &charge.tool, charge.position, charge.direction));
            detonated += 1;
            false
        });
        if detonated > 0 {
            debug!("{} charge(s) detonated", detonated);
        }
        detonated
    }

    /// Regenerate from a seed derived from the current one. Supplies carry
    /// over; pending charges are dropped with the old grid.
    pub fn next_level(&mut self) -> Result<(), SessionError> {
        let seed = self.level.seed.wrapping_add(LEVEL_SEED_STRIDE);
        let level = generate_level_with_retries(&self.config, seed)?;
        let mut worm = Worm::spawn(&level.grid, level.start, self.config.physics.worm_radius)?;
        worm.tool_index = self.worm.tool_index;

        self.level = level;
        self.worm = worm;
        self.charges.clear();
        self.walk_input = 0.0;
        self.complete = false;
        self.level_number += 1;
        info!("advanced to level {} (seed {})", self.level_number, seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Placement, SupplyConfig};
    use crate::terrain::Material;
    use crate::tools::ToolKind;

    const DT: f32 = 1.0 / 60.0;

    fn small_config() -> LevelConfig {
        LevelConfig {
            width: 50,
            height: 50,
            ..LevelConfig::default()
        }
    }

    fn select(session: &mut Session, kind: ToolKind) {
        let index = session.config().tools.index_of(kind).unwrap();
        while session.worm().tool_index != index {
            session.tick(0.0, [WormCommand::SelectNextTool]);
        }
    }

    #[test]
    fn new_session_spawns_at_start() {
        let session = Session::new(small_config(), 1).unwrap();
        assert_eq!(session.worm().position, cell_center(session.level().start));
        assert_eq!(session.level_number(), 1);
        assert_eq!(session.current_tool().map(|t| t.kind), Some(ToolKind::Drill));
    }

    #[test]
    fn drill_within_reach_carves_and_reports() {
        let mut session = Session::new(small_config(), 3).unwrap();
        let below = session.worm().position + Vec2::new(0.0, 3.5);
        let before = session.grid().clone();
        let report = session.tick(0.0, [WormCommand::UseTool { at: below, direction: None }]);
        for cell in &report.changed {
            assert!(before.material_at(*cell).unwrap().is_solid());
            assert_eq!(session.grid().material_at(*cell), Some(Material::Empty));
        }
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn out_of_reach_is_a_no_op() {
        let mut session = Session::new(small_config(), 3).unwrap();
        let far = session.worm().position + Vec2::new(20.0, 0.0);
        let before = session.grid().clone();
        let report = session.tick(0.0, [WormCommand::UseTool { at: far, direction: None }]);
        assert_eq!(report.rejected, vec![ToolRejection::OutOfReach]);
        assert_eq!(session.grid(), &before);
    }

    #[test]
    fn dynamite_waits_for_its_fuse() {
        let mut session = Session::new(small_config(), 5).unwrap();
        select(&mut session, ToolKind::Dynamite);
        let sticks = session.supplies().dynamite;
        let target = session.worm().position + Vec2::new(8.0, 8.0);
        let report = session.tick(DT, [WormCommand::UseTool { at: target, direction: None }]);
        assert_eq!(report.detonations, 0);
        assert_eq!(session.charges().len(), 1);
        assert_eq!(session.supplies().dynamite, sticks - 1);

        let mut went_off = 0;
        for _ in 0..150 {
            went_off += session.tick(DT, []).detonations;
        }
        assert_eq!(went_off, 1);
        assert!(session.charges().is_empty());
        let ToolShape::Circle { radius } = Tool::dynamite().shape else {
            unreachable!()
        };
        for (cell, m) in session.grid().cells() {
            if cell_center(cell).distance(target) <= radius {
                assert_eq!(m, Material::Empty);
            }
        }
    }

    #[test]
    fn torch_without_gas_is_rejected() {
        let config = LevelConfig {
            supplies: SupplyConfig {
                starting_gas: 5,
                ..SupplyConfig::default()
            },
            ..small_config()
        };
        let mut session = Session::new(config, 2).unwrap();
        select(&mut session, ToolKind::Torch);
        let at = session.worm().position + Vec2::new(1.0, 0.0);
        let report = session.tick(0.0, [WormCommand::UseTool { at, direction: None }]);
        assert_eq!(report.rejected, vec![ToolRejection::NoGas]);
    }

    #[test]
    fn laser_falls_back_to_aim() {
        let mut config = small_config();
        config.placement = Placement::Fixed {
            start: (10, 25),
            goal: (45, 45),
        };
        let mut session = Session::new(config, 8).unwrap();
        select(&mut session, ToolKind::Laser);
        let origin = session.worm().position;
        let report = session.tick(
            0.0,
            [
                WormCommand::Aim(Vec2::X),
                WormCommand::UseTool { at: origin, direction: None },
            ],
        );
        assert!(report.changed.iter().all(|c| (c.y as f32 + 0.5 - origin.y).abs() <= 1.0));
        for x in 14..45 {
            let m = session.grid().material_at(IVec2::new(x, 25)).unwrap();
            assert!(m != Material::Rock && m != Material::Metal, "({x}, 25) still {m:?}");
        }
    }

    #[test]
    fn walking_into_goal_completes_level_and_advances() {
        let mut config = small_config();
        config.placement = Placement::Fixed {
            start: (10, 10),
            goal: (13, 10),
        };
        let mut session = Session::new(config, 4).unwrap();
        let mut done = false;
        for _ in 0..120 {
            if session.tick(DT, [WormCommand::Move { horizontal: 1.0 }]).reached_goal {
                done = true;
                break;
            }
        }
        assert!(done);
        assert!(session.is_complete());
        assert_eq!(session.tick(DT, []), TickReport::default());

        let gas = session.supplies().gas;
        session.next_level().unwrap();
        assert_eq!(session.level_number(), 2);
        assert!(!session.is_complete());
        assert_eq!(session.supplies().gas, gas);
        assert_eq!(session.worm().position, cell_center(session.level().start));
    }

    #[test]
    fn random_placement_sessions_start_and_advance() {
        let config = LevelConfig {
            placement: Placement::Random { min_distance: 10.0 },
            ..small_config()
        };
        for seed in 0..60 {
            let mut session = Session::new(config.clone(), seed)
                .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
            session
                .next_level()
                .unwrap_or_else(|e| panic!("seed {seed}, level 2: {e}"));
            assert_eq!(session.level_number(), 2);
            assert_eq!(session.worm().position, cell_center(session.level().start));
        }
    }

    #[test]
    fn worm_never_ends_a_tick_inside_terrain() {
        let mut session = Session::new(small_config(), 11).unwrap();
        let tolerance = session.config().physics.contact_tolerance;
        let script = [
            WormCommand::Move { horizontal: 1.0 },
            WormCommand::Jump,
            WormCommand::Move { horizontal: -1.0 },
            WormCommand::Move { horizontal: 0.0 },
        ];
        for i in 0..600 {
            let command = script[(i / 40) % script.len()];
            session.tick(DT, [command]);
            let worm = session.worm();
            assert!(
                !session
                    .grid()
                    .circle_overlaps_solid(worm.position, worm.radius - 2.0 * tolerance),
                "overlap at tick {i}: {:?}",
                worm.position
            );
        }
    }
}
