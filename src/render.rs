//! sprite view of the session: tiles, worm, goal and pickups
//!
//! Tiles are only respawned for cells named by `TerrainChanged`; a
//! `LevelStarted` throws the whole level away and redraws it.
use bevy::prelude::*;

use crate::components::*;
use crate::constants::*;
use crate::noise_field::noise;
use crate::pickups::PickupKind;
use crate::plugin::{LevelStarted, TerrainChanged};
use crate::session::Session;
use crate::terrain::{cell_center, cell_to_world, Material};

/// One optional sprite per grid cell, row‑major.
#[derive(Resource, Default)]
pub struct TileSprites {
    width: usize,
    entities: Vec<Option<Entity>>,
}

impl TileSprites {
    fn slot(&mut self, cell: IVec2) -> Option<&mut Option<Entity>> {
        if cell.x < 0 || cell.y < 0 || cell.x as usize >= self.width {
            return None;
        }
        self.entities.get_mut(cell.y as usize * self.width + cell.x as usize)
    }
}

/* ---------- helpers ---------- */

fn to_world(session: &Session, p: Vec2) -> Vec2 {
    cell_to_world(session.grid().height(), session.config().tile_size, p)
}

/// base material colour with quantised noise banding
fn tile_color(seed: u64, material: Material, cell: IVec2) -> Option<Color> {
    let base = match material {
        Material::Empty => return None,
        Material::Dirt => DIRT_COLOR,
        Material::Rock => ROCK_COLOR,
        Material::Metal => METAL_COLOR,
    }
    .to_srgba();

    let raw = noise(
        seed,
        cell.x as f64 * COLOR_NOISE_SCALE,
        cell.y as f64 * COLOR_NOISE_SCALE,
    ) as f32;
    let levels = COLOR_VARIATION_LEVELS as f32;
    let step = (((raw + 1.0) * 0.5) * levels).floor().clamp(0.0, levels - 1.0);
    let norm = step / (levels - 1.0) * 2.0 - 1.0;
    let factor = 1.0 + norm * COLOR_VARIATION_STRENGTH;

    Some(Color::srgb(
        (base.red * factor).clamp(0.0, 1.0),
        (base.green * factor).clamp(0.0, 1.0),
        (base.blue * factor).clamp(0.0, 1.0),
    ))
}

fn spawn_tile(commands: &mut Commands, session: &Session, cell: IVec2) -> Option<Entity> {
    let material = session.grid().material_at(cell)?;
    let color = tile_color(session.level().seed, material, cell)?;
    let pos = to_world(session, cell_center(cell));
    let entity = commands
        .spawn((
            Sprite {
                color,
                custom_size: Some(Vec2::splat(session.config().tile_size)),
                ..default()
            },
            Transform::from_xyz(pos.x, pos.y, 0.0),
            TileSprite {
                x: cell.x as usize,
                y: cell.y as usize,
            },
            LevelEntity,
        ))
        .id();
    Some(entity)
}

fn marker(session: &Session, at: Vec2, size: f32, color: Color, z: f32) -> (Sprite, Transform) {
    let pos = to_world(session, at);
    (
        Sprite {
            color,
            custom_size: Some(Vec2::splat(size * session.config().tile_size)),
            ..default()
        },
        Transform::from_xyz(pos.x, pos.y, z),
    )
}

/* ---------- systems ---------- */

/// drop everything from the previous level and draw the new one
pub fn rebuild_level_system(
    mut commands: Commands,
    mut started: EventReader<LevelStarted>,
    session: Option<Res<Session>>,
    mut tiles: ResMut<TileSprites>,
    stale: Query<Entity, With<LevelEntity>>,
) {
    let Some(number) = started.read().last().map(|e| e.number) else {
        return;
    };
    let Some(session) = session else { return };

    for e in &stale {
        commands.entity(e).despawn();
    }

    let grid = session.grid();
    tiles.width = grid.width();
    tiles.entities = grid
        .cells()
        .map(|(cell, _)| spawn_tile(&mut commands, &session, cell))
        .collect();

    let goal = cell_center(session.level().goal);
    let goal_size = session.config().goal_radius;
    commands.spawn((marker(&session, goal, goal_size, GOAL_COLOR, 1.0), GoalMarker, LevelEntity));

    for (cell, kind) in session.level().pickups.iter() {
        let color = match kind {
            PickupKind::GasBottle => GAS_COLOR,
            PickupKind::Dynamite => STICK_COLOR,
        };
        commands.spawn((
            marker(&session, cell_center(cell), 1.0, color, 2.0),
            PickupSprite { cell, kind },
            LevelEntity,
        ));
    }

    let worm = session.worm();
    commands.spawn((
        marker(&session, worm.position, worm.radius * 2.0, WORM_COLOR, 3.0),
        WormSprite,
        LevelEntity,
    ));
    info!("level {} drawn ({} tiles)", number, tiles.entities.iter().flatten().count());
}

/// respawn the sprites of cells that changed this frame
pub fn redraw_changed_tiles_system(
    mut commands: Commands,
    mut changed: EventReader<TerrainChanged>,
    session: Option<Res<Session>>,
    mut tiles: ResMut<TileSprites>,
) {
    let Some(session) = session else {
        changed.clear();
        return;
    };
    for event in changed.read() {
        for &cell in &event.cells {
            let Some(slot) = tiles.slot(cell) else { continue };
            if let Some(e) = slot.take() {
                commands.entity(e).despawn();
            }
            *slot = spawn_tile(&mut commands, &session, cell);
        }
    }
}

/// worm transform follows the session; collected pickups disappear
pub fn sync_sprites_system(
    mut commands: Commands,
    session: Option<Res<Session>>,
    mut worm_q: Query<(&mut Transform, &mut Sprite), With<WormSprite>>,
    pickup_q: Query<(Entity, &PickupSprite)>,
) {
    let Some(session) = session else { return };
    let worm = session.worm();

    if let Ok((mut tf, mut sprite)) = worm_q.get_single_mut() {
        let pos = to_world(&session, worm.position);
        tf.translation.x = pos.x;
        tf.translation.y = pos.y;
        sprite.flip_x = worm.facing < 0.0;
    }

    for (e, pickup) in &pickup_q {
        if session.level().pickups.get(pickup.cell) != Some(pickup.kind) {
            commands.entity(e).despawn();
        }
    }
}
