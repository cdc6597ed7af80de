use bevy::prelude::*;

use crate::pickups::PickupKind;

/* ===========================================================
   worm
   =========================================================== */
#[derive(Component)]
pub struct WormSprite;

/* ===========================================================
   level markers
   =========================================================== */
#[derive(Component)]
pub struct GoalMarker;

#[derive(Component)]
pub struct PickupSprite {
    pub cell: IVec2,
    pub kind: PickupKind,
}

/* ===========================================================
   terrain helper components
   =========================================================== */
#[derive(Component)]
pub struct TileSprite {
    pub x: usize,
    pub y: usize,
}

/// marks every entity that belongs to the current level
#[derive(Component)]
pub struct LevelEntity;
