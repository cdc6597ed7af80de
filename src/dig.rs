//! material‑aware carving driven by tool geometry
use bevy::log::debug;
use bevy::math::{IVec2, Vec2};

use crate::terrain::{Material, TerrainGrid};
use crate::tools::Tool;

/// Apply `tool` at `origin` (cell units). Line tools extend along
/// `direction`. Cells outside the grid are skipped, cells the tool cannot
/// affect are left alone.
///
/// Returns the cells that actually changed, sorted row‑major.
pub fn apply_tool(
    grid: &mut TerrainGrid,
    tool: &Tool,
    origin: Vec2,
    direction: Option<Vec2>,
) -> Vec<IVec2> {
    let mut changed: Vec<IVec2> = tool
        .affected_cells(origin, direction)
        .into_iter()
        .filter(|cell| {
            grid.material_at(*cell)
                .is_some_and(|m| tool.can_destroy(m))
        })
        .collect();
    changed.sort_by_key(|c| (c.y, c.x));
    changed.dedup();

    for cell in &changed {
        grid.set(*cell, Material::Empty);
    }

    debug!(
        "{} at ({:.1}, {:.1}) carved {} cells",
        tool.kind.name(),
        origin.x,
        origin.y,
        changed.len()
    );
    changed
}
