//! loose items lying in open cells: gas bottles & dynamite sticks
use std::collections::BTreeMap;

use bevy::math::{IVec2, Vec2};
use rand::Rng;

use crate::config::PickupConfig;
use crate::terrain::{cell_center, Material, TerrainGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    GasBottle,
    Dynamite,
}

/// Items keyed by cell. They sit beside the grid, never inside a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pickups {
    items: BTreeMap<(i32, i32), PickupKind>,
}

impl Pickups {
    /// Scatter the configured items over `Empty` cells at or below
    /// `min_row`, keeping them `spacing` cells apart.
    pub fn scatter(
        grid: &TerrainGrid,
        config: &PickupConfig,
        min_row: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let mut pickups = Pickups::default();
        let (w, h) = (grid.width() as i32, grid.height() as i32);
        let min_row = min_row as i32;
        if w == 0 || min_row >= h {
            return pickups;
        }

        let (mut gas, mut sticks) = (0, 0);
        for _ in 0..config.attempts {
            if gas >= config.gas_bottles && sticks >= config.dynamite_sticks {
                break;
            }
            let cell = IVec2::new(rng.gen_range(0..w), rng.gen_range(min_row..h));
            if grid.material_at(cell) != Some(Material::Empty) {
                continue;
            }
            let crowded = pickups.items.keys().any(|&(x, y)| {
                (x - cell.x).abs() < config.spacing && (y - cell.y).abs() < config.spacing
            });
            if crowded {
                continue;
            }
            let want_gas = gas < config.gas_bottles
                && (sticks >= config.dynamite_sticks || rng.gen_bool(0.6));
            if want_gas {
                pickups.insert(cell, PickupKind::GasBottle);
                gas += 1;
            } else if sticks < config.dynamite_sticks {
                pickups.insert(cell, PickupKind::Dynamite);
                sticks += 1;
            }
        }
        pickups
    }

    pub fn insert(&mut self, cell: IVec2, kind: PickupKind) {
        self.items.insert((cell.x, cell.y), kind);
    }

    pub fn get(&self, cell: IVec2) -> Option<PickupKind> {
        self.items.get(&(cell.x, cell.y)).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, PickupKind)> + '_ {
        self.items.iter().map(|(&(x, y), k)| (IVec2::new(x, y), *k))
    }

    /// Remove and return every item whose cell centre lies within
    /// `radius + 0.5` of `center`.
    pub fn collect_near(&mut self, center: Vec2, radius: f32) -> Vec<(IVec2, PickupKind)> {
        let reach = radius + 0.5;
        let hits: Vec<_> = self
            .iter()
            .filter(|(cell, _)| cell_center(*cell).distance(center) < reach)
            .collect();
        for (cell, _) in &hits {
            self.items.remove(&(cell.x, cell.y));
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_grid() -> TerrainGrid {
        TerrainGrid::new(60, 60)
    }

    #[test]
    fn scatter_respects_counts_rows_and_spacing() {
        let config = PickupConfig::default();
        let pickups = Pickups::scatter(&open_grid(), &config, 24, &mut StdRng::seed_from_u64(4));
        let items: Vec<_> = pickups.iter().collect();
        let gas = items.iter().filter(|(_, k)| *k == PickupKind::GasBottle).count();
        let sticks = items.len() - gas;
        assert!(gas <= config.gas_bottles && sticks <= config.dynamite_sticks);
        assert!(!items.is_empty());
        for (i, (a, _)) in items.iter().enumerate() {
            assert!(a.y >= 24);
            for (b, _) in &items[i + 1..] {
                let apart = (a.x - b.x).abs() >= config.spacing || (a.y - b.y).abs() >= config.spacing;
                assert!(apart, "{a:?} too close to {b:?}");
            }
        }
    }

    #[test]
    fn scatter_only_uses_open_cells() {
        let mut grid = open_grid();
        for y in 0..60 {
            for x in 0..30 {
                grid.set(IVec2::new(x, y), Material::Rock);
            }
        }
        let pickups = Pickups::scatter(&grid, &PickupConfig::default(), 0, &mut StdRng::seed_from_u64(9));
        assert!(pickups.iter().all(|(c, _)| c.x >= 30));
    }

    #[test]
    fn scatter_is_seeded() {
        let config = PickupConfig::default();
        let a = Pickups::scatter(&open_grid(), &config, 10, &mut StdRng::seed_from_u64(1));
        let b = Pickups::scatter(&open_grid(), &config, 10, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn collect_takes_only_nearby_items() {
        let mut pickups = Pickups::default();
        pickups.insert(IVec2::new(5, 5), PickupKind::GasBottle);
        pickups.insert(IVec2::new(9, 5), PickupKind::Dynamite);
        let got = pickups.collect_near(Vec2::new(5.5, 4.0), 1.5);
        assert_eq!(got, vec![(IVec2::new(5, 5), PickupKind::GasBottle)]);
        assert_eq!(pickups.len(), 1);
        assert!(pickups.collect_near(Vec2::new(5.5, 4.0), 1.5).is_empty());
    }
}
