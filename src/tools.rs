//! tool catalog: digging geometry, material affinity, strength and cost
use bevy::math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::terrain::Material;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Drill,
    Dynamite,
    Torch,
    Laser,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Drill => "drill",
            ToolKind::Dynamite => "dynamite",
            ToolKind::Torch => "torch",
            ToolKind::Laser => "laser",
        }
    }
}

/// Carve geometry. Lengths are in cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ToolShape {
    Circle { radius: f32 },
    Line { length: f32, thickness: f32 },
}

impl ToolShape {
    /// Every cell the shape touches when applied at `origin`, unclipped.
    ///
    /// Circles take cells whose centre lies within `radius`. Lines take
    /// cells whose centre lies within half the thickness (never less than
    /// half a cell) of the segment; a missing or zero direction or a
    /// non‑positive length collapses the line to a circle of `thickness`.
    pub fn affected_cells(&self, origin: Vec2, direction: Option<Vec2>) -> Vec<IVec2> {
        match *self {
            ToolShape::Circle { radius } => disc_cells(origin, radius),
            ToolShape::Line { length, thickness } => {
                let dir = direction.and_then(|d| d.try_normalize());
                match dir {
                    Some(dir) if length > 0.0 => {
                        segment_cells(origin, origin + dir * length, (thickness * 0.5).max(0.5))
                    }
                    _ => disc_cells(origin, thickness),
                }
            }
        }
    }
}

fn disc_cells(origin: Vec2, radius: f32) -> Vec<IVec2> {
    let radius = radius.max(0.0);
    let min = (origin - Vec2::splat(radius)).floor().as_ivec2();
    let max = (origin + Vec2::splat(radius)).floor().as_ivec2();
    let r2 = radius * radius;

    let mut cells = Vec::new();
    for y in min.y..=max.y {
        for x in min.x..=max.x {
            let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if centre.distance_squared(origin) <= r2 {
                cells.push(IVec2::new(x, y));
            }
        }
    }
    cells
}

fn segment_cells(a: Vec2, b: Vec2, half_width: f32) -> Vec<IVec2> {
    let min = (a.min(b) - Vec2::splat(half_width)).floor().as_ivec2();
    let max = (a.max(b) + Vec2::splat(half_width)).floor().as_ivec2();
    let ab = b - a;
    let len2 = ab.length_squared();

    let mut cells = Vec::new();
    for y in min.y..=max.y {
        for x in min.x..=max.x {
            let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let t = ((centre - a).dot(ab) / len2).clamp(0.0, 1.0);
            if centre.distance(a + ab * t) <= half_width {
                cells.push(IVec2::new(x, y));
            }
        }
    }
    cells
}

/// Small bit set over the solid materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Material>", into = "Vec<Material>")]
pub struct MaterialSet(u8);

impl MaterialSet {
    pub const EMPTY: MaterialSet = MaterialSet(0);

    pub fn of(materials: &[Material]) -> Self {
        materials.iter().fold(Self::EMPTY, |set, m| set.with(*m))
    }

    pub fn with(self, material: Material) -> Self {
        MaterialSet(self.0 | 1 << material as u8)
    }

    pub fn contains(self, material: Material) -> bool {
        self.0 & (1 << material as u8) != 0
    }
}

impl From<Vec<Material>> for MaterialSet {
    fn from(v: Vec<Material>) -> Self {
        MaterialSet::of(&v)
    }
}

impl From<MaterialSet> for Vec<Material> {
    fn from(set: MaterialSet) -> Self {
        Material::SOLIDS
            .into_iter()
            .filter(|m| set.contains(*m))
            .collect()
    }
}

/// What one use of a tool consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ToolCost {
    Free,
    Gas(u32),
    Stick,
    Battery(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub kind: ToolKind,
    pub shape: ToolShape,
    pub allowed: MaterialSet,
    /// highest hardness this tool can remove
    pub strength: u8,
    pub cost: ToolCost,
    /// max distance from the worm centre to the aim point
    pub reach: Option<f32>,
    /// seconds between use and effect; 0 acts immediately
    #[serde(default)]
    pub fuse: f32,
}

impl Tool {
    pub fn drill() -> Self {
        Self {
            kind: ToolKind::Drill,
            shape: ToolShape::Circle { radius: 2.5 },
            allowed: MaterialSet::of(&[Material::Dirt, Material::Rock]),
            strength: 2,
            cost: ToolCost::Free,
            reach: Some(4.0),
            fuse: 0.0,
        }
    }

    pub fn dynamite() -> Self {
        Self {
            kind: ToolKind::Dynamite,
            shape: ToolShape::Circle { radius: 5.0 },
            allowed: MaterialSet::of(&Material::SOLIDS),
            strength: 3,
            cost: ToolCost::Stick,
            reach: Some(25.0),
            fuse: 2.0,
        }
    }

    pub fn torch() -> Self {
        Self {
            kind: ToolKind::Torch,
            shape: ToolShape::Circle { radius: 1.5 },
            allowed: MaterialSet::of(&[Material::Dirt]),
            strength: 1,
            cost: ToolCost::Gas(10),
            reach: Some(4.0),
            fuse: 0.0,
        }
    }

    pub fn laser() -> Self {
        Self {
            kind: ToolKind::Laser,
            shape: ToolShape::Line {
                length: 50.0,
                thickness: 2.0,
            },
            allowed: MaterialSet::of(&[Material::Rock, Material::Metal]),
            strength: 3,
            cost: ToolCost::Battery(10.0),
            reach: Some(2.0),
            fuse: 0.0,
        }
    }

    /// Material gate: allowed set and hardness both have to agree.
    pub fn can_destroy(&self, material: Material) -> bool {
        material.is_solid() && self.allowed.contains(material) && material.hardness() <= self.strength
    }

    pub fn affected_cells(&self, origin: Vec2, direction: Option<Vec2>) -> Vec<IVec2> {
        self.shape.affected_cells(origin, direction)
    }
}

/// Ordered, immutable list of tools; the worm cycles through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCatalog {
    tools: Vec<Tool>,
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new(vec![Tool::drill(), Tool::dynamite(), Tool::torch(), Tool::laser()])
    }
}

impl ToolCatalog {
    pub fn new(tools: Vec<Tool>) -> Self {
        Self { tools }
    }

    pub fn get(&self, index: usize) -> Option<&Tool> {
        self.tools.get(index)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn index_of(&self, kind: ToolKind) -> Option<usize> {
        self.tools.iter().position(|t| t.kind == kind)
    }

    /// Whether at least one tool can remove `material`.
    pub fn covers(&self, material: Material) -> bool {
        self.tools.iter().any(|t| t.can_destroy(material))
    }
}
