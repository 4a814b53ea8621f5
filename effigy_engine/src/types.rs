// Core types shared across the engine.
//
// Defines spatial coordinates (`BlockPos` for block-grid positions,
// `SpawnPoint` for the continuous position an entity actually stands at),
// the opaque `EntityHandle` minted by the host, and the fixed equipment
// slot set. All registry names — shapes, archetypes, identities, block and
// entity kinds — compare case-insensitively; `lower_key` produces the
// canonical map key while the original spelling is kept for display.
//
// See also: `shape.rs` for how block offsets are matched around a placement
// point, `host.rs` for the world interface these types cross.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position (or relative offset) in the world's block grid.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Translate this position by a relative offset.
    pub const fn offset(self, d: BlockPos) -> Self {
        Self {
            x: self.x + d.x,
            y: self.y + d.y,
            z: self.z + d.z,
        }
    }

    /// The point where a summoned entity stands when this block is the
    /// trigger position: centred on the block horizontally, dropped to the
    /// shape's lowest level vertically.
    pub fn spawn_point(self, ground_offset: i32) -> SpawnPoint {
        SpawnPoint {
            x: f64::from(self.x) + 0.5,
            y: f64::from(self.y + ground_offset),
            z: f64::from(self.z) + 0.5,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A continuous world position — where entities spawn and effects strike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SpawnPoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Translate on the horizontal plane, keeping altitude.
    pub fn offset_xz(self, dx: f64, dz: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y,
            z: self.z + dz,
        }
    }
}

impl fmt::Display for SpawnPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Entity handle
// ---------------------------------------------------------------------------

/// Opaque handle to a host-owned entity. The engine never inspects the
/// value; it only passes it back into host operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Equipment slots
// ---------------------------------------------------------------------------

/// The five equipment slots an archetype may override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Chest,
    Legs,
    Feet,
    MainHand,
}

impl EquipmentSlot {
    /// All slots, in the order archetype configuration lists them.
    pub const ALL: [EquipmentSlot; 5] = [
        EquipmentSlot::Head,
        EquipmentSlot::Chest,
        EquipmentSlot::Legs,
        EquipmentSlot::Feet,
        EquipmentSlot::MainHand,
    ];

    /// The key this slot uses in archetype configuration sections.
    pub const fn config_key(self) -> &'static str {
        match self {
            EquipmentSlot::Head => "helmet",
            EquipmentSlot::Chest => "chestplate",
            EquipmentSlot::Legs => "leggings",
            EquipmentSlot::Feet => "boots",
            EquipmentSlot::MainHand => "weapon",
        }
    }
}

// ---------------------------------------------------------------------------
// Case-insensitive names
// ---------------------------------------------------------------------------

/// Canonical lookup key for a case-insensitive registry name.
pub fn lower_key(name: &str) -> String {
    name.trim().to_lowercase()
}
