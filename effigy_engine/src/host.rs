// The abstract host boundary.
//
// The engine owns no world, no entities, and no identifier tables of its
// own — it validates names against, reads blocks from, and mutates entities
// through these traits. A game server implements them over its live world;
// tests implement them over in-memory maps.
//
// All identifier checks are case-insensitive on the host side: the engine
// passes names as configured and the host must match them regardless of
// case.
//
// See also: `registry.rs` (the only caller of the mutation surface),
// `shape.rs` (which reads blocks through plain callbacks instead, so shape
// matching stays a pure function of world state).

use crate::archetype::StatusEffect;
use crate::item::ItemSpec;
use crate::types::{BlockPos, EntityHandle, EquipmentSlot, SpawnPoint};
use crate::variant::VariantTrait;

/// Pure identifier validation against the host's compiled-in tables.
///
/// Used at load time to reject entries that could never spawn, and at
/// resolve time for the raw-entity-kind tier of archetype resolution.
pub trait HostCatalog {
    /// A spawnable entity kind the host knows natively (e.g. "Zombie").
    fn is_entity_kind(&self, name: &str) -> bool;
    /// A block type that can appear in the world grid.
    fn is_block(&self, name: &str) -> bool;
    /// An item kind usable in an equipment slot.
    fn is_item(&self, name: &str) -> bool;
    /// A playable sound identifier.
    fn is_sound(&self, name: &str) -> bool;
    /// A status effect kind (speed, invisibility, ...).
    fn is_status_effect(&self, name: &str) -> bool;
    /// An enchantment kind applicable to items.
    fn is_enchantment(&self, name: &str) -> bool;
}

/// Read-only view of world blocks.
pub trait BlockView {
    /// The block type name at a position.
    fn block_at(&self, pos: BlockPos) -> String;
    /// True if the position holds no placed block (air or equivalent) —
    /// what shape clearance checks against.
    fn is_open(&self, pos: BlockPos) -> bool;
}

/// Everything the engine needs from the live world: block mutation, entity
/// instantiation and customization, and presentation effects.
///
/// Entity operations take the opaque `EntityHandle` the host minted from
/// `spawn`. Operations on a stale handle are the host's problem; the engine
/// only uses handles it was just given.
pub trait WorldHost: HostCatalog + BlockView {
    /// Clear a block back to air. The only world mutation the engine
    /// performs — consuming the body of a completed shape.
    fn clear_block(&mut self, pos: BlockPos);

    /// Instantiate a base entity of a host-recognized kind. `None` means
    /// the spawn failed (unknown kind, unloaded region, ...); the engine
    /// degrades to "nothing happens".
    fn spawn(&mut self, kind: &str, at: SpawnPoint) -> Option<EntityHandle>;

    /// The host kind name of an existing entity.
    fn kind_of(&self, entity: EntityHandle) -> String;

    /// Toggle a variant trait on an entity (wither sub-kind, saddle, ...).
    fn apply_trait(&mut self, entity: EntityHandle, variant_trait: VariantTrait);

    /// True if the entity carries the given variant trait.
    fn has_trait(&self, entity: EntityHandle, variant_trait: VariantTrait) -> bool;

    /// Set maximum and current health together.
    fn set_health(&mut self, entity: EntityHandle, health: f64);

    /// Set breath/air capacity in ticks.
    fn set_breath(&mut self, entity: EntityHandle, ticks: i64);

    /// Make the entity invulnerable for the given number of ticks after
    /// spawning.
    fn set_invulnerability(&mut self, entity: EntityHandle, ticks: i64);

    /// Whether the entity may despawn when no player is nearby.
    fn set_despawns(&mut self, entity: EntityHandle, despawns: bool);

    fn add_status_effect(&mut self, entity: EntityHandle, effect: &StatusEffect);

    fn set_equipment(&mut self, entity: EntityHandle, slot: EquipmentSlot, item: &ItemSpec);

    /// Chance in [0, 1] that the slot's item drops on death.
    fn set_drop_chance(&mut self, entity: EntityHandle, slot: EquipmentSlot, chance: f64);

    /// Set the visible name tag.
    fn set_name_tag(&mut self, entity: EntityHandle, name: &str);

    /// Dress the entity in the identity-specific headgear for `identity` —
    /// the head-skinning that makes a summon resemble a named player.
    fn set_identity_headgear(&mut self, entity: EntityHandle, identity: &str);

    /// Seat `rider` on `mount`.
    fn mount(&mut self, rider: EntityHandle, mount: EntityHandle);

    /// Whether the entity may pick up items from the ground. Summoned
    /// creatures always get this disabled so they cannot scavenge gear.
    fn set_pickup_enabled(&mut self, entity: EntityHandle, enabled: bool);

    fn play_sound(&mut self, at: SpawnPoint, sound: &str);

    /// A damage-free visual strike (presentation only).
    fn strike_effect(&mut self, at: SpawnPoint);
}
