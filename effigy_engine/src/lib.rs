// effigy_engine — rule-driven creature composition and summoning.
//
// Players build an effigy out of world blocks; placing the final trigger
// block resolves a named creature archetype — possibly composed recursively
// from other archetypes, decorated with equipment, status effects, escorts,
// a mount, and presentation effects — into a concrete spawn. This crate is
// the whole of that logic; the game world itself (blocks, entities, sounds)
// stays behind the traits in `host.rs` and is never owned here.
//
// Module overview:
// - `registry.rs`:  ArchetypeRegistry — the lookup tables, tolerant config
//                   loading, shape matching, and the recursive
//                   resolve-and-spawn walk.
// - `shape.rs`:     ShapePattern — trigger block + body offsets + weighted
//                   summon list; pure matching over a block-read callback.
// - `archetype.rs`: ArchetypeDefinition — base delegation plus overrides
//                   (health, equipment, effects, escorts, mount, mask).
// - `variant.rs`:   PredefinedVariant — the compiled-in variant table
//                   (recognize + construct via base kind and trait toggles).
// - `selection.rs`: WeightedSelection — cumulative-weight random choice.
// - `effects.rs`:   EffectQueue — deferred strikes and escort spawns as a
//                   (tick, sequence) min-heap drained once per step.
// - `item.rs`:      ItemSpec / EquipmentPiece — equipment descriptors.
// - `config.rs`:    ConfigSection + Diagnostics — tolerant access to the
//                   host-parsed configuration tree, warnings never errors.
// - `host.rs`:      HostCatalog / BlockView / WorldHost — the abstract
//                   boundary to the game server.
// - `types.rs`:     BlockPos, SpawnPoint, EntityHandle, EquipmentSlot.
// - `prng`:         Re-exported from `effigy_prng` — xoshiro256** with
//                   SplitMix64 seeding.
//
// The engine is single-threaded and synchronous with the host's simulation
// loop: matching, resolution, and customization all run on the thread that
// delivers the triggering event, with no locking. The one deferred element
// is the effect queue, drained by `run_due_effects` on that same loop.
// All randomness flows through an injected, seedable `SummonRng`, so spawn
// outcomes are reproducible in tests.

pub mod archetype;
pub mod config;
pub mod effects;
pub mod host;
pub mod item;
pub use effigy_prng as prng;
pub mod registry;
pub mod selection;
pub mod shape;
pub mod types;
pub mod variant;
