// The archetype registry — loading, lookup, matching, and the recursive
// resolve-and-spawn walk.
//
// Owns the three lookup tables (shapes, archetype definitions, per-identity
// overrides), the engine RNG, and the deferred effect queue. The host loads
// configuration into it, asks it whether a block placement completes a
// shape, and hands it archetype names to resolve into concrete spawns.
//
// Name resolution precedence, most specific first:
//   1. a per-identity override (consulted via `summon_identity` and
//      `match_shape`, before generic resolution is attempted),
//   2. a user-defined archetype definition,
//   3. a predefined variant,
//   4. a raw entity kind known to the host.
//
// The shape table preserves configuration order — when several shapes could
// match the same placement, the one defined first in the file wins. That
// makes insertion order load-bearing, hence the `IndexMap`. The other
// tables iterate deterministically through `BTreeMap`.
//
// A definition whose base is itself is rejected at load; longer cycles
// (A bases on B, B bases on A) load fine and are caught at spawn time by a
// recursion-depth ceiling that degrades to "no entity" with a warning.
//
// Everything here runs synchronously on the host's simulation thread. The
// only deferred work is the effect queue, drained by `run_due_effects` once
// per step; do not interleave `load` with an in-flight spawn.

use crate::archetype::{ArchetypeDefinition, ArchetypeInfo};
use crate::config::{ConfigSection, Diagnostics};
use crate::effects::{DeferredEffect, EffectQueue};
use crate::host::{BlockView, HostCatalog, WorldHost};
use crate::shape::{ShapeInfo, ShapePattern};
use crate::types::{BlockPos, EntityHandle, SpawnPoint, lower_key};
use crate::variant::PredefinedVariant;
use effigy_prng::SummonRng;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Spawn-time recursion ceiling. Indirect definition cycles pass the load
/// check, so the walk carries a depth counter as a safety net; hitting the
/// ceiling produces no entity rather than unbounded recursion.
const MAX_RESOLVE_DEPTH: u32 = 16;

/// Bespoke summoning rules for one named identity: which archetype it
/// resolves to, and which shapes (by name) may summon it.
#[derive(Clone, Debug)]
pub struct IdentityOverride {
    /// The identity's name as configured.
    pub name: String,
    /// The archetype summoned for this identity.
    pub archetype: String,
    /// Shape names that alone can trigger this identity. Empty means the
    /// identity can only be summoned by command.
    pub shapes: Vec<String>,
}

/// Outcome of testing a placement against the shape tables.
#[derive(Clone, Copy, Debug)]
pub enum ShapeMatch<'a> {
    /// A shape is complete and has its horizontal clearance gap.
    Complete(&'a ShapePattern),
    /// A shape is complete but foreign blocks crowd it; the host should
    /// tell the player to leave a one-block gap.
    Obstructed(&'a ShapePattern),
    /// No shape matched.
    None,
}

/// Name listings of everything currently registered, in table order.
#[derive(Clone, Debug, Serialize)]
pub struct RegistryListing {
    pub shapes: Vec<String>,
    pub archetypes: Vec<String>,
    pub identities: Vec<String>,
}

/// Owns all loaded shapes, archetype definitions, and identity overrides,
/// and turns archetype names into spawned entities.
pub struct ArchetypeRegistry {
    /// Keyed by lower-cased name, in configuration order.
    shapes: IndexMap<String, ShapePattern>,
    /// Keyed by lower-cased name.
    archetypes: BTreeMap<String, ArchetypeDefinition>,
    /// Keyed by lower-cased identity name.
    identities: BTreeMap<String, IdentityOverride>,
    rng: SummonRng,
    effects: EffectQueue,
}

impl ArchetypeRegistry {
    pub fn new(rng: SummonRng) -> Self {
        Self {
            shapes: IndexMap::new(),
            archetypes: BTreeMap::new(),
            identities: BTreeMap::new(),
            rng,
            effects: EffectQueue::new(),
        }
    }

    // -- loading ------------------------------------------------------------

    /// Clear and rebuild all tables from a configuration tree. Emits a
    /// warning for every malformed or conflicting entry and keeps going;
    /// never fails. Pending deferred effects survive a reload, like any
    /// already-scheduled work.
    pub fn load(
        &mut self,
        root: &serde_json::Value,
        catalog: &dyn HostCatalog,
        diags: &mut Diagnostics,
    ) {
        self.shapes.clear();
        self.archetypes.clear();
        self.identities.clear();

        let root = ConfigSection::new(root, "");
        self.load_shapes(&root, catalog, diags);
        self.load_archetypes(&root, catalog, diags);
        self.load_identities(&root, catalog, diags);
    }

    fn load_shapes(
        &mut self,
        root: &ConfigSection<'_>,
        catalog: &dyn HostCatalog,
        diags: &mut Diagnostics,
    ) {
        let Some(value) = root.child_object("shapes") else {
            return;
        };
        let section = ConfigSection::new(value, "shapes");
        for name in section.keys() {
            let key = lower_key(name);
            if self.shapes.contains_key(&key) {
                diags.warn(
                    "shapes",
                    format!("a shape called {name} already exists and can't be redefined"),
                );
                continue;
            }
            let path = format!("shapes.{name}");
            let loaded = section
                .get(name)
                .filter(|v| v.is_object())
                .and_then(|v| {
                    ShapePattern::from_config(name, &ConfigSection::new(v, &path), catalog, diags)
                });
            match loaded {
                Some(shape) => {
                    self.shapes.insert(key, shape);
                }
                None => diags.warn(
                    path,
                    format!("shape {name} was not defined, due to errors in the configuration"),
                ),
            }
        }
    }

    fn load_archetypes(
        &mut self,
        root: &ConfigSection<'_>,
        catalog: &dyn HostCatalog,
        diags: &mut Diagnostics,
    ) {
        let Some(value) = root.child_object("creatures") else {
            return;
        };
        let section = ConfigSection::new(value, "creatures");
        for name in section.keys() {
            // An existing archetype of any tier blocks redefinition —
            // including predefined variants and raw host kinds.
            if self.is_valid_archetype(name, catalog) {
                diags.warn(
                    "creatures",
                    format!("a creature called {name} already exists and can't be redefined"),
                );
                continue;
            }
            let path = format!("creatures.{name}");
            let loaded = section
                .get(name)
                .filter(|v| v.is_object())
                .and_then(|v| {
                    ArchetypeDefinition::from_config(
                        name,
                        &ConfigSection::new(v, &path),
                        catalog,
                        diags,
                    )
                });
            let Some(def) = loaded else {
                diags.warn(
                    path,
                    format!("creature {name} was not defined, due to errors in the configuration"),
                );
                continue;
            };
            if lower_key(name) == lower_key(def.base()) {
                // A definition in terms of itself would recurse forever at
                // spawn time.
                diags.warn(
                    path,
                    format!("creature {name} cannot be defined in terms of itself"),
                );
            } else if self.is_valid_archetype(def.base(), catalog) {
                self.archetypes.insert(lower_key(name), def);
            } else {
                diags.warn(
                    path,
                    format!(
                        "can't define creature {name} because we can't spawn a {}",
                        def.base()
                    ),
                );
            }
        }
    }

    fn load_identities(
        &mut self,
        root: &ConfigSection<'_>,
        catalog: &dyn HostCatalog,
        diags: &mut Diagnostics,
    ) {
        let Some(value) = root.child_object("identities") else {
            return;
        };
        let section = ConfigSection::new(value, "identities");
        for name in section.keys() {
            let key = lower_key(name);
            if self.identities.contains_key(&key) {
                diags.warn(
                    "identities",
                    format!("an identity called {name} already exists and can't be redefined"),
                );
                continue;
            }
            let path = format!("identities.{name}");
            let Some(value) = section.get(name).filter(|v| v.is_object()) else {
                diags.warn(path, format!("identity {name} is not a configuration section"));
                continue;
            };
            let entry = ConfigSection::new(value, &path);

            // Without an explicit archetype, an identity summons the
            // archetype sharing its own name.
            let archetype = entry.str_or("spawn", name, diags);
            if !self.is_valid_archetype(&archetype, catalog) {
                diags.warn(
                    path,
                    format!("can't define identity {name} because there is no archetype named {archetype}"),
                );
                continue;
            }

            let mut shapes = Vec::new();
            for shape_name in entry.opt_str_list("shapes", diags).unwrap_or_default() {
                if self.shapes.contains_key(&lower_key(&shape_name)) {
                    shapes.push(shape_name);
                } else {
                    diags.warn(
                        path.clone(),
                        format!("identity {name} references undefined shape {shape_name}"),
                    );
                }
            }
            if shapes.is_empty() {
                diags.warn(
                    path.clone(),
                    format!("identity {name} can only be summoned by command because no shapes are listed"),
                );
            }

            self.identities.insert(
                key,
                IdentityOverride {
                    name: name.to_string(),
                    archetype,
                    shapes,
                },
            );
        }
    }

    // -- lookup -------------------------------------------------------------

    pub fn shape(&self, name: &str) -> Option<&ShapePattern> {
        self.shapes.get(&lower_key(name))
    }

    pub fn archetype(&self, name: &str) -> Option<&ArchetypeDefinition> {
        self.archetypes.get(&lower_key(name))
    }

    pub fn identity_override(&self, name: &str) -> Option<&IdentityOverride> {
        self.identities.get(&lower_key(name))
    }

    /// True if `name` resolves at any tier: identity override, archetype
    /// definition, predefined variant, or raw host entity kind. The host
    /// must check this before consuming trigger items — a failed spawn
    /// after the fact leaves the player with nothing.
    pub fn is_valid_archetype(&self, name: &str, catalog: &dyn HostCatalog) -> bool {
        self.identities.contains_key(&lower_key(name))
            || self.archetypes.contains_key(&lower_key(name))
            || PredefinedVariant::from_name(name).is_some()
            || catalog.is_entity_kind(name)
    }

    /// A friendly type name for an existing entity: its predefined variant
    /// name when one recognizes it, else the raw host kind.
    pub fn summoned_kind_name(&self, world: &impl WorldHost, entity: EntityHandle) -> String {
        PredefinedVariant::from_entity(world, entity)
            .map(|v| v.name().to_string())
            .unwrap_or_else(|| world.kind_of(entity))
    }

    // -- shape matching -----------------------------------------------------

    /// Test whether placing `placed` at `origin` completes a shape.
    ///
    /// An identity with a per-identity override is matched only against its
    /// own shape list (in list order); everything else scans the full table
    /// in configuration order. The first complete shape decides the
    /// outcome: clearance then determines `Complete` vs `Obstructed`, and
    /// later shapes are not consulted.
    pub fn match_shape<'a>(
        &'a self,
        origin: BlockPos,
        placed: &str,
        identity: Option<&str>,
        view: &impl BlockView,
    ) -> ShapeMatch<'a> {
        let restricted = identity.and_then(|name| self.identities.get(&lower_key(name)));
        match restricted {
            Some(over) => {
                for shape_name in &over.shapes {
                    if let Some(shape) = self.shapes.get(&lower_key(shape_name)) {
                        if shape.is_complete(origin, placed, |p| view.block_at(p)) {
                            return Self::check_clearance(shape, origin, view);
                        }
                    }
                }
                ShapeMatch::None
            }
            None => {
                for shape in self.shapes.values() {
                    if shape.is_complete(origin, placed, |p| view.block_at(p)) {
                        return Self::check_clearance(shape, origin, view);
                    }
                }
                ShapeMatch::None
            }
        }
    }

    /// Draw a summon archetype name from a shape's weighted list. `None`
    /// when the shape is unknown or configured no summons.
    pub fn choose_summon(&mut self, shape_name: &str) -> Option<String> {
        let shape = self.shapes.get(&lower_key(shape_name))?;
        shape.choose_archetype(&mut self.rng).map(String::from)
    }

    fn check_clearance<'a>(
        shape: &'a ShapePattern,
        origin: BlockPos,
        view: &impl BlockView,
    ) -> ShapeMatch<'a> {
        if shape.has_clearance(origin, |p| view.is_open(p)) {
            ShapeMatch::Complete(shape)
        } else {
            ShapeMatch::Obstructed(shape)
        }
    }

    // -- resolution & spawning ----------------------------------------------

    /// Resolve an archetype name and spawn it at `at`, applying the
    /// definition chain's overrides. `display_name` names and skins the
    /// outermost summon only; bases and mounts spawn anonymous. Returns
    /// `None` when nothing could be spawned.
    pub fn resolve_and_spawn(
        &mut self,
        name: &str,
        at: SpawnPoint,
        display_name: Option<&str>,
        now: u64,
        world: &mut impl WorldHost,
    ) -> Option<EntityHandle> {
        self.spawn_recursive(name, at, display_name, now, world, 0)
    }

    /// Summon for a named identity: the per-identity override's archetype
    /// when one exists (the most specific resolution tier), else the
    /// identity name itself, with the identity as display name either way.
    pub fn summon_identity(
        &mut self,
        identity: &str,
        at: SpawnPoint,
        now: u64,
        world: &mut impl WorldHost,
    ) -> Option<EntityHandle> {
        let target = self
            .identities
            .get(&lower_key(identity))
            .map(|over| over.archetype.clone());
        match target {
            Some(archetype) => self.resolve_and_spawn(&archetype, at, Some(identity), now, world),
            None => self.resolve_and_spawn(identity, at, Some(identity), now, world),
        }
    }

    fn spawn_recursive(
        &mut self,
        name: &str,
        at: SpawnPoint,
        display_name: Option<&str>,
        now: u64,
        world: &mut impl WorldHost,
        depth: u32,
    ) -> Option<EntityHandle> {
        if depth >= MAX_RESOLVE_DEPTH {
            log::warn!(
                "archetype `{name}` exceeds the resolution depth limit; \
                 the definitions probably form a cycle"
            );
            return None;
        }

        let def = self.archetypes.get(&lower_key(name)).cloned();
        let entity = match &def {
            Some(def) => {
                // Effects and escorts trigger on the attempt, before the
                // base spawn can fail.
                def.spawn_effects(at, now, &mut self.rng, &mut self.effects, world);
                def.schedule_escorts(at, now, &mut self.rng, &mut self.effects);

                // The definition spawns another archetype and customizes it.
                let entity = self.spawn_recursive(def.base(), at, None, now, world, depth + 1);
                if let Some(entity) = entity {
                    def.customize(entity, world);

                    if let Some(mount_name) = def.mount() {
                        if self.is_valid_archetype(mount_name, &*world) {
                            let mount =
                                self.spawn_recursive(mount_name, at, None, now, world, depth + 1);
                            if let Some(mount) = mount {
                                world.mount(entity, mount);
                            }
                        }
                    }
                }
                entity
            }
            None if !name.trim().is_empty() => {
                if let Some(variant) = PredefinedVariant::from_name(name) {
                    variant.spawn(world, at)
                } else if world.is_entity_kind(name) {
                    world.spawn(name, at)
                } else {
                    None
                }
            }
            None => None,
        };

        let entity = entity?;

        // Fall back to the configured default name when no explicit name
        // was given; bases and escorts arrive here with no explicit name.
        let used_name = match display_name {
            Some(n) if !n.is_empty() => Some(n.to_string()),
            _ => def
                .as_ref()
                .and_then(|d| d.default_name())
                .map(str::to_string),
        };
        if let Some(used_name) = &used_name {
            world.set_name_tag(entity, used_name);
        }

        // Wear the identity head for the mask or the effective name, unless
        // the definition keeps its configured headgear.
        let keep_helmet = def.as_ref().is_some_and(|d| d.keep_helmet());
        if !keep_helmet {
            let head = def
                .as_ref()
                .and_then(|d| d.mask())
                .map(str::to_string)
                .or(used_name);
            if let Some(head) = head.filter(|h| !h.is_empty()) {
                world.set_identity_headgear(entity, &head);
            }
        }

        // Summons must not scavenge gear dropped nearby.
        world.set_pickup_enabled(entity, false);
        Some(entity)
    }

    // -- deferred effects ---------------------------------------------------

    /// Fire every queued effect due at or before `now`. Effects scheduled
    /// while draining (an escort's own strikes, say) wait for the next
    /// step.
    pub fn run_due_effects(&mut self, now: u64, world: &mut impl WorldHost) {
        let mut due = Vec::new();
        while let Some(queued) = self.effects.pop_due(now) {
            due.push(queued);
        }
        for queued in due {
            match queued.effect {
                DeferredEffect::Strike { at } => world.strike_effect(at),
                DeferredEffect::SpawnEscort { archetype, at } => {
                    if self
                        .spawn_recursive(&archetype, at, None, now, world, 0)
                        .is_none()
                    {
                        log::warn!("escort archetype `{archetype}` produced no creature");
                    }
                }
            }
        }
    }

    /// Number of queued deferred effects.
    pub fn pending_effects(&self) -> usize {
        self.effects.len()
    }

    // -- listings & descriptions --------------------------------------------

    pub fn describe_shape(&self, name: &str) -> Option<ShapeInfo> {
        self.shape(name).map(ShapePattern::describe)
    }

    pub fn describe_archetype(&self, name: &str) -> Option<ArchetypeInfo> {
        self.archetype(name).map(ArchetypeDefinition::describe)
    }

    /// Every registered name, in table order: shapes in configuration
    /// order, archetypes and identities alphabetically.
    pub fn list(&self) -> RegistryListing {
        RegistryListing {
            shapes: self.shapes.values().map(|s| s.name().to_string()).collect(),
            archetypes: self
                .archetypes
                .values()
                .map(|d| d.name().to_string())
                .collect(),
            identities: self.identities.values().map(|o| o.name.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::StatusEffect;
    use crate::item::ItemSpec;
    use crate::types::EquipmentSlot;
    use crate::variant::VariantTrait;
    use serde_json::json;

    /// Compact in-memory host: a sparse block map plus a spawn log.
    #[derive(Default)]
    struct MiniWorld {
        blocks: BTreeMap<BlockPos, String>,
        next_id: u64,
        spawned: Vec<String>,
        named: Vec<(EntityHandle, String)>,
    }

    impl HostCatalog for MiniWorld {
        fn is_entity_kind(&self, name: &str) -> bool {
            matches!(lower_key(name).as_str(), "zombie" | "skeleton" | "pig")
        }
        fn is_block(&self, name: &str) -> bool {
            matches!(lower_key(name).as_str(), "gold_block" | "diamond_block" | "pumpkin")
        }
        fn is_item(&self, _: &str) -> bool {
            true
        }
        fn is_sound(&self, _: &str) -> bool {
            true
        }
        fn is_status_effect(&self, _: &str) -> bool {
            true
        }
        fn is_enchantment(&self, _: &str) -> bool {
            true
        }
    }

    impl BlockView for MiniWorld {
        fn block_at(&self, pos: BlockPos) -> String {
            self.blocks.get(&pos).cloned().unwrap_or_else(|| "air".to_string())
        }
        fn is_open(&self, pos: BlockPos) -> bool {
            !self.blocks.contains_key(&pos)
        }
    }

    impl WorldHost for MiniWorld {
        fn clear_block(&mut self, pos: BlockPos) {
            self.blocks.remove(&pos);
        }
        fn spawn(&mut self, kind: &str, _: SpawnPoint) -> Option<EntityHandle> {
            self.next_id += 1;
            self.spawned.push(kind.to_string());
            Some(EntityHandle(self.next_id))
        }
        fn kind_of(&self, _: EntityHandle) -> String {
            "zombie".to_string()
        }
        fn apply_trait(&mut self, _: EntityHandle, _: VariantTrait) {}
        fn has_trait(&self, _: EntityHandle, _: VariantTrait) -> bool {
            false
        }
        fn set_health(&mut self, _: EntityHandle, _: f64) {}
        fn set_breath(&mut self, _: EntityHandle, _: i64) {}
        fn set_invulnerability(&mut self, _: EntityHandle, _: i64) {}
        fn set_despawns(&mut self, _: EntityHandle, _: bool) {}
        fn add_status_effect(&mut self, _: EntityHandle, _: &StatusEffect) {}
        fn set_equipment(&mut self, _: EntityHandle, _: EquipmentSlot, _: &ItemSpec) {}
        fn set_drop_chance(&mut self, _: EntityHandle, _: EquipmentSlot, _: f64) {}
        fn set_name_tag(&mut self, entity: EntityHandle, name: &str) {
            self.named.push((entity, name.to_string()));
        }
        fn set_identity_headgear(&mut self, _: EntityHandle, _: &str) {}
        fn mount(&mut self, _: EntityHandle, _: EntityHandle) {}
        fn set_pickup_enabled(&mut self, _: EntityHandle, _: bool) {}
        fn play_sound(&mut self, _: SpawnPoint, _: &str) {}
        fn strike_effect(&mut self, _: SpawnPoint) {}
    }

    fn registry_with(config: &serde_json::Value) -> (ArchetypeRegistry, Diagnostics) {
        let mut registry = ArchetypeRegistry::new(SummonRng::new(42));
        let mut diags = Diagnostics::new();
        registry.load(config, &MiniWorld::default(), &mut diags);
        (registry, diags)
    }

    const AT: SpawnPoint = SpawnPoint::new(0.5, 64.0, 0.5);

    #[test]
    fn validity_covers_all_four_tiers() {
        let (registry, _) = registry_with(&json!({
            "creatures": { "Brute": { "spawn": "Zombie" } },
            "identities": { "Alice": { "spawn": "Brute" } }
        }));
        let world = MiniWorld::default();
        assert!(registry.is_valid_archetype("alice", &world)); // identity
        assert!(registry.is_valid_archetype("BRUTE", &world)); // definition
        assert!(registry.is_valid_archetype("WitherSkeleton", &world)); // variant
        assert!(registry.is_valid_archetype("Zombie", &world)); // raw kind
        assert!(!registry.is_valid_archetype("Nonesuch", &world));
    }

    #[test]
    fn self_reference_is_rejected_with_warning() {
        let (registry, diags) = registry_with(&json!({
            "creatures": { "Ouroboros": { "spawn": "ouroboros" } }
        }));
        assert!(registry.archetype("Ouroboros").is_none());
        assert!(diags
            .warnings()
            .iter()
            .any(|w| w.message.contains("in terms of itself")));
    }

    #[test]
    fn unresolvable_base_is_rejected() {
        let (registry, diags) = registry_with(&json!({
            "creatures": { "Brute": { "spawn": "Dodo" } }
        }));
        assert!(registry.archetype("Brute").is_none());
        assert!(diags
            .warnings()
            .iter()
            .any(|w| w.message.contains("we can't spawn a Dodo")));
    }

    #[test]
    fn redefining_an_existing_name_warns_and_keeps_first() {
        // "Zombie" is a raw host kind, so a definition named Zombie is a
        // redefinition attempt.
        let (registry, diags) = registry_with(&json!({
            "creatures": { "Zombie": { "spawn": "Skeleton" } }
        }));
        assert!(registry.archetype("Zombie").is_none());
        assert!(diags
            .warnings()
            .iter()
            .any(|w| w.message.contains("already exists")));
    }

    #[test]
    fn definitions_load_in_file_order_so_bases_can_chain() {
        let (registry, diags) = registry_with(&json!({
            "creatures": {
                "Inner": { "spawn": "Zombie" },
                "Outer": { "spawn": "Inner" }
            }
        }));
        assert!(diags.is_empty());
        assert!(registry.archetype("Outer").is_some());
    }

    #[test]
    fn identity_defaults_to_its_own_name() {
        let (registry, _) = registry_with(&json!({
            "creatures": { "Alice": { "spawn": "Zombie" } },
            "identities": { "Alice": {} }
        }));
        let over = registry.identity_override("alice").unwrap();
        assert_eq!(over.archetype, "Alice");
    }

    #[test]
    fn identity_without_valid_archetype_is_dropped() {
        let (registry, diags) = registry_with(&json!({
            "identities": { "Bob": {} }
        }));
        assert!(registry.identity_override("Bob").is_none());
        assert!(diags
            .warnings()
            .iter()
            .any(|w| w.message.contains("no archetype named Bob")));
    }

    #[test]
    fn identity_unknown_shapes_are_skipped() {
        let (registry, diags) = registry_with(&json!({
            "shapes": { "Statue": { "trigger": "pumpkin" } },
            "creatures": { "Knight": { "spawn": "Skeleton" } },
            "identities": { "Alice": { "spawn": "Knight", "shapes": ["Statue", "Ziggurat"] } }
        }));
        let over = registry.identity_override("Alice").unwrap();
        assert_eq!(over.shapes, vec!["Statue".to_string()]);
        assert!(diags
            .warnings()
            .iter()
            .any(|w| w.message.contains("undefined shape Ziggurat")));
    }

    #[test]
    fn first_configured_shape_wins_ties() {
        // Both shapes are a bare pumpkin trigger; the one defined first in
        // the file must win.
        let (registry, _) = registry_with(&json!({
            "shapes": {
                "Second": { "trigger": "gold_block" },
                "First": { "trigger": "pumpkin" },
                "Shadow": { "trigger": "pumpkin" }
            }
        }));
        let world = MiniWorld::default();
        let origin = BlockPos::new(0, 64, 0);
        match registry.match_shape(origin, "pumpkin", None, &world) {
            ShapeMatch::Complete(shape) => assert_eq!(shape.name(), "First"),
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn identity_matching_is_restricted_to_its_shape_list() {
        let (registry, _) = registry_with(&json!({
            "shapes": {
                "Generic": { "trigger": "pumpkin" },
                "Statue": { "trigger": "gold_block" }
            },
            "creatures": { "Knight": { "spawn": "Skeleton" } },
            "identities": { "Alice": { "spawn": "Knight", "shapes": ["Statue"] } }
        }));
        let world = MiniWorld::default();
        let origin = BlockPos::new(0, 64, 0);
        // The generic pumpkin shape would match, but Alice only answers to
        // her own statue.
        match registry.match_shape(origin, "pumpkin", Some("Alice"), &world) {
            ShapeMatch::None => {}
            other => panic!("expected no match for Alice, got {other:?}"),
        }
        match registry.match_shape(origin, "gold_block", Some("Alice"), &world) {
            ShapeMatch::Complete(shape) => assert_eq!(shape.name(), "Statue"),
            other => panic!("expected Statue, got {other:?}"),
        }
    }

    #[test]
    fn obstructed_shape_is_reported_not_skipped() {
        let (registry, _) = registry_with(&json!({
            "shapes": {
                "Obelisk": {
                    "trigger": "gold_block",
                    "body": [ { "block": "diamond_block", "offset": [0, -1, 0] } ]
                }
            }
        }));
        let mut world = MiniWorld::default();
        let origin = BlockPos::new(10, 64, 10);
        world
            .blocks
            .insert(BlockPos::new(10, 63, 10), "diamond_block".to_string());
        // A foreign block right beside the body.
        world
            .blocks
            .insert(BlockPos::new(11, 63, 10), "pumpkin".to_string());
        match registry.match_shape(origin, "gold_block", None, &world) {
            ShapeMatch::Obstructed(shape) => assert_eq!(shape.name(), "Obelisk"),
            other => panic!("expected obstruction, got {other:?}"),
        }
    }

    #[test]
    fn identity_override_beats_generic_archetype_of_same_name() {
        // Both a per-identity binding and a generic definition exist under
        // the name Alice; summoning the identity must use the binding.
        let (mut registry, _) = registry_with(&json!({
            "creatures": {
                "Knight": { "spawn": "Skeleton" },
                "Alice": { "spawn": "Zombie" }
            },
            "identities": { "Alice": { "spawn": "Knight" } }
        }));
        let mut world = MiniWorld::default();
        let entity = registry.summon_identity("Alice", AT, 0, &mut world);
        assert!(entity.is_some());
        assert_eq!(world.spawned, vec!["Skeleton".to_string()]);
        // The summon still bears the identity's name.
        assert_eq!(world.named.len(), 1);
        assert_eq!(world.named[0].1, "Alice");
    }

    #[test]
    fn deep_definition_chains_hit_the_depth_ceiling() {
        let mut registry = ArchetypeRegistry::new(SummonRng::new(42));
        let mut creatures = serde_json::Map::new();
        creatures.insert("Link0".to_string(), json!({ "spawn": "Zombie" }));
        for i in 1..=20 {
            creatures.insert(
                format!("Link{i}"),
                json!({ "spawn": format!("Link{}", i - 1) }),
            );
        }
        let deep = serde_json::Value::Object(
            [("creatures".to_string(), serde_json::Value::Object(creatures))]
                .into_iter()
                .collect(),
        );
        let mut diags = Diagnostics::new();
        registry.load(&deep, &MiniWorld::default(), &mut diags);
        assert!(diags.is_empty());

        let mut world = MiniWorld::default();
        // Link20 needs 21 frames to reach the raw kind — past the ceiling.
        assert!(registry
            .resolve_and_spawn("Link20", AT, None, 0, &mut world)
            .is_none());
        assert!(world.spawned.is_empty());
        // A shallow chain is untouched by the guard.
        assert!(registry
            .resolve_and_spawn("Link3", AT, None, 0, &mut world)
            .is_some());
        assert_eq!(world.spawned, vec!["Zombie".to_string()]);
    }

    #[test]
    fn unknown_name_spawns_nothing() {
        let (mut registry, _) = registry_with(&json!({}));
        let mut world = MiniWorld::default();
        assert!(registry
            .resolve_and_spawn("Nonesuch", AT, None, 0, &mut world)
            .is_none());
        assert!(registry.resolve_and_spawn("", AT, None, 0, &mut world).is_none());
    }

    #[test]
    fn listing_preserves_shape_file_order() {
        let (registry, _) = registry_with(&json!({
            "shapes": {
                "Zed": { "trigger": "pumpkin" },
                "Axe": { "trigger": "gold_block" }
            },
            "creatures": {
                "Brute": { "spawn": "Zombie" },
                "Archer": { "spawn": "Skeleton" }
            }
        }));
        let listing = registry.list();
        assert_eq!(listing.shapes, vec!["Zed".to_string(), "Axe".to_string()]);
        // Archetypes list alphabetically.
        assert_eq!(
            listing.archetypes,
            vec!["Archer".to_string(), "Brute".to_string()]
        );
    }

    #[test]
    fn descriptions_come_back_structured() {
        let (registry, _) = registry_with(&json!({
            "shapes": {
                "Obelisk": {
                    "trigger": "gold_block",
                    "body": [ { "block": "diamond_block", "offset": [0, -1, 0] } ],
                    "summon": [ { "weight": 1.0, "spawn": "Brute" } ]
                }
            },
            "creatures": {
                "Brute": { "spawn": "Zombie", "health": 40 }
            }
        }));
        let shape_info = registry.describe_shape("obelisk").unwrap();
        assert_eq!(shape_info.trigger, "gold_block");
        assert_eq!(shape_info.ground_offset, -1);
        assert_eq!(shape_info.summons[0].archetype, "Brute");
        assert!((shape_info.summons[0].percent - 100.0).abs() < 1e-9);

        let info = registry.describe_archetype("BRUTE").unwrap();
        assert_eq!(info.base, "Zombie");
        assert_eq!(info.health, Some(40));
        assert!(registry.describe_archetype("Nonesuch").is_none());
    }

    #[test]
    fn reload_replaces_tables() {
        let (mut registry, _) = registry_with(&json!({
            "creatures": { "Brute": { "spawn": "Zombie" } }
        }));
        assert!(registry.archetype("Brute").is_some());
        let mut diags = Diagnostics::new();
        registry.load(
            &json!({ "creatures": { "Archer": { "spawn": "Skeleton" } } }),
            &MiniWorld::default(),
            &mut diags,
        );
        assert!(registry.archetype("Brute").is_none());
        assert!(registry.archetype("Archer").is_some());
    }
}
