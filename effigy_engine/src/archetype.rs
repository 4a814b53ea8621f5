// Archetype definitions — what a named summon actually is.
//
// An archetype delegates to a base archetype (another definition, a
// predefined variant, or a raw host kind) and layers overrides on whatever
// that base eventually produces: health, breath, invulnerability, despawn
// policy, status effects, five equipment slots with independent drop
// chances, an optional mount, an optional cosmetic mask identity, and
// presentation on spawn (a sound plus a burst of damage-free strikes) and
// escorts spawned nearby on independent delays.
//
// Definitions form a directed graph through base/mount/escort references.
// Only direct self-reference is rejected at load (see `registry.rs`);
// everything else resolves lazily at spawn time.
//
// Malformed numeric ranges are clamped rather than rejected: a `max` below
// its `min` is forced up to `min`, negative counts and durations go to
// zero. A dropped entry is always warned, never silently ignored.

use crate::config::{ConfigSection, Diagnostics};
use crate::effects::{DeferredEffect, EffectQueue};
use crate::host::{HostCatalog, WorldHost};
use crate::item::{EquipmentPiece, ItemSpec};
use crate::selection::WeightedSelection;
use crate::shape::{SummonChance, summon_breakdown};
use crate::types::{EntityHandle, EquipmentSlot, SpawnPoint};
use effigy_prng::SummonRng;
use serde::{Deserialize, Serialize};

/// A status effect applied to the summon when it spawns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: String,
    /// Duration in ticks. Defaults to effectively-forever.
    pub duration: i64,
    pub amplifier: i32,
    /// Ambient effects render with subdued particles.
    pub ambient: bool,
}

/// Parameters of the visual strike burst played on spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrikeBurst {
    pub min: u32,
    pub max: u32,
    /// Distance bounds of follow-up strikes from the spawn point, on the
    /// horizontal plane.
    pub min_range: f64,
    pub max_range: f64,
    /// Follow-up strikes land within this many ticks of the spawn.
    pub duration: u32,
}

impl Default for StrikeBurst {
    fn default() -> Self {
        Self {
            min: 0,
            max: 0,
            min_range: 2.0,
            max_range: 5.0,
            duration: 30,
        }
    }
}

/// Escort sub-spawns: count, placement ring, time window, and the weighted
/// archetype choices.
#[derive(Clone, Debug)]
pub struct EscortSpec {
    pub min: u32,
    pub max: u32,
    pub min_range: f64,
    pub max_range: f64,
    /// Each escort spawns at an independent random delay within this many
    /// ticks.
    pub duration: u32,
    pub summons: WeightedSelection<String>,
}

/// A named, possibly recursively-defined summon template.
#[derive(Clone, Debug)]
pub struct ArchetypeDefinition {
    name: String,
    /// The archetype this definition spawns and then customizes.
    base: String,
    mount: Option<String>,
    /// Cosmetic identity override for headgear skinning, independent of the
    /// display name.
    mask: Option<String>,
    /// Name tag used when the summon was given no explicit name.
    default_name: Option<String>,
    /// When set and true, configured headgear is kept instead of the
    /// identity head; takes precedence over `mask`. Stored as an Option so
    /// descriptions can show only explicitly configured values.
    keep_helmet: Option<bool>,
    health: Option<i64>,
    /// Breath/air capacity in ticks.
    breath: Option<i64>,
    invulnerable_ticks: Option<i64>,
    despawns: Option<bool>,
    sound: Option<String>,
    strikes: StrikeBurst,
    effects: Vec<StatusEffect>,
    /// Indexed in step with `EquipmentSlot::ALL`.
    equipment: [EquipmentPiece; 5],
    escorts: Option<EscortSpec>,
}

impl ArchetypeDefinition {
    /// Load a definition from its configuration section. Returns `None`
    /// (after warning) only when the mandatory base archetype is missing;
    /// everything else degrades field by field.
    pub fn from_config(
        name: &str,
        section: &ConfigSection<'_>,
        catalog: &dyn HostCatalog,
        diags: &mut Diagnostics,
    ) -> Option<ArchetypeDefinition> {
        let base = section.str_or("spawn", "", diags);
        if base.is_empty() {
            diags.warn(
                section.path(),
                format!("creature {name} can't be defined because it is missing a `spawn` value"),
            );
            return None;
        }

        let sound = match section.opt_str("sound", diags) {
            Some(s) if !s.is_empty() => {
                if catalog.is_sound(&s) {
                    Some(s)
                } else {
                    diags.warn(section.path(), format!("creature {name} has invalid sound {s}"));
                    None
                }
            }
            _ => None,
        };

        let mut def = ArchetypeDefinition {
            name: name.to_string(),
            base,
            mount: section.opt_str("mount", diags),
            mask: section.opt_str("mask", diags),
            default_name: section.opt_str("default_name", diags),
            keep_helmet: section.opt_bool("keep_helmet", diags),
            health: section.opt_i64("health", diags).map(|h| h.max(1)),
            breath: section.opt_i64("air", diags).map(|a| a.max(0)),
            invulnerable_ticks: section.opt_i64("invulnerable_ticks", diags).map(|t| t.max(0)),
            despawns: section.opt_bool("despawns", diags),
            sound,
            strikes: StrikeBurst::default(),
            effects: Vec::new(),
            equipment: Default::default(),
            escorts: None,
        };

        if let Some(value) = section.child_object("lightning") {
            let path = format!("{}.lightning", section.path());
            let lightning = ConfigSection::new(value, &path);
            let min = lightning.i64_or("min", 0, diags).max(0) as u32;
            let max = (lightning.i64_or("max", i64::from(min), diags).max(0) as u32).max(min);
            let min_range = lightning.f64_or("min_range", 2.0, diags).max(0.0);
            let max_range = lightning.f64_or("max_range", 5.0, diags).max(min_range);
            let duration = lightning.i64_or("duration", 30, diags).max(0) as u32;
            def.strikes = StrikeBurst {
                min,
                max,
                min_range,
                max_range,
                duration,
            };
        }

        if let Some(entries) = section.list("effects") {
            for (i, entry) in entries.iter().enumerate() {
                let context = format!("{}.effects[{i}]", section.path());
                if !entry.is_object() {
                    diags.warn(context, "expected a mapping; skipping");
                    continue;
                }
                let entry = ConfigSection::new(entry, &context);
                match entry.opt_str("type", diags) {
                    None => diags.warn(context.clone(), "status effect has no type"),
                    Some(kind) if !catalog.is_status_effect(&kind) => {
                        diags.warn(
                            context.clone(),
                            format!("`{kind}` is not a valid status effect type"),
                        );
                    }
                    Some(kind) => def.effects.push(StatusEffect {
                        kind,
                        duration: entry.i64_or("duration", i64::from(i32::MAX), diags),
                        amplifier: entry.i64_or("amplifier", 1, diags) as i32,
                        ambient: entry.bool_or("ambient", true, diags),
                    }),
                }
            }
        }

        for (i, slot) in EquipmentSlot::ALL.iter().enumerate() {
            if let Some(value) = section.child_object(slot.config_key()) {
                let path = format!("{}.{}", section.path(), slot.config_key());
                let piece = ConfigSection::new(value, &path);
                def.equipment[i] = EquipmentPiece::from_config(Some(&piece), catalog, diags);
            }
        }

        if let Some(value) = section.child_object("escorts") {
            let path = format!("{}.escorts", section.path());
            def.escorts = Some(load_escorts(&ConfigSection::new(value, &path), diags));
        }

        Some(def)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The archetype name this definition spawns and customizes. Distinct
    /// from `name` — a definition in terms of itself is rejected at load.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The archetype this summon rides, if any.
    pub fn mount(&self) -> Option<&str> {
        self.mount.as_deref().filter(|m| !m.is_empty())
    }

    /// The identity whose headgear this summon always wears, irrespective
    /// of the name it was summoned with.
    pub fn mask(&self) -> Option<&str> {
        self.mask.as_deref()
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// True if configured headgear must be kept rather than replaced by an
    /// identity head. Defaults to false when unset.
    pub fn keep_helmet(&self) -> bool {
        self.keep_helmet.unwrap_or(false)
    }

    pub fn escorts(&self) -> Option<&EscortSpec> {
        self.escorts.as_ref()
    }

    /// Play the spawn sound and the strike burst: the first strike lands
    /// immediately at the spawn point, the rest are deferred to random ring
    /// positions within the configured window.
    pub fn spawn_effects(
        &self,
        at: SpawnPoint,
        now: u64,
        rng: &mut SummonRng,
        queue: &mut EffectQueue,
        world: &mut impl WorldHost,
    ) {
        if let Some(sound) = &self.sound {
            world.play_sound(at, sound);
        }

        let strikes = rng.roll_between(self.strikes.min, self.strikes.max);
        if strikes > 0 {
            world.strike_effect(at);
            for _ in 1..strikes {
                let delay = rng.roll_between(0, self.strikes.duration);
                let target = ring_position(at, self.strikes.min_range, self.strikes.max_range, rng);
                queue.schedule(now + u64::from(delay), DeferredEffect::Strike { at: target });
            }
        }
    }

    /// Roll the escort count and queue each escort on an independent delay
    /// and ring position. The archetype of each escort is drawn when it is
    /// scheduled.
    pub fn schedule_escorts(
        &self,
        at: SpawnPoint,
        now: u64,
        rng: &mut SummonRng,
        queue: &mut EffectQueue,
    ) {
        let Some(escorts) = &self.escorts else {
            return;
        };
        let count = rng.roll_between(escorts.min, escorts.max);
        for _ in 0..count {
            let delay = rng.roll_between(0, escorts.duration);
            let target = ring_position(at, escorts.min_range, escorts.max_range, rng);
            if let Some(archetype) = escorts.summons.choose(rng) {
                queue.schedule(
                    now + u64::from(delay),
                    DeferredEffect::SpawnEscort {
                        archetype: archetype.clone(),
                        at: target,
                    },
                );
            }
        }
    }

    /// Apply this definition's overrides to an already-spawned entity.
    pub fn customize(&self, entity: EntityHandle, world: &mut impl WorldHost) {
        if let Some(health) = self.health {
            world.set_health(entity, health as f64);
        }
        if let Some(breath) = self.breath {
            world.set_breath(entity, breath);
        }
        if let Some(ticks) = self.invulnerable_ticks {
            world.set_invulnerability(entity, ticks);
        }
        if let Some(despawns) = self.despawns {
            world.set_despawns(entity, despawns);
        }
        for effect in &self.effects {
            world.add_status_effect(entity, effect);
        }
        for (i, slot) in EquipmentSlot::ALL.iter().enumerate() {
            let piece = &self.equipment[i];
            if let Some(item) = &piece.item {
                world.set_equipment(entity, *slot, item);
            }
            if let Some(chance) = piece.drop_chance {
                world.set_drop_chance(entity, *slot, chance);
            }
        }
    }

    pub fn describe(&self) -> ArchetypeInfo {
        ArchetypeInfo {
            name: self.name.clone(),
            base: self.base.clone(),
            mount: self.mount.clone(),
            mask: self.mask.clone(),
            default_name: self.default_name.clone(),
            keep_helmet: self.keep_helmet,
            health: self.health,
            breath: self.breath,
            invulnerable_ticks: self.invulnerable_ticks,
            despawns: self.despawns,
            sound: self.sound.clone(),
            strikes: (self.strikes.max > 0).then_some(self.strikes),
            effects: self.effects.clone(),
            equipment: EquipmentSlot::ALL
                .iter()
                .zip(&self.equipment)
                .filter(|(_, piece)| piece.is_configured())
                .map(|(slot, piece)| EquipmentInfo {
                    slot: *slot,
                    item: piece.item.clone(),
                    drop_chance: piece.drop_chance,
                })
                .collect(),
            escorts: self.escorts.as_ref().filter(|e| e.max > 0).map(|e| EscortInfo {
                min: e.min,
                max: e.max,
                min_range: e.min_range,
                max_range: e.max_range,
                duration: e.duration,
                summons: summon_breakdown(&e.summons),
            }),
        }
    }
}

fn load_escorts(section: &ConfigSection<'_>, diags: &mut Diagnostics) -> EscortSpec {
    let min = section.i64_or("min", 0, diags).max(0) as u32;
    let max = (section.i64_or("max", i64::from(min), diags).max(0) as u32).max(min);
    let min_range = section.f64_or("min_range", 1.0, diags).max(0.0);
    let max_range = section.f64_or("max_range", min_range, diags).max(min_range);
    let duration = section.i64_or("duration", 30, diags).max(0) as u32;

    let mut summons = WeightedSelection::new();
    if let Some(entries) = section.list("summon") {
        for (i, entry) in entries.iter().enumerate() {
            let context = format!("{}.summon[{i}]", section.path());
            if !entry.is_object() {
                diags.warn(context, "expected a mapping; skipping");
                continue;
            }
            let entry = ConfigSection::new(entry, &context);
            let weight = entry.f64_or("weight", 1.0, diags);
            let spawn = entry.str_or("spawn", "", diags);
            if spawn.is_empty() || weight <= 0.0 {
                diags.warn(context.clone(), "entry has an invalid weight or spawn value");
            } else {
                summons.add_choice(spawn, weight);
            }
        }
    }

    EscortSpec {
        min,
        max,
        min_range,
        max_range,
        duration,
        summons,
    }
}

/// A random point at the same altitude as `centre`, between `min_range` and
/// `max_range` blocks away on the horizontal plane.
fn ring_position(
    centre: SpawnPoint,
    min_range: f64,
    max_range: f64,
    rng: &mut SummonRng,
) -> SpawnPoint {
    let range = rng.range_f64(min_range, max_range);
    let angle = rng.next_f64() * std::f64::consts::TAU;
    centre.offset_xz(range * angle.cos(), range * angle.sin())
}

/// Structured description of an archetype, for host-side rendering.
#[derive(Clone, Debug, Serialize)]
pub struct ArchetypeInfo {
    pub name: String,
    pub base: String,
    pub mount: Option<String>,
    pub mask: Option<String>,
    pub default_name: Option<String>,
    pub keep_helmet: Option<bool>,
    pub health: Option<i64>,
    pub breath: Option<i64>,
    pub invulnerable_ticks: Option<i64>,
    pub despawns: Option<bool>,
    pub sound: Option<String>,
    /// Present only when the archetype actually strikes.
    pub strikes: Option<StrikeBurst>,
    pub effects: Vec<StatusEffect>,
    /// Only configured slots appear.
    pub equipment: Vec<EquipmentInfo>,
    /// Present only when escorts can actually spawn.
    pub escorts: Option<EscortInfo>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EquipmentInfo {
    pub slot: EquipmentSlot,
    pub item: Option<ItemSpec>,
    pub drop_chance: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EscortInfo {
    pub min: u32,
    pub max: u32,
    pub min_range: f64,
    pub max_range: f64,
    pub duration: u32,
    pub summons: Vec<SummonChance>,
}
