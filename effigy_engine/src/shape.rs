// Shape patterns — the block arrangements that trigger a summon.
//
// A shape names the block type whose placement triggers the check (the
// trigger block) and a body: (relative offset, required block type) pairs
// that must all be present around the placement point. A completed shape
// chooses an archetype name from its weighted summon list; the registry
// then vaporizes the body and spawns the archetype at the shape's ground
// level.
//
// Matching is a pure function of world state: blocks are read through a
// callback, nothing is mutated, and repeated calls give the same answer.
// The registry tests shapes in configuration order and the first complete
// one wins, so a shape never needs to know about its neighbours.
//
// See also: `selection.rs` for the weighted summon list, `registry.rs` for
// the match scan and the identity-restricted variant of it.

use crate::config::{ConfigError, ConfigSection, Diagnostics};
use crate::host::HostCatalog;
use crate::selection::WeightedSelection;
use crate::types::{BlockPos, SpawnPoint, lower_key};
use effigy_prng::SummonRng;
use serde::Serialize;
use smallvec::SmallVec;

/// One required block of a shape's body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BodyBlock {
    /// Position relative to the trigger block.
    pub offset: BlockPos,
    /// Required block type (stored lower-cased).
    pub block: String,
}

/// A named block arrangement that can summon creatures.
#[derive(Clone, Debug)]
pub struct ShapePattern {
    name: String,
    /// Trigger block type, lower-cased.
    trigger: String,
    /// Disabled shapes never match; their archetypes stay reachable by
    /// command or per-identity rules.
    enabled: bool,
    body: SmallVec<[BodyBlock; 8]>,
    /// Minimum Y offset across the body — where the summon stands.
    ground_offset: i32,
    summons: WeightedSelection<String>,
}

/// A summon choice with its share of the total weight, for listings.
#[derive(Clone, Debug, Serialize)]
pub struct SummonChance {
    pub archetype: String,
    pub weight: f64,
    pub percent: f64,
}

/// Render a weighted archetype list as percentages.
pub(crate) fn summon_breakdown(selection: &WeightedSelection<String>) -> Vec<SummonChance> {
    let total = selection.total_weight();
    selection
        .entries()
        .map(|(weight, archetype)| SummonChance {
            archetype: archetype.clone(),
            weight,
            percent: 100.0 * weight / total,
        })
        .collect()
}

/// Structured description of a shape, for host-side rendering.
#[derive(Clone, Debug, Serialize)]
pub struct ShapeInfo {
    pub name: String,
    pub trigger: String,
    pub enabled: bool,
    pub ground_offset: i32,
    pub body: Vec<BodyBlock>,
    pub summons: Vec<SummonChance>,
}

impl ShapePattern {
    /// Load a shape from its configuration section. Returns `None` (after
    /// warning) when the trigger is missing/unknown or any body block is
    /// malformed — a shape with a hole in its body must not half-match.
    pub fn from_config(
        name: &str,
        section: &ConfigSection<'_>,
        catalog: &dyn HostCatalog,
        diags: &mut Diagnostics,
    ) -> Option<ShapePattern> {
        let trigger = section.str_or("trigger", "", diags);
        if trigger.is_empty() || !catalog.is_block(&trigger) {
            diags.warn(
                section.path(),
                format!("shape {name} has an invalid trigger block `{trigger}`"),
            );
            return None;
        }

        let enabled = section.bool_or("enabled", true, diags);
        if !enabled {
            diags.warn(
                section.path(),
                format!("summoning by building shape {name} is disabled"),
            );
        }

        let mut shape = ShapePattern {
            name: name.to_string(),
            trigger: lower_key(&trigger),
            enabled,
            body: SmallVec::new(),
            ground_offset: 0,
            summons: WeightedSelection::new(),
        };

        if let Some(entries) = section.list("body") {
            for (i, entry) in entries.iter().enumerate() {
                let context = format!("{}.body[{i}]", section.path());
                match load_body_block(entry, &context, catalog, diags) {
                    Ok(block) => shape.add_body_block(block),
                    Err(err) => {
                        diags.warn(context, err);
                        return None;
                    }
                }
            }
        }

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
                shape.summons.add_choice(spawn, weight);
            }
        }

        Some(shape)
    }

    fn add_body_block(&mut self, block: BodyBlock) {
        if block.offset.y < self.ground_offset {
            self.ground_offset = block.offset.y;
        }
        self.body.push(block);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Y offset of the lowest body block (0 for a bare trigger).
    pub fn ground_offset(&self) -> i32 {
        self.ground_offset
    }

    pub fn body(&self) -> &[BodyBlock] {
        &self.body
    }

    /// True if this shape is enabled, `placed` is its trigger block, and
    /// every body block is in place around `origin`.
    pub fn is_complete(
        &self,
        origin: BlockPos,
        placed: &str,
        block_at: impl Fn(BlockPos) -> String,
    ) -> bool {
        self.enabled
            && self.trigger.eq_ignore_ascii_case(placed)
            && self
                .body
                .iter()
                .all(|b| block_at(origin.offset(b.offset)).eq_ignore_ascii_case(&b.block))
    }

    /// True if the shape has a one-block horizontal gap: every cell of the
    /// shape (trigger included) must have its 8 horizontal neighbours be
    /// either other shape cells or open. Keeps a summon from eating blocks
    /// that belong to an adjacent build.
    pub fn has_clearance(&self, origin: BlockPos, is_open: impl Fn(BlockPos) -> bool) -> bool {
        let cells: Vec<BlockPos> = std::iter::once(origin)
            .chain(self.body.iter().map(|b| origin.offset(b.offset)))
            .collect();
        cells.iter().all(|cell| {
            (-1..=1).all(|dx| {
                (-1..=1).all(|dz| {
                    if dx == 0 && dz == 0 {
                        return true;
                    }
                    let neighbour = cell.offset(BlockPos::new(dx, 0, dz));
                    cells.contains(&neighbour) || is_open(neighbour)
                })
            })
        })
    }

    /// Pick the archetype this completion summons, or `None` when no summon
    /// entries were configured (shape usable only via per-identity rules).
    pub fn choose_archetype(&self, rng: &mut SummonRng) -> Option<&str> {
        self.summons.choose(rng).map(String::as_str)
    }

    /// Clear every body block of a committed match. The trigger block
    /// itself was never placed — the host cancels the placement event.
    pub fn vaporize(&self, origin: BlockPos, mut clear: impl FnMut(BlockPos)) {
        for b in &self.body {
            clear(origin.offset(b.offset));
        }
    }

    /// Where a summon triggered at `origin` should stand.
    pub fn spawn_point(&self, origin: BlockPos) -> SpawnPoint {
        origin.spawn_point(self.ground_offset)
    }

    pub fn describe(&self) -> ShapeInfo {
        ShapeInfo {
            name: self.name.clone(),
            trigger: self.trigger.clone(),
            enabled: self.enabled,
            ground_offset: self.ground_offset,
            body: self.body.iter().cloned().collect(),
            summons: summon_breakdown(&self.summons),
        }
    }
}

fn load_body_block(
    entry: &serde_json::Value,
    context: &str,
    catalog: &dyn HostCatalog,
    diags: &mut Diagnostics,
) -> Result<BodyBlock, ConfigError> {
    if !entry.is_object() {
        return Err(ConfigError::Malformed("expected a mapping".to_string()));
    }
    let entry = ConfigSection::new(entry, context);
    let block = entry.str_or("block", "", diags);
    if block.is_empty() || !catalog.is_block(&block) {
        return Err(ConfigError::Invalid {
            key: block,
            expected: "block type",
        });
    }
    let offset = entry.list("offset").ok_or(ConfigError::Missing {
        key: "offset".to_string(),
    })?;
    if offset.len() != 3 {
        return Err(ConfigError::Malformed(
            "offset needs exactly three components".to_string(),
        ));
    }
    let mut xyz = [0i32; 3];
    for (slot, value) in xyz.iter_mut().zip(offset) {
        *slot = value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .ok_or_else(|| ConfigError::Malformed("offset components must be numbers".to_string()))?
            as i32;
    }
    Ok(BodyBlock {
        offset: BlockPos::new(xyz[0], xyz[1], xyz[2]),
        block: lower_key(&block),
    })
}
