// Benchmark for the shape-match scan.
//
// Shape matching runs synchronously on every placement of a named block,
// so the full-table scan has to stay cheap even with a generously sized
// configuration. Measures the worst cases: a placement matching the last
// configured shape, and one matching nothing at all.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use effigy_engine::config::Diagnostics;
use effigy_engine::host::{BlockView, HostCatalog};
use effigy_engine::prng::SummonRng;
use effigy_engine::registry::ArchetypeRegistry;
use effigy_engine::types::BlockPos;
use serde_json::json;
use std::collections::BTreeMap;

struct BenchWorld {
    blocks: BTreeMap<BlockPos, String>,
}

impl HostCatalog for BenchWorld {
    fn is_entity_kind(&self, _: &str) -> bool {
        true
    }
    fn is_block(&self, _: &str) -> bool {
        true
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

impl BlockView for BenchWorld {
    fn block_at(&self, pos: BlockPos) -> String {
        self.blocks
            .get(&pos)
            .cloned()
            .unwrap_or_else(|| "air".to_string())
    }
    fn is_open(&self, pos: BlockPos) -> bool {
        !self.blocks.contains_key(&pos)
    }
}

/// A registry with `n` column-shaped patterns, each on a distinct trigger.
fn build_registry(n: usize) -> ArchetypeRegistry {
    let mut shapes = serde_json::Map::new();
    for i in 0..n {
        shapes.insert(
            format!("Pillar{i}"),
            json!({
                "trigger": format!("block_{i}"),
                "body": [
                    { "block": format!("base_{i}"), "offset": [0, -1, 0] },
                    { "block": format!("base_{i}"), "offset": [0, -2, 0] }
                ],
                "summon": [ { "weight": 1.0, "spawn": "Zombie" } ]
            }),
        );
    }
    let config = serde_json::Value::Object(
        [("shapes".to_string(), serde_json::Value::Object(shapes))]
            .into_iter()
            .collect(),
    );

    let mut registry = ArchetypeRegistry::new(SummonRng::new(1));
    let mut diags = Diagnostics::new();
    let catalog = BenchWorld {
        blocks: BTreeMap::new(),
    };
    registry.load(&config, &catalog, &mut diags);
    registry
}

fn bench_shape_match(c: &mut Criterion) {
    const SHAPES: usize = 64;
    let registry = build_registry(SHAPES);
    let origin = BlockPos::new(0, 64, 0);

    let last = SHAPES - 1;
    let mut blocks = BTreeMap::new();
    blocks.insert(BlockPos::new(0, 63, 0), format!("base_{last}"));
    blocks.insert(BlockPos::new(0, 62, 0), format!("base_{last}"));
    let world = BenchWorld { blocks };

    c.bench_function("match last of 64 shapes", |b| {
        b.iter(|| {
            registry.match_shape(
                black_box(origin),
                black_box(&format!("block_{last}")),
                None,
                &world,
            )
        })
    });

    c.bench_function("match nothing across 64 shapes", |b| {
        b.iter(|| registry.match_shape(black_box(origin), black_box("unplaceable"), None, &world))
    });
}

criterion_group!(benches, bench_shape_match);
criterion_main!(benches);
