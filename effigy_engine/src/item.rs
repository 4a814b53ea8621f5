// Equipment item descriptors.
//
// An archetype can equip up to five slots, each from an `ItemSpec` loaded
// out of its configuration section. Item and enchantment kinds are
// validated against the host catalog at load: an unknown item kind drops
// the whole item (with a warning), an unknown enchantment kind drops just
// that enchantment. The drop chance lives beside the item, not inside it —
// a slot can override the drop chance alone.

use crate::config::{ConfigSection, Diagnostics};
use crate::host::HostCatalog;
use serde::{Deserialize, Serialize};

/// An enchantment applied to an equipment item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enchant {
    pub kind: String,
    pub level: i32,
}

/// A single equipment item: kind, wear, and cosmetic metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Host item kind, e.g. "iron_helmet".
    pub item: String,
    /// Damage / wear value, >= 0.
    pub damage: i32,
    /// Custom display name, if any.
    pub display_name: Option<String>,
    /// Lore lines shown on the item.
    pub lore: Vec<String>,
    pub enchantments: Vec<Enchant>,
}

impl ItemSpec {
    /// Load an item from its configuration section, or `None` (with a
    /// warning) when the item kind is missing or unknown to the host.
    pub fn from_config(
        section: &ConfigSection<'_>,
        catalog: &dyn HostCatalog,
        diags: &mut Diagnostics,
    ) -> Option<ItemSpec> {
        let kind = section.str_or("item", "", diags);
        if kind.is_empty() || !catalog.is_item(&kind) {
            diags.warn(section.path(), format!("invalid item kind `{kind}`"));
            return None;
        }

        let damage = section.i64_or("damage", 0, diags).max(0) as i32;
        let display_name = section.opt_str("name", diags);
        let lore = section.opt_str_list("lore", diags).unwrap_or_default();

        let mut enchantments = Vec::new();
        if let Some(entries) = section.list("enchantments") {
            for (i, entry) in entries.iter().enumerate() {
                let context = format!("{}.enchantments[{i}]", section.path());
                if !entry.is_object() {
                    diags.warn(context, "expected a mapping; skipping");
                    continue;
                }
                let entry = ConfigSection::new(entry, &context);
                match entry.opt_str("type", diags) {
                    None => diags.warn(context.clone(), "enchantment has no type"),
                    Some(kind) if !catalog.is_enchantment(&kind) => {
                        diags.warn(context.clone(), format!("`{kind}` is not a valid enchantment"));
                    }
                    Some(kind) => {
                        let level = entry.i64_or("level", 1, diags).max(1) as i32;
                        enchantments.push(Enchant { kind, level });
                    }
                }
            }
        }

        Some(ItemSpec {
            item: kind,
            damage,
            display_name,
            lore,
            enchantments,
        })
    }
}

/// An equipment slot override: an optional item and an independent optional
/// drop chance. The drop chance applies even when the item failed to load.
#[derive(Clone, Debug, Default, Serialize)]
pub struct EquipmentPiece {
    pub item: Option<ItemSpec>,
    pub drop_chance: Option<f64>,
}

impl EquipmentPiece {
    /// Load a slot override from the slot's configuration section, if the
    /// section exists at all.
    pub fn from_config(
        section: Option<&ConfigSection<'_>>,
        catalog: &dyn HostCatalog,
        diags: &mut Diagnostics,
    ) -> EquipmentPiece {
        match section {
            None => EquipmentPiece::default(),
            Some(section) => EquipmentPiece {
                item: ItemSpec::from_config(section, catalog, diags),
                drop_chance: section.opt_f64("drop_chance", diags),
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.item.is_some() || self.drop_chance.is_some()
    }
}
