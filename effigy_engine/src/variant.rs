// Predefined creature variants.
//
// Some summonable identities are not configuration-defined and not plain
// host entity kinds either: they are well-known variations of a base kind,
// produced by spawning the base and toggling an attribute (a wither-type
// skeleton, a saddled pig, a villager with a profession). Each variant is a
// name plus a capability pair — a recognizer over an existing entity and a
// constructor — expressed here as data: the base kind and the trait list.
//
// Recognition scans the table linearly and returns the first match, so the
// table is ordered most-specific-first: a baby zombie villager must be
// reported as BabyZombieVillager, not BabyZombie or ZombieVillager.
//
// See also: `registry.rs`, which consults this table as the third
// resolution tier and for friendly names of already-spawned creatures.

use crate::host::WorldHost;
use crate::types::{EntityHandle, SpawnPoint};
use serde::{Deserialize, Serialize};

/// Villager professions with a predefined variant identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Profession {
    Blacksmith,
    Butcher,
    Farmer,
    Librarian,
    Priest,
}

/// An orthogonal trait toggle distinguishing a variant from its base kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariantTrait {
    /// Wither-type sub-kind of a skeleton.
    Withered,
    /// Carries a saddle.
    Saddled,
    /// A zombified villager.
    Villager,
    /// Juvenile form.
    Baby,
    Profession(Profession),
}

/// A compiled-in variant identity: recognize by base kind + traits,
/// construct by spawning the base kind and applying each trait.
#[derive(Clone, Copy, Debug)]
pub struct PredefinedVariant {
    name: &'static str,
    base_kind: &'static str,
    traits: &'static [VariantTrait],
}

/// The fixed variant table, most specific first.
pub const PREDEFINED_VARIANTS: [PredefinedVariant; 10] = [
    PredefinedVariant {
        name: "BabyZombieVillager",
        base_kind: "zombie",
        traits: &[VariantTrait::Baby, VariantTrait::Villager],
    },
    PredefinedVariant {
        name: "BabyZombie",
        base_kind: "zombie",
        traits: &[VariantTrait::Baby],
    },
    PredefinedVariant {
        name: "WitherSkeleton",
        base_kind: "skeleton",
        traits: &[VariantTrait::Withered],
    },
    PredefinedVariant {
        name: "SaddledPig",
        base_kind: "pig",
        traits: &[VariantTrait::Saddled],
    },
    PredefinedVariant {
        name: "ZombieVillager",
        base_kind: "zombie",
        traits: &[VariantTrait::Villager],
    },
    PredefinedVariant {
        name: "Blacksmith",
        base_kind: "villager",
        traits: &[VariantTrait::Profession(Profession::Blacksmith)],
    },
    PredefinedVariant {
        name: "Butcher",
        base_kind: "villager",
        traits: &[VariantTrait::Profession(Profession::Butcher)],
    },
    PredefinedVariant {
        name: "Farmer",
        base_kind: "villager",
        traits: &[VariantTrait::Profession(Profession::Farmer)],
    },
    PredefinedVariant {
        name: "Librarian",
        base_kind: "villager",
        traits: &[VariantTrait::Profession(Profession::Librarian)],
    },
    PredefinedVariant {
        name: "Priest",
        base_kind: "villager",
        traits: &[VariantTrait::Profession(Profession::Priest)],
    },
];

impl PredefinedVariant {
    /// Look up a variant by case-insensitive name.
    pub fn from_name(name: &str) -> Option<&'static PredefinedVariant> {
        PREDEFINED_VARIANTS
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name.trim()))
    }

    /// If the entity matches a variant's recognizer, return that variant.
    /// First match in table order wins.
    pub fn from_entity(
        world: &impl WorldHost,
        entity: EntityHandle,
    ) -> Option<&'static PredefinedVariant> {
        PREDEFINED_VARIANTS.iter().find(|v| v.recognize(world, entity))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_kind(&self) -> &'static str {
        self.base_kind
    }

    /// True if the entity is of this variant's base kind and carries every
    /// distinguishing trait.
    pub fn recognize(&self, world: &impl WorldHost, entity: EntityHandle) -> bool {
        world.kind_of(entity).eq_ignore_ascii_case(self.base_kind)
            && self.traits.iter().all(|t| world.has_trait(entity, *t))
    }

    /// Spawn the base kind and apply the distinguishing traits.
    pub fn spawn(&self, world: &mut impl WorldHost, at: SpawnPoint) -> Option<EntityHandle> {
        let entity = world.spawn(self.base_kind, at)?;
        for t in self.traits {
            world.apply_trait(entity, *t);
        }
        Some(entity)
    }
}
