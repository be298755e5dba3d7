//! Tile variants and their per-variant effect/damage contracts.
//!
//! A tile never mutates its own variant in place. Operations that would
//! change the variant (ice shattering to water, sand blasted to ground)
//! return a [`TileOutcome::ReplaceWith`] command value; the owning square
//! performs the swap and applies the effect-carry policy. In-place effect
//! membership changes (forest catching fire) are applied directly.

use crate::effect::{Effect, EffectSet};
use crate::geometry::{Coordinate, Direction};

/// Closed set of tile variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileKind {
    Ground,
    Grassland,
    Forest,
    Sand,
    Water,
    Ice,
    DamagedIce,
    Chasm,
    Lava,
    Teleporter { companion: Option<Coordinate> },
    Conveyor { direction: Direction },
}

impl TileKind {
    /// Effects implied by the variant itself rather than stored on the
    /// tile: water is always submerged, lava is submerged and
    /// permanently on fire.
    const fn implicit_effects(self) -> EffectSet {
        match self {
            Self::Water => EffectSet::SUBMERGED,
            Self::Lava => EffectSet::SUBMERGED.union(EffectSet::FIRE),
            _ => EffectSet::empty(),
        }
    }
}

/// What happens to the ground beneath a unit that ends movement there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryHazard {
    /// Safe footing.
    None,
    /// Non-massive, non-flying ground units drown; carried acid is
    /// donated to the water.
    Drown,
    /// Non-flying units fall and are removed outright, regardless of
    /// damage state.
    Fall,
    /// Drowns like water, and ignites massive units that survive it.
    Molten,
}

/// Command value describing a variant transition requested by a tile
/// operation. Applied by the owning square, never by the tile itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum TileOutcome {
    Unchanged,
    ReplaceWith { kind: TileKind, carry: EffectCarry },
}

/// Which of the old tile's effects survive a variant swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectCarry {
    /// Drop everything.
    None,
    /// Keep the persistent subset (smoke, acid).
    Persistent,
    /// Keep the persistent subset and add `extra`.
    PersistentWith(EffectSet),
}

impl EffectCarry {
    pub(crate) fn carried(self, old: EffectSet) -> EffectSet {
        match self {
            Self::None => EffectSet::empty(),
            Self::Persistent => old & EffectSet::PERSISTENT,
            Self::PersistentWith(extra) => (old & EffectSet::PERSISTENT) | extra,
        }
    }
}

/// One board square's terrain: a variant plus its active effect tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub kind: TileKind,
    effects: EffectSet,
}

impl Tile {
    pub const fn new(kind: TileKind) -> Self {
        Self {
            kind,
            effects: EffectSet::empty(),
        }
    }

    pub(crate) const fn with_effects(kind: TileKind, effects: EffectSet) -> Self {
        Self { kind, effects }
    }

    /// Active effects, including those implied by the variant (submerged
    /// on water, fire on lava).
    pub fn effects(&self) -> EffectSet {
        self.effects | self.kind.implicit_effects()
    }

    pub(crate) fn insert_effect(&mut self, set: EffectSet) {
        self.effects |= set;
    }

    pub(crate) fn remove_effect(&mut self, set: EffectSet) {
        self.effects &= !set;
    }

    /// Hazard a unit faces by ending movement on this tile.
    pub fn entry_hazard(&self) -> EntryHazard {
        match self.kind {
            TileKind::Water => EntryHazard::Drown,
            TileKind::Chasm => EntryHazard::Fall,
            TileKind::Lava => EntryHazard::Molten,
            _ => EntryHazard::None,
        }
    }

    /// Dispatches one effect application to the variant contract.
    pub(crate) fn apply_effect(&mut self, effect: Effect) -> TileOutcome {
        match effect {
            Effect::Fire => self.apply_fire(),
            Effect::Ice => self.apply_ice(),
            Effect::Acid => self.apply_acid(),
            Effect::Smoke => self.apply_smoke(),
            // Marker tags attach directly; the variant rules never
            // generate them and only damage clears them.
            Effect::Mine | Effect::TimePod | Effect::VekEmerge => {
                self.effects |= effect.as_set();
                TileOutcome::Unchanged
            }
            // Unit-only tags are meaningless on bare terrain.
            Effect::Shield | Effect::Web | Effect::Explosive | Effect::Submerged => {
                TileOutcome::Unchanged
            }
        }
    }

    fn apply_fire(&mut self) -> TileOutcome {
        match self.kind {
            // Water cannot burn; lava already does; chasm holds nothing.
            TileKind::Water | TileKind::Lava | TileKind::Chasm => TileOutcome::Unchanged,
            // Sand smothers flame.
            TileKind::Sand => TileOutcome::Unchanged,
            // Fire bypasses the damage staircase and melts ice straight
            // to water in one step. The melt sheds everything the ice
            // carried, acid included.
            TileKind::Ice | TileKind::DamagedIce => TileOutcome::ReplaceWith {
                kind: TileKind::Water,
                carry: EffectCarry::None,
            },
            _ => {
                self.effects |= EffectSet::FIRE;
                TileOutcome::Unchanged
            }
        }
    }

    fn apply_ice(&mut self) -> TileOutcome {
        match self.kind {
            TileKind::Water => TileOutcome::ReplaceWith {
                kind: TileKind::Ice,
                carry: EffectCarry::Persistent,
            },
            // Variant closure: lava and chasm reject ice.
            TileKind::Lava | TileKind::Chasm => TileOutcome::Unchanged,
            _ => {
                // Freezing dry land only snuffs any burning.
                self.effects &= !EffectSet::FIRE;
                TileOutcome::Unchanged
            }
        }
    }

    fn apply_acid(&mut self) -> TileOutcome {
        match self.kind {
            // Variant closure: lava and chasm reject acid.
            TileKind::Lava | TileKind::Chasm => TileOutcome::Unchanged,
            _ => {
                self.effects |= EffectSet::ACID;
                TileOutcome::Unchanged
            }
        }
    }

    fn apply_smoke(&mut self) -> TileOutcome {
        // Smoke is a cloud above the square; every variant holds it,
        // including chasm and lava.
        self.effects |= EffectSet::SMOKE;
        TileOutcome::Unchanged
    }

    /// Damage reaching bare terrain (no unit on the square).
    pub(crate) fn take_damage(&mut self) -> TileOutcome {
        // Pod and mine markers are destroyed by any damage.
        self.effects &= !(EffectSet::MINE | EffectSet::TIME_POD);
        match self.kind {
            TileKind::Forest => {
                // Forests ignite from damage, never from mere occupancy.
                self.effects |= EffectSet::FIRE;
                TileOutcome::Unchanged
            }
            TileKind::Grassland => TileOutcome::ReplaceWith {
                kind: TileKind::Ground,
                carry: EffectCarry::Persistent,
            },
            // One-way: blasted sand becomes smoked bare ground.
            TileKind::Sand => TileOutcome::ReplaceWith {
                kind: TileKind::Ground,
                carry: EffectCarry::PersistentWith(EffectSet::SMOKE),
            },
            TileKind::Ice => TileOutcome::ReplaceWith {
                kind: TileKind::DamagedIce,
                carry: EffectCarry::Persistent,
            },
            TileKind::DamagedIce => TileOutcome::ReplaceWith {
                kind: TileKind::Water,
                carry: EffectCarry::Persistent,
            },
            _ => TileOutcome::Unchanged,
        }
    }

    /// Repair-class cleanup of the square.
    pub(crate) fn repair(&mut self) -> TileOutcome {
        match self.kind {
            // Lava never stops burning; repair clears the smoke only.
            TileKind::Lava => {
                self.effects &= !EffectSet::SMOKE;
            }
            _ => {
                self.effects &= !(EffectSet::FIRE | EffectSet::SMOKE);
            }
        }
        TileOutcome::Unchanged
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::new(TileKind::Ground)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forest_ignites_from_damage_only() {
        let mut tile = Tile::new(TileKind::Forest);
        assert_eq!(tile.effects(), EffectSet::empty());
        assert_eq!(tile.take_damage(), TileOutcome::Unchanged);
        assert_eq!(tile.effects(), EffectSet::FIRE);
    }

    #[test]
    fn sand_blasts_to_smoked_ground() {
        let mut tile = Tile::new(TileKind::Sand);
        let outcome = tile.take_damage();
        assert_eq!(
            outcome,
            TileOutcome::ReplaceWith {
                kind: TileKind::Ground,
                carry: EffectCarry::PersistentWith(EffectSet::SMOKE),
            }
        );
    }

    #[test]
    fn ice_takes_two_hits_but_melts_in_one() {
        let mut ice = Tile::new(TileKind::Ice);
        assert_eq!(
            ice.take_damage(),
            TileOutcome::ReplaceWith {
                kind: TileKind::DamagedIce,
                carry: EffectCarry::Persistent,
            }
        );
        let mut cracked = Tile::new(TileKind::DamagedIce);
        assert_eq!(
            cracked.take_damage(),
            TileOutcome::ReplaceWith {
                kind: TileKind::Water,
                carry: EffectCarry::Persistent,
            }
        );
        let mut fresh = Tile::new(TileKind::Ice);
        assert_eq!(
            fresh.apply_effect(Effect::Fire),
            TileOutcome::ReplaceWith {
                kind: TileKind::Water,
                carry: EffectCarry::None,
            }
        );
    }

    #[test]
    fn water_cannot_burn() {
        let mut tile = Tile::new(TileKind::Water);
        assert_eq!(tile.apply_effect(Effect::Fire), TileOutcome::Unchanged);
        assert_eq!(tile.effects(), EffectSet::SUBMERGED);
    }

    #[test]
    fn chasm_variant_closure() {
        let mut tile = Tile::new(TileKind::Chasm);
        for effect in [Effect::Fire, Effect::Ice, Effect::Acid] {
            assert_eq!(tile.apply_effect(effect), TileOutcome::Unchanged);
            assert_eq!(tile.effects(), EffectSet::empty());
        }
        let _ = tile.apply_effect(Effect::Smoke);
        assert_eq!(tile.effects(), EffectSet::SMOKE);
    }

    #[test]
    fn lava_variant_closure_and_repair() {
        let mut tile = Tile::new(TileKind::Lava);
        for effect in [Effect::Ice, Effect::Acid] {
            assert_eq!(tile.apply_effect(effect), TileOutcome::Unchanged);
        }
        let _ = tile.apply_effect(Effect::Smoke);
        let _ = tile.repair();
        // Repair removes smoke only; the fire is the variant's own.
        assert_eq!(tile.effects(), EffectSet::FIRE | EffectSet::SUBMERGED);
    }

    #[test]
    fn damage_destroys_pod_markers() {
        let mut tile = Tile::new(TileKind::Ground);
        let _ = tile.apply_effect(Effect::TimePod);
        let _ = tile.take_damage();
        assert_eq!(tile.effects(), EffectSet::empty());
    }
}
