//! Effect and attribute vocabulary.
//!
//! Closed tag sets with no behavior of their own; membership transitions
//! are governed entirely by the tile- and unit-variant rules, never by
//! generic set algebra.

use bitflags::bitflags;

/// A single effect tag, used by the apply API.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Effect {
    Fire,
    Ice,
    Acid,
    Smoke,
    Shield,
    Web,
    Explosive,
    Submerged,
    Mine,
    TimePod,
    VekEmerge,
}

impl Effect {
    pub const fn as_set(self) -> EffectSet {
        match self {
            Self::Fire => EffectSet::FIRE,
            Self::Ice => EffectSet::ICE,
            Self::Acid => EffectSet::ACID,
            Self::Smoke => EffectSet::SMOKE,
            Self::Shield => EffectSet::SHIELD,
            Self::Web => EffectSet::WEB,
            Self::Explosive => EffectSet::EXPLOSIVE,
            Self::Submerged => EffectSet::SUBMERGED,
            Self::Mine => EffectSet::MINE,
            Self::TimePod => EffectSet::TIME_POD,
            Self::VekEmerge => EffectSet::VEK_EMERGE,
        }
    }
}

bitflags! {
    /// Set of currently-active effect tags on a tile or unit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EffectSet: u16 {
        const FIRE       = 1 << 0;
        const ICE        = 1 << 1;
        const ACID       = 1 << 2;
        const SMOKE      = 1 << 3;
        const SHIELD     = 1 << 4;
        const WEB        = 1 << 5;
        const EXPLOSIVE  = 1 << 6;
        const SUBMERGED  = 1 << 7;
        const MINE       = 1 << 8;
        const TIME_POD   = 1 << 9;
        const VEK_EMERGE = 1 << 10;
    }
}

impl EffectSet {
    /// Effects that survive a tile variant swap (smoke, acid). Fire is
    /// dropped on any water-producing transition unless the new variant
    /// is itself permanently on fire.
    pub const PERSISTENT: Self = Self::SMOKE.union(Self::ACID);

    /// Effects that travel with a unit when it relocates, as opposed to
    /// tile-only effects that stay behind.
    pub const UNIT_CARRIED: Self = Self::FIRE
        .union(Self::ICE)
        .union(Self::ACID)
        .union(Self::SHIELD)
        .union(Self::WEB)
        .union(Self::EXPLOSIVE);
}

#[cfg(feature = "serde")]
impl serde::Serialize for EffectSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.bits(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EffectSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <u16 as serde::Deserialize>::deserialize(deserializer).map(Self::from_bits_truncate)
    }
}

bitflags! {
    /// Intrinsic unit attributes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AttributeSet: u8 {
        /// Survives water; does not drown.
        const MASSIVE  = 1 << 0;
        /// Cannot be pushed.
        const STABLE   = 1 << 1;
        /// Ignores ground hazards (water, chasm, lava).
        const FLYING   = 1 << 2;
        /// Each damage instance is reduced by one.
        const ARMORED  = 1 << 3;
        /// Moves underground; surfaces beneath other units.
        const BURROWER = 1 << 4;
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AttributeSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.bits(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AttributeSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <u8 as serde::Deserialize>::deserialize(deserializer).map(Self::from_bits_truncate)
    }
}
