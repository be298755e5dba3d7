//! Unit model: hp, attributes, effect interactions, death replacement.
//!
//! A unit occupies a square, can itself hold effects, and carries hp,
//! attributes, owned weapons, and a scoring counter for damage taken this
//! resolution cycle. Death is signalled to the board as a [`Replacement`]
//! command; the unit never deletes itself.

use arrayvec::ArrayVec;

use crate::config::BoardConfig;
use crate::effect::{AttributeSet, Effect, EffectSet};
use crate::geometry::Coordinate;
use crate::weapon::{QueuedShot, Weapon};

/// Closed set of unit kinds.
///
/// Composite kinds (train, dam) carry their partner coordinate so the
/// board can mirror state transitions across the link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitKind {
    Mech,
    /// Dead mech: invulnerable, unfreezable, unshieldable, pushable,
    /// revivable by repair.
    MechCorpse,
    Vek,
    Blob,
    Building,
    Mountain,
    DamagedMountain,
    Train { partner: Coordinate },
    TrainCorpse,
    Dam { partner: Coordinate },
}

impl UnitKind {
    pub const fn is_corpse(self) -> bool {
        matches!(self, Self::MechCorpse | Self::TrainCorpse)
    }

    const fn is_mountain(self) -> bool {
        matches!(self, Self::Mountain | Self::DamagedMountain)
    }

    /// Composite halves mirror damage and effects to their partner.
    pub const fn partner(self) -> Option<Coordinate> {
        match self {
            Self::Train { partner } | Self::Dam { partner } => Some(partner),
            _ => None,
        }
    }
}

type WeaponSlots = ArrayVec<Weapon, { BoardConfig::MAX_WEAPONS_PER_UNIT }>;

/// One board occupant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub kind: UnitKind,
    hp: i32,
    max_hp: i32,
    attributes: AttributeSet,
    effects: EffectSet,
    /// Damage absorbed this resolution cycle, overkill clamped; used
    /// purely for scoring by the search layer.
    damage_taken: i32,
    /// Owned per unit at creation time. Two units of the same kind must
    /// never share weapon or queued-shot state.
    weapons: WeaponSlots,
    queued_shot: Option<QueuedShot>,
    /// Coordinate of the unit this one is webbed to, if any.
    web_link: Option<Coordinate>,
}

impl Unit {
    pub fn new(kind: UnitKind, max_hp: i32) -> Self {
        Self {
            kind,
            hp: max_hp,
            max_hp,
            attributes: AttributeSet::empty(),
            effects: EffectSet::empty(),
            damage_taken: 0,
            weapons: WeaponSlots::new(),
            queued_shot: None,
            web_link: None,
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_weapons(mut self, weapons: impl IntoIterator<Item = Weapon>) -> Self {
        for weapon in weapons {
            self.weapons.push(weapon);
        }
        self
    }

    // ===== convenience constructors for the standard kinds =====

    pub fn mech(max_hp: i32) -> Self {
        Self::new(UnitKind::Mech, max_hp).with_attributes(AttributeSet::MASSIVE)
    }

    pub fn vek(max_hp: i32) -> Self {
        Self::new(UnitKind::Vek, max_hp)
    }

    pub fn blob(max_hp: i32) -> Self {
        let mut unit = Self::new(UnitKind::Blob, max_hp);
        unit.effects |= EffectSet::EXPLOSIVE;
        unit
    }

    pub fn building(max_hp: i32) -> Self {
        Self::new(UnitKind::Building, max_hp).with_attributes(AttributeSet::STABLE)
    }

    pub fn mountain() -> Self {
        Self::new(UnitKind::Mountain, 2)
            .with_attributes(AttributeSet::STABLE | AttributeSet::MASSIVE)
    }

    pub fn train_half(partner: Coordinate) -> Self {
        Self::new(UnitKind::Train { partner }, 1)
            .with_attributes(AttributeSet::STABLE | AttributeSet::MASSIVE)
    }

    pub fn dam_half(partner: Coordinate) -> Self {
        Self::new(UnitKind::Dam { partner }, 2)
            .with_attributes(AttributeSet::STABLE | AttributeSet::MASSIVE)
    }

    // ===== queries =====

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn attributes(&self) -> AttributeSet {
        self.attributes
    }

    pub fn effects(&self) -> EffectSet {
        self.effects
    }

    pub fn damage_taken(&self) -> i32 {
        self.damage_taken
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn weapon(&self, index: usize) -> Option<&Weapon> {
        self.weapons.get(index)
    }

    pub fn queued_shot(&self) -> Option<&QueuedShot> {
        self.queued_shot.as_ref()
    }

    pub fn web_link(&self) -> Option<Coordinate> {
        self.web_link
    }

    /// Corpses lose the stable attribute; everything else keeps it.
    pub fn is_pushable(&self) -> bool {
        self.kind.is_corpse() || !self.attributes.contains(AttributeSet::STABLE)
    }

    pub fn is_flying(&self) -> bool {
        self.attributes.contains(AttributeSet::FLYING)
    }

    pub fn is_massive(&self) -> bool {
        self.attributes.contains(AttributeSet::MASSIVE)
    }

    // ===== mutation, called by the board =====

    pub(crate) fn set_queued_shot(&mut self, shot: Option<QueuedShot>) {
        self.queued_shot = shot;
    }

    pub(crate) fn queued_shot_mut(&mut self) -> Option<&mut QueuedShot> {
        self.queued_shot.as_mut()
    }

    pub(crate) fn set_web_link(&mut self, link: Option<Coordinate>) {
        self.web_link = link;
        if link.is_some() {
            self.effects |= EffectSet::WEB;
        } else {
            self.effects &= !EffectSet::WEB;
        }
    }

    pub(crate) fn insert_effect(&mut self, set: EffectSet) {
        self.effects |= set;
    }

    pub(crate) fn remove_effect(&mut self, set: EffectSet) {
        self.effects &= !set;
    }

    /// Applies one effect tag under the unit contract. A shield blocks
    /// fire/ice/acid until it is itself consumed by a damage event;
    /// corpses cannot be frozen or shielded.
    pub(crate) fn apply_effect(&mut self, effect: Effect) {
        let shielded = self.effects.contains(EffectSet::SHIELD);
        match effect {
            Effect::Fire => {
                if !shielded {
                    self.effects |= EffectSet::FIRE;
                    self.effects &= !EffectSet::ICE;
                }
            }
            Effect::Ice => {
                if !shielded && !self.kind.is_corpse() {
                    self.effects |= EffectSet::ICE;
                    self.effects &= !EffectSet::FIRE;
                }
            }
            Effect::Acid => {
                if !shielded {
                    self.effects |= EffectSet::ACID;
                }
            }
            Effect::Shield => {
                if !self.kind.is_corpse() {
                    self.effects |= EffectSet::SHIELD;
                }
            }
            Effect::Explosive => {
                self.effects |= EffectSet::EXPLOSIVE;
            }
            // Smoke and board markers live on the tile; submerged and
            // web are managed by the board's movement logic.
            Effect::Smoke
            | Effect::Web
            | Effect::Submerged
            | Effect::Mine
            | Effect::TimePod
            | Effect::VekEmerge => {}
        }
    }

    /// Subtracts damage through the modifier pipeline and accumulates
    /// the scoring counter with overkill clamped to pre-damage hp.
    ///
    /// Returns the hp actually lost.
    pub(crate) fn receive_damage(&mut self, amount: i32) -> i32 {
        debug_assert!(amount >= 0);
        if self.kind.is_corpse() {
            return 0;
        }
        // Frozen units shatter the ice instead of losing hp.
        if self.effects.contains(EffectSet::ICE) {
            self.effects &= !EffectSet::ICE;
            return 0;
        }
        // A shield is consumed by the hit, whatever its magnitude.
        if self.effects.contains(EffectSet::SHIELD) {
            self.effects &= !EffectSet::SHIELD;
            return 0;
        }
        let adjusted = if self.kind.is_mountain() {
            // Mountains advance one stage per hit regardless of amount.
            1
        } else if self.effects.contains(EffectSet::ACID) {
            // Acid doubles the hit and bypasses armor.
            amount * 2
        } else if self.attributes.contains(AttributeSet::ARMORED) {
            (amount - 1).max(0)
        } else {
            amount
        };
        let pre_hp = self.hp.max(0);
        self.hp -= adjusted;
        self.damage_taken += adjusted.min(pre_hp);
        adjusted
    }

    /// Heals up to `amount`, capped at max hp. No-op on corpses; corpse
    /// revival goes through the board so tile state can participate.
    pub(crate) fn heal(&mut self, amount: i32) {
        if self.kind.is_corpse() || !self.is_alive() {
            return;
        }
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Death replacement for this unit, computed at flush time from its
    /// final effect state.
    pub(crate) fn replacement(&self) -> Replacement {
        match self.kind {
            UnitKind::Mech => Replacement::Corpse(UnitKind::MechCorpse),
            UnitKind::Train { .. } => Replacement::Corpse(UnitKind::TrainCorpse),
            UnitKind::Mountain => Replacement::AdvanceStage(UnitKind::DamagedMountain),
            _ => Replacement::Vanish,
        }
    }

    /// In-place transformation into this unit's corpse. Keeps max hp,
    /// attributes, and weapons for revival; drops fire/ice/shield but
    /// keeps acid, and sheds any queued shot or web link.
    pub(crate) fn become_corpse(&mut self, corpse_kind: UnitKind) {
        self.kind = corpse_kind;
        self.hp = 0;
        self.effects &= EffectSet::ACID;
        self.queued_shot = None;
        self.web_link = None;
    }

    /// Revives a mech corpse at 1 hp. Acid it died with is already on
    /// the corpse; fire is re-applied only when `tile_on_fire`.
    pub(crate) fn revive(&mut self, tile_on_fire: bool) {
        debug_assert!(self.kind == UnitKind::MechCorpse);
        self.kind = UnitKind::Mech;
        self.hp = 1;
        if tile_on_fire {
            self.effects |= EffectSet::FIRE;
        }
    }

    /// Clears the scoring counter; the search layer calls this between
    /// scored steps.
    pub fn reset_damage_taken(&mut self) {
        self.damage_taken = 0;
    }
}

/// Command value describing what a dead unit leaves behind. Applied by
/// the board during flush, exactly once per death.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Replacement {
    /// Remove the unit outright.
    Vanish,
    /// Transform in place into the corpse kind.
    Corpse(UnitKind),
    /// Advance to the next damage stage instead of dying outright.
    AdvanceStage(UnitKind),
}
