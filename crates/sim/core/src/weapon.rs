//! Weapon protocol: shot-candidate production, validation, resolution.
//!
//! The two-phase contract is explicit in the signatures:
//! [`Weapon::candidate_shots`] is a pure, geometry-only view over the
//! board at generation time; [`Weapon::shoot`] re-validates the shot
//! against *current* board state and fails with
//! [`BoardError::NullWeaponShot`] when the shot is no longer legal.
//! Resolution applies damage/push/effects solely through the board's
//! mutation API and leaves the pending-damage queue for the caller to
//! flush.

use tracing::debug;

use crate::board::Board;
use crate::effect::Effect;
use crate::error::BoardError;
use crate::geometry::{Coordinate, Direction};

/// Ephemeral candidate description of one weapon use. Not unit state,
/// except for the single queued-shot slot enemies use to pre-announce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shot {
    pub direction: Direction,
    /// Arc distance for artillery-class weapons; `None` for beam and
    /// adjacent shots whose reach is implied by geometry.
    pub distance: Option<i32>,
}

impl Shot {
    pub const fn beam(direction: Direction) -> Self {
        Self {
            direction,
            distance: None,
        }
    }

    pub const fn arc(direction: Direction, distance: i32) -> Self {
        Self {
            direction,
            distance: Some(distance),
        }
    }
}

/// An enemy's pre-announced next weapon use, visible on the unit and
/// interactable before it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueuedShot {
    /// Index into the owning unit's weapon slots.
    pub weapon: usize,
    pub shot: Shot,
}

impl QueuedShot {
    pub fn new(weapon: usize, shot: Shot) -> Self {
        Self { weapon, shot }
    }

    /// Flips the shot to its mirror direction. A flipped shot that
    /// became illegal fails at fire time, never here.
    pub(crate) fn flip(&mut self) {
        self.shot.direction = self.shot.direction.mirror();
    }
}

/// Closed weapon families; concrete stat catalogs stay outside the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponKind {
    /// Beam to the first unit in line; damages it and optionally pushes
    /// it onward.
    Projectile { damage: i32, push: bool },
    /// Arcs over obstructions to a square 2..=range away; damages the
    /// target square and pushes its four neighbours outward.
    Artillery { damage: i32, range: i32 },
    /// Strikes the adjacent square.
    Melee { damage: i32, push: bool },
    /// Self-heal/utility: heals the wielder and cleans its square, or
    /// revives an adjacent corpse.
    Repair,
}

/// One equipped weapon. Power-up toggles change damage magnitude,
/// affected-square shape, or secondary effects, never the shot-generation
/// geometry contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub kind: WeaponKind,
    pub power_a: bool,
    pub power_b: bool,
}

impl Weapon {
    pub const fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            power_a: false,
            power_b: false,
        }
    }

    pub const fn with_power(kind: WeaponKind, power_a: bool, power_b: bool) -> Self {
        Self {
            kind,
            power_a,
            power_b,
        }
    }

    fn base_damage(&self) -> i32 {
        match self.kind {
            WeaponKind::Projectile { damage, .. }
            | WeaponKind::Artillery { damage, .. }
            | WeaponKind::Melee { damage, .. } => damage,
            WeaponKind::Repair => 0,
        }
    }

    /// First power-up toggle raises the damage magnitude by one.
    fn damage(&self) -> i32 {
        self.base_damage() + i32::from(self.power_a)
    }

    /// Every legal candidate shot for the current board and wielder
    /// position. Pure and restartable per call; candidates are not
    /// guaranteed valid after further board mutation, which is why
    /// [`Self::shoot`] re-validates.
    pub fn candidate_shots(&self, board: &Board, wielder: Coordinate) -> Vec<Shot> {
        let mut shots = Vec::new();
        match self.kind {
            WeaponKind::Projectile { .. } => {
                for direction in Direction::ALL {
                    if beam_target(board, wielder, direction).is_some() {
                        shots.push(Shot::beam(direction));
                    }
                }
            }
            WeaponKind::Artillery { range, .. } => {
                for direction in Direction::ALL {
                    for distance in 2..=range {
                        if wielder.step_by(direction, distance).in_bounds() {
                            shots.push(Shot::arc(direction, distance));
                        }
                    }
                }
            }
            WeaponKind::Melee { .. } => {
                for direction in Direction::ALL {
                    if wielder.step(direction).in_bounds() {
                        shots.push(Shot::beam(direction));
                    }
                }
            }
            WeaponKind::Repair => {
                // Direction is irrelevant for the self-targeted action;
                // one canonical candidate keeps the search space small.
                shots.push(Shot::beam(Direction::North));
            }
        }
        shots
    }

    /// Re-validates `shot` against current board state and, on success,
    /// applies the weapon's full resolution. The pending-damage queue is
    /// left for the caller to flush.
    pub fn shoot(&self, board: &mut Board, wielder: Coordinate, shot: Shot) -> Result<(), BoardError> {
        if board.unit(wielder).is_none() {
            return Err(BoardError::NullWeaponShot);
        }
        debug!(?wielder, ?shot, kind = ?self.kind, "resolving shot");
        match self.kind {
            WeaponKind::Projectile { push, .. } => {
                let target =
                    beam_target(board, wielder, shot.direction).ok_or(BoardError::NullWeaponShot)?;
                // Secondary effects land while any shield is still up;
                // the damage then consumes it.
                if self.power_b {
                    board.apply_effect(target, Effect::Fire)?;
                }
                board.take_damage(target, self.damage())?;
                if push {
                    board.push(target, shot.direction)?;
                }
                Ok(())
            }
            WeaponKind::Artillery { range, .. } => {
                let distance = shot.distance.ok_or(BoardError::NullWeaponShot)?;
                if distance < 2 || distance > range {
                    return Err(BoardError::NullWeaponShot);
                }
                let target = wielder.step_by(shot.direction, distance);
                if !target.in_bounds() {
                    return Err(BoardError::NullWeaponShot);
                }
                if self.power_b {
                    board.apply_effect(target, Effect::Smoke)?;
                }
                board.take_damage(target, self.damage())?;
                // Push the ring outward from the blast centre.
                for direction in Direction::ALL {
                    let neighbour = target.step(direction);
                    if neighbour.in_bounds() {
                        board.push(neighbour, direction)?;
                    }
                }
                Ok(())
            }
            WeaponKind::Melee { push, .. } => {
                let target = wielder.step(shot.direction);
                if !target.in_bounds() {
                    return Err(BoardError::NullWeaponShot);
                }
                if self.power_b {
                    board.apply_effect(target, Effect::Fire)?;
                }
                board.take_damage(target, self.damage())?;
                if push {
                    board.push(target, shot.direction)?;
                }
                Ok(())
            }
            WeaponKind::Repair => {
                board.repair(wielder, 1)?;
                Ok(())
            }
        }
    }
}

/// First unit square struck by a beam from `origin` travelling
/// `direction`; `None` when the beam exits the board without a hit.
fn beam_target(board: &Board, origin: Coordinate, direction: Direction) -> Option<Coordinate> {
    let mut cursor = origin.step(direction);
    while cursor.in_bounds() {
        if board.unit(cursor).is_some() {
            return Some(cursor);
        }
        cursor = cursor.step(direction);
    }
    None
}
