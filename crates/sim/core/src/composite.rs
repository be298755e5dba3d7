//! Multi-square composite units: the two-square dam and train.
//!
//! Composite halves are ordinary units whose kind carries the partner
//! coordinate; the board mirrors damage and unit-borne effects across
//! the link. This module owns placement (keeping the two halves
//! consistent) and the train's forward motion, which is driven by the
//! environmental tick.

use tracing::debug;

use crate::board::Board;
use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::geometry::{Coordinate, Direction};
use crate::unit::{Unit, UnitKind};

fn adjacent(a: Coordinate, b: Coordinate) -> bool {
    (a.x - b.x).abs() + (a.y - b.y).abs() == 1
}

/// Places the two vertically stacked dam halves. Destroying either half
/// later destroys both and floods the dam's rows.
pub fn place_dam(board: &mut Board, a: Coordinate, b: Coordinate) -> Result<(), BoardError> {
    // The breach floods west along both halves' rows, so the halves
    // must share a column.
    if a.x != b.x || (a.y - b.y).abs() != 1 {
        return Err(BoardError::CantHappenInGame(
            "dam halves must be vertically adjacent",
        ));
    }
    board.place_unit(a, Unit::dam_half(b))?;
    board.place_unit(b, Unit::dam_half(a))
}

/// Places the two linked train halves, back half trailing the front.
pub fn place_train(board: &mut Board, front: Coordinate, back: Coordinate) -> Result<(), BoardError> {
    if !adjacent(front, back) {
        return Err(BoardError::CantHappenInGame("train halves must be adjacent"));
    }
    board.place_unit(front, Unit::train_half(back))?;
    board.place_unit(back, Unit::train_half(front))
}

/// Advances the train two squares in `direction` as part of the
/// environmental tick.
///
/// A blocked train stops where it stands: the blocker takes collision
/// damage and both train halves take lethal damage (committed at the
/// caller's flush). The track never leaves the board in the real game,
/// so an off-board advance is [`BoardError::CantHappenInGame`].
pub fn advance_train(
    board: &mut Board,
    front: Coordinate,
    direction: Direction,
) -> Result<(), BoardError> {
    let unit = board.unit(front).ok_or(BoardError::NoUnit(front))?;
    let UnitKind::Train { partner: back } = unit.kind else {
        return Err(BoardError::CantHappenInGame("advance target is not a train"));
    };

    for step in 1..=BoardConfig::TRAIN_ADVANCE {
        let dest = front.step_by(direction, step);
        if !dest.in_bounds() {
            return Err(BoardError::CantHappenInGame("train ran off the board"));
        }
        if board.unit(dest).is_some() {
            debug!(?dest, "train blocked");
            board.take_damage(dest, 2)?;
            // The crash wrecks the train; both halves die at flush and
            // become non-mirroring corpses.
            board.take_damage(front, 1)?;
            return Ok(());
        }
    }

    // Clear track: slide both halves forward, back half first so the
    // front's old square is free for it.
    let mut back_unit = board.remove_unit(back).ok_or(BoardError::NoUnit(back))?;
    let mut front_unit = board.remove_unit(front).ok_or(BoardError::NoUnit(front))?;
    let new_front = front.step_by(direction, BoardConfig::TRAIN_ADVANCE);
    let new_back = back.step_by(direction, BoardConfig::TRAIN_ADVANCE);
    front_unit.kind = UnitKind::Train { partner: new_back };
    back_unit.kind = UnitKind::Train { partner: new_front };
    board.place_unit(new_front, front_unit)?;
    board.place_unit(new_back, back_unit)
}
