//! Error taxonomy for the resolution core.
//!
//! Every error is synchronous and propagated immediately to the caller;
//! the core is a deterministic simulator, so there are no retries and no
//! partial-failure modes. A mutation either fully applies or fails before
//! touching state.

use crate::geometry::Coordinate;

/// Errors surfaced by the board mutation API and the weapon protocol.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardError {
    /// A generated or queued shot is no longer valid at fire time: the
    /// target moved or died, the destination is now occupied, or the
    /// geometry no longer produces a hit. The caller must re-derive its
    /// shot candidates or skip the action.
    #[error("weapon shot is no longer valid")]
    NullWeaponShot,

    /// A teleporter was entered or fired without a configured companion
    /// pad.
    #[error("teleporter at {0:?} has no companion tile")]
    MissingCompanionTile(Coordinate),

    /// The real game's rules make the requested operation structurally
    /// impossible; treated as a programmer/configuration error, not a
    /// recoverable condition.
    #[error("cannot happen in game: {0}")]
    CantHappenInGame(&'static str),

    /// Coordinate lies outside the 8x8 board.
    #[error("coordinate {0:?} is out of bounds")]
    OutOfBounds(Coordinate),

    /// Placement target already holds a unit.
    #[error("square {0:?} is already occupied")]
    Occupied(Coordinate),

    /// Operation requires a unit at the coordinate but the square is
    /// empty.
    #[error("no unit at {0:?}")]
    NoUnit(Coordinate),
}
