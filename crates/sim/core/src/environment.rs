//! Area environmental hazards.
//!
//! Each hazard is a value describing one environmental tick, applied
//! purely through the board mutation API. None of them flush: the
//! caller commits the accumulated damage afterwards, exactly as with
//! weapon fire.

use tracing::debug;

use crate::board::Board;
use crate::config::BoardConfig;
use crate::effect::EffectSet;
use crate::error::BoardError;
use crate::geometry::{Coordinate, Direction};
use crate::tile::{Tile, TileKind};
use crate::unit::Unit;

/// One environmental action applied over the whole board.
pub trait EnvironmentalAction {
    fn apply(&self, board: &mut Board) -> Result<(), BoardError>;
}

/// Lightning strikes a listed set of squares for one damage each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightningStorm {
    pub strikes: Vec<Coordinate>,
}

impl EnvironmentalAction for LightningStorm {
    fn apply(&self, board: &mut Board) -> Result<(), BoardError> {
        debug!(strikes = self.strikes.len(), "lightning storm");
        for &strike in &self.strikes {
            board.take_damage(strike, 1)?;
        }
        Ok(())
    }
}

/// Plus-shaped strike: the centre square and its four neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AirStrike {
    pub centre: Coordinate,
    pub damage: i32,
}

impl EnvironmentalAction for AirStrike {
    fn apply(&self, board: &mut Board) -> Result<(), BoardError> {
        board.take_damage(self.centre, self.damage)?;
        for neighbour in self.centre.neighbours() {
            board.take_damage(neighbour, self.damage)?;
        }
        Ok(())
    }
}

/// Floods the outermost line of the board on the given edge: every
/// floodable tile there becomes water, with the usual drowning rules
/// for occupants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TidalWave {
    pub edge: Direction,
}

impl TidalWave {
    fn edge_line(self) -> impl Iterator<Item = Coordinate> {
        let last = BoardConfig::BOARD_SIZE as i32 - 1;
        (0..=last).map(move |i| match self.edge {
            Direction::North => Coordinate::new(i, last),
            Direction::South => Coordinate::new(i, 0),
            Direction::East => Coordinate::new(last, i),
            Direction::West => Coordinate::new(0, i),
        })
    }
}

impl EnvironmentalAction for TidalWave {
    fn apply(&self, board: &mut Board) -> Result<(), BoardError> {
        debug!(edge = %self.edge, "tidal wave");
        for coord in self.edge_line() {
            let tile = board.tile(coord).ok_or(BoardError::OutOfBounds(coord))?;
            if matches!(
                tile.kind,
                TileKind::Water | TileKind::Chasm | TileKind::Lava | TileKind::Teleporter { .. }
            ) {
                continue;
            }
            let carried = tile.effects() & EffectSet::PERSISTENT;
            board.place_tile(coord, Tile::with_effects(TileKind::Water, carried))?;
        }
        Ok(())
    }
}

/// Pushes every conveyor occupant one square along its belt. Occupants
/// are snapshotted first so a unit pushed onto the next belt segment is
/// not carried twice in one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ConveyorTick;

impl EnvironmentalAction for ConveyorTick {
    fn apply(&self, board: &mut Board) -> Result<(), BoardError> {
        let moves: Vec<(Coordinate, Direction)> = board
            .occupied()
            .filter_map(|coord| match board.tile(coord).map(|tile| tile.kind) {
                Some(TileKind::Conveyor { direction }) => Some((coord, direction)),
                _ => None,
            })
            .collect();
        for (coord, direction) in moves {
            board.push(coord, direction)?;
        }
        Ok(())
    }
}

/// Resolves every vek-emerge marker: a blocked emerge bumps the
/// occupant and keeps the marker; an open square spawns a vek and
/// clears it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VekEmergence {
    /// Hit points of each newly emerged vek.
    pub spawn_hp: i32,
}

impl EnvironmentalAction for VekEmergence {
    fn apply(&self, board: &mut Board) -> Result<(), BoardError> {
        let size = BoardConfig::BOARD_SIZE as i32;
        for y in 0..size {
            for x in 0..size {
                let coord = Coordinate::new(x, y);
                let marked = board
                    .tile(coord)
                    .is_some_and(|tile| tile.effects().contains(EffectSet::VEK_EMERGE));
                if !marked {
                    continue;
                }
                if board.unit(coord).is_some() {
                    // Blocked: the emerging unit bumps whatever stands
                    // above it and tries again next turn.
                    debug!(?coord, "emerge blocked");
                    let bump = board.config().bump_damage;
                    board.take_damage(coord, bump)?;
                } else {
                    clear_marker(board, coord)?;
                    board.place_unit(coord, Unit::vek(self.spawn_hp))?;
                }
            }
        }
        Ok(())
    }
}

fn clear_marker(board: &mut Board, coord: Coordinate) -> Result<(), BoardError> {
    let tile = *board.tile(coord).ok_or(BoardError::OutOfBounds(coord))?;
    let cleared = tile.effects() & !(EffectSet::VEK_EMERGE | EffectSet::SUBMERGED);
    board.place_tile(coord, Tile::with_effects(tile.kind, cleared))
}
