//! Board and square ownership, the mutation API, and deferred resolution.
//!
//! The board exclusively owns all square, tile, and unit state; the
//! search layer and scenario harness mutate it only through the methods
//! here. Damage and effect application land on the tile/unit
//! immediately, but cascading consequences (deaths, stage advances,
//! acid handoff, explosions) are committed by an explicit [`Board::flush`]
//! so that many damage sources can land in one user-visible step before
//! death logic runs exactly once.

use tracing::{debug, trace};

use crate::config::BoardConfig;
use crate::effect::{Effect, EffectSet};
use crate::error::BoardError;
use crate::geometry::{Coordinate, Direction};
use crate::tile::{EntryHazard, Tile, TileKind, TileOutcome};
use crate::unit::{Replacement, Unit, UnitKind};
use crate::weapon::QueuedShot;

/// One coordinate's worth of board state: exactly one tile, at most one
/// unit.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Square {
    pub tile: Tile,
    pub unit: Option<Unit>,
}

/// The 8x8 playfield plus the pending-damage queue.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    squares: Vec<Square>,
    /// Squares that took damage this cycle, in recorded order. Drained
    /// and cleared by [`Board::flush`].
    pending: Vec<Coordinate>,
    config: BoardConfig,
}

impl Board {
    /// An 8x8 grid of default ground tiles.
    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    pub fn with_config(config: BoardConfig) -> Self {
        Self {
            squares: vec![Square::default(); BoardConfig::SQUARES],
            pending: Vec::new(),
            config,
        }
    }

    fn index(coord: Coordinate) -> usize {
        coord.y as usize * BoardConfig::BOARD_SIZE + coord.x as usize
    }

    fn square(&self, coord: Coordinate) -> Option<&Square> {
        coord.in_bounds().then(|| &self.squares[Self::index(coord)])
    }

    fn square_mut(&mut self, coord: Coordinate) -> Option<&mut Square> {
        coord
            .in_bounds()
            .then(|| &mut self.squares[Self::index(coord)])
    }

    fn checked(&self, coord: Coordinate) -> Result<(), BoardError> {
        if coord.in_bounds() {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds(coord))
        }
    }

    // ===== queries =====

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn tile(&self, coord: Coordinate) -> Option<&Tile> {
        self.square(coord).map(|square| &square.tile)
    }

    pub fn unit(&self, coord: Coordinate) -> Option<&Unit> {
        self.square(coord).and_then(|square| square.unit.as_ref())
    }

    /// All occupied coordinates, in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..BoardConfig::BOARD_SIZE as i32).flat_map(move |y| {
            (0..BoardConfig::BOARD_SIZE as i32)
                .map(move |x| Coordinate::new(x, y))
                .filter(|&coord| self.unit(coord).is_some())
        })
    }

    /// Sum of the overkill-clamped scoring counters of every unit on the
    /// board.
    pub fn total_damage_taken(&self) -> i32 {
        self.squares
            .iter()
            .filter_map(|square| square.unit.as_ref())
            .map(Unit::damage_taken)
            .sum()
    }

    // ===== placement =====

    /// Replaces the tile at `coord`, discarding the old tile and its
    /// effects. Any occupant is settled against the new terrain.
    pub fn place_tile(&mut self, coord: Coordinate, tile: Tile) -> Result<(), BoardError> {
        self.checked(coord)?;
        if let TileKind::Teleporter { companion } = tile.kind
            && let Some(unit) = self.unit(coord)
            && unit.kind != UnitKind::TrainCorpse
        {
            let companion = companion.ok_or(BoardError::MissingCompanionTile(coord))?;
            self.checked(companion)?;
        }
        self.squares[Self::index(coord)].tile = tile;
        if self.unit(coord).is_some() {
            self.settle_unit(coord)?;
        }
        Ok(())
    }

    /// Places a new unit on an empty square, then settles it against the
    /// terrain (teleporters fire, water drowns, fire ignites).
    pub fn place_unit(&mut self, coord: Coordinate, unit: Unit) -> Result<(), BoardError> {
        self.checked(coord)?;
        if self.unit(coord).is_some() {
            return Err(BoardError::Occupied(coord));
        }
        self.check_teleporter(coord, &unit)?;
        self.squares[Self::index(coord)].unit = Some(unit);
        self.settle_unit(coord)
    }

    pub fn remove_unit(&mut self, coord: Coordinate) -> Option<Unit> {
        self.square_mut(coord)?.unit.take()
    }

    // ===== effects =====

    /// Routes one effect application through the tile and unit variant
    /// contracts. Composite halves mirror unit-borne effects to their
    /// partner square.
    pub fn apply_effect(&mut self, coord: Coordinate, effect: Effect) -> Result<(), BoardError> {
        self.checked(coord)?;
        let square = &mut self.squares[Self::index(coord)];
        let outcome = square.tile.apply_effect(effect);
        let submerged = square.tile.effects().contains(EffectSet::SUBMERGED);
        self.apply_tile_outcome(coord, outcome);

        let partner = match self.squares[Self::index(coord)].unit.as_mut() {
            Some(unit) => {
                // Fire cannot take hold on a submerged occupant.
                if !(effect == Effect::Fire && submerged) {
                    unit.apply_effect(effect);
                }
                unit.kind.partner()
            }
            None => None,
        };
        if let Some(partner) = partner
            && matches!(effect, Effect::Fire | Effect::Ice | Effect::Acid)
            && let Some(partner_unit) = self.square_mut(partner).and_then(|s| s.unit.as_mut())
        {
            partner_unit.apply_effect(effect);
        }
        Ok(())
    }

    fn apply_tile_outcome(&mut self, coord: Coordinate, outcome: TileOutcome) {
        if let TileOutcome::ReplaceWith { kind, carry } = outcome {
            let square = &mut self.squares[Self::index(coord)];
            let carried = carry.carried(square.tile.effects());
            trace!(?coord, ?kind, "tile variant swap");
            square.tile = Tile::with_effects(kind, carried);
            // The new terrain may drown or drop the occupant.
            if square.unit.is_some() {
                self.apply_entry_hazard(coord);
            }
        }
    }

    // ===== damage =====

    /// Applies `amount` damage at `coord`: to the unit if one is
    /// present, otherwise to the tile. Records the square into the
    /// pending queue; death and cascades commit at [`Board::flush`].
    pub fn take_damage(&mut self, coord: Coordinate, amount: i32) -> Result<(), BoardError> {
        self.checked(coord)?;
        let square = &mut self.squares[Self::index(coord)];
        match square.unit.as_mut() {
            Some(unit) => {
                let lost = unit.receive_damage(amount);
                let partner = unit.kind.partner();
                trace!(?coord, amount, lost, "unit damaged");
                self.pending.push(coord);
                // Composite halves mirror the hit to their partner.
                if let Some(partner) = partner {
                    if let Some(partner_unit) =
                        self.square_mut(partner).and_then(|s| s.unit.as_mut())
                    {
                        partner_unit.receive_damage(amount);
                    }
                    self.pending.push(partner);
                }
            }
            None => {
                let outcome = square.tile.take_damage();
                self.apply_tile_outcome(coord, outcome);
            }
        }
        Ok(())
    }

    /// Repair at `coord`: heals a live unit and cleans its square,
    /// revives a mech corpse, or cleans bare terrain.
    pub fn repair(&mut self, coord: Coordinate, amount: i32) -> Result<(), BoardError> {
        self.checked(coord)?;
        let square = &mut self.squares[Self::index(coord)];
        match square.unit.as_mut() {
            Some(unit) if unit.kind == UnitKind::MechCorpse => {
                let tile_on_fire = square.tile.effects().contains(EffectSet::FIRE);
                unit.revive(tile_on_fire);
                debug!(?coord, "corpse revived");
                // A revived corpse on a paired teleporter relocates
                // exactly as a live unit would.
                self.settle_unit(coord)
            }
            Some(unit) if unit.kind == UnitKind::TrainCorpse => Ok(()),
            Some(unit) => {
                unit.heal(amount);
                unit.remove_effect(EffectSet::FIRE);
                let outcome = square.tile.repair();
                self.apply_tile_outcome(coord, outcome);
                Ok(())
            }
            None => {
                let outcome = square.tile.repair();
                self.apply_tile_outcome(coord, outcome);
                Ok(())
            }
        }
    }

    // ===== movement =====

    /// Moves a unit to an empty destination. Web links follow the unit;
    /// only pushes sever them.
    pub fn move_unit(&mut self, coord: Coordinate, dest: Coordinate) -> Result<(), BoardError> {
        self.checked(coord)?;
        self.checked(dest)?;
        if self.unit(coord).is_none() {
            return Err(BoardError::NoUnit(coord));
        }
        if self.unit(dest).is_some() {
            return Err(BoardError::Occupied(dest));
        }
        if let Some(unit) = self.unit(coord) {
            self.check_teleporter(dest, unit)?;
        }
        self.relocate(coord, dest);
        self.settle_unit(dest)
    }

    /// Pushes the occupant of `coord` one square. Stable units and
    /// off-board destinations make this a no-op; an occupied destination
    /// bumps both parties and nobody relocates.
    pub fn push(&mut self, coord: Coordinate, direction: Direction) -> Result<(), BoardError> {
        self.checked(coord)?;
        let Some(unit) = self.unit(coord) else {
            return Ok(());
        };
        if !unit.is_pushable() {
            return Ok(());
        }
        let dest = coord.step(direction);
        if !dest.in_bounds() {
            return Ok(());
        }
        if self.unit(dest).is_some() {
            let bump = self.config.bump_damage;
            debug!(?coord, ?dest, "push collision");
            self.take_damage(coord, bump)?;
            self.take_damage(dest, bump)?;
            return Ok(());
        }
        if let Some(unit) = self.unit(coord) {
            self.check_teleporter(dest, unit)?;
        }
        self.sever_web(coord);
        self.relocate(coord, dest);
        self.settle_unit(dest)
    }

    /// Moves the unit struct between squares and keeps any web partner's
    /// back-pointer in sync.
    fn relocate(&mut self, from: Coordinate, to: Coordinate) {
        let unit = self.squares[Self::index(from)].unit.take();
        self.squares[Self::index(to)].unit = unit;
        // Pending entries follow the unit; a deferred death cannot be
        // escaped by relocating before the flush.
        for entry in &mut self.pending {
            if *entry == from {
                *entry = to;
            }
        }
        let link = self.unit(to).and_then(Unit::web_link);
        if let Some(partner) = link
            && let Some(partner_unit) = self.square_mut(partner).and_then(|s| s.unit.as_mut())
        {
            partner_unit.set_web_link(Some(to));
        }
    }

    /// Rejects arrival on an unpaired teleporter before any state has
    /// changed, so a failed placement or move leaves the board untouched.
    fn check_teleporter(&self, coord: Coordinate, unit: &Unit) -> Result<(), BoardError> {
        if let TileKind::Teleporter { companion } = self.squares[Self::index(coord)].tile.kind
            && unit.kind != UnitKind::TrainCorpse
        {
            let companion = companion.ok_or(BoardError::MissingCompanionTile(coord))?;
            self.checked(companion)?;
        }
        Ok(())
    }

    /// Settles a unit that just arrived on `coord`: tile effects rub off
    /// on it, teleporters relocate it, and hazardous terrain kills it.
    fn settle_unit(&mut self, coord: Coordinate) -> Result<(), BoardError> {
        let square = &mut self.squares[Self::index(coord)];
        let Some(unit) = square.unit.as_mut() else {
            return Ok(());
        };
        // Pad/terrain effects transfer before any teleport: fire
        // ignites the occupant, a dry acid pool is absorbed by it.
        let tile_effects = square.tile.effects();
        if tile_effects.contains(EffectSet::FIRE) && !tile_effects.contains(EffectSet::SUBMERGED) {
            unit.apply_effect(Effect::Fire);
        }
        if tile_effects.contains(EffectSet::ACID) {
            unit.apply_effect(Effect::Acid);
            if !tile_effects.contains(EffectSet::SUBMERGED) {
                square.tile.remove_effect(EffectSet::ACID);
            }
        }

        if let TileKind::Teleporter { companion } = square.tile.kind {
            // Composite corpses do not propagate through teleporters.
            if unit.kind != UnitKind::TrainCorpse {
                let companion = companion.ok_or(BoardError::MissingCompanionTile(coord))?;
                self.checked(companion)?;
                self.teleport(coord, companion);
                self.apply_entry_hazard(companion);
                return Ok(());
            }
        }

        self.apply_entry_hazard(coord);
        Ok(())
    }

    /// Exchanges the occupants of a teleporter pair. A second unit on
    /// the companion pad swaps to the origin pad; teleport does not
    /// re-trigger for either party.
    fn teleport(&mut self, from: Coordinate, to: Coordinate) {
        debug!(?from, ?to, "teleport");
        let (a, b) = (Self::index(from), Self::index(to));
        self.squares.swap(a, b);
        // The tiles must stay put; only the occupants exchange.
        let tile_a = self.squares[a].tile;
        self.squares[a].tile = self.squares[b].tile;
        self.squares[b].tile = tile_a;
        // Pending entries follow the exchanged occupants.
        for entry in &mut self.pending {
            if *entry == from {
                *entry = to;
            } else if *entry == to {
                *entry = from;
            }
        }
    }

    /// Applies the terrain entry hazard to the occupant of `coord`.
    /// Drowning and falling remove the unit immediately, bypassing the
    /// pending queue; hp deaths always defer to flush.
    fn apply_entry_hazard(&mut self, coord: Coordinate) {
        let square = &mut self.squares[Self::index(coord)];
        let Some(unit) = square.unit.as_ref() else {
            return;
        };
        if unit.is_flying() {
            return;
        }
        match square.tile.entry_hazard() {
            EntryHazard::None => {}
            EntryHazard::Drown => {
                if unit.is_massive() {
                    // Submerged: the water snuffs any burning.
                    if let Some(unit) = square.unit.as_mut() {
                        unit.remove_effect(EffectSet::FIRE);
                    }
                } else {
                    let drowned = square.unit.take();
                    debug!(?coord, "unit drowned");
                    if let Some(drowned) = drowned
                        && drowned.effects().contains(EffectSet::ACID)
                    {
                        square.tile.insert_effect(EffectSet::ACID);
                    }
                }
            }
            EntryHazard::Molten => {
                if unit.is_massive() {
                    if let Some(unit) = square.unit.as_mut() {
                        unit.apply_effect(Effect::Fire);
                    }
                } else {
                    // Lava rejects acid, so nothing is donated.
                    square.unit = None;
                    debug!(?coord, "unit lost to lava");
                }
            }
            EntryHazard::Fall => {
                square.unit = None;
                debug!(?coord, "unit fell into chasm");
            }
        }
    }

    // ===== webbing =====

    /// Webs the units at `a` and `b` to each other.
    pub fn web(&mut self, a: Coordinate, b: Coordinate) -> Result<(), BoardError> {
        self.checked(a)?;
        self.checked(b)?;
        if self.unit(a).is_none() {
            return Err(BoardError::NoUnit(a));
        }
        if self.unit(b).is_none() {
            return Err(BoardError::NoUnit(b));
        }
        if let Some(unit) = self.squares[Self::index(a)].unit.as_mut() {
            unit.set_web_link(Some(b));
        }
        if let Some(unit) = self.squares[Self::index(b)].unit.as_mut() {
            unit.set_web_link(Some(a));
        }
        Ok(())
    }

    /// Severs the web link of the unit at `coord` (both sides).
    fn sever_web(&mut self, coord: Coordinate) {
        let Some(partner) = self.unit(coord).and_then(Unit::web_link) else {
            return;
        };
        if let Some(unit) = self.square_mut(coord).and_then(|s| s.unit.as_mut()) {
            unit.set_web_link(None);
        }
        if let Some(partner_unit) = self.square_mut(partner).and_then(|s| s.unit.as_mut()) {
            partner_unit.set_web_link(None);
        }
    }

    // ===== queued shots =====

    pub fn set_queued_shot(
        &mut self,
        coord: Coordinate,
        shot: QueuedShot,
    ) -> Result<(), BoardError> {
        self.checked(coord)?;
        self.square_mut(coord)
            .and_then(|square| square.unit.as_mut())
            .ok_or(BoardError::NoUnit(coord))?
            .set_queued_shot(Some(shot));
        Ok(())
    }

    pub fn clear_queued_shot(&mut self, coord: Coordinate) -> Result<(), BoardError> {
        self.checked(coord)?;
        self.square_mut(coord)
            .and_then(|square| square.unit.as_mut())
            .ok_or(BoardError::NoUnit(coord))?
            .set_queued_shot(None);
        Ok(())
    }

    /// Flips the queued shot at `coord` to its mirror direction. A
    /// flipped shot that became illegal fails with `NullWeaponShot` when
    /// eventually fired, never here.
    pub fn flip_queued_shot(&mut self, coord: Coordinate) -> Result<(), BoardError> {
        self.checked(coord)?;
        self.square_mut(coord)
            .and_then(|square| square.unit.as_mut())
            .ok_or(BoardError::NoUnit(coord))?
            .queued_shot_mut()
            .ok_or(BoardError::NullWeaponShot)?
            .flip();
        Ok(())
    }

    /// Fires and consumes the queued shot of the unit at `coord`,
    /// re-validating it against current board state.
    pub fn fire_queued_shot(&mut self, coord: Coordinate) -> Result<(), BoardError> {
        self.checked(coord)?;
        let unit = self.unit(coord).ok_or(BoardError::NoUnit(coord))?;
        let queued = unit.queued_shot().copied().ok_or(BoardError::NullWeaponShot)?;
        let weapon = *unit.weapon(queued.weapon).ok_or(BoardError::NullWeaponShot)?;
        if let Some(unit) = self.square_mut(coord).and_then(|s| s.unit.as_mut()) {
            unit.set_queued_shot(None);
        }
        weapon.shoot(self, coord, queued.shot)
    }

    // ===== deferred resolution =====

    /// Whether any damage is waiting on the next flush.
    pub fn has_pending_damage(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Commits all pending deaths and cascades in the order damage was
    /// recorded. Idempotent: flushing twice with no new damage is a
    /// no-op. Death-cascade side effects read the unit's *final* effect
    /// state, not its state when the damage landed.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        debug!(pending = self.pending.len(), "flushing pending damage");
        let mut cursor = 0;
        // Cascades append to the queue mid-drain; re-check the length
        // every iteration.
        while cursor < self.pending.len() {
            let coord = self.pending[cursor];
            cursor += 1;
            self.resolve_pending(coord);
        }
        self.pending.clear();
    }

    fn resolve_pending(&mut self, coord: Coordinate) {
        let Some(unit) = self.unit(coord) else {
            return;
        };
        // Corpses are inert; a second queue entry for a resolved death
        // must not re-run the cascade.
        if unit.kind.is_corpse() {
            return;
        }
        if unit.is_alive() {
            // Mountains commit their stage advance here rather than at
            // the moment of damage.
            if unit.kind == UnitKind::Mountain && unit.hp() == 1 {
                if let Some(unit) = self.square_mut(coord).and_then(|s| s.unit.as_mut()) {
                    unit.kind = UnitKind::DamagedMountain;
                }
            }
            return;
        }

        let effects = unit.effects();
        let replacement = unit.replacement();
        let kind = unit.kind;
        debug!(?coord, ?kind, "unit death");

        self.sever_web(coord);

        // Explosive units detonate into their neighbours; the damage
        // joins the same drain.
        if effects.contains(EffectSet::EXPLOSIVE) {
            for neighbour in coord.neighbours() {
                let _ = self.take_damage(neighbour, 1);
            }
        }

        // Acid handoff from the unit's final effect state. The pool
        // lands on the square it occupies at flush time, even when the
        // same hit both applied the acid and killed it.
        if effects.contains(EffectSet::ACID) {
            let square = &mut self.squares[Self::index(coord)];
            let outcome = square.tile.apply_effect(Effect::Acid);
            self.apply_tile_outcome(coord, outcome);
        }

        if let UnitKind::Dam { partner } = kind {
            self.breach_dam(coord, partner);
            return;
        }

        match replacement {
            Replacement::Vanish => {
                self.squares[Self::index(coord)].unit = None;
            }
            Replacement::Corpse(corpse_kind) => {
                if let Some(unit) = self.square_mut(coord).and_then(|s| s.unit.as_mut()) {
                    unit.become_corpse(corpse_kind);
                }
            }
            Replacement::AdvanceStage(next) => {
                if let Some(unit) = self.square_mut(coord).and_then(|s| s.unit.as_mut()) {
                    unit.kind = next;
                }
            }
        }
    }

    /// Destroying one dam half destroys both and floods the dam's rows:
    /// every floodable tile west of the dam becomes water. Occupants
    /// face the usual drowning rules.
    fn breach_dam(&mut self, coord: Coordinate, partner: Coordinate) {
        debug!(?coord, ?partner, "dam breached");
        self.squares[Self::index(coord)].unit = None;
        if partner.in_bounds() {
            self.squares[Self::index(partner)].unit = None;
        }
        for y in [coord.y, partner.y] {
            for x in 0..coord.x {
                let flooded = Coordinate::new(x, y);
                if !flooded.in_bounds() {
                    continue;
                }
                let square = &mut self.squares[Self::index(flooded)];
                if matches!(
                    square.tile.kind,
                    TileKind::Water
                        | TileKind::Chasm
                        | TileKind::Lava
                        | TileKind::Teleporter { .. }
                ) {
                    continue;
                }
                let carried = square.tile.effects() & EffectSet::PERSISTENT;
                square.tile = Tile::with_effects(TileKind::Water, carried);
                if square.unit.is_some() {
                    self.apply_entry_hazard(flooded);
                }
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::AttributeSet;

    fn at(x: i32, y: i32) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn placement_rejects_double_occupancy() {
        let mut board = Board::new();
        board.place_unit(at(2, 2), Unit::mech(3)).unwrap();
        assert_eq!(
            board.place_unit(at(2, 2), Unit::vek(2)),
            Err(BoardError::Occupied(at(2, 2)))
        );
    }

    #[test]
    fn out_of_bounds_fails_fast() {
        let mut board = Board::new();
        assert_eq!(
            board.take_damage(at(9, 0), 1),
            Err(BoardError::OutOfBounds(at(9, 0)))
        );
        assert_eq!(
            board.move_unit(at(0, 0), at(-1, 0)),
            Err(BoardError::OutOfBounds(at(-1, 0)))
        );
    }

    #[test]
    fn push_relocates_and_effects_travel_with_the_unit() {
        let mut board = Board::new();
        let mut unit = Unit::vek(3);
        unit.apply_effect(Effect::Fire);
        board.place_unit(at(3, 3), unit).unwrap();
        board.apply_effect(at(3, 3), Effect::Smoke).unwrap();

        board.push(at(3, 3), Direction::East).unwrap();
        assert!(board.unit(at(3, 3)).is_none());
        let moved = board.unit(at(4, 3)).unwrap();
        assert!(moved.effects().contains(EffectSet::FIRE));
        // Tile-only smoke stayed behind.
        assert!(board.tile(at(3, 3)).unwrap().effects().contains(EffectSet::SMOKE));
        assert!(!board.tile(at(4, 3)).unwrap().effects().contains(EffectSet::SMOKE));
    }

    #[test]
    fn push_into_occupied_bumps_both_and_nobody_moves() {
        let mut board = Board::new();
        board.place_unit(at(3, 3), Unit::vek(3)).unwrap();
        board.place_unit(at(4, 3), Unit::vek(5)).unwrap();
        board.push(at(3, 3), Direction::East).unwrap();
        board.flush();
        assert_eq!(board.unit(at(3, 3)).unwrap().hp(), 2);
        assert_eq!(board.unit(at(4, 3)).unwrap().hp(), 4);
    }

    #[test]
    fn stable_units_cannot_be_pushed() {
        let mut board = Board::new();
        board.place_unit(at(3, 3), Unit::mountain()).unwrap();
        board.push(at(3, 3), Direction::East).unwrap();
        assert!(board.unit(at(3, 3)).is_some());
        assert!(board.unit(at(4, 3)).is_none());
    }

    #[test]
    fn push_off_board_is_a_no_op() {
        let mut board = Board::new();
        board.place_unit(at(0, 0), Unit::vek(2)).unwrap();
        board.push(at(0, 0), Direction::West).unwrap();
        assert!(board.unit(at(0, 0)).is_some());
    }

    #[test]
    fn pushing_a_webbed_unit_severs_the_link() {
        let mut board = Board::new();
        board.place_unit(at(3, 3), Unit::vek(3)).unwrap();
        board.place_unit(at(3, 4), Unit::mech(3)).unwrap();
        board.web(at(3, 3), at(3, 4)).unwrap();
        assert_eq!(board.unit(at(3, 4)).unwrap().web_link(), Some(at(3, 3)));

        board.push(at(3, 3), Direction::East).unwrap();
        assert_eq!(board.unit(at(4, 3)).unwrap().web_link(), None);
        assert_eq!(board.unit(at(3, 4)).unwrap().web_link(), None);
        assert!(!board.unit(at(3, 4)).unwrap().effects().contains(EffectSet::WEB));
    }

    #[test]
    fn drowning_removes_the_unit_and_donates_acid() {
        let mut board = Board::new();
        board.place_tile(at(5, 5), Tile::new(TileKind::Water)).unwrap();
        let mut unit = Unit::vek(3);
        unit.apply_effect(Effect::Acid);
        board.place_unit(at(5, 5), unit).unwrap();
        assert!(board.unit(at(5, 5)).is_none());
        let tile = board.tile(at(5, 5)).unwrap();
        assert!(tile.effects().contains(EffectSet::ACID));
        assert!(tile.effects().contains(EffectSet::SUBMERGED));
    }

    #[test]
    fn massive_units_wade_and_are_extinguished() {
        let mut board = Board::new();
        board.place_tile(at(5, 5), Tile::new(TileKind::Water)).unwrap();
        let mut mech = Unit::mech(3);
        mech.apply_effect(Effect::Fire);
        board.place_unit(at(5, 5), mech).unwrap();
        let unit = board.unit(at(5, 5)).unwrap();
        assert!(!unit.effects().contains(EffectSet::FIRE));
    }

    #[test]
    fn chasm_kills_regardless_of_damage_state() {
        let mut board = Board::new();
        board.place_tile(at(1, 1), Tile::new(TileKind::Chasm)).unwrap();
        board.place_unit(at(1, 1), Unit::mech(6)).unwrap();
        assert!(board.unit(at(1, 1)).is_none());
        // No pending death: the fall bypassed the queue entirely.
        assert!(!board.has_pending_damage());
    }

    #[test]
    fn flying_units_ignore_ground_hazards() {
        let mut board = Board::new();
        board.place_tile(at(1, 1), Tile::new(TileKind::Chasm)).unwrap();
        board
            .place_unit(at(1, 1), Unit::vek(2).with_attributes(AttributeSet::FLYING))
            .unwrap();
        assert!(board.unit(at(1, 1)).is_some());
    }

    #[test]
    fn teleporter_relocates_on_arrival() {
        let mut board = Board::new();
        board
            .place_tile(at(0, 0), Tile::new(TileKind::Teleporter { companion: Some(at(7, 7)) }))
            .unwrap();
        board
            .place_tile(at(7, 7), Tile::new(TileKind::Teleporter { companion: Some(at(0, 0)) }))
            .unwrap();
        board.place_unit(at(1, 0), Unit::mech(3)).unwrap();
        board.move_unit(at(1, 0), at(0, 0)).unwrap();
        assert!(board.unit(at(0, 0)).is_none());
        assert!(board.unit(at(7, 7)).is_some());
    }

    #[test]
    fn simultaneous_arrival_swaps_the_pair() {
        let mut board = Board::new();
        board
            .place_tile(at(0, 0), Tile::new(TileKind::Teleporter { companion: Some(at(7, 7)) }))
            .unwrap();
        board
            .place_tile(at(7, 7), Tile::new(TileKind::Teleporter { companion: Some(at(0, 0)) }))
            .unwrap();
        board.place_unit(at(7, 7), Unit::vek(2)).unwrap();
        // The vek teleported to (0,0) on placement and now sits on the
        // companion pad.
        assert_eq!(board.unit(at(0, 0)).unwrap().kind, UnitKind::Vek);
        // A second arrival finds the companion occupied: the two swap.
        board.place_unit(at(7, 7), Unit::mech(3)).unwrap();
        assert_eq!(board.unit(at(0, 0)).unwrap().kind, UnitKind::Mech);
        assert_eq!(board.unit(at(7, 7)).unwrap().kind, UnitKind::Vek);
    }

    #[test]
    fn unpaired_teleporter_is_an_error() {
        let mut board = Board::new();
        board
            .place_tile(at(0, 0), Tile::new(TileKind::Teleporter { companion: None }))
            .unwrap();
        assert_eq!(
            board.place_unit(at(0, 0), Unit::mech(3)),
            Err(BoardError::MissingCompanionTile(at(0, 0)))
        );
        // The failed placement left nothing on the pad.
        assert!(board.unit(at(0, 0)).is_none());

        board.place_unit(at(1, 0), Unit::mech(3)).unwrap();
        assert_eq!(
            board.move_unit(at(1, 0), at(0, 0)),
            Err(BoardError::MissingCompanionTile(at(0, 0)))
        );
        // The failed move left the mech where it stood.
        assert!(board.unit(at(1, 0)).is_some());
        assert!(board.unit(at(0, 0)).is_none());
    }

    #[test]
    fn pending_death_follows_a_pushed_unit() {
        let mut board = Board::new();
        board.place_unit(at(3, 3), Unit::vek(2)).unwrap();
        board.take_damage(at(3, 3), 5).unwrap();
        board.push(at(3, 3), Direction::East).unwrap();
        board.flush();
        assert!(board.unit(at(4, 3)).is_none());
        assert!(board.unit(at(3, 3)).is_none());
    }

    #[test]
    fn pending_death_follows_a_teleported_unit() {
        let mut board = Board::new();
        board
            .place_tile(at(0, 0), Tile::new(TileKind::Teleporter { companion: Some(at(7, 7)) }))
            .unwrap();
        board
            .place_tile(at(7, 7), Tile::new(TileKind::Teleporter { companion: Some(at(0, 0)) }))
            .unwrap();
        board.place_unit(at(1, 0), Unit::vek(1)).unwrap();
        board.take_damage(at(1, 0), 3).unwrap();
        board.move_unit(at(1, 0), at(0, 0)).unwrap();
        board.flush();
        assert!(board.unit(at(7, 7)).is_none());
    }

    #[test]
    fn teleporter_pad_effects_transfer_before_teleport() {
        let mut board = Board::new();
        board
            .place_tile(at(0, 0), Tile::new(TileKind::Teleporter { companion: Some(at(7, 7)) }))
            .unwrap();
        board
            .place_tile(at(7, 7), Tile::new(TileKind::Teleporter { companion: Some(at(0, 0)) }))
            .unwrap();
        board.apply_effect(at(0, 0), Effect::Fire).unwrap();
        board.place_unit(at(1, 0), Unit::vek(2)).unwrap();
        board.move_unit(at(1, 0), at(0, 0)).unwrap();
        let arrived = board.unit(at(7, 7)).unwrap();
        assert!(arrived.effects().contains(EffectSet::FIRE));
    }

    #[test]
    fn flush_is_idempotent() {
        let mut board = Board::new();
        board.place_unit(at(2, 2), Unit::vek(1)).unwrap();
        board.take_damage(at(2, 2), 3).unwrap();
        board.flush();
        let snapshot = board.clone();
        board.flush();
        assert_eq!(board, snapshot);
    }

    #[test]
    fn death_commits_only_at_flush() {
        let mut board = Board::new();
        board.place_unit(at(2, 2), Unit::vek(1)).unwrap();
        board.take_damage(at(2, 2), 3).unwrap();
        // Dead but not yet replaced.
        assert!(!board.unit(at(2, 2)).unwrap().is_alive());
        board.flush();
        assert!(board.unit(at(2, 2)).is_none());
    }

    #[test]
    fn multiple_sources_one_death() {
        let mut board = Board::new();
        board.place_unit(at(2, 2), Unit::mech(2)).unwrap();
        board.take_damage(at(2, 2), 1).unwrap();
        board.take_damage(at(2, 2), 1).unwrap();
        board.flush();
        let corpse = board.unit(at(2, 2)).unwrap();
        assert_eq!(corpse.kind, UnitKind::MechCorpse);
    }

    #[test]
    fn dying_acid_carrier_leaves_a_pool() {
        let mut board = Board::new();
        board.place_unit(at(4, 4), Unit::vek(1)).unwrap();
        board.apply_effect(at(4, 4), Effect::Acid).unwrap();
        board.take_damage(at(4, 4), 5).unwrap();
        board.flush();
        assert!(board.unit(at(4, 4)).is_none());
        assert_eq!(board.tile(at(4, 4)).unwrap().effects(), EffectSet::ACID);
    }

    #[test]
    fn acid_applied_by_the_killing_hit_still_lands() {
        // Documented observed behavior: the handoff reads the unit's
        // final effect state at flush time.
        let mut board = Board::new();
        board.place_unit(at(4, 4), Unit::vek(1)).unwrap();
        board.take_damage(at(4, 4), 5).unwrap();
        board.apply_effect(at(4, 4), Effect::Acid).unwrap();
        board.flush();
        assert!(board.unit(at(4, 4)).is_none());
        assert!(board.tile(at(4, 4)).unwrap().effects().contains(EffectSet::ACID));
    }

    #[test]
    fn explosive_death_cascades_through_the_same_flush() {
        let mut board = Board::new();
        board.place_unit(at(4, 4), Unit::blob(1)).unwrap();
        board.place_unit(at(5, 4), Unit::vek(1)).unwrap();
        board.take_damage(at(4, 4), 2).unwrap();
        board.flush();
        assert!(board.unit(at(4, 4)).is_none());
        // The neighbour died to the detonation inside the same flush.
        assert!(board.unit(at(5, 4)).is_none());
    }

    #[test]
    fn mountain_stage_advances_at_flush() {
        let mut board = Board::new();
        board.place_unit(at(6, 6), Unit::mountain()).unwrap();
        board.take_damage(at(6, 6), 4).unwrap();
        assert_eq!(board.unit(at(6, 6)).unwrap().kind, UnitKind::Mountain);
        board.flush();
        assert_eq!(board.unit(at(6, 6)).unwrap().kind, UnitKind::DamagedMountain);
        board.take_damage(at(6, 6), 4).unwrap();
        board.flush();
        assert!(board.unit(at(6, 6)).is_none());
    }

    #[test]
    fn corpse_revival_teleports_like_a_live_unit() {
        let mut board = Board::new();
        board
            .place_tile(at(3, 0), Tile::new(TileKind::Teleporter { companion: Some(at(6, 6)) }))
            .unwrap();
        board
            .place_tile(at(6, 6), Tile::new(TileKind::Teleporter { companion: Some(at(3, 0)) }))
            .unwrap();
        board.place_unit(at(2, 0), Unit::mech(2)).unwrap();
        board.take_damage(at(2, 0), 9).unwrap();
        board.flush();
        // Push the corpse onto the pad: corpses are pushable, and a
        // mech corpse does ride the teleporter.
        board.push(at(2, 0), Direction::East).unwrap();
        let corpse_at = at(6, 6);
        assert_eq!(board.unit(corpse_at).unwrap().kind, UnitKind::MechCorpse);
        board.repair(corpse_at, 1).unwrap();
        // Revival settled it back through the pair.
        assert_eq!(board.unit(at(3, 0)).unwrap().kind, UnitKind::Mech);
        assert_eq!(board.unit(at(3, 0)).unwrap().hp(), 1);
    }
}
