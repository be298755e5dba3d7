//! Deterministic state-resolution core for grid tactical combat.
//!
//! `sim-core` reproduces the tile/unit/effect/damage rules of the game
//! bit-for-bit so a higher-level search layer can brute-force every
//! legal ordering of a turn's actions and score the outcomes. All state
//! mutation flows through [`board::Board`]; damage cascades commit only
//! at an explicit [`board::Board::flush`]. The turn-order search engine,
//! concrete weapon/unit stat catalogs, and the scenario harness are
//! external consumers of the API re-exported here.
pub mod board;
pub mod composite;
pub mod config;
pub mod effect;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod tile;
pub mod unit;
pub mod weapon;

pub use board::{Board, Square};
pub use composite::{advance_train, place_dam, place_train};
pub use config::BoardConfig;
pub use effect::{AttributeSet, Effect, EffectSet};
pub use environment::{
    AirStrike, ConveyorTick, EnvironmentalAction, LightningStorm, TidalWave, VekEmergence,
};
pub use error::BoardError;
pub use geometry::{Coordinate, Direction};
pub use tile::{EffectCarry, EntryHazard, Tile, TileKind, TileOutcome};
pub use unit::{Replacement, Unit, UnitKind};
pub use weapon::{QueuedShot, Shot, Weapon, WeaponKind};
