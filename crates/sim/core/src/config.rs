/// Resolution-core constants and tunable parameters.
///
/// Everything the rules reference numerically lives here so scenario
/// harnesses and the search layer agree on the same bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardConfig {
    /// Damage dealt to each party of a push collision or a blocked emerge.
    pub bump_damage: i32,
}

impl BoardConfig {
    // ===== compile-time constants used as type parameters =====
    /// Board edge length; the board is always BOARD_SIZE x BOARD_SIZE.
    pub const BOARD_SIZE: usize = 8;
    /// Total square count.
    pub const SQUARES: usize = Self::BOARD_SIZE * Self::BOARD_SIZE;
    /// Upper bound on weapons a single unit can equip (primary, secondary,
    /// repair-class).
    pub const MAX_WEAPONS_PER_UNIT: usize = 3;
    /// Squares the train advances per environmental tick.
    pub const TRAIN_ADVANCE: i32 = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BUMP_DAMAGE: i32 = 1;

    pub fn new() -> Self {
        Self {
            bump_damage: Self::DEFAULT_BUMP_DAMAGE,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new()
    }
}
