//! Skirmish engine constants - all tunable values in one place

/// Critically-damaged cells at which a Knight is destroyed
pub const DESTROYED_CRITICAL_THRESHOLD: usize = 6;

/// Half-angle of the front arc in degrees (inclusive boundary)
pub const FRONT_ARC_HALF_ANGLE: f32 = 45.0;

/// Angular delta beyond which a bearing is in the rear arc (inclusive boundary)
pub const REAR_ARC_THRESHOLD: f32 = 135.0;

/// Angular slack keeping the inclusive 45/135 degree boundaries stable
/// against atan2 rounding
pub const ARC_EPSILON_DEG: f32 = 1e-3;

/// Back-off from a terrain entry point when clamping straight-line movement
pub const MOVE_CLAMP_EPSILON: f32 = 0.01;

/// Shield save succeeds on a d6 of this or higher
pub const SHIELD_SAVE_TARGET: u8 = 4;

/// Armor save succeeds when the modified roll reaches this total
pub const ARMOR_SAVE_TARGET: i32 = 5;

/// Armor-save bonus granted by the shield-shift action for the rest of the turn
pub const SHIELD_SHIFT_SAVE_BONUS: i32 = 1;

/// Armor-save modifier while the target sits in soft cover
pub const SOFT_COVER_SAVE_BONUS: i32 = 1;

/// Armor-pen modifier applied to rear-arc hits (harder save)
pub const REAR_ARMOR_PEN: i32 = -1;

/// Flat damage bonus for hits from any arc other than front
pub const FLANK_DAMAGE_BONUS: i32 = 1;

/// Arm cells on one side of the midline needed before arm weapons can be lost
pub const ARM_GROUP_MIN_CELLS: usize = 2;

/// Action-point ceiling after a head critical
pub const HEAD_CRITICAL_AP_CAP: u8 = 2;

/// Movement penalty (distance units) added per leg critical
pub const LEG_CRITICAL_MOVE_PENALTY: f32 = 1.0;
