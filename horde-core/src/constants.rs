//! Centralized tuning constants for the horde simulation.
//!
//! Shared numbers used by more than one subsystem live here. Per-weapon
//! formulas and affix tables stay in their own modules as the single source
//! of truth.

// =====================================================
// Frame
// =====================================================

/// Upper bound on a single simulation step (seconds)
pub const MAX_FRAME_DT: f32 = 0.05;

/// Camera catch-up rate: each frame closes `1 - e^(-rate * dt)` of the gap
pub const CAMERA_FOLLOW_RATE: f32 = 10.0;

// =====================================================
// Player
// =====================================================

/// Player collision radius
pub const PLAYER_RADIUS: f32 = 34.0;

/// Starting pickup radius
pub const PLAYER_BASE_PICKUP_RADIUS: f32 = 90.0;

/// Starting max HP
pub const PLAYER_BASE_MAX_HP: f32 = 100.0;

/// Starting move speed (units per second)
pub const PLAYER_BASE_MOVE_SPEED: f32 = 320.0;

/// XP required for the first level-up
pub const PLAYER_BASE_XP_TO_NEXT: u32 = 8;

/// Invulnerability window after a contact hit (seconds)
pub const CONTACT_IFRAMES: f32 = 0.7;

/// Time since last contact hit before regen resumes (seconds)
pub const REGEN_DELAY: f32 = 2.0;

/// Number of equipment slots
pub const EQUIPMENT_SLOTS: usize = 8;

/// Armor to damage-reduction factor: 1 armor = 3%
pub const ARMOR_REDUCTION_PER_POINT: f32 = 0.03;

/// Damage reduction cap
pub const MAX_DAMAGE_REDUCTION: f32 = 0.45;

// =====================================================
// Progression
// =====================================================

/// xpToNext growth: next = floor(current * XP_CURVE_MULT + XP_CURVE_ADD)
pub const XP_CURVE_MULT: f32 = 1.28;

/// Additive term of the XP curve
pub const XP_CURVE_ADD: f32 = 2.0;

/// Base max HP granted per level-up
pub const LEVEL_UP_MAX_HP: f32 = 6.0;

/// Flat heal applied per level-up
pub const LEVEL_UP_HEAL: f32 = 10.0;

/// Upgrade choices offered per prompt
pub const UPGRADE_CHOICES: usize = 3;

/// Level both fusion ingredients must reach
pub const FUSION_MIN_LEVEL: u32 = 3;

// =====================================================
// Monsters
// =====================================================

/// Monster collision radius
pub const MONSTER_RADIUS: f32 = 34.0;

/// Per-second knockback retention: knock *= KNOCKBACK_DECAY^dt
pub const KNOCKBACK_DECAY: f32 = 0.001;

/// Seek speed bounds
pub const MONSTER_MIN_SPEED: f32 = 120.0;
pub const MONSTER_MAX_SPEED: f32 = 280.0;

// =====================================================
// Spawn Director
// =====================================================

/// Seconds per intensity step
pub const INTENSITY_PERIOD_SECS: f32 = 30.0;

/// Population cap: SPAWN_CAP_BASE + intensity * SPAWN_CAP_PER_INTENSITY
pub const SPAWN_CAP_BASE: usize = 22;
pub const SPAWN_CAP_PER_INTENSITY: usize = 8;

/// Timer floor while the population is at cap
pub const SPAWN_CAP_BACKOFF: f32 = 0.35;

/// Spawn ring radius bounds
pub const SPAWN_RADIUS_MIN: f32 = 520.0;
pub const SPAWN_RADIUS_MAX: f32 = 900.0;

/// Positional jitter on each spawn axis
pub const SPAWN_JITTER: f32 = 80.0;

/// Spawn interval shrinks from MAX toward MIN over the run
pub const SPAWN_INTERVAL_MAX: f32 = 1.7;
pub const SPAWN_INTERVAL_MIN: f32 = 0.55;

/// Seconds for the interval to shrink by one second
pub const SPAWN_INTERVAL_RAMP_SECS: f32 = 140.0;

// =====================================================
// Pickups & Drops
// =====================================================

/// XP orb collision radius
pub const XP_PICKUP_RADIUS: f32 = 18.0;

/// Equipment pickup collision radius
pub const EQUIPMENT_PICKUP_RADIUS: f32 = 22.0;

/// Minimum magnet radius (actual is max(this, pickupRadius * 3))
pub const MAGNET_RADIUS_MIN: f32 = 260.0;

/// XP orb value bounds
pub const XP_DROP_MIN: u32 = 1;
pub const XP_DROP_MAX: u32 = 8;

/// Equipment drop: base chance per kill
pub const EQUIPMENT_DROP_BASE: f32 = 0.025;

/// Equipment drop: chance added per point of luck
pub const EQUIPMENT_DROP_PER_LUCK: f32 = 0.004;

/// Equipment drop: chance ceiling
pub const EQUIPMENT_DROP_MAX: f32 = 0.08;

// =====================================================
// Assets
// =====================================================

/// Monster sprite variants in the asset table
pub const MONSTER_VARIANTS: u32 = 24;

/// Equipment icons per rarity tier
pub const EQUIPMENT_ICONS_PER_RARITY: u32 = 6;
