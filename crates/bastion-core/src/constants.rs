//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Movement ---

/// Distance at which a mover counts a waypoint as reached (world units).
pub const WAYPOINT_REACHED_RADIUS: f32 = 0.1;

/// Minimum per-tick displacement that updates an enemy's facing.
pub const FACING_MIN_DELTA: f32 = 1e-4;

// --- Wave spawning ---

/// Lower bound of the random lateral path offset given to wave spawns.
pub const SPAWN_OFFSET_MIN: f32 = -0.3;

/// Upper bound of the random lateral path offset given to wave spawns.
pub const SPAWN_OFFSET_MAX: f32 = 0.5;

// --- Enemy lifecycle ---

/// Death animation window before a dying enemy is recycled (seconds).
pub const DEATH_RECYCLE_DELAY: f32 = 1.0;

/// Lateral distance between a splitting slime and each of its clones.
pub const SPLIT_CLONE_LATERAL: f32 = 0.3;

/// Path offset given to each clone; the left clone takes the negative value.
pub const SPLIT_CLONE_PATH_OFFSET: f32 = 0.15;

/// Fallback when the split animation never reports completion (seconds).
pub const SPLIT_ANIMATION_TIMEOUT: f32 = 1.0;

// --- Targeting ---

/// Distance weight in target scoring: `health + distance * weight`.
pub const SCORE_DISTANCE_WEIGHT: f32 = 5.0;

/// Fraction of nominal range tested against an enemy's collision bounds.
pub const RANGE_SHRINK: f32 = 0.95;

// --- Fire control ---

/// Wind-up between acquiring a target and the first volley (seconds).
pub const PRE_ATTACK_LEAD: f32 = 0.1;

/// Fallback when the attack animation never reports the volley release (seconds).
pub const ATTACK_RELEASE_TIMEOUT: f32 = 0.3;

/// Time without a target before an archer turns back to its idle facing (seconds).
pub const IDLE_RESET_DELAY: f32 = 4.0;

/// Total angular spread of one volley (degrees), centered on the aim line.
pub const VOLLEY_SPREAD_DEG: f32 = 40.0;

/// Spacing between archer slots on a tower (world units).
pub const ARCHER_SLOT_SPACING: f32 = 0.4;

/// Height of archer slots above the tower base (world units).
pub const ARCHER_SLOT_HEIGHT: f32 = 0.6;

// --- Ballistics ---

/// Minimum distance along which a spread shot's aim point is projected.
pub const PROJECTILE_MIN_SIM_DISTANCE: f32 = 5.0;

/// Shortest projectile flight (seconds).
pub const FLIGHT_DURATION_MIN: f32 = 0.5;

/// Longest projectile flight (seconds).
pub const FLIGHT_DURATION_MAX: f32 = 1.5;

/// Distance contribution to the arc height.
pub const ARC_DISTANCE_FACTOR: f32 = 0.35;

/// Clamp range of the distance contribution.
pub const ARC_BASE_MIN: f32 = 1.5;
pub const ARC_BASE_MAX: f32 = 3.5;

/// Fraction of the target's collider height added to the arc.
pub const ARC_TARGET_HEIGHT_FACTOR: f32 = 0.25;
pub const ARC_TARGET_HEIGHT_MIN: f32 = 0.25;
pub const ARC_TARGET_HEIGHT_MAX: f32 = 1.0;

/// Vertical delta contribution (`dy * factor`), clamped.
pub const ARC_VERTICAL_FACTOR: f32 = 0.2;
pub const ARC_VERTICAL_MIN: f32 = -0.5;
pub const ARC_VERTICAL_MAX: f32 = 1.0;

/// Final arc height bounds.
pub const ARC_HEIGHT_MIN: f32 = 2.0;
pub const ARC_HEIGHT_MAX: f32 = 4.0;

/// Smallest parabolic bump applied mid-flight.
pub const ARC_FLOOR: f32 = 0.1;

/// Visual exaggeration of the parabolic bump.
pub const ARC_VISUAL_SCALE: f32 = 1.5;

/// Normalized progress after which a projectile may hit by contact.
pub const HIT_ENABLE_PROGRESS: f32 = 0.5;

/// Contact distance between a projectile and its target's collider edge.
pub const PROJECTILE_HIT_RADIUS: f32 = 0.25;

/// Net damage never drops below this after armor.
pub const MIN_NET_DAMAGE: i32 = 1;

// --- Towers ---

/// Fallback when the tower rebuild animation never reports idle (seconds).
pub const TOWER_REBUILD_TIMEOUT: f32 = 1.5;

// --- Outcome ---

/// Delay between hearts reaching zero and the defeat latch (seconds).
pub const DEFEAT_DELAY: f32 = 1.0;

// --- Effects ---

/// Default lifetime of pooled hit effects (seconds).
pub const EFFECT_LIFETIME: f32 = 1.0;

/// Lifetime of the miss marker (seconds).
pub const MISS_EFFECT_LIFETIME: f32 = 0.3;

// --- Economy ---

pub const DEFAULT_STARTING_HEARTS: i32 = 20;
pub const DEFAULT_STARTING_COINS: i32 = 100;
pub const DEFAULT_SELL_REFUND_FRACTION: f32 = 0.5;
pub const DEFAULT_WAVE_DELAY: f32 = 5.0;
