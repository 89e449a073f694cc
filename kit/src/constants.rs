/// Minimum squared length for a direction to be treated as non-zero.
///
/// Used anywhere "is this input/velocity zero?" matters: rotation targets,
/// velocity-movement mode, camera reset gating.
pub const DIRECTION_EPS_SQ: f32 = 1.0e-6;

/// Minimum planar motion required to derive a yaw (meters).
pub const YAW_EPS: f32 = 1.0e-6;

/// Height above the body origin that motor probes start from (meters).
///
/// The body origin sits at the character's feet, so probes start roughly at hip height.
pub const PROBE_ORIGIN_HEIGHT: f32 = 1.0;

/// How long an accepted external velocity injection keeps the force gate closed (seconds).
pub const FORCE_GATE_COOLDOWN_SECS: f32 = 0.1;

/// Scale applied to input when both move axes are fully deflected.
///
/// Keeps keyboard diagonals from being faster than a single axis.
pub const DIAGONAL_INPUT_SCALE: f32 = 0.7;

/// Horizontal fraction of the jump force carried along the movement direction.
pub const JUMP_HORIZONTAL_DIVISOR: f32 = 20.0;

/// Divisor applied to jump force for slide and wall jumps.
pub const SPECIAL_JUMP_FORCE_DIVISOR: f32 = 1.2;

/// Divisor applied to the up vector added to the wall normal on a wall jump.
pub const WALL_JUMP_UP_DIVISOR: f32 = 1.2;

/// Orbit angle tolerance at which a camera reset counts as finished (degrees).
pub const CAMERA_RESET_TOLERANCE_DEG: f32 = 1.0;

/// Divisor applied to the vertical camera axis when zooming with a stick or touch.
pub const STICK_ZOOM_DIVISOR: f32 = 200.0;

/// Seconds an enemy stays in the world after reaching zero health.
pub const ENEMY_REMOVAL_DELAY_SECS: f32 = 2.0;

/// Default fixed physics rate (Hz).
pub const DEFAULT_FIXED_HZ: f32 = 50.0;

/// Largest frame delta the frame clock will accept before clamping (seconds).
///
/// Keeps a long stall from turning into a burst of fixed steps.
pub const MAX_FRAME_DT_SECS: f32 = 0.125;

/// Orbit speed applied when gamepad or touch strafing nudges the camera (degrees per second).
pub const STRAFE_ORBIT_SPEED: f32 = 75.0;

/// Strafe nudging only happens when the camera is further out than this (negative distance).
pub const STRAFE_ORBIT_MIN_DISTANCE: f32 = -1.0;

/// Largest horizontal offset between player and enemy that still counts as landing on it (meters).
pub const STOMP_CONTACT_RADIUS: f32 = 1.0;
