// Tuning constants for orientation tracking, target acquisition and phase
// choreography. All angles are degrees, all durations seconds.

// Lock-on
pub const HIT_TOLERANCE_DEG: f32 = 8.0;
pub const LOCK_LENIENCY: f32 = 1.5; // widens the hit tolerance while aiming
pub const LOCK_DURATION_SEC: f64 = 3.0;

// Target spawning
pub const MIN_SEPARATION_DEG: f32 = 60.0;
pub const SPAWN_MAX_ATTEMPTS: u32 = 20;
pub const SPAWN_YAW_OFFSET_MIN_DEG: f32 = 60.0;
pub const SPAWN_YAW_OFFSET_MAX_DEG: f32 = 150.0;
pub const SPAWN_PITCH_JITTER_DEG: f32 = 20.0;
pub const SKY_PITCH_MIN_DEG: f32 = 30.0;
pub const SKY_PITCH_MAX_DEG: f32 = 120.0;

// Orientation defaults used when the platform omits an axis
pub const DEFAULT_PITCH_DEG: f32 = 90.0;
pub const DEFAULT_ROLL_DEG: f32 = 0.0;

// Guidance
pub const SCREEN_PX_PER_DEG: f32 = 15.0;
pub const ARROW_MIN_DISTANCE_DEG: f32 = 25.0; // arrow hidden when closer than this
pub const ARROW_FADE_START_DEG: f32 = 20.0;
pub const ARROW_FADE_SPAN_DEG: f32 = 20.0;
pub const SIGNAL_FULL_SCALE_DEG: f32 = 100.0;

// Intro
pub const INTRO_LINE_COUNT: usize = 15;
pub const INTRO_LINE_SEC: f64 = 2.0;
pub const INTRO_TAIL_SEC: f64 = 1.0;

// Launch
pub const WARP_DELAY_SEC: f64 = 2.0;
pub const LAUNCH_TO_SEARCH_SEC: f64 = 4.5;

// Audio levels and fades
pub const IDLE_LOOP_VOLUME: f32 = 0.6;
pub const PROLOGUE_FADE_SEC: f64 = 1.5;
pub const IDLE_FADE_SEC: f64 = 0.5;
pub const SEARCH_FADE_SEC: f64 = 2.0;
pub const LOCK_ALARM_REPEAT_SEC: f64 = 0.4;

// Search ambience
pub const SHOOTING_STAR_MIN_SEC: f64 = 10.0;
pub const SHOOTING_STAR_MAX_SEC: f64 = 25.0;
pub const SHOOTING_STAR_LIFETIME_SEC: f64 = 3.0;
pub const SENSOR_NOTICE_SEC: f64 = 5.0; // no sample by then -> "awaiting sensor"
