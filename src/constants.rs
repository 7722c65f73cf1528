//! Playfield and catcher constants.
//!
//! Positions are normalized to [0, 1] across the playfield width, times are
//! chart milliseconds.

// Playfield
pub const PLAYFIELD_MIN: f64 = 0.0;
pub const PLAYFIELD_MAX: f64 = 1.0;

// Synthetic start object
pub const START_POSITION: f64 = 0.5;
pub const START_TIME: f64 = -100_000.0; // also the sentinel keyframe time

// Catcher defaults
pub const DASH_SPEED_DEFAULT: f64 = 1.0 / 512.0; // 1 playfield pixel per ms
pub const CATCHER_HALF_WIDTH_DEFAULT: f64 = 0.08;
pub const CLOCK_RATE_DEFAULT: f64 = 1.0;
pub const CATCHER_HALF_WIDTH_MAX: f64 = 0.5;
pub const REACH_TOLERANCE: f64 = 1e-9; // absorbs rounding in carried catcher positions

// Catch values
pub const FRUIT_VALUE: u32 = 100;
pub const TICK_VALUE: u32 = 1;
