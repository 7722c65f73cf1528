//! Direction strategy shared by the left and right continuation passes.
//!
//! Every boundary and comparison that differs between the two passes lives
//! here, so the scoring and reconstruction code is written once against
//! `Side`.

use serde::{Deserialize, Serialize};

use crate::constants::{PLAYFIELD_MAX, PLAYFIELD_MIN};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Catcher edge on this side when centered on `position`, clamped to the playfield.
    #[inline]
    pub fn edge(self, position: f64, half_width: f64) -> f64 {
        match self {
            Self::Left => (position - half_width).max(PLAYFIELD_MIN),
            Self::Right => (position + half_width).min(PLAYFIELD_MAX),
        }
    }

    /// Distance from `position` to the wall on this side.
    #[inline]
    pub fn span(self, position: f64) -> f64 {
        match self {
            Self::Left => position - PLAYFIELD_MIN,
            Self::Right => PLAYFIELD_MAX - position,
        }
    }

    /// Whether `candidate` lies on this side of `current`. Stacked objects
    /// (equal positions) belong to the right side.
    #[inline]
    pub fn holds(self, candidate: f64, current: f64) -> bool {
        match self {
            Self::Left => candidate < current,
            Self::Right => candidate >= current,
        }
    }

    /// Moves `x` by `distance` toward this side.
    #[inline]
    pub fn advance(self, x: f64, distance: f64) -> f64 {
        match self {
            Self::Left => x - distance,
            Self::Right => x + distance,
        }
    }

    /// Moves `x` by `distance` away from this side.
    #[inline]
    pub fn retreat(self, x: f64, distance: f64) -> f64 {
        self.opposite().advance(x, distance)
    }

    /// Edge of a catch radius around `position` that faces a catcher
    /// arriving from the opposite side.
    #[inline]
    pub fn facing_edge(self, position: f64, half_width: f64) -> f64 {
        self.retreat(position, half_width)
    }

    /// `x` is at or past `bound` in this direction.
    #[inline]
    pub fn within(self, x: f64, bound: f64) -> bool {
        match self {
            Self::Left => x <= bound,
            Self::Right => x >= bound,
        }
    }

    /// `x` is strictly past `bound` in this direction.
    #[inline]
    pub fn beyond(self, x: f64, bound: f64) -> bool {
        match self {
            Self::Left => x < bound,
            Self::Right => x > bound,
        }
    }

    /// Limiter that admits every catcher position.
    #[inline]
    pub fn open_limiter(self) -> f64 {
        match self {
            Self::Left => PLAYFIELD_MAX,
            Self::Right => PLAYFIELD_MIN,
        }
    }
}
