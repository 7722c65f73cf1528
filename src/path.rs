//! Walks the scored chart from the start object and emits the catcher's
//! planned keyframes.

use serde::{Deserialize, Serialize};

use crate::constants::{REACH_TOLERANCE, START_POSITION};
use crate::object::{CatchableObject, Chart};
use crate::score::{ObjectScore, ScoreEngine, Successor};
use crate::side::Side;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub time: f64,
    pub position: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Trajectory {
    /// Sentinel keyframe first, then one per visited object, non-decreasing in time.
    pub keyframes: Vec<Keyframe>,
    /// Chart indices of the visited objects, start object excluded.
    pub visited: Vec<usize>,
    pub caught_value: u64,
}

impl Trajectory {
    /// Number of consecutive visits that ride a hyperdash.
    pub fn hyperdash_transitions(&self, chart: &Chart) -> usize {
        let mut previous = 0usize;
        let mut count = 0;
        for &index in &self.visited {
            if chart.get(previous).hyperdashes_to(chart.get(index).position) {
                count += 1;
            }
            previous = index;
        }
        count
    }
}

/// Picks the side to continue on from `position`.
///
/// A side is open when it has a successor that `reachable` accepts and the
/// catcher edge at `position` has not crossed its limiter. When only one side
/// is open it is taken regardless of score. When both are, the higher score
/// wins and a tie keeps the current `heading`.
pub fn choose_side(
    score: &ObjectScore,
    position: f64,
    half_width: f64,
    heading: Side,
    reachable: impl Fn(&Successor) -> bool,
) -> Option<Side> {
    let open = |side: Side| {
        let continuation = score.side(side);
        continuation.next.as_ref().is_some_and(&reachable)
            && side.within(side.advance(position, half_width), continuation.limiter)
    };

    match (open(Side::Left), open(Side::Right)) {
        (true, true) => {
            let left = score.left.score;
            let right = score.right.score;
            Some(if left == right {
                heading
            } else if left > right {
                Side::Left
            } else {
                Side::Right
            })
        }
        (true, false) => Some(Side::Left),
        (false, true) => Some(Side::Right),
        (false, false) => None,
    }
}

/// Where the catcher ends up when it heads from `position` toward `target`
/// with `travel` of dash distance available. It stops short when the target
/// is farther than that, which still catches anything `reaches` accepted.
pub fn approach(position: f64, target: f64, travel: f64) -> f64 {
    if (target - position).abs() <= travel {
        target
    } else if target < position {
        Side::Left.advance(position, travel)
    } else {
        Side::Right.advance(position, travel)
    }
}

/// Whether a catcher standing at `position` when `current` is caught can
/// still catch `next`, either by dashing or by riding `current`'s hyperdash.
fn reaches(
    current: &CatchableObject,
    position: f64,
    next: &CatchableObject,
    half_width: f64,
    dash_speed: f64,
) -> bool {
    if current.hyperdashes_to(next.position) {
        return true;
    }
    let side = if next.position < position {
        Side::Left
    } else {
        Side::Right
    };
    let travel = (next.time - current.time) * dash_speed;
    side.within(
        side.advance(side.advance(position, half_width), travel + REACH_TOLERANCE),
        side.facing_edge(next.position, half_width),
    )
}

/// Reconstructs the plan, scoring any object the walk reaches that has not
/// been scored yet.
///
/// Each keyframe holds the catcher position at the moment the object is
/// caught. Between keyframes the catcher never moves faster than the dash
/// speed unless it rides a hyperdash.
pub fn reconstruct(engine: &mut ScoreEngine<'_>) -> Trajectory {
    let chart = engine.chart();
    let half_width = engine.config().half_width;
    let dash_speed = engine.config().effective_dash_speed();

    let mut position = START_POSITION;
    let mut heading = Side::Right;
    let mut cursor = 0usize;
    let mut keyframes = Vec::new();
    let mut visited = Vec::new();
    let mut caught_value = 0u64;

    loop {
        let current = chart.get(cursor);
        keyframes.push(Keyframe {
            time: current.time,
            position,
        });
        if cursor > 0 {
            visited.push(cursor);
            caught_value += current.value as u64;
        }

        let score = engine.compute(cursor);
        let reachable = |next: &Successor| {
            reaches(current, position, chart.get(next.index), half_width, dash_speed)
        };
        let Some(side) = choose_side(&score, position, half_width, heading, reachable) else {
            break;
        };
        let Some(next) = score.side(side).next else {
            break;
        };
        let target = chart.get(next.index);
        let arrival = if current.hyperdashes_to(target.position) {
            target.position
        } else {
            approach(position, target.position, (target.time - current.time) * dash_speed)
        };
        tracing::debug!(
            cursor,
            position,
            arrival,
            side = side.as_str(),
            score_left = score.left.score,
            score_right = score.right.score,
            limiter_left = score.left.limiter,
            limiter_right = score.right.limiter,
            next = next.index,
            "advancing"
        );

        position = arrival;
        heading = side;
        cursor = next.index;
    }

    Trajectory {
        keyframes,
        visited,
        caught_value,
    }
}
