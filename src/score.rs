//! Memoized continuation scoring.
//!
//! For every object the engine records the best chain value reachable when
//! the catcher leaves it toward the left and toward the right, together with
//! the limiter that keeps that chain reachable and the successor it starts
//! with. A candidate always comes strictly later in the chart than the object
//! it continues, so the dependency graph is a DAG and a post-order walk with
//! an explicit stack scores every needed object exactly once.

use serde::Serialize;

use crate::catcher::CatcherConfig;
use crate::error::ChartError;
use crate::object::{CatchableObject, Chart};
use crate::side::Side;

/// First object of a continuation chain and the side it continues on.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Successor {
    pub index: usize,
    pub position: f64,
    pub path: Side,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Continuation {
    pub score: u64,
    /// Catcher edge bound beyond which `next` can no longer be reached.
    pub limiter: f64,
    pub next: Option<Successor>,
}

impl Continuation {
    /// Nothing left to catch on `side`.
    pub fn terminal(side: Side) -> Self {
        Self {
            score: 0,
            limiter: side.open_limiter(),
            next: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct ObjectScore {
    pub left: Continuation,
    pub right: Continuation,
}

impl ObjectScore {
    pub fn side(&self, side: Side) -> &Continuation {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn best(&self) -> u64 {
        self.left.score.max(self.right.score)
    }
}

pub struct ScoreEngine<'a> {
    chart: &'a Chart,
    config: CatcherConfig,
    dash_speed: f64,
    memo: Vec<Option<ObjectScore>>,
    evaluations: usize,
}

impl<'a> ScoreEngine<'a> {
    /// Fails when `config` is rejected by [`CatcherConfig::validate`]; the
    /// scan horizon and reach tests need a positive finite dash speed.
    pub fn new(chart: &'a Chart, config: CatcherConfig) -> Result<Self, ChartError> {
        config.validate()?;
        Ok(Self {
            chart,
            config,
            dash_speed: config.effective_dash_speed(),
            memo: vec![None; chart.len()],
            evaluations: 0,
        })
    }

    pub fn chart(&self) -> &'a Chart {
        self.chart
    }

    pub fn config(&self) -> CatcherConfig {
        self.config
    }

    /// Number of objects scored so far. Never exceeds the chart length.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Memoized result for `index`, if it has been scored.
    pub fn get(&self, index: usize) -> Option<&ObjectScore> {
        self.memo.get(index).and_then(Option::as_ref)
    }

    pub fn table(&self) -> &[Option<ObjectScore>] {
        &self.memo
    }

    /// Scores `index` and everything its continuations depend on.
    /// Already scored objects are returned from the memo table untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below `chart().len()`.
    pub fn compute(&mut self, index: usize) -> ObjectScore {
        assert!(
            index < self.chart.len(),
            "object {index} out of range for a chart of {} objects",
            self.chart.len()
        );
        if let Some(score) = self.memo[index] {
            return score;
        }

        let mut stack = vec![index];
        while let Some(&top) = stack.last() {
            if self.memo[top].is_some() {
                stack.pop();
                continue;
            }

            let depth = stack.len();
            for side in Side::BOTH {
                for candidate in self.candidates(top, side) {
                    if self.memo[candidate].is_none() {
                        stack.push(candidate);
                    }
                }
            }

            if stack.len() == depth {
                stack.pop();
                let score = self.evaluate(top);
                self.memo[top] = Some(score);
                self.evaluations += 1;
            }
        }

        match self.memo[index] {
            Some(score) => score,
            None => unreachable!("work stack drained before object {index} was scored"),
        }
    }

    /// Scores the start object, which pulls in every object a plan can visit.
    pub fn compute_start(&mut self) -> ObjectScore {
        let score = self.compute(0);
        tracing::info!(
            objects = self.chart.len(),
            evaluations = self.evaluations,
            score_left = score.left.score,
            score_right = score.right.score,
            "scores computed"
        );
        score
    }

    fn evaluate(&self, index: usize) -> ObjectScore {
        let score = ObjectScore {
            left: self.continuation(index, Side::Left),
            right: self.continuation(index, Side::Right),
        };
        tracing::trace!(
            index,
            score_left = score.left.score,
            score_right = score.right.score,
            limiter_left = score.left.limiter,
            limiter_right = score.right.limiter,
            "object scored"
        );
        score
    }

    fn continuation(&self, index: usize, side: Side) -> Continuation {
        let current = self.chart.get(index);
        let half_width = self.config.half_width;
        let edge = side.edge(current.position, half_width);
        let mut best: Option<Continuation> = None;

        for next in self.candidates(index, side) {
            // populated by the work stack before `index` is evaluated
            let Some(scored) = self.memo[next] else {
                continue;
            };
            let candidate = self.chart.get(next);
            let travel = (candidate.time - current.time) * self.dash_speed;
            let reach = side.advance(edge, travel);
            let hyperdash = current.hyperdashes_to(candidate.position);
            let value = candidate.value as u64;
            let improves = |total: u64| best.map_or(true, |incumbent| total > incumbent.score);

            let onward = scored.side(side);
            let turn = scored.side(side.opposite());
            let onward_total = onward.score + value;
            let turn_total = turn.score + value;

            if onward.score > turn.score
                && improves(onward_total)
                && (side.beyond(reach, onward.limiter) || hyperdash)
            {
                best = Some(Continuation {
                    score: onward_total,
                    limiter: if hyperdash {
                        side.open_limiter()
                    } else {
                        side.retreat(onward.limiter, travel)
                    },
                    next: Some(Successor {
                        index: next,
                        position: candidate.position,
                        path: side,
                    }),
                });
            } else if improves(turn_total) {
                let catch_edge = side.facing_edge(candidate.position, half_width);
                if side.within(reach, catch_edge) || hyperdash {
                    best = Some(Continuation {
                        score: turn_total,
                        limiter: if hyperdash {
                            side.open_limiter()
                        } else {
                            side.retreat(catch_edge, travel)
                        },
                        next: Some(Successor {
                            index: next,
                            position: candidate.position,
                            path: side.opposite(),
                        }),
                    });
                }
            }
        }

        best.unwrap_or_else(|| Continuation::terminal(side))
    }

    /// Objects the `side` pass of `index` examines, in chart order.
    ///
    /// The scan runs until the time horizon (twice the dash time to the wall
    /// on that side) and keeps going past it until one candidate is found.
    /// Which objects qualify depends only on geometry, never on their scores.
    fn candidates(&self, index: usize, side: Side) -> Vec<usize> {
        let current = self.chart.get(index);
        let edge = side.edge(current.position, self.config.half_width);
        let horizon = self.horizon(current, side);

        let mut found = Vec::new();
        for next in index + 1..self.chart.len() {
            let candidate = self.chart.get(next);
            if self.admits(current, edge, candidate, side) {
                found.push(next);
            }
            if candidate.time >= horizon && !found.is_empty() {
                break;
            }
        }
        found
    }

    fn horizon(&self, current: &CatchableObject, side: Side) -> f64 {
        // the catcher idles before the first real object, so the start object
        // measures its horizon from there
        let origin = self
            .chart
            .first_event_time()
            .map_or(current.time, |first| current.time.max(first));
        origin + 2.0 * side.span(current.position) / self.dash_speed
    }

    fn admits(
        &self,
        current: &CatchableObject,
        edge: f64,
        candidate: &CatchableObject,
        side: Side,
    ) -> bool {
        if current.hyperdashes_to(candidate.position) {
            return true;
        }
        if !side.holds(candidate.position, current.position) {
            return false;
        }
        let travel = (candidate.time - current.time) * self.dash_speed;
        side.within(
            side.advance(edge, travel),
            side.facing_edge(candidate.position, self.config.half_width),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::CatchEvent;

    fn chart(events: &[CatchEvent]) -> Chart {
        Chart::new(events).expect("test chart must be valid")
    }

    fn engine(chart: &Chart, config: CatcherConfig) -> ScoreEngine<'_> {
        ScoreEngine::new(chart, config).expect("test catcher must be valid")
    }

    #[test]
    fn empty_chart_scores_zero() {
        let chart = chart(&[]);
        let mut engine = engine(&chart, CatcherConfig::default());
        let score = engine.compute_start();

        assert_eq!(score.left, Continuation::terminal(Side::Left));
        assert_eq!(score.right, Continuation::terminal(Side::Right));
        assert_eq!(engine.evaluations(), 1);
    }

    #[test]
    fn compute_is_idempotent() {
        let chart = chart(&[
            CatchEvent::fruit(0.4, 100.0),
            CatchEvent::tick(0.45, 150.0),
            CatchEvent::fruit(0.6, 300.0),
        ]);
        let mut engine = engine(&chart, CatcherConfig::default());
        let first = engine.compute_start();
        let evaluations = engine.evaluations();
        assert!(evaluations <= chart.len());

        assert_eq!(engine.compute_start(), first);
        for index in 0..chart.len() {
            engine.compute(index);
        }
        assert_eq!(engine.evaluations(), chart.len());
        assert_eq!(engine.compute(0), first);
        assert_eq!(engine.evaluations(), chart.len());
    }

    #[test]
    fn turn_continuation_limiter_clears_catch_radius() {
        // current at index 1 (0.5, t=0), one candidate to the left
        let chart = chart(&[CatchEvent::fruit(0.5, 0.0), CatchEvent::fruit(0.3, 100.0)]);
        let mut engine = engine(&chart, CatcherConfig::new(0.002, 0.05));
        let score = engine.compute(1);

        assert_eq!(score.left.score, 100);
        let next = score.left.next.expect("left successor");
        assert_eq!(next.index, 2);
        assert_eq!(next.position, 0.3);
        assert_eq!(next.path, Side::Right);
        // candidate's facing edge 0.35 pushed back by 0.2 of dash travel
        assert!((score.left.limiter - 0.55).abs() < 1e-9);
        assert_eq!(score.right, Continuation::terminal(Side::Right));
    }

    #[test]
    fn out_of_reach_candidate_is_skipped() {
        let chart = chart(&[CatchEvent::fruit(0.5, 0.0), CatchEvent::fruit(0.1, 100.0)]);
        let mut engine = engine(&chart, CatcherConfig::new(0.001, 0.05));
        let score = engine.compute(1);

        assert_eq!(score.left, Continuation::terminal(Side::Left));
        assert_eq!(score.right, Continuation::terminal(Side::Right));
    }

    #[test]
    fn onward_continuation_is_preferred_when_better_and_reachable() {
        // 0.6 -> 0.5 -> 0.3: the middle object's left chain is worth more
        let chart = chart(&[
            CatchEvent::fruit(0.6, 0.0),
            CatchEvent::fruit(0.5, 100.0),
            CatchEvent::fruit(0.3, 200.0),
        ]);
        let mut engine = engine(&chart, CatcherConfig::new(0.002, 0.05));
        let score = engine.compute(1);

        assert_eq!(score.left.score, 200);
        let next = score.left.next.expect("left successor");
        assert_eq!(next.index, 2);
        assert_eq!(next.path, Side::Left);
        let middle = engine.get(2).expect("middle scored");
        assert!((score.left.limiter - (middle.left.limiter + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn hyperdash_reaches_past_dash_speed_and_opens_limiters() {
        let chart = chart(&[
            CatchEvent::fruit(0.1, 1_000.0).with_hyperdash(0.9),
            CatchEvent::fruit(0.9, 1_010.0),
        ]);
        let mut engine = engine(&chart, CatcherConfig::default());
        let score = engine.compute(1);

        assert_eq!(score.right.score, 100);
        assert_eq!(score.right.limiter, 0.0);
        assert_eq!(score.right.next.map(|next| next.index), Some(2));
        assert_eq!(score.left.score, 100);
        assert_eq!(score.left.limiter, 1.0);
    }

    #[test]
    fn rejects_unusable_catcher() {
        let chart = chart(&[CatchEvent::fruit(0.0, 100.0)]);
        let err = ScoreEngine::new(&chart, CatcherConfig::new(0.0, 0.05))
            .err()
            .expect("zero dash speed must be rejected");
        assert!(err.to_string().contains("dash_speed"));

        let err = ScoreEngine::new(&chart, CatcherConfig::default().with_clock_rate(f64::NAN))
            .err()
            .expect("nan clock rate must be rejected");
        assert!(err.to_string().contains("clock_rate"));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn compute_panics_past_the_chart() {
        let chart = chart(&[CatchEvent::fruit(0.5, 100.0)]);
        engine(&chart, CatcherConfig::default()).compute(chart.len());
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let events: Vec<CatchEvent> = (0..5_000)
            .map(|i| {
                let position = if i % 2 == 0 { 0.45 } else { 0.55 };
                CatchEvent::tick(position, i as f64 * 50.0)
            })
            .collect();
        let chart = chart(&events);
        let mut engine = engine(&chart, CatcherConfig::new(0.01, 0.05));
        let score = engine.compute_start();

        assert_eq!(score.best(), 5_000);
        assert!(engine.evaluations() <= chart.len());
    }
}
