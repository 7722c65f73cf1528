//! Normalized catchable objects and the validated, time-ordered chart.

use serde::{Deserialize, Serialize};

use crate::constants::{
    FRUIT_VALUE, PLAYFIELD_MAX, PLAYFIELD_MIN, START_POSITION, START_TIME, TICK_VALUE,
};
use crate::error::{ChartError, EventField};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Primary scoring object.
    Fruit,
    /// Minor object (droplets, banana ticks).
    Tick,
}

impl ObjectKind {
    pub fn value(self) -> u32 {
        match self {
            Self::Fruit => FRUIT_VALUE,
            Self::Tick => TICK_VALUE,
        }
    }
}

/// One flattened event as handed over by the chart collection step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CatchEvent {
    pub position: f64,
    pub time: f64,
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperdash_target: Option<f64>,
}

impl CatchEvent {
    pub fn fruit(position: f64, time: f64) -> Self {
        Self {
            position,
            time,
            kind: ObjectKind::Fruit,
            hyperdash_target: None,
        }
    }

    pub fn tick(position: f64, time: f64) -> Self {
        Self {
            position,
            time,
            kind: ObjectKind::Tick,
            hyperdash_target: None,
        }
    }

    pub fn with_hyperdash(mut self, target: f64) -> Self {
        self.hyperdash_target = Some(target);
        self
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct CatchableObject {
    pub position: f64,
    pub time: f64,
    pub hyperdash_target: Option<f64>,
    pub value: u32,
}

impl CatchableObject {
    pub fn start() -> Self {
        Self {
            position: START_POSITION,
            time: START_TIME,
            hyperdash_target: None,
            value: 0,
        }
    }

    /// True when catching `self` lets the catcher hyperdash exactly onto `position`.
    #[inline]
    pub fn hyperdashes_to(&self, position: f64) -> bool {
        self.hyperdash_target == Some(position)
    }
}

impl From<&CatchEvent> for CatchableObject {
    fn from(event: &CatchEvent) -> Self {
        Self {
            position: event.position,
            time: event.time,
            hyperdash_target: event.hyperdash_target,
            value: event.kind.value(),
        }
    }
}

/// Time-ordered objects with the synthetic start object at index 0.
#[derive(Clone, Debug)]
pub struct Chart {
    objects: Vec<CatchableObject>,
}

impl Chart {
    /// Validates `events` and stable-sorts them by time.
    pub fn new(events: &[CatchEvent]) -> Result<Self, ChartError> {
        validate_events(events)?;
        let mut objects: Vec<CatchableObject> = events.iter().map(CatchableObject::from).collect();
        objects.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self::with_start(objects))
    }

    /// Like [`Chart::new`] but rejects out-of-order input instead of sorting it.
    pub fn from_sorted(events: &[CatchEvent]) -> Result<Self, ChartError> {
        validate_events(events)?;
        for (index, pair) in events.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                return Err(ChartError::Unsorted {
                    index: index + 1,
                    previous: pair[0].time,
                    time: pair[1].time,
                });
            }
        }
        Ok(Self::with_start(
            events.iter().map(CatchableObject::from).collect(),
        ))
    }

    fn with_start(real: Vec<CatchableObject>) -> Self {
        let mut objects = Vec::with_capacity(real.len() + 1);
        objects.push(CatchableObject::start());
        objects.extend(real);
        Self { objects }
    }

    pub fn objects(&self) -> &[CatchableObject] {
        &self.objects
    }

    pub fn get(&self, index: usize) -> &CatchableObject {
        &self.objects[index]
    }

    /// Number of objects including the start object.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the chart holds nothing but the start object.
    pub fn is_empty(&self) -> bool {
        self.objects.len() <= 1
    }

    pub fn total_value(&self) -> u64 {
        self.objects.iter().map(|object| object.value as u64).sum()
    }

    /// Time of the earliest real object, if any.
    pub fn first_event_time(&self) -> Option<f64> {
        self.objects.get(1).map(|object| object.time)
    }
}

fn validate_events(events: &[CatchEvent]) -> Result<(), ChartError> {
    for (index, event) in events.iter().enumerate() {
        if !event.time.is_finite() {
            return Err(ChartError::NonFinite {
                index,
                field: EventField::Time,
                value: event.time,
            });
        }
        check_playfield(index, EventField::Position, event.position)?;
        if let Some(target) = event.hyperdash_target {
            check_playfield(index, EventField::HyperdashTarget, target)?;
        }
    }
    Ok(())
}

fn check_playfield(index: usize, field: EventField, value: f64) -> Result<(), ChartError> {
    if !value.is_finite() {
        return Err(ChartError::NonFinite {
            index,
            field,
            value,
        });
    }
    if !(PLAYFIELD_MIN..=PLAYFIELD_MAX).contains(&value) {
        return Err(ChartError::OutOfPlayfield {
            index,
            field,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_object_leads_sorted_chart() {
        let chart = Chart::new(&[
            CatchEvent::fruit(0.3, 900.0),
            CatchEvent::tick(0.7, 100.0),
            CatchEvent::fruit(0.1, 100.0),
        ])
        .expect("chart should build");

        assert_eq!(chart.len(), 4);
        assert_eq!(*chart.get(0), CatchableObject::start());
        // stable: the tick stays ahead of the fruit sharing its time
        assert_eq!(chart.get(1).position, 0.7);
        assert_eq!(chart.get(1).value, TICK_VALUE);
        assert_eq!(chart.get(2).position, 0.1);
        assert_eq!(chart.get(3).time, 900.0);
        assert_eq!(chart.total_value(), 201);
        assert_eq!(chart.first_event_time(), Some(100.0));
    }

    #[test]
    fn empty_input_is_start_only() {
        let chart = Chart::new(&[]).expect("empty chart is valid");
        assert!(chart.is_empty());
        assert_eq!(chart.len(), 1);
        assert_eq!(chart.total_value(), 0);
        assert_eq!(chart.first_event_time(), None);
    }

    #[test]
    fn rejects_non_finite_fields() {
        let err = Chart::new(&[CatchEvent::fruit(0.5, 0.0), CatchEvent::fruit(f64::NAN, 1.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            ChartError::NonFinite {
                index: 1,
                field: EventField::Position,
                ..
            }
        ));

        let err = Chart::new(&[CatchEvent::tick(0.5, f64::INFINITY)]).unwrap_err();
        assert!(matches!(
            err,
            ChartError::NonFinite {
                field: EventField::Time,
                ..
            }
        ));
    }

    #[test]
    fn rejects_positions_outside_playfield() {
        let err = Chart::new(&[CatchEvent::fruit(1.2, 0.0)]).unwrap_err();
        assert!(matches!(err, ChartError::OutOfPlayfield { index: 0, .. }));

        let err = Chart::new(&[CatchEvent::fruit(0.2, 0.0).with_hyperdash(-0.1)]).unwrap_err();
        assert!(matches!(
            err,
            ChartError::OutOfPlayfield {
                field: EventField::HyperdashTarget,
                ..
            }
        ));
    }

    #[test]
    fn strict_constructor_rejects_unsorted_input() {
        let events = [CatchEvent::fruit(0.2, 500.0), CatchEvent::fruit(0.4, 200.0)];
        assert_eq!(
            Chart::from_sorted(&events).unwrap_err(),
            ChartError::Unsorted {
                index: 1,
                previous: 500.0,
                time: 200.0,
            }
        );
        assert!(Chart::new(&events).is_ok());
    }

    #[test]
    fn event_json_uses_snake_case_kinds() {
        let event: CatchEvent =
            serde_json::from_str(r#"{"position":0.25,"time":10,"kind":"tick"}"#)
                .expect("event should parse");
        assert_eq!(event, CatchEvent::tick(0.25, 10.0));
        let object = CatchableObject::from(&event.with_hyperdash(0.75));
        assert!(object.hyperdashes_to(0.75));
        assert!(!object.hyperdashes_to(0.7));
    }
}
