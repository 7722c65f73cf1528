use std::fmt;

/// Which numeric field of an input event failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventField {
    Position,
    Time,
    HyperdashTarget,
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::Time => write!(f, "time"),
            Self::HyperdashTarget => write!(f, "hyperdash_target"),
        }
    }
}

/// Which catcher parameter failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatcherField {
    DashSpeed,
    HalfWidth,
    ClockRate,
}

impl fmt::Display for CatcherField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DashSpeed => write!(f, "dash_speed"),
            Self::HalfWidth => write!(f, "half_width"),
            Self::ClockRate => write!(f, "clock_rate"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChartError {
    NonFinite {
        index: usize,
        field: EventField,
        value: f64,
    },
    OutOfPlayfield {
        index: usize,
        field: EventField,
        value: f64,
    },
    Unsorted {
        index: usize,
        previous: f64,
        time: f64,
    },
    InvalidCatcher {
        field: CatcherField,
        value: f64,
    },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                index,
                field,
                value,
            } => write!(f, "event {index}: {field} is not finite ({value})"),
            Self::OutOfPlayfield {
                index,
                field,
                value,
            } => write!(f, "event {index}: {field} {value} is outside [0, 1]"),
            Self::Unsorted {
                index,
                previous,
                time,
            } => write!(
                f,
                "event {index}: time {time} precedes previous event time {previous}"
            ),
            Self::InvalidCatcher { field, value } => {
                write!(f, "invalid catcher {field}: {value}")
            }
        }
    }
}

impl std::error::Error for ChartError {}
