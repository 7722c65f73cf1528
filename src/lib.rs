pub mod benchmark;
pub mod catcher;
pub mod constants;
pub mod error;
pub mod object;
pub mod path;
pub mod runner;
pub mod score;
pub mod side;
pub mod util;

pub use catcher::CatcherConfig;
pub use error::ChartError;
pub use object::{CatchEvent, CatchableObject, Chart, ObjectKind};
pub use path::{reconstruct, Keyframe, Trajectory};
pub use score::{Continuation, ObjectScore, ScoreEngine, Successor};
pub use side::Side;
