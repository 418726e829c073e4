//! Soft-real-time LED animation playback engine: scene data model,
//! compositor, dual-pattern dissolve engine, and the fixed-rate frame
//! scheduler that drives them. OSC wire parsing, UDP socket I/O, and
//! process/CLI packaging are external collaborators, see the `daemon`
//! crate.

pub mod color;
pub mod control_surface;
pub mod dissolve;
pub mod effect;
pub mod error;
pub mod frame_scheduler;
pub mod json;
pub mod scene;
pub mod scene_manager;
pub mod segment;
pub mod sink;
pub mod stats;
pub mod time;

pub use color::{Accumulator, Color};
pub use control_surface::{Command, CommandArg, ControlSurface};
pub use dissolve::{DissolveEngine, DissolveSchedule, DissolveScheduleRegistry, DissolveState, DissolveTransition};
pub use effect::Effect;
pub use error::{EngineError, EngineResult};
pub use frame_scheduler::{FrameScheduler, DEFAULT_FPS};
pub use scene::{PatternState, Scene};
pub use scene_manager::{new_shared, SceneManager, SharedSceneManager};
pub use segment::{DimmerTriple, Segment};
pub use sink::Sink;
pub use stats::EngineStats;
pub use time::{Clock, Instant};
