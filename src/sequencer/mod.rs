// Sequencer module
// Step grid, look-ahead scheduling, transport and the playback controller

pub mod metronome;
pub mod pattern;
pub mod scheduler;
pub mod sequence;
pub mod session_timer;
pub mod tap_tempo;
pub mod tick_source;
pub mod timeline;
pub mod transport;
pub mod visual;

pub use metronome::{Metronome, MetronomeError};
pub use pattern::{AccentLevel, Pattern};
pub use scheduler::{FillReport, LookAheadScheduler};
pub use sequence::{BarCycle, SequenceConfig};
pub use tick_source::{ManualTicker, RepeatingTask, ThreadTicker};
pub use timeline::{StepMode, Tempo};
pub use transport::{PlaybackState, TransportState};
pub use visual::{FrameOutcome, StepVisual};
