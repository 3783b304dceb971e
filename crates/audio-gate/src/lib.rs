//! audio-gate: energy-based utterance segmentation
//!
//! A continuous stream of mono PCM frames goes in; discrete utterance
//! buffers come out. Recording starts when a frame's level crosses the
//! start threshold, and ends once the level has stayed below the stop
//! threshold for the configured silence window. Brief recoveries reset
//! the window, so a pause mid-sentence does not split the utterance.

mod types;
pub use types::{AudioBuffer, GateConfig, GateEvent};

mod level;
pub use level::level_db;

mod gate;
pub use gate::AudioGate;

pub mod chime;

mod playback;
pub use playback::{AudioOutput, NullOutput};
#[cfg(feature = "audio")]
pub use playback::CpalOutput;

#[cfg(feature = "audio")]
pub mod mic;
