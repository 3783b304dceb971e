//! command-dispatch: the orchestrator at the center of the pipeline
//!
//! One linear cycle per utterance: the audio gate finalizes a buffer, the
//! scene description (already capturing since recording started) is
//! joined with a bounded wait, the buffer is transcribed, the command
//! interpreter and the conversational reply run concurrently, and the
//! resulting command sequence is walked step by step against both hubs in
//! lock-step. Every call that leaves the process is bounded by a timeout;
//! a failure anywhere degrades the cycle instead of wedging the robot.

mod config;
pub use config::DispatchConfig;

mod state;
pub use state::{SessionCell, SessionState};

mod orchestrator;
pub use orchestrator::{Collaborators, Orchestrator};

mod pump;
pub use pump::spawn_audio_pump;
