//! ai-client: the pipeline's external AI collaborators
//!
//! Everything that leaves the process for a hosted model lives behind an
//! object-safe async trait here: speech-to-text, scene description,
//! command interpretation, conversational replies, and text-to-speech.
//! The default `mock` backends keep the whole pipeline runnable and
//! testable offline; the HTTP backends are feature-gated per provider.

mod error;
pub use error::{AiError, Result};

mod traits;
pub use traits::{
    CommandInterpreter, Conversationalist, FrameGrabber, SceneDescriber, SpeechSynth, Transcriber,
};

mod config;
pub use config::{ElevenLabsConfig, OpenAiConfig, VisionConfig};

pub mod plugin;

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{
    MockConversation, MockFrameGrabber, MockInterpreter, MockSceneDescriber, MockSynth,
    MockTranscriber,
};

#[cfg(feature = "openai")]
mod openai;
#[cfg(feature = "openai")]
pub use openai::{OpenAiConversation, OpenAiInterpreter, OpenAiTranscriber};

#[cfg(feature = "elevenlabs")]
mod elevenlabs;
#[cfg(feature = "elevenlabs")]
pub use elevenlabs::ElevenLabsSynth;

#[cfg(feature = "http-vision")]
mod vision;
#[cfg(feature = "http-vision")]
pub use vision::HttpSceneDescriber;

/// The line spoken when the conversation backend is unreachable.
pub const OFFLINE_LINE: &str = "System malfunction. Communication module offline.";
