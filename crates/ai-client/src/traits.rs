use crate::Result;
use async_trait::async_trait;

/// Speech-to-text over a finished utterance buffer.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Mono PCM in, transcript out. May legitimately return an empty
    /// string for unintelligible audio.
    async fn transcribe(&self, samples: &[i16], sample_rate_hz: u32) -> Result<String>;
}

/// Captures one frame and returns a natural-language description of the
/// scene. Started concurrently with audio capture; the orchestrator joins
/// it with a bounded wait.
#[async_trait]
pub trait SceneDescriber: Send + Sync {
    async fn describe(&self) -> Result<String>;
}

/// Translates (transcript, scene) into command-sequence JSON text.
/// Parsing and validation happen downstream in `command-proto`.
#[async_trait]
pub trait CommandInterpreter: Send + Sync {
    async fn interpret(&self, transcript: &str, scene: Option<&str>) -> Result<String>;
}

/// Produces the spoken reply for the same (transcript, scene) pair.
#[async_trait]
pub trait Conversationalist: Send + Sync {
    async fn reply(&self, transcript: &str, scene: Option<&str>) -> Result<String>;
}

/// Text-to-speech returning mono PCM at [`sample_rate_hz`].
///
/// [`sample_rate_hz`]: SpeechSynth::sample_rate_hz
#[async_trait]
pub trait SpeechSynth: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<i16>>;
    fn sample_rate_hz(&self) -> u32;
}

/// One JPEG frame from the onboard camera, for upload to the hosted
/// vision services.
pub trait FrameGrabber: Send + Sync {
    fn grab_jpeg(&self) -> Result<Vec<u8>>;
}
