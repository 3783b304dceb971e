use crate::{
    AiError, CommandInterpreter, Conversationalist, FrameGrabber, Result, SceneDescriber,
    SpeechSynth, Transcriber,
};
use async_trait::async_trait;
use std::time::Duration;

/// Returns a fixed transcript, optionally after a delay or as a failure.
/// The builders cover exactly the behaviors the orchestrator has to
/// survive: text, silence, latency, errors.
pub struct MockTranscriber {
    text: String,
    delay: Option<Duration>,
    fail: bool,
}

impl MockTranscriber {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delay: None,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            text: String::new(),
            delay: None,
            fail: true,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _samples: &[i16], _sample_rate_hz: u32) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AiError::Unavailable("mock transcriber failure"));
        }
        Ok(self.text.clone())
    }
}

pub struct MockSceneDescriber {
    description: String,
    delay: Option<Duration>,
    fail: bool,
}

impl MockSceneDescriber {
    pub fn reply(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            delay: None,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            description: String::new(),
            delay: None,
            fail: true,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SceneDescriber for MockSceneDescriber {
    async fn describe(&self) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AiError::Unavailable("mock vision failure"));
        }
        Ok(self.description.clone())
    }
}

/// Hands back a canned command-sequence JSON string.
pub struct MockInterpreter {
    json: String,
    fail: bool,
}

impl MockInterpreter {
    pub fn sequence(json: impl Into<String>) -> Self {
        Self {
            json: json.into(),
            fail: false,
        }
    }

    pub fn empty() -> Self {
        Self::sequence("[]")
    }

    pub fn failing() -> Self {
        Self {
            json: String::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl CommandInterpreter for MockInterpreter {
    async fn interpret(&self, _transcript: &str, _scene: Option<&str>) -> Result<String> {
        if self.fail {
            return Err(AiError::Unavailable("mock interpreter failure"));
        }
        Ok(self.json.clone())
    }
}

pub struct MockConversation {
    line: String,
    delay: Option<Duration>,
}

impl MockConversation {
    pub fn line(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Conversationalist for MockConversation {
    async fn reply(&self, _transcript: &str, _scene: Option<&str>) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.line.clone())
    }
}

/// Emits a short sine placeholder scaled to the text length.
pub struct MockSynth {
    sample_rate_hz: u32,
}

impl MockSynth {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz: sample_rate_hz.max(8_000),
        }
    }
}

impl Default for MockSynth {
    fn default() -> Self {
        Self::new(22_050)
    }
}

#[async_trait]
impl SpeechSynth for MockSynth {
    async fn synthesize(&self, text: &str) -> Result<Vec<i16>> {
        let sr = self.sample_rate_hz;
        let dur_s = (text.len() as f32 / 10.0).clamp(0.2, 1.0);
        let frames = (sr as f32 * dur_s) as usize;
        let mut out = Vec::with_capacity(frames);
        for n in 0..frames {
            let t = n as f32 / sr as f32;
            let s = (2.0 * std::f32::consts::PI * 440.0 * t).sin();
            out.push((s * 3_000.0) as i16);
        }
        Ok(out)
    }

    fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }
}

/// A static two-byte-marker JPEG stand-in; the mock services never look
/// inside the payload.
#[derive(Default)]
pub struct MockFrameGrabber;

impl FrameGrabber for MockFrameGrabber {
    fn grab_jpeg(&self) -> Result<Vec<u8>> {
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_transcriber_round_trip() -> Result<()> {
        let t = MockTranscriber::reply("Kaist.");
        assert_eq!(t.transcribe(&[0i16; 160], 8_000).await?, "Kaist.");
        assert!(MockTranscriber::failing()
            .transcribe(&[], 8_000)
            .await
            .is_err());
        Ok(())
    }

    #[tokio::test]
    async fn mock_synth_scales_with_text() -> Result<()> {
        let synth = MockSynth::default();
        let short = synth.synthesize("Roger.").await?;
        let long = synth.synthesize(&"acknowledged ".repeat(10)).await?;
        assert!(!short.is_empty());
        assert!(long.len() > short.len());
        Ok(())
    }

    #[tokio::test]
    async fn mock_interpreter_defaults_to_no_motion() -> Result<()> {
        let i = MockInterpreter::empty();
        assert_eq!(i.interpret("what do you see?", None).await?, "[]");
        Ok(())
    }
}
