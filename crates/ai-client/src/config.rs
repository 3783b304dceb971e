use crate::{AiError, Result};

/// Settings for the OpenAI-compatible endpoints (transcription, command
/// interpretation, conversation). The key comes from `OPENAI_API_KEY`.
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub transcribe_model: String,
    pub command_model: String,
    pub chat_model: String,
}

impl OpenAiConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AiError::Unavailable("OPENAI_API_KEY is not set"))?;
        Ok(Self {
            api_key,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            transcribe_model: "gpt-4o-mini-transcribe".to_string(),
            command_model: "gpt-4.1-mini".to_string(),
            chat_model: "gpt-4.1-mini".to_string(),
        })
    }
}

/// Settings for the ElevenLabs text-to-speech endpoint. The key comes
/// from `ELEVENLABS_API_KEY`.
#[derive(Clone, Debug)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub voice_id: String,
    pub model_id: String,
    pub sample_rate_hz: u32,
}

impl ElevenLabsConfig {
    pub fn from_env(voice_id: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .map_err(|_| AiError::Unavailable("ELEVENLABS_API_KEY is not set"))?;
        Ok(Self {
            api_key,
            base_url: "https://api.elevenlabs.io".to_string(),
            voice_id: voice_id.into(),
            model_id: "eleven_flash_v2_5".to_string(),
            sample_rate_hz: 22_050,
        })
    }
}

/// Endpoint of the hosted scene-description (VLM) service.
#[derive(Clone, Debug)]
pub struct VisionConfig {
    pub endpoint: String,
}
