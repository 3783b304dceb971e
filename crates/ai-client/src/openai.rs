//! OpenAI-compatible backends: speech-to-text plus the two chat-completions
//! roles (command interpretation and conversation).

use crate::{
    AiError, CommandInterpreter, Conversationalist, OpenAiConfig, Result, Transcriber,
    OFFLINE_LINE,
};
use async_trait::async_trait;
use tracing::warn;

const COMMAND_SYSTEM_PROMPT: &str = "You translate operator voice commands, together with an \
optional scene description, into robot control steps. Respond with ONLY a JSON array of steps; \
each step is an array of {\"cmd\", \"val\"} objects executed together, with cmd one of: move \
(signed cm), steer (signed deg), rotate_x (signed deg), rotate_y (signed deg, -25..25), shoot \
(0 means acquire the target automatically). Return [] when no motion is required.";

const CONVERSATION_SYSTEM_PROMPT: &str = "You are the voice of a tactical ground robot. Answer \
the operator in English, concise and mission-focused, acknowledging commands briefly.";

pub struct OpenAiTranscriber {
    cfg: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiTranscriber {
    pub fn new(cfg: OpenAiConfig) -> Result<Self> {
        Ok(Self {
            cfg,
            client: reqwest::Client::builder().build()?,
        })
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, samples: &[i16], sample_rate_hz: u32) -> Result<String> {
        let wav = wav_bytes(samples, sample_rate_hz)?;
        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| AiError::Encode(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.cfg.transcribe_model.clone())
            .text("response_format", "text")
            .text("language", "en");

        let resp = self
            .client
            .post(format!("{}/audio/transcriptions", self.cfg.base_url))
            .bearer_auth(&self.cfg.api_key)
            .multipart(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AiError::Status {
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.text().await?.trim().to_string())
    }
}

pub struct OpenAiInterpreter {
    cfg: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiInterpreter {
    pub fn new(cfg: OpenAiConfig) -> Result<Self> {
        Ok(Self {
            cfg,
            client: reqwest::Client::builder().build()?,
        })
    }
}

#[async_trait]
impl CommandInterpreter for OpenAiInterpreter {
    async fn interpret(&self, transcript: &str, scene: Option<&str>) -> Result<String> {
        chat(
            &self.client,
            &self.cfg,
            &self.cfg.command_model,
            0.0,
            COMMAND_SYSTEM_PROMPT,
            &user_content(transcript, scene),
        )
        .await
    }
}

pub struct OpenAiConversation {
    cfg: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiConversation {
    pub fn new(cfg: OpenAiConfig) -> Result<Self> {
        Ok(Self {
            cfg,
            client: reqwest::Client::builder().build()?,
        })
    }
}

#[async_trait]
impl Conversationalist for OpenAiConversation {
    async fn reply(&self, transcript: &str, scene: Option<&str>) -> Result<String> {
        match chat(
            &self.client,
            &self.cfg,
            &self.cfg.chat_model,
            0.7,
            CONVERSATION_SYSTEM_PROMPT,
            &user_content(transcript, scene),
        )
        .await
        {
            Ok(reply) => Ok(reply),
            Err(e) => {
                // The robot still speaks when the backend is down.
                warn!(error = %e, "conversation backend failed, using offline line");
                Ok(OFFLINE_LINE.to_string())
            }
        }
    }
}

fn user_content(transcript: &str, scene: Option<&str>) -> String {
    match scene {
        Some(scene) if !scene.is_empty() => {
            format!("[Scene description]: {scene}\n\n{transcript}")
        }
        _ => transcript.to_string(),
    }
}

async fn chat(
    client: &reqwest::Client,
    cfg: &OpenAiConfig,
    model: &str,
    temperature: f32,
    system: &str,
    user: &str,
) -> Result<String> {
    #[derive(serde::Serialize)]
    struct Msg<'a> {
        role: &'a str,
        content: &'a str,
    }
    #[derive(serde::Serialize)]
    struct ChatReq<'a> {
        model: &'a str,
        temperature: f32,
        messages: [Msg<'a>; 2],
    }
    #[derive(serde::Deserialize)]
    struct RespMsg {
        content: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct Choice {
        message: RespMsg,
    }
    #[derive(serde::Deserialize)]
    struct ChatResp {
        choices: Vec<Choice>,
    }

    let req = ChatReq {
        model,
        temperature,
        messages: [
            Msg {
                role: "system",
                content: system,
            },
            Msg {
                role: "user",
                content: user,
            },
        ],
    };
    let resp = client
        .post(format!("{}/chat/completions", cfg.base_url))
        .bearer_auth(&cfg.api_key)
        .json(&req)
        .send()
        .await?;
    if !resp.status().is_success() {
        return Err(AiError::Status {
            status: resp.status().as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }
    let body: ChatResp = resp.json().await?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| AiError::Malformed("chat response had no content".to_string()))
}

fn wav_bytes(samples: &[i16], sample_rate_hz: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate_hz,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut bytes = Vec::new();
    {
        let cursor = std::io::Cursor::new(&mut bytes);
        let mut writer =
            hound::WavWriter::new(cursor, spec).map_err(|e| AiError::Encode(e.to_string()))?;
        for &s in samples {
            writer
                .write_sample(s)
                .map_err(|e| AiError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AiError::Encode(e.to_string()))?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_encoding_produces_riff_header() -> Result<()> {
        let bytes = wav_bytes(&[0i16, 1, -1, i16::MAX], 8_000)?;
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        Ok(())
    }

    #[test]
    fn scene_is_prefixed_when_present() {
        assert_eq!(user_content("advance", None), "advance");
        assert_eq!(
            user_content("advance", Some("open hallway")),
            "[Scene description]: open hallway\n\nadvance"
        );
        assert_eq!(user_content("advance", Some("")), "advance");
    }
}
