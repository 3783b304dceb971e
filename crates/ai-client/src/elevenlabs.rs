//! ElevenLabs text-to-speech, requested as raw PCM so playback needs no
//! codec.

use crate::{AiError, ElevenLabsConfig, Result, SpeechSynth};
use async_trait::async_trait;

pub struct ElevenLabsSynth {
    cfg: ElevenLabsConfig,
    client: reqwest::Client,
}

impl ElevenLabsSynth {
    pub fn new(cfg: ElevenLabsConfig) -> Result<Self> {
        Ok(Self {
            cfg,
            client: reqwest::Client::builder().build()?,
        })
    }
}

#[async_trait]
impl SpeechSynth for ElevenLabsSynth {
    async fn synthesize(&self, text: &str) -> Result<Vec<i16>> {
        #[derive(serde::Serialize)]
        struct VoiceSettings {
            stability: f32,
            similarity_boost: f32,
        }
        #[derive(serde::Serialize)]
        struct TtsReq<'a> {
            text: &'a str,
            model_id: &'a str,
            voice_settings: VoiceSettings,
        }

        let url = format!(
            "{}/v1/text-to-speech/{}?output_format=pcm_{}",
            self.cfg.base_url, self.cfg.voice_id, self.cfg.sample_rate_hz
        );
        let resp = self
            .client
            .post(url)
            .header("xi-api-key", &self.cfg.api_key)
            .json(&TtsReq {
                text,
                model_id: &self.cfg.model_id,
                voice_settings: VoiceSettings {
                    stability: 1.0,
                    similarity_boost: 1.0,
                },
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AiError::Status {
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let bytes = resp.bytes().await?;
        Ok(pcm_from_le_bytes(&bytes))
    }

    fn sample_rate_hz(&self) -> u32 {
        self.cfg.sample_rate_hz
    }
}

fn pcm_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
