//! Hosted scene-description (VLM) client: capture one JPEG, upload it as
//! base64 JSON, read back the textual description.

use crate::{AiError, FrameGrabber, Result, SceneDescriber, VisionConfig};
use async_trait::async_trait;
use base64::Engine;

pub struct HttpSceneDescriber {
    cfg: VisionConfig,
    grabber: Box<dyn FrameGrabber>,
    client: reqwest::Client,
}

impl HttpSceneDescriber {
    pub fn new(cfg: VisionConfig, grabber: Box<dyn FrameGrabber>) -> Result<Self> {
        Ok(Self {
            cfg,
            grabber,
            client: reqwest::Client::builder().build()?,
        })
    }
}

#[async_trait]
impl SceneDescriber for HttpSceneDescriber {
    async fn describe(&self) -> Result<String> {
        let jpeg = self.grabber.grab_jpeg()?;
        let payload = serde_json::json!({
            "image": base64::engine::general_purpose::STANDARD.encode(jpeg),
        });
        let resp = self
            .client
            .post(&self.cfg.endpoint)
            .json(&payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AiError::Status {
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let body = resp.text().await?;
        Ok(extract_description(&body))
    }
}

/// The service replies either with a JSON object carrying the description
/// or with the raw text itself.
fn extract_description(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["result", "description", "text"] {
            if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
                return s.trim().to_string();
            }
        }
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_extracted_from_json_or_raw() {
        assert_eq!(
            extract_description(r#"{"result": "two soldiers, facing away"}"#),
            "two soldiers, facing away"
        );
        assert_eq!(
            extract_description("a clear hallway\n"),
            "a clear hallway"
        );
    }
}
