//! HTTP detector: upload one JPEG to the face-recognition service and
//! parse the detection list it returns.

use crate::{Detection, LocatorError, Result, SceneDetector};
use ai_client::FrameGrabber;
use async_trait::async_trait;
use base64::Engine;

pub struct HttpDetector {
    endpoint: String,
    grabber: Box<dyn FrameGrabber>,
    client: reqwest::Client,
}

impl HttpDetector {
    pub fn new(endpoint: impl Into<String>, grabber: Box<dyn FrameGrabber>) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            grabber,
            client: reqwest::Client::builder()
                .build()
                .map_err(|e| LocatorError::Service(e.to_string()))?,
        })
    }
}

#[async_trait]
impl SceneDetector for HttpDetector {
    async fn detect(&self) -> Result<Vec<Detection>> {
        let jpeg = self
            .grabber
            .grab_jpeg()
            .map_err(|e| LocatorError::Capture(e.to_string()))?;
        let payload = serde_json::json!({
            "image": base64::engine::general_purpose::STANDARD.encode(jpeg),
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LocatorError::Service(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(LocatorError::Service(format!(
                "detection service returned {}",
                resp.status()
            )));
        }
        resp.json::<Vec<Detection>>()
            .await
            .map_err(|e| LocatorError::Malformed(e.to_string()))
    }
}
