use crate::{Detection, LocatorError, Result, SceneDetector};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Scripted detector for tests and offline runs. Counts its invocations
/// so tests can assert the locator ran exactly once per engage step.
pub struct MockDetector {
    detections: Vec<Detection>,
    delay: Option<Duration>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockDetector {
    pub fn returning(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            delay: None,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sees an empty frame.
    pub fn none() -> Self {
        Self::returning(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::none()
        }
    }

    /// Delay every `detect` call, for timeout tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared invocation counter, usable after the detector moves into a
    /// locator.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl SceneDetector for MockDetector {
    async fn detect(&self) -> Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(LocatorError::Service("mock detector failure".to_string()));
        }
        Ok(self.detections.clone())
    }
}
