use crate::{Detection, Result};
use async_trait::async_trait;

/// Captures one frame and runs recognition over it. The orchestrator
/// bounds the wait; a slow detector is abandoned, not cancelled.
#[async_trait]
pub trait SceneDetector: Send + Sync {
    async fn detect(&self) -> Result<Vec<Detection>>;
}
