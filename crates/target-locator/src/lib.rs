//! target-locator: from "engage" to concrete aim angles
//!
//! When a command step carries the autonomous-engage trigger, this crate
//! asks the face-recognition collaborator for detections, picks the first
//! hostile, and converts its pixel offset from frame center into turret
//! angles through a pluggable aim model. The caller owns the timeout and
//! the fire-without-aim fallback.

mod types;
pub use types::{BoundingBox, Detection};

mod error;
pub use error::{LocatorError, Result};

mod traits;
pub use traits::SceneDetector;

mod aim;
pub use aim::{AimModel, AimSolution, LinearFovAim};

mod locator;
pub use locator::{engage_steps, fallback_step, Engagement, TargetLocator, TargetPolicy};

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::MockDetector;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpDetector;
