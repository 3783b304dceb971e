use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// `[x, y, w, h]` in frame pixels, as the detection service reports it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox(pub u32, pub u32, pub u32, pub u32);

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.2
    }

    pub fn height(&self) -> u32 {
        self.3
    }
}

/// One recognized face/object in a frame.
///
/// `label` is `"enemy"`, a recognized ally name, or `"unknown"`;
/// `distance` is the embedding distance to the closest enrolled ally
/// (lower means more ally-like). Detections are consumed within the cycle
/// and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub center: (f64, f64),
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(skip)]
    pub ts: Option<OffsetDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_deserializes() -> serde_json::Result<()> {
        let raw = r#"{
            "label": "enemy",
            "center": [412.0, 233.0],
            "bbox": [380, 200, 64, 66],
            "distance": 0.81
        }"#;
        let det: Detection = serde_json::from_str(raw)?;
        assert_eq!(det.label, "enemy");
        assert_eq!(det.center, (412.0, 233.0));
        assert_eq!(det.bbox, Some(BoundingBox(380, 200, 64, 66)));
        Ok(())
    }

    #[test]
    fn bbox_and_distance_are_optional() -> serde_json::Result<()> {
        let det: Detection =
            serde_json::from_str(r#"{"label": "unknown", "center": [10, 20]}"#)?;
        assert_eq!(det.bbox, None);
        assert_eq!(det.distance, None);
        Ok(())
    }
}
