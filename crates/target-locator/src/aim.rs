use crate::Detection;

/// Turret angles that bring the barrel from neutral onto a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimSolution {
    pub yaw_deg: f64,
    pub pitch_deg: f64,
}

/// Pixel offset to angle conversion, pluggable so a calibrated camera
/// model can replace the linear approximation without touching the
/// dispatcher.
pub trait AimModel: Send + Sync {
    fn solve(&self, det: &Detection) -> AimSolution;
}

/// Linear pixel-to-angle approximation over a fixed field of view.
/// Adequate for the small angular ranges the turret works in; it is not
/// a calibrated projection.
#[derive(Clone, Copy, Debug)]
pub struct LinearFovAim {
    pub frame_width: f64,
    pub frame_height: f64,
    pub horizontal_fov_deg: f64,
    pub vertical_fov_deg: f64,
}

impl Default for LinearFovAim {
    fn default() -> Self {
        Self {
            frame_width: 640.0,
            frame_height: 480.0,
            horizontal_fov_deg: 60.0,
            vertical_fov_deg: 45.0,
        }
    }
}

impl AimModel for LinearFovAim {
    fn solve(&self, det: &Detection) -> AimSolution {
        let (cx, cy) = det.center;
        let rel_x = self.frame_width / 2.0 - cx;
        let rel_y = self.frame_height / 2.0 - cy;
        AimSolution {
            yaw_deg: rel_x * self.horizontal_fov_deg / self.frame_width,
            pitch_deg: rel_y * self.vertical_fov_deg / self.frame_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det_at(x: f64, y: f64) -> Detection {
        Detection {
            label: "enemy".to_string(),
            center: (x, y),
            bbox: None,
            distance: None,
            ts: None,
        }
    }

    #[test]
    fn centered_target_needs_no_aim() {
        let aim = LinearFovAim::default().solve(&det_at(320.0, 240.0));
        assert_eq!(aim.yaw_deg, 0.0);
        assert_eq!(aim.pitch_deg, 0.0);
    }

    #[test]
    fn frame_edges_map_to_half_fov() {
        let model = LinearFovAim::default();
        let left = model.solve(&det_at(0.0, 240.0));
        assert!((left.yaw_deg - 30.0).abs() < 1e-9);
        let bottom = model.solve(&det_at(320.0, 480.0));
        assert!((bottom.pitch_deg + 22.5).abs() < 1e-9);
    }
}
