use crate::{AimModel, AimSolution, Detection, Result, SceneDetector};
use command_proto::{Command, CommandStep, ShootMode};
use tracing::{debug, info};

/// Hostility is membership-based: any label not on the ally roster is a
/// valid target, which covers `"enemy"` and unrecognized faces alike.
#[derive(Clone, Debug, Default)]
pub struct TargetPolicy {
    allies: Vec<String>,
}

impl TargetPolicy {
    pub fn new(allies: Vec<String>) -> Self {
        Self { allies }
    }

    pub fn is_hostile(&self, label: &str) -> bool {
        !self.allies.iter().any(|a| a.eq_ignore_ascii_case(label))
    }
}

/// A hostile detection together with its aim solution.
#[derive(Clone, Debug, PartialEq)]
pub struct Engagement {
    pub target: Detection,
    pub aim: AimSolution,
}

pub struct TargetLocator {
    detector: Box<dyn SceneDetector>,
    aim: Box<dyn AimModel>,
    policy: TargetPolicy,
}

impl TargetLocator {
    pub fn new(
        detector: Box<dyn SceneDetector>,
        aim: Box<dyn AimModel>,
        policy: TargetPolicy,
    ) -> Self {
        Self {
            detector,
            aim,
            policy,
        }
    }

    /// Capture, detect, and resolve the first hostile into aim angles.
    ///
    /// Only the first hostile is engaged per cycle; the rest are logged
    /// and ignored. `Ok(None)` means the frame held no hostile at all.
    pub async fn acquire(&self) -> Result<Option<Engagement>> {
        let detections = self.detector.detect().await?;
        let mut hostiles = detections
            .iter()
            .filter(|d| self.policy.is_hostile(&d.label));
        let Some(target) = hostiles.next() else {
            info!(total = detections.len(), "no hostile in frame");
            return Ok(None);
        };
        let remaining = hostiles.count();
        if remaining > 0 {
            debug!(remaining, "additional hostiles ignored this cycle");
        }
        let aim = self.aim.solve(target);
        info!(
            label = %target.label,
            yaw = aim.yaw_deg,
            pitch = aim.pitch_deg,
            "target acquired"
        );
        Ok(Some(Engagement {
            target: target.clone(),
            aim,
        }))
    }
}

/// The three-phase engage sequence: rotate onto the target, fire once,
/// rotate back to neutral. Each phase goes to both hubs and is awaited
/// before the next.
pub fn engage_steps(aim: &AimSolution) -> [CommandStep; 3] {
    let rotate = CommandStep::new(vec![
        Command::RotateX(aim.yaw_deg),
        Command::rotate_y(aim.pitch_deg),
    ]);
    let fire = CommandStep::single(Command::Shoot(ShootMode::Burst(1)));
    let back = CommandStep::new(vec![
        Command::RotateX(-aim.yaw_deg),
        Command::rotate_y(-aim.pitch_deg),
    ]);
    [rotate, fire, back]
}

/// Fire-without-aim, sent when no target could be acquired in time.
pub fn fallback_step() -> CommandStep {
    CommandStep::single(Command::Shoot(ShootMode::Burst(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinearFovAim, MockDetector};

    fn det(label: &str, x: f64, y: f64) -> Detection {
        Detection {
            label: label.to_string(),
            center: (x, y),
            bbox: None,
            distance: None,
            ts: None,
        }
    }

    fn locator(detections: Vec<Detection>) -> TargetLocator {
        TargetLocator::new(
            Box::new(MockDetector::returning(detections)),
            Box::new(LinearFovAim::default()),
            TargetPolicy::new(vec!["Han".to_string(), "Mina".to_string()]),
        )
    }

    #[test]
    fn allies_are_not_hostile() {
        let policy = TargetPolicy::new(vec!["Han".to_string()]);
        assert!(!policy.is_hostile("Han"));
        assert!(!policy.is_hostile("han"));
        assert!(policy.is_hostile("enemy"));
        assert!(policy.is_hostile("unknown"));
    }

    #[tokio::test]
    async fn first_hostile_wins() -> Result<()> {
        let engagement = locator(vec![
            det("Han", 100.0, 100.0),
            det("enemy", 420.0, 240.0),
            det("unknown", 50.0, 50.0),
        ])
        .acquire()
        .await?;
        assert!(engagement.is_some());
        if let Some(e) = engagement {
            assert_eq!(e.target.label, "enemy");
        }
        Ok(())
    }

    #[tokio::test]
    async fn all_allies_means_no_engagement() -> Result<()> {
        let engagement = locator(vec![det("Han", 1.0, 2.0), det("Mina", 3.0, 4.0)])
            .acquire()
            .await?;
        assert_eq!(engagement, None);
        Ok(())
    }

    #[test]
    fn engage_steps_rotate_fire_return() {
        let aim = AimSolution {
            yaw_deg: 12.0,
            pitch_deg: 5.0,
        };
        let [rotate, fire, back] = engage_steps(&aim);
        assert_eq!(
            rotate.commands,
            vec![Command::RotateX(12.0), Command::RotateY(5.0)]
        );
        assert_eq!(
            fire.commands,
            vec![Command::Shoot(ShootMode::Burst(1))]
        );
        assert_eq!(
            back.commands,
            vec![Command::RotateX(-12.0), Command::RotateY(-5.0)]
        );
    }

    #[test]
    fn engage_pitch_is_clamped() {
        let aim = AimSolution {
            yaw_deg: 0.0,
            pitch_deg: 40.0,
        };
        let [rotate, _, back] = engage_steps(&aim);
        assert_eq!(rotate.commands[1], Command::RotateY(25.0));
        assert_eq!(back.commands[1], Command::RotateY(-25.0));
    }
}
