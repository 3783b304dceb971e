use core::fmt;

/// Turret pitch is mechanically limited to this magnitude in degrees.
pub const ROTATE_Y_LIMIT_DEG: f64 = 25.0;

/// One primitive command executed by a hub.
///
/// Signs follow the robot frame: `move` forward/backward in centimeters,
/// `steer` chassis yaw in degrees (positive clockwise), `rotate_x` turret
/// yaw (positive right), `rotate_y` turret pitch (positive up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Move(f64),
    Steer(f64),
    RotateX(f64),
    RotateY(f64),
    Shoot(ShootMode),
}

/// The two observed meanings of `shoot.val` on the wire.
///
/// `val: 0` asks the robot to acquire a target itself; any positive value
/// is a raw fire command with a repeat count. The dispatcher only reacts
/// to `AutoEngage`; `Burst` steps are forwarded verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShootMode {
    AutoEngage,
    Burst(u32),
}

impl Command {
    /// Build a turret-pitch command, clamped to the mechanical range.
    pub fn rotate_y(deg: f64) -> Self {
        if deg.abs() > ROTATE_Y_LIMIT_DEG {
            tracing::warn!(requested = deg, "rotate_y outside +/-25 deg, clamping");
        }
        Command::RotateY(deg.clamp(-ROTATE_Y_LIMIT_DEG, ROTATE_Y_LIMIT_DEG))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Move(_) => "move",
            Command::Steer(_) => "steer",
            Command::RotateX(_) => "rotate_x",
            Command::RotateY(_) => "rotate_y",
            Command::Shoot(_) => "shoot",
        }
    }

    /// The numeric `val` this command carries on the wire.
    pub fn value(&self) -> f64 {
        match self {
            Command::Move(v) | Command::Steer(v) | Command::RotateX(v) | Command::RotateY(v) => *v,
            Command::Shoot(ShootMode::AutoEngage) => 0.0,
            Command::Shoot(ShootMode::Burst(n)) => f64::from(*n),
        }
    }

    pub fn is_auto_engage(&self) -> bool {
        matches!(self, Command::Shoot(ShootMode::AutoEngage))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name(), self.value())
    }
}

/// A set of commands a hub executes simultaneously.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CommandStep {
    pub commands: Vec<Command>,
}

impl CommandStep {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn single(command: Command) -> Self {
        Self {
            commands: vec![command],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// True when this step carries the `shoot val:0` targeting trigger.
    pub fn wants_auto_engage(&self) -> bool {
        self.commands.iter().any(Command::is_auto_engage)
    }
}

/// An ordered list of steps, executed strictly one after another.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CommandSequence {
    pub steps: Vec<CommandStep>,
}

impl CommandSequence {
    pub fn new(steps: Vec<CommandStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<CommandStep> for CommandSequence {
    fn from_iter<I: IntoIterator<Item = CommandStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}
