use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod forces;
pub mod history;
pub mod stepper;

pub use channel::{ChannelStats, DelayedChannel, NetworkConditions};
pub use clock::TickClock;
pub use config::{MovementConfig, SyncConfig};
pub use error::{Result, SyncError};
pub use forces::apply_input_forces;
pub use history::{ClientHistory, PredictedSnapshot};
pub use stepper::{KinematicBody, Pose, Stepper};

pub const DEFAULT_TICK_DT: f32 = 0.02;
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;
pub const DEFAULT_SNAPSHOT_INTERVAL: u32 = 4;
pub const DEFAULT_LATENCY: f64 = 0.1;
pub const DEFAULT_MAX_POSITION_ERROR: f32 = 0.1;

const FORWARD_BIT: u8 = 1 << 0;
const BACKWARD_BIT: u8 = 1 << 1;
const LEFT_BIT: u8 = 1 << 2;
const RIGHT_BIT: u8 = 1 << 3;
const JUMP_BIT: u8 = 1 << 4;

/// Player commands sampled for exactly one tick.
///
/// On the wire every command is packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct InputCommand {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputCommand {
    pub const IDLE: InputCommand = InputCommand {
        forward: false,
        backward: false,
        left: false,
        right: false,
        jump: false,
    };

    pub fn forward() -> Self {
        Self {
            forward: true,
            ..Self::IDLE
        }
    }

    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.forward {
            bits |= FORWARD_BIT;
        }
        if self.backward {
            bits |= BACKWARD_BIT;
        }
        if self.left {
            bits |= LEFT_BIT;
        }
        if self.right {
            bits |= RIGHT_BIT;
        }
        if self.jump {
            bits |= JUMP_BIT;
        }
        bits
    }

    /// Unknown high bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            forward: bits & FORWARD_BIT != 0,
            backward: bits & BACKWARD_BIT != 0,
            left: bits & LEFT_BIT != 0,
            right: bits & RIGHT_BIT != 0,
            jump: bits & JUMP_BIT != 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.to_bits() == 0
    }
}

impl From<u8> for InputCommand {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

impl From<InputCommand> for u8 {
    fn from(input: InputCommand) -> Self {
        input.to_bits()
    }
}

/// A contiguous, inclusive run of client inputs starting at `start_tick`.
///
/// The client resends everything from the last acknowledged tick on every
/// tick, so consecutive messages overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    pub start_tick: u32,
    pub inputs: Vec<InputCommand>,
}

impl InputMessage {
    pub fn new(start_tick: u32, inputs: Vec<InputCommand>) -> Self {
        Self { start_tick, inputs }
    }

    /// Last tick covered by this message, `None` when it carries no inputs.
    pub fn max_tick(&self) -> Option<u32> {
        let len = u32::try_from(self.inputs.len()).ok()?;
        if len == 0 {
            return None;
        }
        self.start_tick.checked_add(len - 1)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Authoritative state of the simulated actor at the start of `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    pub tick: u32,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl StateMessage {
    /// Captures the current state of `stepper` for `tick`.
    pub fn capture<S: Stepper + ?Sized>(tick: u32, stepper: &S) -> Self {
        Self {
            tick,
            position: stepper.position(),
            rotation: stepper.rotation(),
            velocity: stepper.velocity(),
            angular_velocity: stepper.angular_velocity(),
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            rotation: self.rotation,
        }
    }

    /// Hard-resets `stepper` to this state.
    pub fn apply_to<S: Stepper + ?Sized>(&self, stepper: &mut S) {
        stepper.set_position(self.position);
        stepper.set_rotation(self.rotation);
        stepper.set_velocity(self.velocity);
        stepper.set_angular_velocity(self.angular_velocity);
    }
}

/// Wire envelope used when client and server run in separate processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    Input(InputMessage),
    State(StateMessage),
}

impl Packet {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Packet> {
        Ok(bincode::deserialize(bytes)?)
    }
}
