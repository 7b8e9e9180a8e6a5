//! Tunables shared by client, server and the channels between them

use crate::{
    Result, SyncError, DEFAULT_HISTORY_CAPACITY, DEFAULT_LATENCY, DEFAULT_MAX_POSITION_ERROR,
    DEFAULT_SNAPSHOT_INTERVAL, DEFAULT_TICK_DT,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How an [`InputCommand`](crate::InputCommand) turns into impulses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Impulse magnitude applied per active flag per tick
    pub impulse: f32,
    /// Jumping is only allowed at or below this height
    pub jump_height_threshold: f32,
    /// Camera-relative movement basis
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            impulse: 0.5,
            jump_height_threshold: 0.6,
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Fixed tick duration in seconds
    pub dt: f32,
    /// Simulated one-way latency in seconds
    pub latency: f64,
    /// Extra random delay in seconds, uniformly distributed in `[0, jitter]`
    pub jitter: f64,
    /// Probability that a message is dropped at send time
    pub packet_loss: f64,
    /// Squared positional error that triggers a rewind
    pub max_position_error_sq: f32,
    /// Rotation dot product below which a rewind is triggered.
    /// `0.0` effectively disables the rotation check.
    pub min_rotation_dot: f32,
    pub history_capacity: usize,
    /// Server ticks between two state messages
    pub snapshot_interval: u32,
    pub movement: MovementConfig,
    /// Upper bound on client ticks consumed per frame, `None` for no bound
    pub max_ticks_per_frame: Option<u32>,
    /// Seed for the loss/jitter random sources
    pub seed: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_TICK_DT,
            latency: DEFAULT_LATENCY,
            jitter: 0.0,
            packet_loss: 0.0,
            max_position_error_sq: DEFAULT_MAX_POSITION_ERROR * DEFAULT_MAX_POSITION_ERROR,
            min_rotation_dot: 0.0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            movement: MovementConfig::default(),
            max_ticks_per_frame: None,
            seed: 0,
        }
    }
}

impl SyncConfig {
    /// A lossless, zero-latency configuration.
    pub fn ideal() -> Self {
        Self {
            latency: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SyncError::InvalidConfig(format!(
                "tick duration must be positive, got {}",
                self.dt
            )));
        }
        if !(0.0..=1.0).contains(&self.packet_loss) {
            return Err(SyncError::InvalidConfig(format!(
                "packet loss must be within [0, 1], got {}",
                self.packet_loss
            )));
        }
        if !(self.latency >= 0.0 && self.jitter >= 0.0) {
            return Err(SyncError::InvalidConfig(
                "latency and jitter must not be negative".to_string(),
            ));
        }
        if self.history_capacity == 0 || self.history_capacity > u32::MAX as usize {
            return Err(SyncError::InvalidConfig(format!(
                "history capacity out of range: {}",
                self.history_capacity
            )));
        }
        if self.snapshot_interval == 0 {
            return Err(SyncError::InvalidConfig(
                "snapshot interval must be at least one tick".to_string(),
            ));
        }
        if self.max_ticks_per_frame == Some(0) {
            return Err(SyncError::InvalidConfig(
                "max ticks per frame must be at least one".to_string(),
            ));
        }
        Ok(())
    }

    /// Round-trip time expressed in ticks, rounded up.
    pub fn round_trip_ticks(&self) -> u32 {
        let rtt = 2.0 * (self.latency + self.jitter);
        (rtt / self.dt as f64).ceil() as u32
    }
}
