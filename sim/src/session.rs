//! One client and one server joined by two simulated links

use client::{ClientFrame, ClientState, InputSampler};
use log::debug;
use server::{ServerFrame, ServerState};
use shared::{
    DelayedChannel, InputMessage, NetworkConditions, Pose, Result, StateMessage, Stepper,
    SyncConfig,
};
use std::fmt;

/// Everything that happened during one session frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Simulation time at the end of the frame, in seconds
    pub now: f64,
    pub client: ClientFrame,
    pub server: ServerFrame,
}

/// Drives a predicting client and an authoritative server in lockstep
/// frames over lossy, delayed channels.
pub struct Session<S: Stepper, I: InputSampler> {
    config: SyncConfig,
    now: f64,
    frames: u64,
    client: ClientState<S>,
    server: ServerState<S>,
    sampler: I,
    to_server: DelayedChannel<InputMessage>,
    to_client: DelayedChannel<StateMessage>,
}

impl<S: Stepper + Clone, I: InputSampler> Session<S, I> {
    /// Both sides start from a copy of `stepper`.
    pub fn new(config: &SyncConfig, stepper: S, sampler: I) -> Result<Self> {
        let client = ClientState::new(config, stepper.clone())?;
        let server = ServerState::new(config, stepper)?;
        let conditions = NetworkConditions::from_config(config);

        Ok(Self {
            config: config.clone(),
            now: 0.0,
            frames: 0,
            client,
            server,
            sampler,
            to_server: DelayedChannel::seeded(conditions, config.seed),
            to_client: DelayedChannel::seeded(conditions, config.seed.wrapping_add(1)),
        })
    }
}

impl<S: Stepper, I: InputSampler> Session<S, I> {
    /// Advances simulated time by `frame_dt` and runs the client, then the
    /// server.
    pub fn advance(&mut self, frame_dt: f32) -> Result<FrameReport> {
        self.now += f64::from(frame_dt.max(0.0));
        self.frames += 1;

        let client = self.client.update(
            frame_dt,
            self.now,
            &mut self.sampler,
            &mut self.to_server,
            &mut self.to_client,
        )?;
        let server = self
            .server
            .update(self.now, &mut self.to_server, &mut self.to_client);

        if let Some(outcome) = client.reconciliation.filter(|outcome| outcome.corrected) {
            debug!(
                "Frame {}: client corrected at tick {} ({} ticks replayed)",
                self.frames, outcome.tick, outcome.replayed_ticks
            );
        }

        Ok(FrameReport {
            now: self.now,
            client,
            server,
        })
    }

    /// Runs `frames` frames of exactly one tick each.
    pub fn advance_ticks(&mut self, frames: u32) -> Result<()> {
        let dt = self.config.dt;
        for _ in 0..frames {
            self.advance(dt)?;
        }
        Ok(())
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn client(&self) -> &ClientState<S> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut ClientState<S> {
        &mut self.client
    }

    pub fn server(&self) -> &ServerState<S> {
        &self.server
    }

    pub fn input_channel(&self) -> &DelayedChannel<InputMessage> {
        &self.to_server
    }

    pub fn state_channel(&self) -> &DelayedChannel<StateMessage> {
        &self.to_client
    }

    pub fn summary(&self) -> SessionSummary {
        let client = self.client.stats();
        let server = self.server.stats();
        let predicted = self.client.predicted_pose();
        let authoritative = self.server.display_pose();

        SessionSummary {
            elapsed: self.now,
            frames: self.frames,
            client_tick: self.client.tick(),
            server_tick: self.server.tick(),
            corrections: client.corrections,
            replayed_ticks: client.replayed_ticks,
            states_received: client.states_received,
            input_messages_lost: client.input_messages_lost,
            snapshots_lost: server.snapshots_lost,
            stale_inputs_discarded: server.stale_discarded,
            predicted,
            authoritative,
        }
    }
}

/// End-of-run statistics for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub elapsed: f64,
    pub frames: u64,
    pub client_tick: u32,
    pub server_tick: u32,
    pub corrections: u64,
    pub replayed_ticks: u64,
    pub states_received: u64,
    pub input_messages_lost: u64,
    pub snapshots_lost: u64,
    pub stale_inputs_discarded: u64,
    pub predicted: Pose,
    pub authoritative: Pose,
}

impl SessionSummary {
    /// Client tick lead over the server.
    pub fn tick_lead(&self) -> i64 {
        i64::from(self.client_tick) - i64::from(self.server_tick)
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:.2}s over {} frames: client tick {}, server tick {} (lead {})",
            self.elapsed,
            self.frames,
            self.client_tick,
            self.server_tick,
            self.tick_lead()
        )?;
        writeln!(
            f,
            "states received {}, corrections {}, replayed ticks {}",
            self.states_received, self.corrections, self.replayed_ticks
        )?;
        writeln!(
            f,
            "input messages lost {}, snapshots lost {}, stale inputs discarded {}",
            self.input_messages_lost, self.snapshots_lost, self.stale_inputs_discarded
        )?;
        write!(
            f,
            "predicted {:?}, authoritative {:?}",
            self.predicted.position, self.authoritative.position
        )
    }
}
