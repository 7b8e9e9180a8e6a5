//! Authoritative input replay and snapshot broadcasting
//!
//! The server owns the canonical body. It advances only when client inputs
//! arrive, applying each tick's input exactly once even though the client
//! resends overlapping ranges, and every `snapshot_interval` applied ticks it
//! offers a state message back to the client.

use log::{trace, warn};
use shared::{
    apply_input_forces, DelayedChannel, InputMessage, Pose, Result, StateMessage, Stepper,
    SyncConfig,
};

/// Running totals for the server side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub messages_received: u64,
    /// Messages whose every input had already been applied
    pub stale_discarded: u64,
    /// Empty messages, messages that skip past unreceived ticks, or ones
    /// ending on the last representable tick
    pub rejected: u64,
    pub inputs_applied: u64,
    pub snapshots_sent: u64,
    pub snapshots_lost: u64,
}

/// What one server frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerFrame {
    pub inputs_applied: u32,
    /// Snapshot framed this frame, whether or not the channel dropped it
    pub snapshot: Option<StateMessage>,
}

/// Result of offering one input message to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    Applied { inputs: u32 },
    Stale,
    Rejected,
}

/// All server-owned synchronisation state.
pub struct ServerState<S: Stepper> {
    config: SyncConfig,
    /// Next tick the server expects input for
    tick: u32,
    snapshot_accumulator: u32,
    stepper: S,
    display: Pose,
    stats: ServerStats,
}

impl<S: Stepper> ServerState<S> {
    pub fn new(config: &SyncConfig, stepper: S) -> Result<Self> {
        config.validate()?;
        let display = Pose::of(&stepper);
        Ok(Self {
            config: config.clone(),
            tick: 0,
            snapshot_accumulator: 0,
            stepper,
            display,
            stats: ServerStats::default(),
        })
    }

    /// Runs one server frame: applies every due input message, then frames a
    /// snapshot if enough ticks have been simulated since the last one.
    pub fn update(
        &mut self,
        now: f64,
        input_channel: &mut DelayedChannel<InputMessage>,
        state_channel: &mut DelayedChannel<StateMessage>,
    ) -> ServerFrame {
        let mut inputs_applied = 0;
        while let Some(message) = input_channel.poll(now) {
            if let InputDisposition::Applied { inputs } = self.apply_input_message(&message) {
                inputs_applied += inputs;
            }
        }

        let snapshot = if self.snapshot_accumulator >= self.config.snapshot_interval {
            self.snapshot_accumulator = 0;
            let snapshot = self.snapshot();
            if state_channel.send(now, snapshot) {
                self.stats.snapshots_sent += 1;
            } else {
                self.stats.snapshots_lost += 1;
            }
            Some(snapshot)
        } else {
            None
        };

        ServerFrame {
            inputs_applied,
            snapshot,
        }
    }

    /// Applies the inputs in `message` the server has not seen yet.
    pub fn apply_input_message(&mut self, message: &InputMessage) -> InputDisposition {
        self.stats.messages_received += 1;

        let Some(max_tick) = message.max_tick() else {
            warn!("Rejecting empty input message at tick {}", message.start_tick);
            self.stats.rejected += 1;
            return InputDisposition::Rejected;
        };

        if max_tick < self.tick {
            trace!(
                "Discarding stale inputs [{}, {}] at server tick {}",
                message.start_tick,
                max_tick,
                self.tick
            );
            self.stats.stale_discarded += 1;
            return InputDisposition::Stale;
        }

        if message.start_tick > self.tick {
            warn!(
                "Rejecting inputs [{}, {}]: ticks from {} were never received",
                message.start_tick, max_tick, self.tick
            );
            self.stats.rejected += 1;
            return InputDisposition::Rejected;
        }

        let Some(next_tick) = max_tick.checked_add(1) else {
            warn!(
                "Rejecting inputs [{}, {}]: tick counter exhausted",
                message.start_tick, max_tick
            );
            self.stats.rejected += 1;
            return InputDisposition::Rejected;
        };

        let start_index = (self.tick - message.start_tick) as usize;
        let mut applied = 0;
        for input in &message.inputs[start_index..] {
            apply_input_forces(&mut self.stepper, input, &self.config.movement);
            self.stepper.step(self.config.dt);
            self.snapshot_accumulator += 1;
            applied += 1;
        }

        self.tick = next_tick;
        self.display = Pose::of(&self.stepper);
        self.stats.inputs_applied += u64::from(applied);

        InputDisposition::Applied { inputs: applied }
    }

    /// Authoritative state at the start of the current server tick.
    pub fn snapshot(&self) -> StateMessage {
        StateMessage::capture(self.tick, &self.stepper)
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn snapshot_accumulator(&self) -> u32 {
        self.snapshot_accumulator
    }

    /// Authoritative pose for presentation, refreshed after each applied
    /// input message.
    pub fn display_pose(&self) -> Pose {
        self.display
    }

    pub fn stepper(&self) -> &S {
        &self.stepper
    }

    pub fn stats(&self) -> ServerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{InputCommand, KinematicBody, NetworkConditions};

    fn server() -> ServerState<KinematicBody> {
        ServerState::new(&SyncConfig::ideal(), KinematicBody::default()).unwrap()
    }

    fn forward(start_tick: u32, len: usize) -> InputMessage {
        InputMessage::new(start_tick, vec![InputCommand::forward(); len])
    }

    #[test]
    fn test_server_creation() {
        let server = server();
        assert_eq!(server.tick(), 0);
        assert_eq!(server.snapshot_accumulator(), 0);
        assert_eq!(server.display_pose(), Pose::default());
    }

    #[test]
    fn test_applies_new_inputs() {
        let mut server = server();
        let disposition = server.apply_input_message(&forward(0, 3));

        assert_eq!(disposition, InputDisposition::Applied { inputs: 3 });
        assert_eq!(server.tick(), 3);
        assert_eq!(server.snapshot_accumulator(), 3);
        assert!(server.display_pose().position.z > 0.0);
    }

    #[test]
    fn test_overlapping_inputs_are_applied_once() {
        let mut overlapping = server();
        overlapping.apply_input_message(&forward(0, 2));
        let disposition = overlapping.apply_input_message(&forward(0, 5));
        assert_eq!(disposition, InputDisposition::Applied { inputs: 3 });

        let mut direct = server();
        direct.apply_input_message(&forward(0, 5));

        assert_eq!(overlapping.tick(), 5);
        assert_eq!(overlapping.stepper(), direct.stepper());
        assert_eq!(overlapping.stats().inputs_applied, 5);
    }

    #[test]
    fn test_stale_message_changes_nothing() {
        let mut server = server();
        server.apply_input_message(&forward(0, 10));
        let before = server.stepper().clone();
        let accumulator = server.snapshot_accumulator();

        let disposition = server.apply_input_message(&forward(3, 5));

        assert_eq!(disposition, InputDisposition::Stale);
        assert_eq!(server.tick(), 10);
        assert_eq!(server.stepper(), &before);
        assert_eq!(server.snapshot_accumulator(), accumulator);
        assert_eq!(server.stats().stale_discarded, 1);
    }

    #[test]
    fn test_gaps_and_empty_messages_are_rejected() {
        let mut server = server();
        assert_eq!(
            server.apply_input_message(&forward(2, 3)),
            InputDisposition::Rejected
        );
        assert_eq!(
            server.apply_input_message(&InputMessage::new(0, Vec::new())),
            InputDisposition::Rejected
        );
        assert_eq!(server.tick(), 0);
        assert_eq!(server.stats().rejected, 2);
    }

    #[test]
    fn test_last_representable_tick_is_rejected() {
        let mut server = server();
        server.tick = u32::MAX;
        let before = server.stepper().clone();

        let disposition = server.apply_input_message(&forward(u32::MAX, 1));

        assert_eq!(disposition, InputDisposition::Rejected);
        assert_eq!(server.tick(), u32::MAX);
        assert_eq!(server.stepper(), &before);
        assert_eq!(server.stats().rejected, 1);
    }

    #[test]
    fn test_snapshot_every_interval() {
        let mut server = server();
        let mut inputs = DelayedChannel::perfect();
        let mut states = DelayedChannel::perfect();

        inputs.send(0.0, forward(0, 3));
        let frame = server.update(0.0, &mut inputs, &mut states);
        assert_eq!(frame.inputs_applied, 3);
        assert!(frame.snapshot.is_none());

        inputs.send(0.0, forward(0, 4));
        let frame = server.update(0.0, &mut inputs, &mut states);
        let snapshot = frame.snapshot.expect("snapshot after four ticks");
        assert_eq!(snapshot.tick, 4);
        assert_eq!(server.snapshot_accumulator(), 0);
        assert_eq!(states.poll(0.0), Some(snapshot));
        assert_approx_eq!(snapshot.position.z, server.stepper().position.z);
    }

    #[test]
    fn test_lost_snapshot_still_resets_accumulator() {
        let mut server = server();
        let mut inputs = DelayedChannel::perfect();
        let conditions = NetworkConditions {
            packet_loss: 1.0,
            ..NetworkConditions::perfect()
        };
        let mut states = DelayedChannel::seeded(conditions, 11);

        inputs.send(0.0, forward(0, 4));
        let frame = server.update(0.0, &mut inputs, &mut states);

        assert!(frame.snapshot.is_some());
        assert!(states.is_empty());
        assert_eq!(server.snapshot_accumulator(), 0);
        assert_eq!(server.stats().snapshots_lost, 1);
    }

    #[test]
    fn test_undelivered_inputs_wait() {
        let mut server = server();
        let conditions = NetworkConditions {
            latency: 0.5,
            ..NetworkConditions::perfect()
        };
        let mut inputs = DelayedChannel::seeded(conditions, 2);
        let mut states = DelayedChannel::perfect();

        inputs.send(0.0, forward(0, 1));
        assert_eq!(server.update(0.25, &mut inputs, &mut states).inputs_applied, 0);
        assert_eq!(server.update(0.5, &mut inputs, &mut states).inputs_applied, 1);
    }
}
