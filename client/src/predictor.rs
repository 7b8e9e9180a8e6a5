//! Client-side prediction
//!
//! Every tick the client samples input, records it together with the
//! pre-step pose, advances its own stepper immediately and resends every
//! input the server has not yet acknowledged.

use crate::input::InputSampler;
use crate::reconciler::ReconcileOutcome;
use log::trace;
use shared::{
    apply_input_forces, ClientHistory, DelayedChannel, InputMessage, Pose, Result, StateMessage,
    Stepper, SyncConfig, SyncError, TickClock,
};

/// Running totals for the client side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientStats {
    pub ticks_predicted: u64,
    pub input_messages_lost: u64,
    pub states_received: u64,
    /// Due state messages skipped because a newer one was due in the same frame
    pub states_discarded: u64,
    pub corrections: u64,
    pub replayed_ticks: u64,
    pub last_position_error_sq: f32,
}

/// What one client frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientFrame {
    pub ticks: u32,
    pub reconciliation: Option<ReconcileOutcome>,
}

/// All client-owned synchronisation state.
pub struct ClientState<S: Stepper> {
    pub(crate) config: SyncConfig,
    pub(crate) clock: TickClock,
    /// Next tick to be predicted
    pub(crate) tick: u32,
    pub(crate) last_received_state_tick: u32,
    pub(crate) history: ClientHistory,
    pub(crate) stepper: S,
    pub(crate) ghost: Option<Pose>,
    pub(crate) stats: ClientStats,
}

impl<S: Stepper> ClientState<S> {
    pub fn new(config: &SyncConfig, stepper: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            clock: TickClock::new(config.dt).with_max_ticks(config.max_ticks_per_frame),
            tick: 0,
            last_received_state_tick: 0,
            history: ClientHistory::new(config.history_capacity),
            stepper,
            ghost: None,
            stats: ClientStats::default(),
        })
    }

    /// Runs one client frame: predicts every due tick, then reconciles
    /// against the newest state message that has arrived.
    pub fn update(
        &mut self,
        frame_dt: f32,
        now: f64,
        sampler: &mut dyn InputSampler,
        input_channel: &mut DelayedChannel<InputMessage>,
        state_channel: &mut DelayedChannel<StateMessage>,
    ) -> Result<ClientFrame> {
        let ticks = self.clock.advance(frame_dt);
        for _ in 0..ticks {
            self.predict_tick(now, sampler, input_channel)?;
        }

        let reconciliation = self.reconcile(now, state_channel)?;
        Ok(ClientFrame {
            ticks,
            reconciliation,
        })
    }

    /// Predicts a single tick and offers the unacknowledged inputs to the
    /// server.
    pub fn predict_tick(
        &mut self,
        now: f64,
        sampler: &mut dyn InputSampler,
        input_channel: &mut DelayedChannel<InputMessage>,
    ) -> Result<()> {
        let tick = self.tick;
        let next_tick = tick
            .checked_add(1)
            .ok_or(SyncError::TickOverflow { tick })?;
        let unacknowledged = tick - self.last_received_state_tick;
        if unacknowledged as usize >= self.history.capacity() {
            return Err(SyncError::HistoryOverrun {
                requested: self.last_received_state_tick,
                current: tick,
                capacity: self.history.capacity(),
            });
        }

        let input = sampler.sample();
        self.history.record(tick, input, Pose::of(&self.stepper));
        apply_input_forces(&mut self.stepper, &input, &self.config.movement);
        self.stepper.step(self.config.dt);

        let inputs = self
            .history
            .inputs_between(self.last_received_state_tick, tick)?;
        let message = InputMessage::new(self.last_received_state_tick, inputs);
        trace!(
            "Tick {}: sending inputs [{}, {}]",
            tick,
            message.start_tick,
            tick
        );
        if !input_channel.send(now, message) {
            self.stats.input_messages_lost += 1;
        }

        self.tick = next_tick;
        self.stats.ticks_predicted += 1;
        Ok(())
    }

    /// Next tick to be predicted.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn last_received_state_tick(&self) -> u32 {
        self.last_received_state_tick
    }

    /// Locally predicted pose for presentation.
    pub fn predicted_pose(&self) -> Pose {
        Pose::of(&self.stepper)
    }

    /// Last authoritative pose received, for debug display.
    pub fn ghost_pose(&self) -> Option<Pose> {
        self.ghost
    }

    pub fn history(&self) -> &ClientHistory {
        &self.history
    }

    pub fn stepper(&self) -> &S {
        &self.stepper
    }

    /// Direct access to the predicted body, bypassing input recording.
    /// Anything done here is invisible to the server.
    pub fn stepper_mut(&mut self) -> &mut S {
        &mut self.stepper
    }

    pub fn stats(&self) -> ClientStats {
        self.stats
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}
