//! Server reconciliation
//!
//! Compares authoritative snapshots with what the client predicted for the
//! same tick. When they disagree beyond tolerance the client snaps to the
//! authoritative state and replays every buffered input since that tick.

use crate::predictor::ClientState;
use log::{debug, trace};
use shared::{
    apply_input_forces, DelayedChannel, Pose, Result, StateMessage, Stepper, SyncError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileOutcome {
    /// Tick of the state message that was evaluated
    pub tick: u32,
    pub position_error_sq: f32,
    pub rotation_dot: f32,
    /// Whether the client rewound and resimulated
    pub corrected: bool,
    pub replayed_ticks: u32,
    /// Older due messages skipped in favour of this one
    pub discarded_messages: u32,
}

impl<S: Stepper> ClientState<S> {
    /// Consumes every due state message and reconciles against the newest.
    ///
    /// Returns `Ok(None)` when nothing has arrived, in which case prediction
    /// simply continues.
    pub fn reconcile(
        &mut self,
        now: f64,
        state_channel: &mut DelayedChannel<StateMessage>,
    ) -> Result<Option<ReconcileOutcome>> {
        let Some(mut latest) = state_channel.poll(now) else {
            return Ok(None);
        };

        let mut discarded = 0;
        while let Some(newer) = state_channel.poll(now) {
            trace!("Skipping state for tick {} in favour of {}", latest.tick, newer.tick);
            latest = newer;
            discarded += 1;
        }
        self.stats.states_discarded += u64::from(discarded);

        let mut outcome = self.apply_state(&latest)?;
        outcome.discarded_messages = discarded;
        Ok(Some(outcome))
    }

    /// Reconciles against a single authoritative snapshot.
    pub fn apply_state(&mut self, state: &StateMessage) -> Result<ReconcileOutcome> {
        if state.tick > self.tick {
            return Err(SyncError::FutureState {
                tick: state.tick,
                current: self.tick,
            });
        }

        // A snapshot for the tick about to be predicted is compared against
        // the live body, which is exactly that tick's pre-step pose.
        let predicted = if state.tick == self.tick {
            Pose::of(&self.stepper)
        } else {
            self.history.ensure_resident(state.tick)?;
            self.history
                .snapshot(state.tick)
                .unwrap_or_default()
        };

        self.last_received_state_tick = state.tick;
        self.ghost = Some(state.pose());
        self.stats.states_received += 1;

        let authoritative = state.pose();
        let position_error_sq = authoritative.position_error_sq(&predicted);
        let rotation_dot = authoritative.rotation_dot(&predicted);
        self.stats.last_position_error_sq = position_error_sq;

        let corrected = position_error_sq > self.config.max_position_error_sq
            || rotation_dot < self.config.min_rotation_dot;

        let replayed_ticks = if corrected {
            self.rewind_and_replay(state)?
        } else {
            0
        };

        if corrected {
            debug!(
                "Rollback at tick {}: position error² {:.5}, rotation dot {:.5}, replayed {} ticks",
                state.tick, position_error_sq, rotation_dot, replayed_ticks
            );
        }

        Ok(ReconcileOutcome {
            tick: state.tick,
            position_error_sq,
            rotation_dot,
            corrected,
            replayed_ticks,
            discarded_messages: 0,
        })
    }

    /// Hard-resets the body to `state` and resimulates up to the current tick,
    /// refreshing the recorded predictions along the way.
    fn rewind_and_replay(&mut self, state: &StateMessage) -> Result<u32> {
        state.apply_to(&mut self.stepper);

        let mut replayed = 0;
        for tick in state.tick..self.tick {
            let input = self
                .history
                .input(tick)
                .ok_or(SyncError::HistoryOverrun {
                    requested: tick,
                    current: self.tick,
                    capacity: self.history.capacity(),
                })?;
            self.history
                .overwrite_snapshot(tick, Pose::of(&self.stepper))?;
            apply_input_forces(&mut self.stepper, &input, &self.config.movement);
            self.stepper.step(self.config.dt);
            replayed += 1;
        }

        self.stats.corrections += 1;
        self.stats.replayed_ticks += u64::from(replayed);
        Ok(replayed)
    }
}
