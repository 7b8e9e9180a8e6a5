//! Fixed-capacity ring buffer of per-tick client inputs and predictions

use crate::{InputCommand, Pose, Result, SyncError};

/// Pre-step pose recorded for a tick, used only for divergence checks.
pub type PredictedSnapshot = Pose;

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    snapshot: PredictedSnapshot,
    input: InputCommand,
}

/// Client history indexed by `tick % capacity`.
///
/// Only the last `capacity` ticks are resident; anything older has been
/// overwritten and is reported as missing rather than read back stale.
#[derive(Debug, Clone)]
pub struct ClientHistory {
    slots: Vec<Slot>,
    next_tick: u32,
}

impl ClientHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must not be zero");
        Self {
            slots: vec![Slot::default(); capacity],
            next_tick: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// One past the newest recorded tick.
    pub fn next_tick(&self) -> u32 {
        self.next_tick
    }

    /// Whether `tick` was recorded and has not been overwritten since.
    pub fn is_resident(&self, tick: u32) -> bool {
        tick < self.next_tick && ((self.next_tick - tick) as usize) <= self.capacity()
    }

    fn index(&self, tick: u32) -> usize {
        tick as usize % self.capacity()
    }

    /// Records the input sampled for `tick` and the pose before it is applied.
    ///
    /// Ticks are recorded in order; re-recording an already resident tick
    /// (during resimulation) leaves the write cursor untouched.
    pub fn record(&mut self, tick: u32, input: InputCommand, snapshot: PredictedSnapshot) {
        let index = self.index(tick);
        self.slots[index] = Slot { snapshot, input };
        if tick >= self.next_tick {
            self.next_tick = tick + 1;
        }
    }

    /// Overwrites the prediction for a resident tick, keeping its input.
    pub fn overwrite_snapshot(&mut self, tick: u32, snapshot: PredictedSnapshot) -> Result<()> {
        self.ensure_resident(tick)?;
        let index = self.index(tick);
        self.slots[index].snapshot = snapshot;
        Ok(())
    }

    pub fn input(&self, tick: u32) -> Option<InputCommand> {
        self.is_resident(tick)
            .then(|| self.slots[self.index(tick)].input)
    }

    pub fn snapshot(&self, tick: u32) -> Option<PredictedSnapshot> {
        self.is_resident(tick)
            .then(|| self.slots[self.index(tick)].snapshot)
    }

    /// Inputs for the inclusive range `[from, to]`, oldest first.
    pub fn inputs_between(&self, from: u32, to: u32) -> Result<Vec<InputCommand>> {
        self.ensure_resident(from)?;
        self.ensure_resident(to)?;
        Ok((from..=to)
            .map(|tick| self.slots[self.index(tick)].input)
            .collect())
    }

    pub fn ensure_resident(&self, tick: u32) -> Result<()> {
        if self.is_resident(tick) {
            Ok(())
        } else {
            Err(SyncError::HistoryOverrun {
                requested: tick,
                current: self.next_tick,
                capacity: self.capacity(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn pose_at(x: f32) -> PredictedSnapshot {
        Pose {
            position: Vec3::new(x, 0.0, 0.0),
            ..Pose::default()
        }
    }

    #[test]
    fn test_record_and_read_back() {
        let mut history = ClientHistory::new(8);
        history.record(0, InputCommand::forward(), pose_at(0.0));
        history.record(1, InputCommand::IDLE, pose_at(1.0));

        assert_eq!(history.next_tick(), 2);
        assert_eq!(history.input(0), Some(InputCommand::forward()));
        assert_eq!(history.snapshot(1), Some(pose_at(1.0)));
        assert_eq!(history.input(2), None);
    }

    #[test]
    fn test_wraparound_evicts_oldest() {
        let mut history = ClientHistory::new(4);
        for tick in 0..6 {
            history.record(tick, InputCommand::IDLE, pose_at(tick as f32));
        }

        assert!(!history.is_resident(0));
        assert!(!history.is_resident(1));
        assert!(history.is_resident(2));
        assert!(history.is_resident(5));
        // tick 5 reused the slot of tick 1
        assert_eq!(history.snapshot(1), None);
        assert_eq!(history.snapshot(5), Some(pose_at(5.0)));
        assert_eq!(history.snapshot(2), Some(pose_at(2.0)));
    }

    #[test]
    fn test_inputs_between() {
        let mut history = ClientHistory::new(4);
        for tick in 0..6 {
            let input = InputCommand {
                jump: tick % 2 == 0,
                ..InputCommand::IDLE
            };
            history.record(tick, input, pose_at(0.0));
        }

        let inputs = history.inputs_between(2, 5).unwrap();
        assert_eq!(inputs.len(), 4);
        assert!(inputs[0].jump);
        assert!(!inputs[1].jump);

        assert!(matches!(
            history.inputs_between(1, 5),
            Err(SyncError::HistoryOverrun { requested: 1, .. })
        ));
    }

    #[test]
    fn test_overwrite_snapshot_keeps_input() {
        let mut history = ClientHistory::new(4);
        history.record(0, InputCommand::forward(), pose_at(0.0));
        history.overwrite_snapshot(0, pose_at(9.0)).unwrap();

        assert_eq!(history.snapshot(0), Some(pose_at(9.0)));
        assert_eq!(history.input(0), Some(InputCommand::forward()));
        assert!(history.overwrite_snapshot(1, pose_at(1.0)).is_err());
    }

    #[test]
    fn test_rerecording_does_not_move_cursor() {
        let mut history = ClientHistory::new(4);
        for tick in 0..3 {
            history.record(tick, InputCommand::IDLE, pose_at(0.0));
        }
        history.record(1, InputCommand::forward(), pose_at(1.0));
        assert_eq!(history.next_tick(), 3);
        assert_eq!(history.input(1), Some(InputCommand::forward()));
    }
}
