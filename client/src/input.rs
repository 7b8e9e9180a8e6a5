//! Per-tick input sampling

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::InputCommand;

/// Produces the command set for the tick about to be simulated.
pub trait InputSampler {
    fn sample(&mut self) -> InputCommand;
}

impl<F> InputSampler for F
where
    F: FnMut() -> InputCommand,
{
    fn sample(&mut self) -> InputCommand {
        self()
    }
}

/// Returns the same command every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantInput(pub InputCommand);

impl InputSampler for ConstantInput {
    fn sample(&mut self) -> InputCommand {
        self.0
    }
}

/// Plays back a fixed sequence of commands, looping at the end.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    script: Vec<InputCommand>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(script: Vec<InputCommand>) -> Self {
        Self { script, cursor: 0 }
    }

    /// Forward, right, backward, left, each held for `hold_ticks` ticks.
    pub fn circuit(hold_ticks: usize) -> Self {
        let legs = [
            InputCommand::forward(),
            InputCommand {
                right: true,
                ..InputCommand::IDLE
            },
            InputCommand {
                backward: true,
                ..InputCommand::IDLE
            },
            InputCommand {
                left: true,
                ..InputCommand::IDLE
            },
        ];
        let script = legs
            .iter()
            .flat_map(|leg| std::iter::repeat(*leg).take(hold_ticks))
            .collect();
        Self::new(script)
    }
}

impl InputSampler for ScriptedInput {
    fn sample(&mut self) -> InputCommand {
        if self.script.is_empty() {
            return InputCommand::IDLE;
        }
        let input = self.script[self.cursor];
        self.cursor = (self.cursor + 1) % self.script.len();
        input
    }
}

/// Holds random key combinations for random stretches of ticks, mimicking
/// a player mashing the movement keys.
#[derive(Debug, Clone)]
pub struct RandomInput {
    rng: StdRng,
    current: InputCommand,
    remaining: u32,
}

impl RandomInput {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            current: InputCommand::IDLE,
            remaining: 0,
        }
    }
}

impl InputSampler for RandomInput {
    fn sample(&mut self) -> InputCommand {
        if self.remaining == 0 {
            self.current = InputCommand::from_bits(self.rng.gen_range(0..32));
            self.remaining = self.rng.gen_range(5..30);
        }
        self.remaining -= 1;
        self.current
    }
}
