use clap::{Parser, ValueEnum};
use client::{ConstantInput, InputSampler, RandomInput, ScriptedInput};
use log::{error, info, warn};
use shared::{InputCommand, KinematicBody, MovementConfig, SyncConfig};
use sim::{run_realtime, Session};
use tokio::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputMode {
    /// Hold forward
    Forward,
    /// Drive a square: forward, right, backward, left
    Circuit,
    /// Random key combinations from the seed
    Random,
    /// No input
    Idle,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Fixed simulation step in seconds
    #[arg(long, default_value_t = shared::DEFAULT_TICK_DT)]
    dt: f32,

    /// One-way network latency in milliseconds
    #[arg(short = 'l', long, default_value = "100")]
    latency_ms: u64,

    /// Maximum extra random delay in milliseconds
    #[arg(short = 'j', long, default_value = "0")]
    jitter_ms: u64,

    /// Probability of dropping any message (0.0 to 1.0)
    #[arg(long, default_value = "0")]
    loss: f64,

    /// Applied server ticks between state messages
    #[arg(long, default_value_t = shared::DEFAULT_SNAPSHOT_INTERVAL)]
    snapshot_interval: u32,

    /// Client history ring buffer capacity in ticks
    #[arg(long, default_value_t = shared::DEFAULT_HISTORY_CAPACITY)]
    history: usize,

    /// Position error tolerated before the client rewinds
    #[arg(long, default_value_t = shared::DEFAULT_MAX_POSITION_ERROR)]
    max_error: f32,

    /// Minimum rotation dot product tolerated before the client rewinds
    #[arg(long, default_value = "0")]
    rotation_dot: f32,

    /// Impulse applied per held direction key
    #[arg(long)]
    impulse: Option<f32>,

    /// Cap on ticks simulated per frame; surplus ticks are dropped
    #[arg(long)]
    max_ticks_per_frame: Option<u32>,

    /// Seed for packet loss, jitter and random input
    #[arg(short = 's', long, default_value = "0")]
    seed: u64,

    /// Frames per second of wall-clock pacing
    #[arg(short = 'f', long, default_value = "60")]
    frame_rate: u32,

    /// Stop after this many seconds; runs until Ctrl+C when omitted
    #[arg(short = 'd', long)]
    duration_secs: Option<u64>,

    /// Input source for the client
    #[arg(short = 'i', long, value_enum, default_value_t = InputMode::Circuit)]
    input: InputMode,
}

impl Args {
    fn config(&self) -> SyncConfig {
        let mut movement = MovementConfig::default();
        if let Some(impulse) = self.impulse {
            movement.impulse = impulse;
        }

        SyncConfig {
            dt: self.dt,
            latency: self.latency_ms as f64 / 1000.0,
            jitter: self.jitter_ms as f64 / 1000.0,
            packet_loss: self.loss,
            max_position_error_sq: self.max_error * self.max_error,
            min_rotation_dot: self.rotation_dot,
            history_capacity: self.history,
            snapshot_interval: self.snapshot_interval,
            movement,
            max_ticks_per_frame: self.max_ticks_per_frame,
            seed: self.seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for periodic progress, debug for rollbacks");
    }

    let args = Args::parse();
    let config = args.config();
    config.validate()?;

    info!(
        "Simulating {:.0} Hz ticks with {}ms latency, {}ms jitter, {:.0}% loss",
        1.0 / config.dt,
        args.latency_ms,
        args.jitter_ms,
        config.packet_loss * 100.0
    );
    if config.round_trip_ticks() as usize >= config.history_capacity {
        warn!(
            "Round trip of {} ticks does not fit a history of {}; the client will overrun",
            config.round_trip_ticks(),
            config.history_capacity
        );
    }

    match args.input {
        InputMode::Forward => run(&config, &args, ConstantInput(InputCommand::forward())).await,
        InputMode::Circuit => run(&config, &args, ScriptedInput::circuit(50)).await,
        InputMode::Random => run(&config, &args, RandomInput::new(config.seed)).await,
        InputMode::Idle => run(&config, &args, ConstantInput(InputCommand::IDLE)).await,
    }
}

async fn run<I: InputSampler>(
    config: &SyncConfig,
    args: &Args,
    sampler: I,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(config, KinematicBody::default(), sampler)?;
    let duration = args.duration_secs.map(Duration::from_secs);

    tokio::select! {
        result = run_realtime(&mut session, args.frame_rate, duration) => {
            if let Err(e) = result {
                if e.is_desync() {
                    error!("Client and server lost sync: {}", e);
                }
                println!("{}", session.summary());
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    println!("{}", session.summary());
    Ok(())
}
