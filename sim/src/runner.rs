//! Wall-clock pacing for a session

use crate::session::{Session, SessionSummary};
use client::InputSampler;
use log::{info, warn};
use shared::{Result, Stepper};
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};

/// Longest frame handed to the session; longer stalls are clamped.
const MAX_FRAME_TIME: f32 = 1.0 / 20.0;

/// Runs `session` at `frame_rate` frames per second of real time, either for
/// `duration` or forever.
pub async fn run_realtime<S: Stepper, I: InputSampler>(
    session: &mut Session<S, I>,
    frame_rate: u32,
    duration: Option<Duration>,
) -> Result<SessionSummary> {
    let mut frame_timer = interval(Duration::from_secs_f32(1.0 / frame_rate.max(1) as f32));
    frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = Instant::now();
    let mut last_frame = started;
    let mut last_report = started;

    // The first tick fires immediately
    frame_timer.tick().await;

    loop {
        frame_timer.tick().await;

        let current_time = Instant::now();
        let mut frame_dt = (current_time - last_frame).as_secs_f32();
        last_frame = current_time;

        if frame_dt > MAX_FRAME_TIME {
            warn!(
                "Large frame time detected ({:.3}s), capping to {:.3}s",
                frame_dt, MAX_FRAME_TIME
            );
            frame_dt = MAX_FRAME_TIME;
        }

        session.advance(frame_dt)?;

        if current_time - last_report >= Duration::from_secs(1) {
            last_report = current_time;
            let summary = session.summary();
            info!(
                "Client tick {}, server tick {}, corrections {}, snapshots lost {}",
                summary.client_tick, summary.server_tick, summary.corrections, summary.snapshots_lost
            );
        }

        if duration.is_some_and(|limit| current_time - started >= limit) {
            break;
        }
    }

    Ok(session.summary())
}
