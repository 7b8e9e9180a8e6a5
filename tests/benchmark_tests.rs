//! Performance benchmarks for the hot paths of prediction and reconciliation

use client::{ClientState, ConstantInput};
use glam::Vec3;
use shared::{
    apply_input_forces, DelayedChannel, InputCommand, InputMessage, KinematicBody, Packet,
    StateMessage, Stepper, SyncConfig,
};
use sim::Session;
use std::time::Instant;

/// Benchmarks a single fixed step of the kinematic body
#[test]
fn benchmark_body_step() {
    let config = SyncConfig::default();
    let mut body = KinematicBody::default();
    let input = InputCommand::forward();

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        apply_input_forces(&mut body, &input, &config.movement);
        body.step(config.dt);
    }

    let duration = start.elapsed();
    println!(
        "Body step: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 100ms for 10k iterations
    assert!(duration.as_millis() < 100);
}

/// Benchmarks a worst-case rollback across a full unacknowledged window
#[test]
fn benchmark_resimulation() {
    let config = SyncConfig::ideal();
    let mut client = ClientState::new(&config, KinematicBody::default()).unwrap();
    let mut sampler = ConstantInput(InputCommand::forward());
    let mut to_server: DelayedChannel<InputMessage> = DelayedChannel::perfect();

    let window = 200;
    for _ in 0..window {
        client.predict_tick(0.0, &mut sampler, &mut to_server).unwrap();
    }

    let mut state = StateMessage::capture(0, &KinematicBody::default());

    let iterations = 100;
    let start = Instant::now();

    for i in 0..iterations {
        // every rollback must diverge from the previous one
        state.position = Vec3::new(1.0 + i as f32, 0.0, 0.0);
        let outcome = client.apply_state(&state).unwrap();
        assert_eq!(outcome.replayed_ticks, window);
    }

    let duration = start.elapsed();
    println!(
        "Resimulation: {} rollbacks of {} ticks in {:?} ({:.2} µs/rollback)",
        iterations,
        window,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 500);
}

/// Benchmarks packet encoding and decoding for typical resend windows
#[test]
fn benchmark_packet_codec() {
    let packet = Packet::Input(InputMessage::new(1000, vec![InputCommand::forward(); 10]));

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let bytes = packet.encode().unwrap();
        let _ = Packet::decode(&bytes).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Packet codec: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 500);
}

/// Benchmarks whole session frames under realistic network conditions
#[test]
fn benchmark_session_frames() {
    let config = SyncConfig {
        jitter: 0.02,
        packet_loss: 0.05,
        ..SyncConfig::default()
    };
    let mut session = Session::new(
        &config,
        KinematicBody::default(),
        ConstantInput(InputCommand::forward()),
    )
    .unwrap();

    let frames = 5_000;
    let start = Instant::now();
    session.advance_ticks(frames).unwrap();
    let duration = start.elapsed();

    println!(
        "Session: {} frames in {:?} ({:.2} µs/frame)",
        frames,
        duration,
        duration.as_micros() as f64 / frames as f64
    );

    assert_eq!(session.client().tick(), frames);
    assert!(duration.as_millis() < 1000);
}
