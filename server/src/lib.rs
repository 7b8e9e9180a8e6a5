//! # Authoritative Server Library
//!
//! Server half of the synchronisation core. The server keeps the canonical
//! state of the simulated actor and is the only side whose simulation is
//! never corrected.
//!
//! ## Input Replay
//! Input messages carry an inclusive run of client ticks. Because the client
//! resends everything since its last acknowledged tick, consecutive messages
//! overlap. The server tracks the next tick it needs and:
//! - discards a message whose last tick is already behind it (stale),
//! - skips the overlapping prefix of a message and applies only new ticks,
//! - rejects empty messages and messages that start past its current tick.
//!
//! Every applied input goes through the same impulse mapping and fixed-step
//! stepper as the client's prediction, so both sides compute identical
//! states from identical inputs.
//!
//! ## State Broadcasting
//! After every `snapshot_interval` applied ticks the server frames a
//! [`StateMessage`](shared::StateMessage) holding position, rotation,
//! velocity and angular velocity at the start of its current tick. A lost
//! snapshot is never retransmitted; the next periodic one supersedes it.
//!
//! ## Usage Example
//!
//! ```rust
//! use server::ServerState;
//! use shared::{DelayedChannel, InputCommand, InputMessage, KinematicBody, SyncConfig};
//!
//! let config = SyncConfig::ideal();
//! let mut server = ServerState::new(&config, KinematicBody::default())?;
//! let mut from_client = DelayedChannel::perfect();
//! let mut to_client = DelayedChannel::perfect();
//!
//! from_client.send(0.0, InputMessage::new(0, vec![InputCommand::forward(); 4]));
//! let frame = server.update(0.0, &mut from_client, &mut to_client);
//!
//! assert_eq!(server.tick(), 4);
//! assert_eq!(frame.snapshot.map(|s| s.tick), Some(4));
//! # Ok::<(), shared::SyncError>(())
//! ```

pub mod authority;

pub use authority::{InputDisposition, ServerFrame, ServerState, ServerStats};
