//! # Synchronisation Session Harness
//!
//! Wires a predicting [`client::ClientState`] and an authoritative
//! [`server::ServerState`] together through two
//! [`DelayedChannel`](shared::DelayedChannel)s, one per direction. Each
//! frame advances simulated time, runs the client (prediction, then
//! reconciliation) and then the server (input replay, then snapshots).
//!
//! [`Session`] is fully deterministic for a given configuration and seed,
//! which makes it the entry point for scenario tests. [`run_realtime`]
//! paces a session against the wall clock for interactive runs.

pub mod runner;
pub mod session;

pub use runner::run_realtime;
pub use session::{FrameReport, Session, SessionSummary};
