//! # Prediction Client Library
//!
//! Client half of the synchronisation core. The client never waits for the
//! server: it predicts its own actor every tick and corrects itself when an
//! authoritative snapshot proves the prediction wrong.
//!
//! ## Client-Side Prediction
//! Each fixed tick the client samples an [`InputCommand`](shared::InputCommand),
//! records it in a ring buffer together with the pose *before* the input is
//! applied, applies the input as impulses and steps its local body. It then
//! resends every input since the last acknowledged tick, so a lost input
//! message is healed by the next one.
//!
//! ## Server Reconciliation
//! State messages carry the authoritative state at the start of a tick. The
//! client compares that state with the pose it recorded for the same tick.
//! Within tolerance nothing happens. Beyond tolerance the client snaps its
//! body to the authoritative state and replays every buffered input up to
//! the present, which is a full deterministic resimulation rather than a
//! blend.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! The [`InputSampler`](input::InputSampler) collaborator plus constant,
//! scripted and random samplers.
//!
//! ### Predictor Module (`predictor`)
//! [`ClientState`](predictor::ClientState): tick clock, history buffer, the
//! predicted body and the per-frame update.
//!
//! ### Reconciler Module (`reconciler`)
//! Newest-wins consumption of state messages, divergence checks and
//! rewind-and-replay.
//!
//! ## Usage Example
//!
//! ```rust
//! use client::input::ConstantInput;
//! use client::predictor::ClientState;
//! use shared::{DelayedChannel, InputCommand, KinematicBody, SyncConfig};
//!
//! let config = SyncConfig::ideal();
//! let mut client = ClientState::new(&config, KinematicBody::default())?;
//! let mut sampler = ConstantInput(InputCommand::forward());
//! let mut to_server = DelayedChannel::perfect();
//! let mut from_server = DelayedChannel::perfect();
//!
//! let frame = client.update(config.dt, 0.0, &mut sampler, &mut to_server, &mut from_server)?;
//! assert_eq!(frame.ticks, 1);
//! # Ok::<(), shared::SyncError>(())
//! ```

pub mod input;
pub mod predictor;
pub mod reconciler;

pub use input::{ConstantInput, InputSampler, RandomInput, ScriptedInput};
pub use predictor::{ClientFrame, ClientState, ClientStats};
pub use reconciler::ReconcileOutcome;
