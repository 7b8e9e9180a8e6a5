//! Latency and loss simulating message queue
//!
//! Stands in for an unreliable network link between client and server. Each
//! message is either dropped at send time or scheduled for delivery at
//! `now + latency (+ jitter)`. Delivery times never decrease, so messages
//! are consumed in the order they were sent.

use crate::SyncConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConditions {
    /// One-way latency in seconds
    pub latency: f64,
    /// Maximum additional random delay in seconds
    pub jitter: f64,
    /// Probability of dropping a message (0.0 to 1.0)
    pub packet_loss: f64,
}

impl Default for NetworkConditions {
    fn default() -> Self {
        Self::perfect()
    }
}

impl NetworkConditions {
    pub fn perfect() -> Self {
        Self {
            latency: 0.0,
            jitter: 0.0,
            packet_loss: 0.0,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            latency: config.latency,
            jitter: config.jitter,
            packet_loss: config.packet_loss,
        }
    }
}

/// Counters for monitoring a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub sent: u64,
    pub dropped: u64,
    pub delivered: u64,
}

#[derive(Debug)]
struct InFlight<T> {
    delivery_time: f64,
    message: T,
}

/// One-directional simulated link carrying messages of type `T`.
#[derive(Debug)]
pub struct DelayedChannel<T> {
    queue: VecDeque<InFlight<T>>,
    conditions: NetworkConditions,
    rng: StdRng,
    last_delivery_time: f64,
    stats: ChannelStats,
}

impl<T> DelayedChannel<T> {
    pub fn new(conditions: NetworkConditions, rng: StdRng) -> Self {
        Self {
            queue: VecDeque::new(),
            conditions,
            rng,
            last_delivery_time: f64::NEG_INFINITY,
            stats: ChannelStats::default(),
        }
    }

    pub fn seeded(conditions: NetworkConditions, seed: u64) -> Self {
        Self::new(conditions, StdRng::seed_from_u64(seed))
    }

    /// Lossless channel with no delay.
    pub fn perfect() -> Self {
        Self::seeded(NetworkConditions::perfect(), 0)
    }

    /// Offers `message` to the link at time `now`.
    ///
    /// Returns `false` when the message was lost.
    pub fn send(&mut self, now: f64, message: T) -> bool {
        self.stats.sent += 1;

        if self.conditions.packet_loss > 0.0 && self.rng.gen::<f64>() < self.conditions.packet_loss
        {
            self.stats.dropped += 1;
            return false;
        }

        let jitter = if self.conditions.jitter > 0.0 {
            self.rng.gen_range(0.0..=self.conditions.jitter)
        } else {
            0.0
        };
        let delivery_time = (now + self.conditions.latency + jitter).max(self.last_delivery_time);
        self.last_delivery_time = delivery_time;

        self.queue.push_back(InFlight {
            delivery_time,
            message,
        });
        true
    }

    /// Removes and returns the oldest message if it is due at `now`.
    pub fn poll(&mut self, now: f64) -> Option<T> {
        if !self.has_due(now) {
            return None;
        }
        let in_flight = self.queue.pop_front()?;
        self.stats.delivered += 1;
        Some(in_flight.message)
    }

    pub fn has_due(&self, now: f64) -> bool {
        self.queue
            .front()
            .is_some_and(|head| now >= head.delivery_time)
    }

    /// Delivery time of the oldest message still in flight.
    pub fn next_delivery_time(&self) -> Option<f64> {
        self.queue.front().map(|head| head.delivery_time)
    }

    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn conditions(&self) -> NetworkConditions {
        self.conditions
    }

    pub fn set_conditions(&mut self, conditions: NetworkConditions) {
        self.conditions = conditions;
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }
}
