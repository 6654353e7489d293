//! Opaque deadline token for bounding the agent's blocking startup wait
//!
//! The Controller and Server forward a [`Timeout`] unexamined; only the
//! agent runner, which performs the blocking startup wait, interprets
//! it. The bounded retry loops never consult it; they terminate only by
//! running out of attempts.

use std::time::{Duration, Instant};

/// Deadline token passed into `start` and forwarded to the agent-boot step
#[derive(Debug, Clone)]
pub struct Timeout {
    deadline: Option<Instant>,
}

impl Timeout {
    /// Start a deadline that expires `limit` from now
    pub fn start(limit: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + limit),
        }
    }

    /// A token that never expires
    pub fn unbounded() -> Self {
        Self { deadline: None }
    }

    /// Whether the deadline has passed
    pub fn expired(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Time left before expiry, or `None` for an unbounded token
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
