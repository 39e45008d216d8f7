//! Transient ping markers.
//!
//! A ping is an expanding ring that fades out. Each view animates its own
//! copies; the sender never tracks a ping after publishing it.

#[cfg(test)]
#[path = "ping_test.rs"]
mod ping_test;

use crate::camera::Point;
use crate::consts::{PING_DECAY, PING_GROWTH};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ping {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub alpha: f64,
}

impl Ping {
    #[must_use]
    pub fn new(at: Point, radius: f64) -> Self {
        Self { x: at.x, y: at.y, radius, alpha: 1.0 }
    }

    /// Grow and fade by one tick.
    pub fn advance(&mut self) {
        self.radius += PING_GROWTH;
        self.alpha -= PING_DECAY;
    }

    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.alpha <= 0.0
    }
}

/// Advance every ping one tick and drop the ones that have faded out.
pub fn advance_all(pings: &mut Vec<Ping>) {
    for ping in pings.iter_mut() {
        ping.advance();
    }
    pings.retain(|p| !p.is_spent());
}
