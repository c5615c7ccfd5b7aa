//! Boost commitment and boost tank

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::consts::{BOOST_CONSUMPTION, MAX_BOOST_AMOUNT, MIN_BOOST_CONSUMPTION, MIN_BOOST_TIME};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Whether the vehicle is committed to boosting.
///
/// A boost request always commits the vehicle. The commitment can only be
/// released once more than `MIN_BOOST_TIME` has elapsed, and only on a tick
/// without a request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum BoostCommit {
    /// Not boosting.
    Idle,

    /// Boosting, `elapsed_s` seconds since the commitment started.
    Committed {
        elapsed_s: f64
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Boost available to the vehicle, between 0 and `MAX_BOOST_AMOUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoostTank {
    amount: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for BoostCommit {
    fn default() -> Self {
        BoostCommit::Idle
    }
}

impl BoostCommit {

    pub fn is_boosting(&self) -> bool {
        matches!(self, BoostCommit::Committed { .. })
    }

    /// Time since the commitment started, zero when idle.
    pub fn elapsed_s(&self) -> f64 {
        match *self {
            BoostCommit::Idle => 0.0,
            BoostCommit::Committed { elapsed_s } => elapsed_s
        }
    }

    /// Apply this tick's boost request.
    ///
    /// Requesting while already committed keeps the elapsed time.
    pub fn update(self, requested: bool) -> Self {
        match (self, requested) {
            (BoostCommit::Idle, true) => BoostCommit::Committed { elapsed_s: 0.0 },
            (BoostCommit::Committed { elapsed_s }, false) if elapsed_s > MIN_BOOST_TIME => {
                BoostCommit::Idle
            },
            (commit, _) => commit
        }
    }

    /// Accumulate `dt` of boosting time. Idle stays idle.
    pub fn advance(self, dt: f64) -> Self {
        match self {
            BoostCommit::Idle => BoostCommit::Idle,
            BoostCommit::Committed { elapsed_s } => BoostCommit::Committed {
                elapsed_s: elapsed_s + dt
            }
        }
    }
}

impl Default for BoostTank {
    fn default() -> Self {
        Self::full()
    }
}

impl BoostTank {
    /// Create a tank holding `amount`, limited to the tank's capacity.
    pub fn new(amount: f64) -> Self {
        Self {
            amount: amount.max(0.0).min(MAX_BOOST_AMOUNT)
        }
    }

    pub fn full() -> Self {
        Self { amount: MAX_BOOST_AMOUNT }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// True if the tank can pay for a full minimum boost commitment.
    pub fn can_start_boost(&self) -> bool {
        self.amount >= MIN_BOOST_CONSUMPTION
    }

    /// True if the tank can pay for `dt` of boosting.
    pub fn can_boost_for(&self, dt: f64) -> bool {
        self.amount >= BOOST_CONSUMPTION * dt
    }

    /// Use `dt` worth of boost. The tank never goes below empty.
    pub fn drain(&mut self, dt: f64) {
        self.amount = (self.amount - BOOST_CONSUMPTION * dt).max(0.0);
    }
}
