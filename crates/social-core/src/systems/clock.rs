//! World Clock
//!
//! Run/pause state machine, tick counter, speed multiplier and the in-flight
//! guard that keeps ticks from overlapping.
//!
//! Through `Simulation::step` overlap is already ruled out by the `&mut`
//! borrow; the guard covers hosts that drive a `WorldClock` and the tick
//! schedule themselves.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A fresh clock is `Running`: the headless engine ticks as soon as it is
/// driven. Hosts that want a paused start call `pause` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Idle,
    #[default]
    Running,
}

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("a tick is already in flight (tick {0})")]
    TickInFlight(u64),
}

/// Resource tracking world age and run state
#[derive(Resource, Debug, Clone)]
pub struct WorldClock {
    pub tick: u64,
    pub state: ClockState,
    /// Multiplier applied to every drive step's dt
    pub speed: f64,
    /// Effective dt of the tick currently being applied
    pub tick_dt: f64,
    in_flight: bool,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl WorldClock {
    pub fn new(speed: f64) -> Self {
        Self {
            tick: 0,
            state: ClockState::default(),
            speed,
            tick_dt: 1.0,
            in_flight: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Claim the tick slot and fix its effective dt.
    pub fn begin_tick(&mut self, dt: f64) -> Result<f64, ClockError> {
        if self.in_flight {
            return Err(ClockError::TickInFlight(self.tick));
        }
        self.in_flight = true;
        self.tick_dt = dt * self.speed;
        Ok(self.tick_dt)
    }

    pub fn end_tick(&mut self) {
        self.in_flight = false;
    }

    pub fn pause(&mut self) {
        self.state = ClockState::Idle;
    }

    pub fn resume(&mut self) {
        self.state = ClockState::Running;
    }

    pub fn toggle(&mut self) -> ClockState {
        self.state = match self.state {
            ClockState::Idle => ClockState::Running,
            ClockState::Running => ClockState::Idle,
        };
        self.state
    }

    /// Back to tick zero; run state and speed are kept.
    pub fn rewind(&mut self) {
        self.tick = 0;
        self.in_flight = false;
    }
}

/// System: count the tick
pub fn advance_clock(mut clock: ResMut<WorldClock>) {
    clock.tick += 1;
}
