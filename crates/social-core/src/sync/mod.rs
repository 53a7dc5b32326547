//! Physics Backend Sync
//!
//! Drives a [`Simulation`] either locally or from an external physics
//! backend. Any backend failure drops the adapter to local stepping for the
//! rest of the run.

pub mod http;

use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{info, warn};

use social_wire::{AgentSnapshot, ResetRequest, ResetResponse};

use crate::components::world::WorldBounds;
use crate::control::ControlCommand;
use crate::simulation::{SimError, Simulation};

pub use http::HttpBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{path} answered status {status}")]
    Status { path: &'static str, status: u16 },
    #[error("undecodable body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// An out-of-process engine that computes the same simulation.
pub trait PhysicsBackend: Send + Sync {
    /// Liveness check
    fn probe(&self) -> Result<(), BackendError>;

    fn reset(&self, request: &ResetRequest) -> Result<ResetResponse, BackendError>;

    /// Advance `count` ticks; one snapshot per agent, in collection order.
    fn step(&self, count: u32) -> Result<Vec<AgentSnapshot>, BackendError>;

    fn glitch(&self) -> Result<(), BackendError>;

    fn observer(&self) -> Result<(), BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Local,
    Remote,
}

/// What a drive step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// A tick was applied, computed in the given mode
    Ticked(SyncMode),
    /// World is paused; metrics were refreshed only
    Paused,
    /// A remote step was already outstanding; this request was discarded
    Dropped,
}

/// Clears the busy flag when the outstanding request finishes.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SyncAdapter<B = HttpBackend> {
    backend: Option<B>,
    remote: AtomicBool,
    busy: AtomicBool,
}

impl<B: PhysicsBackend> SyncAdapter<B> {
    /// Local stepping only.
    pub fn local() -> Self {
        Self {
            backend: None,
            remote: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    /// Probe `backend`; remote mode on success, local otherwise.
    pub fn connect(backend: B) -> Self {
        let remote = match backend.probe() {
            Ok(()) => {
                info!("Connected to physics backend");
                true
            }
            Err(err) => {
                info!(error = %err, "Physics backend not reachable, using local engine");
                false
            }
        };
        Self {
            backend: Some(backend),
            remote: AtomicBool::new(remote),
            busy: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> SyncMode {
        if self.remote.load(Ordering::Acquire) {
            SyncMode::Remote
        } else {
            SyncMode::Local
        }
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    fn remote_backend(&self) -> Option<&B> {
        match self.mode() {
            SyncMode::Remote => self.backend.as_ref(),
            SyncMode::Local => None,
        }
    }

    /// Permanent switch to local mode. Only the first failure is logged.
    fn fall_back(&self, err: &BackendError) {
        if self.remote.swap(false, Ordering::AcqRel) {
            warn!(
                error = %err,
                "Physics backend failed, local engine takes over for the rest of the run"
            );
        }
    }

    /// Advance the world by one drive step.
    pub fn drive(&self, sim: &mut Simulation, dt: f64) -> Result<DriveOutcome, SimError> {
        if let Some(backend) = self.remote_backend() {
            if !sim.is_running() {
                sim.step(dt)?;
                return Ok(DriveOutcome::Paused);
            }
            let Some(_guard) = BusyGuard::acquire(&self.busy) else {
                return Ok(DriveOutcome::Dropped);
            };
            match backend.step(1) {
                Ok(snapshots) => {
                    sim.apply_remote_step(&snapshots);
                    return Ok(DriveOutcome::Ticked(SyncMode::Remote));
                }
                Err(err) => self.fall_back(&err),
            }
        }

        if sim.step(dt)? {
            Ok(DriveOutcome::Ticked(SyncMode::Local))
        } else {
            Ok(DriveOutcome::Paused)
        }
    }

    /// Reset the local world and, in remote mode, the backend's.
    pub fn reset(&self, sim: &mut Simulation, bounds: WorldBounds) -> Result<(), SimError> {
        sim.reset(bounds)?;
        if let Some(backend) = self.remote_backend() {
            let request = ResetRequest::from_bounds(bounds.width, bounds.height);
            match backend.reset(&request) {
                Ok(ack) => info!(width = ack.width, height = ack.height, "Physics backend resized"),
                Err(err) => self.fall_back(&err),
            }
        }
        Ok(())
    }

    pub fn glitch(&self, sim: &mut Simulation) {
        if let Some(backend) = self.remote_backend() {
            match backend.glitch() {
                Ok(()) => return,
                Err(err) => self.fall_back(&err),
            }
        }
        sim.trigger_glitch();
    }

    pub fn observer(&self, sim: &mut Simulation) {
        if let Some(backend) = self.remote_backend() {
            match backend.observer() {
                Ok(()) => return,
                Err(err) => self.fall_back(&err),
            }
        }
        sim.trigger_observer();
    }

    /// Route an operator command.
    pub fn apply(&self, sim: &mut Simulation, command: &ControlCommand) -> Result<(), SimError> {
        match *command {
            ControlCommand::Pause => sim.pause(),
            ControlCommand::Resume => sim.resume(),
            ControlCommand::Toggle => {
                sim.toggle();
            }
            ControlCommand::SetWeight { weight, value } => sim.set_global_weight(weight, value)?,
            ControlCommand::SetSpeed { value } => sim.set_speed(value)?,
            ControlCommand::Glitch => self.glitch(sim),
            ControlCommand::Observer => self.observer(sim),
            ControlCommand::Reset { width, height } => {
                self.reset(sim, WorldBounds::new(width, height))?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::personality::PersonalityCatalog;
    use crate::config::SimConfig;
    use std::sync::atomic::AtomicUsize;

    /// Counts calls; every call fails once `fail` is set.
    #[derive(Default)]
    struct CountingBackend {
        fail: AtomicBool,
        steps: AtomicUsize,
        glitches: AtomicUsize,
        resets: AtomicUsize,
    }

    impl CountingBackend {
        fn check(&self) -> Result<(), BackendError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(BackendError::Unavailable("down".into()))
            } else {
                Ok(())
            }
        }
    }

    impl PhysicsBackend for CountingBackend {
        fn probe(&self) -> Result<(), BackendError> {
            self.check()
        }

        fn reset(&self, request: &ResetRequest) -> Result<ResetResponse, BackendError> {
            self.check()?;
            self.resets.fetch_add(1, Ordering::SeqCst);
            Ok(ResetResponse {
                status: "reset".into(),
                width: request.width,
                height: request.height,
            })
        }

        fn step(&self, _count: u32) -> Result<Vec<AgentSnapshot>, BackendError> {
            self.check()?;
            self.steps.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        fn glitch(&self) -> Result<(), BackendError> {
            self.check()?;
            self.glitches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn observer(&self) -> Result<(), BackendError> {
            self.check()
        }
    }

    fn sim() -> Simulation {
        let mut config = SimConfig::default();
        config.world.population = 20;
        Simulation::new(&config, PersonalityCatalog::builtin()).unwrap()
    }

    #[test]
    fn test_local_adapter_steps_locally() {
        let adapter = SyncAdapter::<CountingBackend>::local();
        let mut sim = sim();
        assert_eq!(adapter.mode(), SyncMode::Local);
        assert_eq!(adapter.drive(&mut sim, 1.0).unwrap(), DriveOutcome::Ticked(SyncMode::Local));
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn test_failed_probe_selects_local() {
        let backend = CountingBackend::default();
        backend.fail.store(true, Ordering::SeqCst);
        let adapter = SyncAdapter::connect(backend);
        assert_eq!(adapter.mode(), SyncMode::Local);
    }

    #[test]
    fn test_remote_step_then_fallback() {
        let adapter = SyncAdapter::connect(CountingBackend::default());
        let mut sim = sim();
        assert_eq!(adapter.mode(), SyncMode::Remote);
        assert_eq!(adapter.drive(&mut sim, 1.0).unwrap(), DriveOutcome::Ticked(SyncMode::Remote));
        assert_eq!(adapter.backend().unwrap().steps.load(Ordering::SeqCst), 1);

        adapter.backend().unwrap().fail.store(true, Ordering::SeqCst);
        assert_eq!(adapter.drive(&mut sim, 1.0).unwrap(), DriveOutcome::Ticked(SyncMode::Local));
        assert_eq!(adapter.mode(), SyncMode::Local);

        // Recovery does not bring remote mode back
        adapter.backend().unwrap().fail.store(false, Ordering::SeqCst);
        adapter.drive(&mut sim, 1.0).unwrap();
        assert_eq!(adapter.mode(), SyncMode::Local);
        assert_eq!(adapter.backend().unwrap().steps.load(Ordering::SeqCst), 1);
        assert_eq!(sim.tick(), 3);
    }

    #[test]
    fn test_paused_remote_does_not_request() {
        let adapter = SyncAdapter::connect(CountingBackend::default());
        let mut sim = sim();
        sim.pause();
        assert_eq!(adapter.drive(&mut sim, 1.0).unwrap(), DriveOutcome::Paused);
        assert_eq!(adapter.backend().unwrap().steps.load(Ordering::SeqCst), 0);
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn test_busy_drive_is_dropped() {
        let adapter = SyncAdapter::connect(CountingBackend::default());
        let mut sim = sim();
        let guard = BusyGuard::acquire(&adapter.busy).unwrap();
        assert_eq!(adapter.drive(&mut sim, 1.0).unwrap(), DriveOutcome::Dropped);
        assert_eq!(sim.tick(), 0);
        drop(guard);
        assert_eq!(adapter.drive(&mut sim, 1.0).unwrap(), DriveOutcome::Ticked(SyncMode::Remote));
    }

    #[test]
    fn test_glitch_routing() {
        let adapter = SyncAdapter::connect(CountingBackend::default());
        let mut sim = sim();
        let before = sim.population().to_vec();
        adapter.glitch(&mut sim);
        assert_eq!(adapter.backend().unwrap().glitches.load(Ordering::SeqCst), 1);
        assert_eq!(sim.population(), before.as_slice());

        adapter.backend().unwrap().fail.store(true, Ordering::SeqCst);
        adapter.apply(&mut sim, &ControlCommand::Glitch).unwrap();
        assert_eq!(adapter.mode(), SyncMode::Local);
    }

    #[test]
    fn test_apply_commands() {
        let adapter = SyncAdapter::connect(CountingBackend::default());
        let mut sim = sim();

        adapter.apply(&mut sim, &ControlCommand::Pause).unwrap();
        assert!(!sim.is_running());
        adapter.apply(&mut sim, &ControlCommand::Toggle).unwrap();
        assert!(sim.is_running());

        adapter
            .apply(&mut sim, &ControlCommand::SetSpeed { value: 2.0 })
            .unwrap();
        assert_eq!(sim.clock().speed, 2.0);

        adapter
            .apply(&mut sim, &ControlCommand::Reset { width: 300.0, height: 200.0 })
            .unwrap();
        assert_eq!(sim.bounds(), WorldBounds::new(300.0, 200.0));
        assert_eq!(adapter.backend().unwrap().resets.load(Ordering::SeqCst), 1);

        let err = adapter.apply(&mut sim, &ControlCommand::SetSpeed { value: f64::NAN });
        assert!(err.is_err());
    }
}
