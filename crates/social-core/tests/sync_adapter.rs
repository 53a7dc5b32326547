//! Sync adapter against scripted backends

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use social_core::{
    radius_for, BackendError, DriveOutcome, PersonalityCatalog, PhysicsBackend, SimConfig,
    Simulation, SyncAdapter, SyncMode, WorldBounds,
};
use social_wire::{fixtures, AgentSnapshot, AgentState, Faction, ResetRequest, ResetResponse};

fn world(population: usize) -> Simulation {
    let mut config = SimConfig::default();
    config.world.population = population;
    Simulation::new(&config, PersonalityCatalog::builtin()).unwrap()
}

/// Replays a fixed step response; fails every call once `down` is set.
#[derive(Default)]
struct ReplayBackend {
    down: AtomicBool,
    steps: AtomicUsize,
}

impl ReplayBackend {
    fn check(&self) -> Result<(), BackendError> {
        if self.down.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl PhysicsBackend for ReplayBackend {
    fn probe(&self) -> Result<(), BackendError> {
        self.check()
    }

    fn reset(&self, request: &ResetRequest) -> Result<ResetResponse, BackendError> {
        self.check()?;
        Ok(ResetResponse {
            status: "reset".into(),
            width: request.width,
            height: request.height,
        })
    }

    fn step(&self, _count: u32) -> Result<Vec<AgentSnapshot>, BackendError> {
        self.check()?;
        self.steps.fetch_add(1, Ordering::SeqCst);
        Ok(fixtures::sample_step_response())
    }

    fn glitch(&self) -> Result<(), BackendError> {
        self.check()
    }

    fn observer(&self) -> Result<(), BackendError> {
        self.check()
    }
}

#[test]
fn test_remote_step_overwrites_local_state() {
    let adapter = SyncAdapter::connect(ReplayBackend::default());
    let mut sim = world(3);
    assert_eq!(adapter.mode(), SyncMode::Remote);

    let outcome = adapter.drive(&mut sim, 1.0).unwrap();
    assert_eq!(outcome, DriveOutcome::Ticked(SyncMode::Remote));
    assert_eq!(sim.tick(), 1);

    let agents = sim.population();
    assert_eq!((agents[0].x, agents[0].y), (120.5, 44.25));
    assert_eq!(agents[0].state, AgentState::Hunt);
    assert_eq!(agents[0].faction(), Faction::Entropics);
    assert!((agents[0].radius - radius_for(0.6)).abs() < 1e-9);

    // Reported faction wins over the locally spawned one
    assert_eq!(agents[1].faction(), Faction::Luminaries);
    assert_eq!((agents[1].x, agents[1].y), (300.0, 410.75));

    assert!(agents[2].is_deactivated);
    assert_eq!(agents[2].radius, 2.0);

    let metrics = sim.metrics_snapshot();
    assert_eq!(metrics.population, 2);
    assert_eq!(metrics.tick, 1);
}

#[test]
fn test_remote_faction_change_takes_first_archetype() {
    let adapter = SyncAdapter::connect(ReplayBackend::default());
    let mut sim = world(3);
    {
        let catalog = PersonalityCatalog::builtin();
        let citizen = catalog.first_of(Faction::Inert).unwrap().clone();
        let mut population = sim.world_mut().resource_mut::<social_core::Population>();
        population.agents[1] = social_core::Agent::new(1, &citizen, 10.0, 10.0);
    }

    adapter.drive(&mut sim, 1.0).unwrap();

    let agent = &sim.population()[1];
    assert_eq!(agent.faction(), Faction::Luminaries);
    assert_eq!(agent.personality.name, "The Sun");
}

#[test]
fn test_remote_never_revives_or_moves_deactivated() {
    let adapter = SyncAdapter::connect(ReplayBackend::default());
    let mut sim = world(3);
    let before = {
        let mut population = sim.world_mut().resource_mut::<social_core::Population>();
        population.agents[0].deactivate();
        population.agents[0].clone()
    };

    adapter.drive(&mut sim, 1.0).unwrap();

    // The fixture reports agent 0 alive at (120.5, 44.25) as an Entropics hunter
    assert_eq!(sim.population()[0], before);
    assert!(sim.population()[0].is_deactivated);
    assert_eq!(sim.agent_snapshot().len(), 1);
}

#[test]
fn test_backend_outage_falls_back_for_good() {
    let adapter = SyncAdapter::connect(ReplayBackend::default());
    let mut sim = world(3);
    adapter.drive(&mut sim, 1.0).unwrap();

    adapter.backend().unwrap().down.store(true, Ordering::SeqCst);
    let outcome = adapter.drive(&mut sim, 1.0).unwrap();
    assert_eq!(outcome, DriveOutcome::Ticked(SyncMode::Local));
    assert_eq!(sim.tick(), 2);

    adapter.backend().unwrap().down.store(false, Ordering::SeqCst);
    for _ in 0..5 {
        adapter.drive(&mut sim, 1.0).unwrap();
    }
    assert_eq!(adapter.mode(), SyncMode::Local);
    assert_eq!(adapter.backend().unwrap().steps.load(Ordering::SeqCst), 1);
    assert_eq!(sim.tick(), 7);
}

#[test]
fn test_reset_outage_falls_back() {
    let adapter = SyncAdapter::connect(ReplayBackend::default());
    let mut sim = world(10);
    adapter.backend().unwrap().down.store(true, Ordering::SeqCst);

    adapter.reset(&mut sim, WorldBounds::new(200.0, 100.0)).unwrap();
    assert_eq!(adapter.mode(), SyncMode::Local);
    assert_eq!(sim.bounds(), WorldBounds::new(200.0, 100.0));
}

/// Holds each step until the test releases it.
struct GatedBackend {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl PhysicsBackend for GatedBackend {
    fn probe(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn reset(&self, request: &ResetRequest) -> Result<ResetResponse, BackendError> {
        Ok(ResetResponse {
            status: "reset".into(),
            width: request.width,
            height: request.height,
        })
    }

    fn step(&self, _count: u32) -> Result<Vec<AgentSnapshot>, BackendError> {
        let _ = self.entered.lock().unwrap().send(());
        self.release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        Ok(fixtures::sample_step_response())
    }

    fn glitch(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn observer(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[test]
fn test_overlapping_drive_is_dropped() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let adapter = SyncAdapter::connect(GatedBackend {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let mut first = world(3);
    let mut second = world(3);

    thread::scope(|scope| {
        let in_flight = scope.spawn(|| adapter.drive(&mut first, 1.0));

        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(adapter.drive(&mut second, 1.0).unwrap(), DriveOutcome::Dropped);
        assert_eq!(second.tick(), 0);

        release_tx.send(()).unwrap();
        let outcome = in_flight.join().unwrap().unwrap();
        assert_eq!(outcome, DriveOutcome::Ticked(SyncMode::Remote));
    });

    assert_eq!(first.tick(), 1);
    assert_eq!(adapter.mode(), SyncMode::Remote);

    // The flag clears once the request completes
    release_tx.send(()).unwrap();
    assert_eq!(
        adapter.drive(&mut second, 1.0).unwrap(),
        DriveOutcome::Ticked(SyncMode::Remote)
    );
}
