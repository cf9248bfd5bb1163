//! The user-facing simulation.
//!
//! [`Simulation`] owns one complete, independent instance of every piece
//! of mutable state: the graph, the carriers, the per-kind occupancy
//! maps, the event tree, and the random source. Nothing is shared
//! between instances, so independent simulations can run on separate
//! threads.
//!
//! # Ownership model
//!
//! `Simulation` is [`Send`] when its random source is. All mutating
//! methods take `&mut self`; cancellation is simply not calling
//! [`step()`](Simulation::step) again, since a step either commits fully
//! or leaves the carriers untouched.

use hopkmc_core::{CarrierId, CarrierKind, ChannelId, HopRecord, ProcessKind, StepError, Vec3};
use hopkmc_graph::{Graph, Occupancy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arena::EventArena;
use crate::carrier::Carrier;
use crate::config::{ConfigError, SimConfig, StopReason};
use crate::event::EventHandle;
use crate::invariants::{self, InvariantViolation};
use crate::metrics::RunMetrics;
use crate::observer::{HopObserver, NoopObserver};
use crate::occupation::OccupationTimes;
use crate::placement::place_carriers;
use crate::scheduler::{Scheduler, UniformSource};
use crate::tree::{EventTree, Execution};

// Compile-time assertion: the default simulation is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

// ── StepOutcome ─────────────────────────────────────────────────

/// Result of one successful scheduler iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// A carrier moved.
    Hopped(HopRecord),
    /// The selected destination was occupied. Time advanced, nobody moved,
    /// and the selected transfer event is now unavailable.
    Contended {
        /// The carrier that tried to move.
        carrier: CarrierId,
        /// The channel it tried.
        channel: ChannelId,
        /// The process it tried.
        process: ProcessKind,
        /// Simulated time after the advance.
        time: f64,
    },
}

impl StepOutcome {
    /// The hop, if one happened.
    pub fn hop(&self) -> Option<&HopRecord> {
        match self {
            Self::Hopped(r) => Some(r),
            Self::Contended { .. } => None,
        }
    }
}

// ── RunSummary ──────────────────────────────────────────────────

/// Result of [`Simulation::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps taken by this call.
    pub steps: u64,
    /// Simulated time at the end of the run.
    pub time: f64,
    /// The bound that ended the run.
    pub stop_reason: StopReason,
    /// Counters since construction or the last reset.
    pub metrics: RunMetrics,
}

// ── Simulation ──────────────────────────────────────────────────

/// A kinetic Monte Carlo simulation on one hopping graph.
///
/// # Example
///
/// ```
/// use hopkmc_core::{CarrierKind, ProcessKind, RateTable, Vec3};
/// use hopkmc_engine::{NoopObserver, SimConfig, Simulation, StopCondition};
/// use hopkmc_graph::Graph;
///
/// let mut graph = Graph::new();
/// let a = graph.add_site(Vec3::ZERO).unwrap();
/// let b = graph.add_site(Vec3::new(1.0, 0.0, 0.0)).unwrap();
/// let hop = RateTable::new().with(ProcessKind::ElectronHop, 1.0);
/// graph.connect(a, b, hop).unwrap();
/// graph.connect(b, a, hop).unwrap();
///
/// let config = SimConfig::seeded(7)
///     .with_carrier(CarrierKind::Electron, a)
///     .with_stop(StopCondition::steps(100));
/// let mut sim = Simulation::new(graph, config).unwrap();
/// let summary = sim.run(&mut NoopObserver).unwrap();
/// assert_eq!(summary.steps, 100);
/// ```
#[derive(Debug)]
pub struct Simulation<U = ChaCha8Rng> {
    graph: Graph,
    config: SimConfig,
    carriers: Vec<Carrier>,
    occupancy: Occupancy,
    scheduler: Scheduler<U>,
    occupation: OccupationTimes,
    metrics: RunMetrics,
}

impl Simulation<ChaCha8Rng> {
    /// Validate `config`, place carriers, and build the event tree. The
    /// scheduler draws from a ChaCha8 stream seeded with `config.seed`.
    pub fn new(graph: Graph, config: SimConfig) -> Result<Self, ConfigError> {
        let seed = config.seed;
        Self::with_source(graph, config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Restore the initial placement, clear time and counters, and reseed
    /// the scheduler with `seed`.
    ///
    /// Carriers return to the sites they were placed on at construction;
    /// random placements are not redrawn.
    pub fn reset(&mut self, seed: u64) {
        self.config.seed = seed;
        self.restart();
        self.scheduler.reseed(ChaCha8Rng::seed_from_u64(seed));
    }
}

impl<U: UniformSource> Simulation<U> {
    /// Like [`new`](Simulation::new), drawing uniforms from `source`.
    pub fn with_source(graph: Graph, config: SimConfig, source: U) -> Result<Self, ConfigError> {
        config.validate(&graph)?;
        let (carriers, occupancy) = place_carriers(&graph, &config);
        let tree = EventTree::build(&graph, &carriers);
        tracing::info!(
            sites = graph.site_count(),
            channels = graph.channel_count(),
            carriers = carriers.len(),
            events = tree.arena.len(),
            slots = tree.catalog.slot_count(),
            seed = config.seed,
            "simulation built"
        );
        let occupation = OccupationTimes::new(graph.site_count(), config.record_occupation_time);
        Ok(Self {
            scheduler: Scheduler::with_source(tree, source),
            graph,
            config,
            carriers,
            occupancy,
            occupation,
            metrics: RunMetrics::default(),
        })
    }

    fn restart(&mut self) {
        self.occupancy.clear();
        for c in &mut self.carriers {
            c.reset_to_start();
            if !self.graph.site(c.current_site()).is_reservoir() {
                self.occupancy.occupy(c.kind(), c.current_site());
            }
        }
        self.scheduler
            .restart(EventTree::build(&self.graph, &self.carriers));
        self.occupation.clear();
        self.metrics = RunMetrics::default();
    }

    /// Run one VSSM iteration and report a hop to `observer`.
    ///
    /// # Errors
    ///
    /// [`StepError::Deadlock`] if no transfer event has a positive rate.
    /// The state is unchanged and every later call fails the same way.
    pub fn step<O: HopObserver + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> Result<StepOutcome, StepError> {
        let step = self.scheduler.select_and_execute(
            &self.graph,
            &mut self.occupancy,
            &mut self.carriers,
            &mut self.occupation,
        )?;
        let time = self.scheduler.time();
        let index = self.scheduler.steps() - 1;
        self.metrics.steps += 1;
        self.metrics.last_total_rate = step.total_rate;
        self.metrics.last_dt = step.dt;

        let outcome = match step.execution {
            Execution::Moved {
                carrier,
                origin,
                destination,
                channel,
                process,
                revalidated,
            } => {
                self.metrics.hops += 1;
                self.metrics.hops_by_process[process.index()] += 1;
                self.metrics.revalidations += revalidated as u64;
                let record = HopRecord {
                    step: index,
                    time,
                    carrier,
                    kind: self.carriers[carrier.index()].kind(),
                    origin,
                    destination,
                    channel,
                    process,
                };
                observer.on_hop(&record);
                StepOutcome::Hopped(record)
            }
            Execution::Contended {
                carrier,
                channel,
                process,
            } => {
                self.metrics.contended += 1;
                StepOutcome::Contended {
                    carrier,
                    channel,
                    process,
                    time,
                }
            }
        };
        Ok(outcome)
    }

    /// [`step`](Self::step) without an observer.
    pub fn select_and_execute(&mut self) -> Result<StepOutcome, StepError> {
        self.step(&mut NoopObserver)
    }

    /// Step until the configured [`StopCondition`](crate::StopCondition)
    /// holds.
    ///
    /// Bounds are absolute: a second call on a simulation that already
    /// reached `max_steps` returns immediately with zero steps.
    pub fn run<O: HopObserver + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> Result<RunSummary, StepError> {
        let start = self.scheduler.steps();
        let stop = self.config.stop;
        let stop_reason = loop {
            if let Some(reason) = stop.reached(self.scheduler.steps(), self.scheduler.time()) {
                break reason;
            }
            self.step(observer)?;
        };
        let summary = RunSummary {
            steps: self.scheduler.steps() - start,
            time: self.scheduler.time(),
            stop_reason,
            metrics: self.metrics.clone(),
        };
        tracing::info!(
            steps = summary.steps,
            time = summary.time,
            hops = summary.metrics.hops,
            contended = summary.metrics.contended,
            reason = %stop_reason,
            "run finished"
        );
        Ok(summary)
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Simulated time.
    pub fn time(&self) -> f64 {
        self.scheduler.time()
    }

    /// Completed iterations, contended ones included.
    pub fn steps(&self) -> u64 {
        self.scheduler.steps()
    }

    /// The hopping graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The configuration this simulation was built from.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// All carriers in id order.
    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    /// One carrier.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn carrier(&self, id: CarrierId) -> &Carrier {
        &self.carriers[id.index()]
    }

    /// Per-kind occupancy maps.
    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    /// Read access to the event tree.
    pub fn events(&self) -> &EventArena {
        self.scheduler.events()
    }

    /// Escape event of `carrier`.
    pub fn escape_of(&self, carrier: CarrierId) -> EventHandle {
        self.scheduler.tree().escape_of(carrier)
    }

    /// Current total rate of the tree.
    pub fn total_rate(&self) -> f64 {
        self.events().total_rate()
    }

    /// The scheduler's random source.
    pub fn source(&self) -> &U {
        self.scheduler.source()
    }

    /// Per-site occupation-time accumulators.
    pub fn occupation(&self) -> &OccupationTimes {
        &self.occupation
    }

    /// Counters since construction or the last reset.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Total displacement of every carrier, in id order.
    pub fn carrier_displacements(&self) -> Vec<(CarrierId, Vec3)> {
        self.carriers
            .iter()
            .map(|c| (c.id(), c.displacement()))
            .collect()
    }

    /// Mean displacement of the carriers of `kind` divided by the elapsed
    /// time. `None` before any time has passed or if no such carrier exists.
    pub fn mean_velocity(&self, kind: CarrierKind) -> Option<Vec3> {
        let time = self.time();
        let (sum, n) = self
            .carriers
            .iter()
            .filter(|c| c.kind() == kind)
            .fold((Vec3::ZERO, 0usize), |(sum, n), c| (sum + c.displacement(), n + 1));
        if n == 0 || time <= 0.0 {
            return None;
        }
        Some(sum * (1.0 / (n as f64 * time)))
    }

    /// Collections into reservoirs by carriers of `kind`.
    pub fn collected(&self, kind: CarrierKind) -> u64 {
        self.carriers
            .iter()
            .filter(|c| c.kind() == kind)
            .map(Carrier::collections)
            .sum()
    }

    /// Injections out of reservoirs by carriers of `kind`.
    pub fn injected(&self, kind: CarrierKind) -> u64 {
        self.carriers
            .iter()
            .filter(|c| c.kind() == kind)
            .map(Carrier::injections)
            .sum()
    }

    /// Verify exclusion, occupancy consistency, cached rates, child sets,
    /// and that no unavailable event has a free destination.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        invariants::check(
            &self.graph,
            &self.occupancy,
            &self.carriers,
            self.scheduler.tree(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StopCondition;
    use crate::observer::TrajectoryRecorder;
    use crate::scheduler::ScriptedUniforms;
    use hopkmc_core::{RateTable, SiteId};

    fn pair() -> Graph {
        let mut g = Graph::new();
        let a = g.add_site(Vec3::ZERO).unwrap();
        let b = g.add_site(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let r = RateTable::new()
            .with(ProcessKind::ElectronHop, 1.0)
            .with(ProcessKind::HoleHop, 0.5);
        g.connect(a, b, r).unwrap();
        g.connect(b, a, r).unwrap();
        g
    }

    #[test]
    fn invalid_config_is_rejected_before_building() {
        let err = Simulation::new(pair(), SimConfig::default()).unwrap_err();
        assert_eq!(err, ConfigError::NoCarriers);
    }

    #[test]
    fn hop_is_reported_with_its_step_index() {
        let cfg = SimConfig::default().with_carrier(CarrierKind::Electron, SiteId(0));
        let mut sim =
            Simulation::with_source(pair(), cfg, ScriptedUniforms::new([0.5, 0.5, 0.5, 0.5]))
                .unwrap();
        let mut rec = TrajectoryRecorder::new();
        sim.step(&mut rec).unwrap();
        sim.step(&mut rec).unwrap();
        let steps: Vec<_> = rec.records().iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![0, 1]);
        assert_eq!(rec.records()[0].destination, SiteId(1));
        assert_eq!(rec.records()[1].destination, SiteId(0));
        assert_eq!(rec.records()[1].time, sim.time());
        assert_eq!(sim.carrier(CarrierId(0)).displacement(), Vec3::ZERO);
        assert_eq!(sim.metrics().hops_for(ProcessKind::ElectronHop), 2);
    }

    #[test]
    fn run_stops_at_step_bound_and_is_absolute() {
        let cfg = SimConfig::seeded(5)
            .with_carrier(CarrierKind::Hole, SiteId(1))
            .with_stop(StopCondition::steps(25));
        let mut sim = Simulation::new(pair(), cfg).unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.steps, 25);
        assert_eq!(summary.stop_reason, StopReason::MaxSteps);
        assert_eq!(summary.metrics.hops, 25);
        let again = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(again.steps, 0);
    }

    #[test]
    fn run_stops_at_time_bound() {
        let cfg = SimConfig::seeded(5)
            .with_carrier(CarrierKind::Electron, SiteId(0))
            .with_stop(StopCondition::time(10.0));
        let mut sim = Simulation::new(pair(), cfg).unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.stop_reason, StopReason::MaxTime);
        assert!(summary.time >= 10.0);
    }

    #[test]
    fn reset_replays_the_same_trajectory() {
        let cfg = SimConfig::seeded(11)
            .with_carrier(CarrierKind::Electron, SiteId(0))
            .with_carrier(CarrierKind::Hole, SiteId(0))
            .with_stop(StopCondition::steps(50));
        let mut sim = Simulation::new(pair(), cfg).unwrap();
        let mut first = TrajectoryRecorder::new();
        sim.run(&mut first).unwrap();

        sim.reset(11);
        assert_eq!(sim.steps(), 0);
        assert_eq!(sim.time(), 0.0);
        assert_eq!(sim.carrier(CarrierId(0)).current_site(), SiteId(0));
        let mut second = TrajectoryRecorder::new();
        sim.run(&mut second).unwrap();
        assert_eq!(first.records(), second.records());
        assert_eq!(sim.check_invariants(), Ok(()));
    }

    #[test]
    fn mean_velocity_needs_time_and_carriers() {
        let cfg = SimConfig::seeded(1)
            .with_carrier(CarrierKind::Electron, SiteId(0))
            .with_stop(StopCondition::steps(1));
        let mut sim = Simulation::new(pair(), cfg).unwrap();
        assert_eq!(sim.mean_velocity(CarrierKind::Electron), None);
        sim.run(&mut NoopObserver).unwrap();
        let v = sim.mean_velocity(CarrierKind::Electron).unwrap();
        assert_eq!(v, Vec3::new(1.0 / sim.time(), 0.0, 0.0));
        assert_eq!(sim.mean_velocity(CarrierKind::Exciton), None);
    }
}
