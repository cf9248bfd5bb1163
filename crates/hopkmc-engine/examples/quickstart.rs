//! hopkmc Quickstart: a hole-transport device from scratch.
//!
//! Demonstrates:
//!   1. Building a graph: a 6x3 lattice between two electrodes
//!   2. Configuring carriers and a stop condition
//!   3. Running with a trajectory recorder, then with a channel sink
//!      feeding a consumer thread
//!   4. Reading displacements, velocities, occupation, and counters
//!
//! Run with:
//!   RUST_LOG=hopkmc_engine=debug cargo run --example quickstart

use std::thread;

use hopkmc_core::{CarrierKind, ProcessKind, RateTable, SiteId, Vec3};
use hopkmc_engine::{ChannelSink, SimConfig, Simulation, StopCondition, TrajectoryRecorder};
use hopkmc_graph::Graph;
use tracing_subscriber::EnvFilter;

// ─── Device parameters ──────────────────────────────────────────

const COLS: usize = 6;
const ROWS: usize = 3;
/// Hops along +x are faster than along -x: a field pushes holes to the drain.
const FORWARD: f64 = 2.0;
const BACKWARD: f64 = 0.5;
const TRANSVERSE: f64 = 1.0;
const INJECTION: f64 = 1.0;
const COLLECTION: f64 = 4.0;

fn hole(rate: f64) -> RateTable {
    RateTable::new().with(ProcessKind::HoleHop, rate)
}

fn build_device() -> Result<(Graph, SiteId, SiteId), Box<dyn std::error::Error>> {
    let mut g = Graph::new();
    let source = g.add_reservoir(Vec3::new(-1.0, 1.0, 0.0))?;
    let mut ids = Vec::with_capacity(COLS * ROWS);
    for y in 0..ROWS {
        for x in 0..COLS {
            ids.push(g.add_site(Vec3::new(x as f64, y as f64, 0.0))?);
        }
    }
    let drain = g.add_reservoir(Vec3::new(COLS as f64, 1.0, 0.0))?;
    let at = |x: usize, y: usize| ids[y * COLS + x];

    for y in 0..ROWS {
        g.connect(source, at(0, y), RateTable::new().with(ProcessKind::Injection, INJECTION))?;
        g.connect(
            at(COLS - 1, y),
            drain,
            RateTable::new().with(ProcessKind::Collection, COLLECTION),
        )?;
        for x in 0..COLS {
            if x + 1 < COLS {
                g.connect(at(x, y), at(x + 1, y), hole(FORWARD))?;
                g.connect(at(x + 1, y), at(x, y), hole(BACKWARD))?;
            }
            if y + 1 < ROWS {
                g.connect(at(x, y), at(x, y + 1), hole(TRANSVERSE))?;
                g.connect(at(x, y + 1), at(x, y), hole(TRANSVERSE))?;
            }
        }
    }
    Ok((g, source, drain))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== hopkmc Quickstart ===\n");

    // 1. Graph.
    let (graph, source, drain) = build_device()?;
    println!(
        "Device: {} bulk sites, {} channels, source {source}, drain {drain}",
        graph.bulk_site_count(),
        graph.channel_count()
    );

    // 2. Config: four holes already inside, four waiting at the source.
    let mut config = SimConfig::seeded(42)
        .with_random_carriers(CarrierKind::Hole, 4)
        .with_stop(StopCondition::steps(2_000));
    for _ in 0..4 {
        config = config.with_carrier(CarrierKind::Hole, source);
    }
    let mut sim = Simulation::new(graph, config)?;

    // 3a. Run, recording every hop.
    let mut recorder = TrajectoryRecorder::new();
    match sim.run(&mut recorder) {
        Ok(summary) => println!(
            "Ran {} steps to t = {:.3} ({}): {} hops, {} contended",
            summary.steps,
            summary.time,
            summary.stop_reason,
            summary.metrics.hops,
            summary.metrics.contended
        ),
        // Every hole can end up in the drain, which has no way out.
        Err(e) => println!("Run ended early: {e}"),
    }
    for record in recorder.records().iter().take(5) {
        println!("  {record}");
    }

    // 4. Observables.
    println!("\nInjected: {}", sim.injected(CarrierKind::Hole));
    println!("Collected: {}", sim.collected(CarrierKind::Hole));
    if let Some(v) = sim.mean_velocity(CarrierKind::Hole) {
        println!("Mean hole velocity: {v}");
    }
    for (id, d) in sim.carrier_displacements() {
        println!("  {id}: displacement {d}, now on {}", sim.carrier(id).current_site());
    }
    sim.check_invariants()?;

    // 3b. Reset and stream hops to a consumer thread instead.
    sim.reset(7);
    let (tx, rx) = crossbeam_channel::unbounded::<hopkmc_core::HopRecord>();
    let consumer = thread::spawn(move || {
        let mut by_process = [0u64; ProcessKind::COUNT];
        for record in rx {
            by_process[record.process.index()] += 1;
        }
        by_process
    });
    let mut sink = ChannelSink::new(tx);
    let _ = sim.run(&mut sink);
    drop(sink);
    let by_process = consumer.join().map_err(|_| "consumer thread panicked")?;
    println!("\nAfter reset (seed 7):");
    for process in ProcessKind::ALL {
        let n = by_process[process.index()];
        if n > 0 {
            println!("  {process}: {n}");
        }
    }
    Ok(())
}
