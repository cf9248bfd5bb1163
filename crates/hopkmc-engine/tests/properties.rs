//! Property tests: exclusion, rate conservation, and re-validation
//! completeness over random lattices, populations, and seeds.
//!
//! After every step the full state is checked with
//! [`Simulation::check_invariants`], which compares each escape's cached
//! rate bit for bit with a fresh sum and rejects any unavailable event
//! whose destination is free.

use hopkmc_core::{CarrierKind, SiteId, StepError};
use hopkmc_engine::{SimConfig, Simulation, StepOutcome, StopCondition};
use hopkmc_test_utils::{electrode_chain, square_lattice};
use proptest::prelude::*;

fn assert_exclusion<U: hopkmc_engine::UniformSource>(sim: &Simulation<U>) {
    for kind in CarrierKind::ALL {
        let mut sites: Vec<SiteId> = sim
            .carriers()
            .iter()
            .filter(|c| c.kind() == kind && !sim.graph().site(c.current_site()).is_reservoir())
            .map(|c| c.current_site())
            .collect();
        let n = sites.len();
        sites.sort();
        sites.dedup();
        assert_eq!(sites.len(), n, "two {kind} carriers share a site");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn lattice_runs_keep_every_invariant(
        width in 2usize..5,
        height in 1usize..4,
        electrons in 0usize..6,
        holes in 0usize..6,
        excitons in 0usize..6,
        seed in any::<u64>(),
    ) {
        let sites = width * height;
        let clamp = |n: usize| n.min(sites - 1);
        let (e, h, x) = (clamp(electrons), clamp(holes), clamp(excitons));
        prop_assume!(e + h + x > 0);

        let cfg = SimConfig::seeded(seed)
            .with_random_carriers(CarrierKind::Electron, e)
            .with_random_carriers(CarrierKind::Hole, h)
            .with_random_carriers(CarrierKind::Exciton, x)
            .with_stop(StopCondition::steps(150));
        let mut sim = Simulation::new(square_lattice(width, height, 1.0), cfg).unwrap();
        sim.check_invariants().unwrap();

        for _ in 0..150 {
            // Every kind leaves at least one site free on a connected
            // lattice, so a legal move always exists.
            let outcome = sim.select_and_execute();
            prop_assert!(outcome.is_ok(), "unexpected {:?}", outcome);
            assert_exclusion(&sim);
            if let Err(v) = sim.check_invariants() {
                prop_assert!(false, "invariant violated: {}", v);
            }
            let fresh = sim.events().fresh_rate(sim.events().head());
            prop_assert_eq!(sim.total_rate().to_bits(), fresh.to_bits());
        }
    }

    #[test]
    fn crowded_line_contends_but_never_sticks(seed in any::<u64>(), n in 3usize..8) {
        // n - 1 electrons on n sites: most selections are contended.
        let graph = hopkmc_test_utils::line(n, 1.0);
        let cfg = SimConfig::seeded(seed)
            .with_random_carriers(CarrierKind::Electron, n - 1)
            .with_stop(StopCondition::steps(200));
        let mut sim = Simulation::new(graph, cfg).unwrap();
        for _ in 0..200 {
            let outcome = sim.select_and_execute().unwrap();
            if let StepOutcome::Hopped(h) = outcome {
                prop_assert!(sim.occupancy().is_occupied(CarrierKind::Electron, h.destination));
                prop_assert!(!sim.occupancy().is_occupied(CarrierKind::Electron, h.origin));
            }
            if let Err(v) = sim.check_invariants() {
                prop_assert!(false, "invariant violated: {}", v);
            }
        }
    }

    #[test]
    fn electrode_chain_drains_every_carrier(seed in any::<u64>(), holes in 1usize..4, n in 1usize..5) {
        let chain = electrode_chain(n, 1.0, 1.0, 1.0, 0.3);
        let mut cfg = SimConfig::seeded(seed).with_stop(StopCondition::steps(1));
        for _ in 0..holes {
            cfg = cfg.with_carrier(CarrierKind::Hole, chain.source);
        }
        let mut sim = Simulation::new(chain.graph.clone(), cfg).unwrap();

        let mut steps = 0u64;
        let deadlock = loop {
            match sim.select_and_execute() {
                Ok(_) => {
                    if let Err(v) = sim.check_invariants() {
                        prop_assert!(false, "invariant violated: {}", v);
                    }
                    steps += 1;
                    prop_assert!(steps < 200_000, "chain never drained");
                }
                Err(e) => break e,
            }
        };
        let is_deadlock = matches!(deadlock, StepError::Deadlock { .. });
        prop_assert!(is_deadlock);
        prop_assert!(sim.carriers().iter().all(|c| c.current_site() == chain.drain));
        prop_assert_eq!(sim.collected(CarrierKind::Hole), holes as u64);
        prop_assert!(sim.injected(CarrierKind::Hole) >= holes as u64);
        prop_assert!(sim.occupancy().map(CarrierKind::Hole).is_empty());
    }
}
