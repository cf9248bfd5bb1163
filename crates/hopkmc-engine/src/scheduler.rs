//! The VSSM scheduler: clock, random source, and one-step selection.
//!
//! Each step draws two uniforms from the scheduler's own source, in a
//! fixed order:
//!
//! 1. `u` for the waiting time, `dt = -ln(1 - u) / R`, redrawn while
//!    `u == 0`;
//! 2. `u'` for the selection offset `v = u' * R`.
//!
//! `v` then descends the tree (see [`EventArena::select`]). Because the
//! draw order and enumeration order are fixed, a given sequence of
//! uniforms always yields the same trajectory.

use std::collections::VecDeque;

use hopkmc_core::StepError;
use hopkmc_graph::{Graph, Occupancy};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::arena::EventArena;
use crate::carrier::Carrier;
use crate::occupation::OccupationTimes;
use crate::tree::{EventTree, Execution};

// ── UniformSource ───────────────────────────────────────────────

/// Source of uniform draws in `[0, 1)`.
///
/// Owned exclusively by one scheduler. Implemented for [`ChaCha8Rng`]
/// and for [`ScriptedUniforms`], which replays a fixed sequence.
pub trait UniformSource {
    /// The next draw in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

impl UniformSource for ChaCha8Rng {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// A fixed, pre-recorded sequence of uniforms.
///
/// # Panics
///
/// [`next_uniform`](UniformSource::next_uniform) panics once the
/// sequence is exhausted.
#[derive(Clone, Debug, Default)]
pub struct ScriptedUniforms {
    draws: VecDeque<f64>,
    consumed: usize,
}

impl ScriptedUniforms {
    /// Replay `draws` in order.
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Draws handed out so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Draws still queued.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl UniformSource for ScriptedUniforms {
    fn next_uniform(&mut self) -> f64 {
        let u = self
            .draws
            .pop_front()
            .unwrap_or_else(|| panic!("scripted uniforms exhausted after {} draws", self.consumed));
        self.consumed += 1;
        u
    }
}

// ── Scheduler ───────────────────────────────────────────────────

/// What one call to [`Scheduler::select_and_execute`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Step {
    pub(crate) dt: f64,
    pub(crate) total_rate: f64,
    pub(crate) execution: Execution,
}

/// Event tree plus the clock and random source that drive it.
#[derive(Clone, Debug)]
pub struct Scheduler<U = ChaCha8Rng> {
    tree: EventTree,
    source: U,
    time: f64,
    steps: u64,
}

impl<U: UniformSource> Scheduler<U> {
    pub(crate) fn with_source(tree: EventTree, source: U) -> Self {
        Self {
            tree,
            source,
            time: 0.0,
            steps: 0,
        }
    }

    /// Simulated time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Completed iterations, contended ones included.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Read access to the event arena.
    pub fn events(&self) -> &EventArena {
        &self.tree.arena
    }

    /// The random source.
    pub fn source(&self) -> &U {
        &self.source
    }

    pub(crate) fn tree(&self) -> &EventTree {
        &self.tree
    }

    /// Exponential waiting time for total rate `total`.
    fn draw_waiting_time(&mut self, total: f64) -> f64 {
        let mut u = self.source.next_uniform();
        while u == 0.0 {
            u = self.source.next_uniform();
        }
        -(1.0 - u).ln() / total
    }

    fn draw_selection(&mut self, total: f64) -> f64 {
        self.source.next_uniform() * total
    }

    /// One VSSM iteration.
    ///
    /// Returns [`StepError::Deadlock`] without drawing or advancing the
    /// clock if the total rate is zero.
    pub(crate) fn select_and_execute(
        &mut self,
        graph: &Graph,
        occupancy: &mut Occupancy,
        carriers: &mut [Carrier],
        occupation: &mut OccupationTimes,
    ) -> Result<Step, StepError> {
        let total = self.tree.arena.total_rate();
        if total <= 0.0 {
            tracing::warn!(time = self.time, step = self.steps, "no legal move left");
            return Err(StepError::Deadlock {
                time: self.time,
                step: self.steps,
            });
        }

        let dt = self.draw_waiting_time(total);
        occupation.accumulate(occupancy, dt);
        self.time += dt;

        let v = self.draw_selection(total);
        let transfer = self
            .tree
            .arena
            .select(v)
            .expect("positive total rate implies a selectable transfer event");
        let execution = self.tree.execute(transfer, graph, occupancy, carriers);
        self.steps += 1;

        Ok(Step {
            dt,
            total_rate: total,
            execution,
        })
    }

    /// Replace the tree and clock, keeping the source.
    pub(crate) fn restart(&mut self, tree: EventTree) {
        self.tree = tree;
        self.time = 0.0;
        self.steps = 0;
    }

    pub(crate) fn reseed(&mut self, source: U) {
        self.source = source;
    }
}
