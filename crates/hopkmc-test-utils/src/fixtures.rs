//! Reusable hopping-graph fixtures.
//!
//! Every fixture places sites on a unit grid so displacements are exact
//! small integers. Bulk channels carry the same rate for every bulk
//! process unless stated otherwise, so any carrier kind can move.

use hopkmc_core::{ProcessKind, RateTable, SiteId, Vec3};
use hopkmc_graph::Graph;

/// Every bulk process (electron, hole, Dexter, Förster) at `rate`.
pub fn uniform_rates(rate: f64) -> RateTable {
    RateTable::new()
        .with(ProcessKind::ElectronHop, rate)
        .with(ProcessKind::HoleHop, rate)
        .with(ProcessKind::Dexter, rate)
        .with(ProcessKind::Forster, rate)
}

fn grid_site(g: &mut Graph, x: f64, y: f64) -> SiteId {
    g.add_site(Vec3::new(x, y, 0.0))
        .expect("fixture positions are finite")
}

fn link(g: &mut Graph, a: SiteId, b: SiteId, forward: RateTable, backward: RateTable) {
    g.connect(a, b, forward).expect("fixture channel is valid");
    g.connect(b, a, backward).expect("fixture channel is valid");
}

/// `n` sites on the x axis, neighbours linked both ways.
pub fn line(n: usize, rate: f64) -> Graph {
    biased_line(n, rate, rate)
}

/// Like [`line`], with `forward` rates along +x and `backward` along -x.
pub fn biased_line(n: usize, forward: f64, backward: f64) -> Graph {
    let mut g = Graph::new();
    let sites: Vec<_> = (0..n).map(|i| grid_site(&mut g, i as f64, 0.0)).collect();
    for w in sites.windows(2) {
        link(
            &mut g,
            w[0],
            w[1],
            uniform_rates(forward),
            uniform_rates(backward),
        );
    }
    g
}

/// `n` sites on a periodic ring. The wrap-around channels carry a unit
/// displacement, so a carrier circling the ring accumulates `n` along x.
pub fn ring(n: usize, rate: f64) -> Graph {
    assert!(n >= 3, "a ring needs at least 3 sites");
    let mut g = line(n, rate);
    let (first, last) = (SiteId(0), SiteId(n as u32 - 1));
    g.add_channel(last, first, Vec3::new(1.0, 0.0, 0.0), uniform_rates(rate))
        .expect("fixture channel is valid");
    g.add_channel(first, last, Vec3::new(-1.0, 0.0, 0.0), uniform_rates(rate))
        .expect("fixture channel is valid");
    g
}

/// `width * height` sites on an open square lattice with 4-neighbour
/// links. Site `(x, y)` has id `y * width + x`.
pub fn square_lattice(width: usize, height: usize, rate: f64) -> Graph {
    let mut g = Graph::new();
    for y in 0..height {
        for x in 0..width {
            grid_site(&mut g, x as f64, y as f64);
        }
    }
    let id = |x: usize, y: usize| SiteId((y * width + x) as u32);
    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                link(&mut g, id(x, y), id(x + 1, y), uniform_rates(rate), uniform_rates(rate));
            }
            if y + 1 < height {
                link(&mut g, id(x, y), id(x, y + 1), uniform_rates(rate), uniform_rates(rate));
            }
        }
    }
    g
}

/// Two sites linked both ways.
pub fn pair(rate: f64) -> (Graph, [SiteId; 2]) {
    let mut g = Graph::new();
    let a = grid_site(&mut g, 0.0, 0.0);
    let b = grid_site(&mut g, 1.0, 0.0);
    link(&mut g, a, b, uniform_rates(rate), uniform_rates(rate));
    (g, [a, b])
}

/// Sites A, B, C with A → B at rate 2 and A → C at rate 1, no way back.
pub fn star_abc() -> (Graph, [SiteId; 3]) {
    let mut g = Graph::new();
    let a = grid_site(&mut g, 0.0, 0.0);
    let b = grid_site(&mut g, 1.0, 0.0);
    let c = grid_site(&mut g, 0.0, 1.0);
    g.connect(a, b, uniform_rates(2.0))
        .expect("fixture channel is valid");
    g.connect(a, c, uniform_rates(1.0))
        .expect("fixture channel is valid");
    (g, [a, b, c])
}

/// A single site with no channels.
pub fn isolated_site() -> (Graph, SiteId) {
    let mut g = Graph::new();
    let a = grid_site(&mut g, 0.0, 0.0);
    (g, a)
}

/// A bulk chain between two electrodes.
#[derive(Clone, Debug)]
pub struct ElectrodeChain {
    pub graph: Graph,
    /// Reservoir at x = -1, injecting into the first bulk site.
    pub source: SiteId,
    /// Reservoir at x = n, collecting from the last bulk site.
    pub drain: SiteId,
    /// Bulk sites in chain order.
    pub bulk: Vec<SiteId>,
}

/// `n` bulk sites between a source and a drain electrode.
///
/// The source injects into the first site at `injection`; that site
/// returns to the source at `back`. The last site is collected by the
/// drain at `collection`. Bulk links hop at `hop` both ways.
pub fn electrode_chain(n: usize, injection: f64, hop: f64, collection: f64, back: f64) -> ElectrodeChain {
    assert!(n >= 1, "an electrode chain needs a bulk site");
    let mut graph = Graph::new();
    let source = graph
        .add_reservoir(Vec3::new(-1.0, 0.0, 0.0))
        .expect("fixture positions are finite");
    let bulk: Vec<_> = (0..n).map(|i| grid_site(&mut graph, i as f64, 0.0)).collect();
    let drain = graph
        .add_reservoir(Vec3::new(n as f64, 0.0, 0.0))
        .expect("fixture positions are finite");

    graph
        .connect(
            source,
            bulk[0],
            RateTable::new().with(ProcessKind::Injection, injection),
        )
        .expect("fixture channel is valid");
    graph
        .connect(bulk[0], source, RateTable::new().with(ProcessKind::Return, back))
        .expect("fixture channel is valid");
    for w in bulk.windows(2) {
        link(&mut graph, w[0], w[1], uniform_rates(hop), uniform_rates(hop));
    }
    graph
        .connect(
            bulk[n - 1],
            drain,
            RateTable::new().with(ProcessKind::Collection, collection),
        )
        .expect("fixture channel is valid");

    ElectrodeChain {
        graph,
        source,
        drain,
        bulk,
    }
}
