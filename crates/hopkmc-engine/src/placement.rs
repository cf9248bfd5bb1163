//! Initial carrier placement.
//!
//! Explicit placements are reserved first, so random draws never land
//! on them. Random placements are then resolved in list order, each
//! drawing from the bulk sites still free for its kind (kept in site-id
//! order). The placement stream is seeded from the configuration seed
//! but is independent of the scheduler's stream.

use hopkmc_core::{CarrierId, CarrierKind, SiteId};
use hopkmc_graph::{Graph, Occupancy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::carrier::Carrier;
use crate::config::{CarrierPlacement, SimConfig};

const PLACEMENT_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Place every carrier of a validated configuration.
///
/// Returns the carriers in id order and the matching occupancy maps.
pub(crate) fn place_carriers(graph: &Graph, config: &SimConfig) -> (Vec<Carrier>, Occupancy) {
    let mut occupancy = Occupancy::new();
    for placement in &config.carriers {
        if let CarrierPlacement::Explicit { kind, site } = *placement {
            if !graph.site(site).is_reservoir() {
                occupancy.occupy(kind, site);
            }
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ PLACEMENT_STREAM);
    let mut free: [Option<Vec<SiteId>>; CarrierKind::COUNT] = Default::default();
    let mut carriers = Vec::with_capacity(config.carrier_count());

    for placement in &config.carriers {
        match *placement {
            CarrierPlacement::Explicit { kind, site } => {
                let id = CarrierId(carriers.len() as u32);
                carriers.push(Carrier::new(id, kind, site));
            }
            CarrierPlacement::Random { kind, count } => {
                let pool = free[kind.index()].get_or_insert_with(|| {
                    graph
                        .sites()
                        .filter(|s| !s.is_reservoir() && !occupancy.is_occupied(kind, s.id()))
                        .map(|s| s.id())
                        .collect()
                });
                for _ in 0..count {
                    let site = pool.swap_remove(rng.random_range(0..pool.len()));
                    occupancy.occupy(kind, site);
                    let id = CarrierId(carriers.len() as u32);
                    carriers.push(Carrier::new(id, kind, site));
                }
            }
        }
    }
    (carriers, occupancy)
}
