use crate::data::RoomId;
use crate::topology::Topology;
use log::trace;
use rand::Rng;
use rand::seq::index;

/// Number of rooms a given occupancy rate translates to, rounded down.
pub fn occupied_count(total: usize, rate: f64) -> usize {
    ((total as f64) * rate).floor() as usize
}

/// Draws `floor(total * rate)` distinct rooms uniformly at random.
///
/// `rate` is expected to be within [0, 1]; range checking happens in
/// [`crate::store::OccupancyStore::occupy_random`]. The result is sorted by
/// id so a fixed seed always yields the same list.
pub fn sample_occupancy<R: Rng + ?Sized>(topology: &Topology, rate: f64, rng: &mut R) -> Vec<RoomId> {
    let ids: Vec<RoomId> = topology.ids().collect();
    let amount = occupied_count(ids.len(), rate).min(ids.len());

    let mut picked: Vec<RoomId> = index::sample(rng, ids.len(), amount)
        .into_iter()
        .map(|i| ids[i])
        .collect();
    picked.sort_unstable();

    trace!("Sampled {} of {} rooms at rate {}", picked.len(), ids.len(), rate);
    picked
}
