use crate::data::{OccupancySnapshot, RoomId, RoomStatus};
use crate::error::{BookingError, OccupancyError};
use crate::generator;
use crate::topology::Topology;
use log::{debug, info};
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Occupied rooms over a fixed topology.
///
/// Every mutation happens under one lock, so a booking's validation and its
/// commit can never interleave with another request.
#[derive(Debug)]
pub struct OccupancyStore {
    topology: Arc<Topology>,
    occupied: Mutex<BTreeSet<RoomId>>,
}

impl OccupancyStore {
    pub fn new(topology: Arc<Topology>) -> Self {
        Self {
            topology,
            occupied: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<RoomId>> {
        // The set is always left consistent, so a panic elsewhere does not
        // invalidate it.
        self.occupied.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Free rooms in ascending id order.
    pub fn available_rooms(&self) -> Vec<RoomId> {
        let occupied = self.lock();
        self.topology
            .ids()
            .filter(|id| !occupied.contains(id))
            .collect()
    }

    /// Occupied rooms in ascending id order.
    pub fn occupied_rooms(&self) -> Vec<RoomId> {
        self.lock().iter().copied().collect()
    }

    /// `false` for ids outside the topology.
    pub fn is_occupied(&self, id: RoomId) -> bool {
        self.lock().contains(&id)
    }

    pub fn snapshot(&self) -> OccupancySnapshot {
        let occupied = self.lock();
        let rooms: Vec<RoomStatus> = self
            .topology
            .rooms()
            .map(|room| RoomStatus {
                room: *room,
                occupied: occupied.contains(&room.id),
            })
            .collect();
        let total = rooms.len();
        let occupied_count = occupied.len();
        OccupancySnapshot {
            rooms,
            total,
            available: total - occupied_count,
            occupied: occupied_count,
        }
    }

    /// Books every room in `ids` or none of them.
    ///
    /// Duplicates are collapsed. The first id (in request order) that is
    /// unknown or already taken is reported and nothing is committed.
    /// Returns the distinct ids booked, in request order.
    pub fn book(&self, ids: &[RoomId]) -> Result<Vec<RoomId>, BookingError> {
        if ids.is_empty() {
            return Err(BookingError::EmptyRequest);
        }

        let mut requested = Vec::with_capacity(ids.len());
        let mut seen = BTreeSet::new();
        for &id in ids {
            if seen.insert(id) {
                requested.push(id);
            }
        }

        let mut occupied = self.lock();
        for &id in &requested {
            if !self.topology.contains(id) {
                debug!("Booking rejected: room {} does not exist", id);
                return Err(BookingError::NotFound(id));
            }
            if occupied.contains(&id) {
                debug!("Booking rejected: room {} is already occupied", id);
                return Err(BookingError::AlreadyOccupied(id));
            }
        }
        occupied.extend(requested.iter().copied());

        info!("Booked rooms {:?}", requested);
        Ok(requested)
    }

    /// Frees every room. Returns the number of available rooms afterwards.
    pub fn reset(&self) -> usize {
        self.lock().clear();
        info!("All bookings have been reset");
        self.topology.len()
    }

    /// Replaces the occupancy set with `floor(total * rate)` random rooms.
    ///
    /// Rates outside [0, 1] are rejected rather than clamped.
    pub fn occupy_random<R: Rng + ?Sized>(&self, rate: f64, rng: &mut R) -> Result<usize, OccupancyError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(OccupancyError::InvalidRate(rate));
        }

        let picked = generator::sample_occupancy(&self.topology, rate, rng);
        let count = picked.len();

        let mut occupied = self.lock();
        occupied.clear();
        occupied.extend(picked);

        info!("Generated random occupancy: {} rooms occupied", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::thread;

    fn hotel_store() -> OccupancyStore {
        OccupancyStore::new(Arc::new(Topology::hotel().unwrap()))
    }

    #[test]
    fn starts_empty() {
        let store = hotel_store();
        assert_eq!(store.available_rooms().len(), 97);
        assert!(store.occupied_rooms().is_empty());
        assert!(!store.is_occupied(101));
    }

    #[test]
    fn unknown_room_is_not_occupied() {
        let store = hotel_store();
        assert!(!store.is_occupied(9999));
    }

    #[test]
    fn book_marks_rooms() {
        let store = hotel_store();
        assert_eq!(store.book(&[101, 102]).unwrap(), vec![101, 102]);
        assert!(store.is_occupied(101));
        assert!(store.is_occupied(102));
        assert_eq!(store.available_rooms().len(), 95);
        assert!(!store.available_rooms().contains(&101));
    }

    #[test]
    fn book_is_all_or_nothing() {
        let store = hotel_store();
        store.book(&[101]).unwrap();

        let err = store.book(&[101, 102]).unwrap_err();
        assert_eq!(err, BookingError::AlreadyOccupied(101));
        assert!(!store.is_occupied(102));

        let err = store.book(&[103, 4242]).unwrap_err();
        assert_eq!(err, BookingError::NotFound(4242));
        assert!(!store.is_occupied(103));
        assert_eq!(store.occupied_rooms(), vec![101]);
    }

    #[test]
    fn book_reports_first_failure_in_request_order() {
        let store = hotel_store();
        store.book(&[105]).unwrap();
        assert_eq!(store.book(&[9999, 105]).unwrap_err(), BookingError::NotFound(9999));
        assert_eq!(store.book(&[105, 9999]).unwrap_err(), BookingError::AlreadyOccupied(105));
    }

    #[test]
    fn book_rejects_empty_and_collapses_duplicates() {
        let store = hotel_store();
        assert_eq!(store.book(&[]).unwrap_err(), BookingError::EmptyRequest);
        assert_eq!(store.book(&[201, 201, 202]).unwrap(), vec![201, 202]);
        assert_eq!(store.occupied_rooms(), vec![201, 202]);
    }

    #[test]
    fn reset_is_idempotent() {
        let store = hotel_store();
        store.book(&[101, 202, 303]).unwrap();
        let once = store.reset();
        let twice = store.reset();
        assert_eq!(once, 97);
        assert_eq!(once, twice);
        assert_eq!(store.available_rooms().len(), 97);
    }

    #[test]
    fn occupy_random_extremes() {
        let store = hotel_store();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(store.occupy_random(1.0, &mut rng).unwrap(), 97);
        assert!(store.available_rooms().is_empty());
        assert_eq!(store.available_rooms().len() + store.occupied_rooms().len(), 97);

        assert_eq!(store.occupy_random(0.0, &mut rng).unwrap(), 0);
        assert_eq!(store.available_rooms().len(), 97);
        assert_eq!(store.available_rooms().len() + store.occupied_rooms().len(), 97);
    }

    #[test]
    fn occupy_random_replaces_previous_state() {
        let store = hotel_store();
        store.book(&[101, 102, 103, 104, 105, 106]).unwrap();
        let count = store.occupy_random(0.3, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(count, 29);
        assert_eq!(store.occupied_rooms().len(), 29);
    }

    #[test]
    fn occupy_random_is_reproducible() {
        let a = hotel_store();
        let b = hotel_store();
        a.occupy_random(0.4, &mut StdRng::seed_from_u64(99)).unwrap();
        b.occupy_random(0.4, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a.occupied_rooms(), b.occupied_rooms());
    }

    #[test]
    fn occupy_random_rejects_bad_rate() {
        let store = hotel_store();
        store.book(&[101]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(store.occupy_random(1.5, &mut rng), Err(OccupancyError::InvalidRate(_))));
        assert!(store.occupy_random(-0.1, &mut rng).is_err());
        assert!(store.occupy_random(f64::NAN, &mut rng).is_err());
        assert_eq!(store.occupied_rooms(), vec![101]);
    }

    #[test]
    fn snapshot_counts() {
        let store = hotel_store();
        store.book(&[101, 1007]).unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.total, 97);
        assert_eq!(snapshot.occupied, 2);
        assert_eq!(snapshot.available, 95);
        assert_eq!(snapshot.rooms.iter().filter(|r| r.occupied).count(), 2);
        assert_eq!(snapshot.rooms[0].room.id, 101);
    }

    #[test]
    fn concurrent_overlapping_bookings_only_one_wins() {
        let store = Arc::new(hotel_store());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                // every request contains room 505
                let ids = vec![501 + (i % 4), 505, 506 + (i % 4)];
                thread::spawn(move || store.book(&ids).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(store.occupied_rooms().len(), 3);
    }
}
