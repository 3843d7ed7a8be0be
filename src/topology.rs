use crate::data::{Floor, Position, Room, RoomId};
use crate::error::TopologyError;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Rooms per floor in the default building: floors 1-9 hold 10 rooms, the
/// top floor holds 7.
pub const DEFAULT_FLOOR_SIZES: [u32; 10] = [10, 10, 10, 10, 10, 10, 10, 10, 10, 7];

/// Fixed floor/position layout of every room. Built once and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct Topology {
    rooms: BTreeMap<RoomId, Room>,
}

impl Topology {
    /// Validates an arbitrary room list.
    pub fn new(rooms: impl IntoIterator<Item = Room>) -> Result<Self, TopologyError> {
        let mut by_id = BTreeMap::new();
        let mut placements: HashMap<(Floor, Position), RoomId> = HashMap::new();

        for room in rooms {
            if room.floor == 0 || room.position == 0 {
                return Err(TopologyError::InvalidPlacement(room.id));
            }
            if let Some(&first) = placements.get(&room.key()) {
                return Err(TopologyError::DuplicatePlacement {
                    floor: room.floor,
                    position: room.position,
                    first,
                    second: room.id,
                });
            }
            if by_id.insert(room.id, room).is_some() {
                return Err(TopologyError::DuplicateRoom(room.id));
            }
            placements.insert(room.key(), room.id);
        }

        debug!("Topology built with {} rooms", by_id.len());
        Ok(Self { rooms: by_id })
    }

    /// Numbers rooms `floor * 100 + position`, floors counted from 1.
    pub fn from_floor_sizes(sizes: &[u32]) -> Result<Self, TopologyError> {
        let mut rooms = Vec::new();
        for (floor, &size) in (1..).zip(sizes) {
            if size > 99 {
                return Err(TopologyError::FloorTooLarge { floor, size });
            }
            rooms.extend((1..=size).map(|position| Room {
                id: floor * 100 + position,
                floor,
                position,
            }));
        }
        Self::new(rooms)
    }

    /// The 97-room hotel: 101-110 through 901-910, then 1001-1007.
    pub fn hotel() -> Result<Self, TopologyError> {
        Self::from_floor_sizes(&DEFAULT_FLOOR_SIZES)
    }

    pub fn room(&self, id: RoomId) -> Result<&Room, TopologyError> {
        self.rooms.get(&id).ok_or(TopologyError::UnknownRoom(id))
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.rooms.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// All rooms in ascending id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.keys().copied()
    }

    /// Minutes to walk from `a` to `b`. Unknown ids are reported instead of
    /// being treated as zero distance.
    pub fn travel_time(&self, a: RoomId, b: RoomId) -> Result<u32, TopologyError> {
        Ok(self.room(a)?.travel_time(self.room(b)?))
    }
}
