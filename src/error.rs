use crate::data::{Floor, Position, RoomId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("Room {0} does not exist")]
    UnknownRoom(RoomId),

    #[error("Room {0} is defined more than once")]
    DuplicateRoom(RoomId),

    #[error("Floor {floor} position {position} is assigned to both room {first} and room {second}")]
    DuplicatePlacement {
        floor: Floor,
        position: Position,
        first: RoomId,
        second: RoomId,
    },

    #[error("Room {0} must have a floor and position of at least 1")]
    InvalidPlacement(RoomId),

    #[error("Floor {floor} cannot hold {size} rooms (at most 99)")]
    FloorTooLarge { floor: Floor, size: u32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("Number of rooms must be between 1 and {max}")]
    InvalidCount { max: usize },

    #[error("Not enough rooms available. Only {available} rooms left")]
    NotEnoughRooms { requested: usize, available: usize },

    /// An id handed to the optimizer is not part of the topology. This is a
    /// caller bug, not something a guest can trigger.
    #[error("internal error: {0}")]
    Topology(#[from] TopologyError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
    #[error("Room IDs array is required")]
    EmptyRequest,

    #[error("Room {0} does not exist")]
    NotFound(RoomId),

    #[error("Room {0} is already occupied")]
    AlreadyOccupied(RoomId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OccupancyError {
    #[error("Occupancy rate must be between 0 and 1, got {0}")]
    InvalidRate(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid floor layout: {0}")]
    Layout(#[from] TopologyError),
}
