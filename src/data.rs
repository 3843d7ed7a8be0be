use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type RoomId = u32;
pub type Floor = u32;
pub type Position = u32;

/// Represents a physical room: its floor and how far along the corridor it
/// sits from the stairs/lift (position 1 is closest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub floor: Floor,
    pub position: Position,
}

impl Room {
    /// Ordering key used everywhere rooms are ranked: lowest floor first,
    /// then closest to the stairs.
    pub fn key(&self) -> (Floor, Position) {
        (self.floor, self.position)
    }

    /// 2 minutes per floor; walking along the corridor only counts when both
    /// rooms share a floor.
    pub fn travel_time(&self, other: &Room) -> u32 {
        let vertical = self.floor.abs_diff(other.floor) * 2;
        let horizontal = if self.floor == other.floor {
            self.position.abs_diff(other.position)
        } else {
            0
        };
        vertical + horizontal
    }
}

/// Which branch of the optimizer produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    SingleRoom,
    SameFloor,
    ExactMultiFloor,
    GreedyMultiFloor,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::SingleRoom => "single room",
            Strategy::SameFloor => "same floor",
            Strategy::ExactMultiFloor => "exhaustive search",
            Strategy::GreedyMultiFloor => "greedy search",
        };
        f.write_str(name)
    }
}

/// The rooms chosen for one request and what it costs to walk between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub rooms: Vec<RoomId>,
    pub travel_time: u32,
    pub strategy: Strategy,
    pub message: String,
}

/// A room together with its current occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomStatus {
    pub room: Room,
    pub occupied: bool,
}

/// Consistent view of the whole building taken under a single lock.
#[derive(Debug, Clone)]
pub struct OccupancySnapshot {
    pub rooms: Vec<RoomStatus>,
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindOptimalRequest {
    pub num_rooms: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub room_ids: Vec<RoomId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomOccupancyRequest {
    pub rate: Option<f64>,
}

/// Uniform wrapper around every successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthOutput {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: RoomId,
    pub number: RoomId,
    pub floor: Floor,
    pub position: Position,
    pub status: &'static str,
    pub occupied: bool,
}

impl From<RoomStatus> for RoomView {
    fn from(status: RoomStatus) -> Self {
        Self {
            id: status.room.id,
            number: status.room.id,
            floor: status.room.floor,
            position: status.room.position,
            status: if status.occupied { "occupied" } else { "available" },
            occupied: status.occupied,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsOutput {
    pub rooms: Vec<RoomView>,
    pub total_rooms: usize,
    pub available_rooms: usize,
    pub occupied_rooms: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindOptimalOutput {
    pub selected_rooms: Vec<RoomId>,
    pub travel_time: u32,
    pub strategy: Strategy,
    pub message: String,
}

impl From<Selection> for FindOptimalOutput {
    fn from(selection: Selection) -> Self {
        Self {
            selected_rooms: selection.rooms,
            travel_time: selection.travel_time,
            strategy: selection.strategy,
            message: selection.message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookOutput {
    pub booked_rooms: Vec<RoomId>,
    pub booked_count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomOccupancyOutput {
    pub occupied_count: usize,
    pub available_count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetOutput {
    pub available_rooms: usize,
    pub message: String,
}
