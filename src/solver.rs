use crate::data::{Floor, Room, RoomId, Selection, Strategy};
use crate::error::SelectionError;
use crate::topology::Topology;
use itertools::Itertools;
use log::{debug, info, trace};
use std::collections::BTreeMap;
use std::time::Instant;

/// Largest group a single request may ask for.
pub const MAX_ROOMS_PER_REQUEST: usize = 5;

/// Above this size the exhaustive search is replaced by the greedy heuristic.
const EXACT_SEARCH_LIMIT: usize = 4;

/// Picks `requested` rooms out of `available` minimizing the walk between the
/// first and last room.
///
/// Strategies, tried in order:
/// - one room: the free room closest to the stairs on the lowest floor
/// - any floor with enough free rooms: the lowest such floor, rooms taken in
///   position order
/// - up to four rooms: every combination is scored, first minimum wins
/// - five rooms: greedy growth from the room closest to the stairs
///
/// `available` must only contain ids from `topology`; anything else is an
/// internal error.
pub fn select_optimal(
    topology: &Topology,
    available: &[RoomId],
    requested: usize,
) -> Result<Selection, SelectionError> {
    if requested == 0 || requested > MAX_ROOMS_PER_REQUEST {
        return Err(SelectionError::InvalidCount {
            max: MAX_ROOMS_PER_REQUEST,
        });
    }
    if available.len() < requested {
        return Err(SelectionError::NotEnoughRooms {
            requested,
            available: available.len(),
        });
    }

    let rooms: Vec<&Room> = available
        .iter()
        .map(|&id| topology.room(id))
        .collect::<Result<_, _>>()?;

    let start_time = Instant::now();
    let selection = if requested == 1 {
        single_room(&rooms)
    } else if let Some(selection) = same_floor(&rooms, requested) {
        selection
    } else if requested <= EXACT_SEARCH_LIMIT {
        exact_multi_floor(&rooms, requested)
    } else {
        greedy_multi_floor(&rooms, requested)
    };

    info!(
        "Selected {:?} ({}) with travel time {} in {:.2?}",
        selection.rooms,
        selection.strategy,
        selection.travel_time,
        start_time.elapsed()
    );
    Ok(selection)
}

/// Cost of a group: the walk between its lowest and highest room.
fn span_cost<'a>(rooms: impl IntoIterator<Item = &'a Room> + Clone) -> u32 {
    let first = rooms.clone().into_iter().min_by_key(|r| r.key());
    let last = rooms.into_iter().max_by_key(|r| r.key());
    match (first, last) {
        (Some(first), Some(last)) => first.travel_time(last),
        _ => 0,
    }
}

fn closest_to_stairs<'a>(rooms: &[&'a Room]) -> Option<(usize, &'a Room)> {
    // min_by_key keeps the first of equal keys
    rooms
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|(_, r)| r.key())
}

fn single_room(rooms: &[&Room]) -> Selection {
    let rooms = closest_to_stairs(rooms).map(|(_, r)| vec![r.id]).unwrap_or_default();
    Selection {
        rooms,
        travel_time: 0,
        strategy: Strategy::SingleRoom,
        message: "Single room selected closest to stairs/lift".to_string(),
    }
}

fn same_floor(rooms: &[&Room], requested: usize) -> Option<Selection> {
    let by_floor: BTreeMap<Floor, Vec<&Room>> = rooms
        .iter()
        .map(|r| (r.floor, *r))
        .into_group_map()
        .into_iter()
        .collect();

    let (floor, mut floor_rooms) = by_floor
        .into_iter()
        .find(|(_, floor_rooms)| floor_rooms.len() >= requested)?;
    trace!("Floor {} has {} free rooms", floor, floor_rooms.len());

    floor_rooms.sort_by_key(|r| r.position);
    floor_rooms.truncate(requested);

    Some(Selection {
        travel_time: span_cost(floor_rooms.iter().copied()),
        rooms: floor_rooms.iter().map(|r| r.id).collect(),
        strategy: Strategy::SameFloor,
        message: format!("All rooms selected on floor {} to minimize travel time", floor),
    })
}

fn exact_multi_floor(rooms: &[&Room], requested: usize) -> Selection {
    let mut best: Option<(u32, Vec<&Room>)> = None;
    let mut examined: u64 = 0;

    // combinations() is lazy; only the current candidate is held in memory
    for combination in rooms.iter().copied().combinations(requested) {
        examined += 1;
        let cost = span_cost(combination.iter().copied());
        if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
            best = Some((cost, combination));
        }
    }
    debug!("Exhaustive search examined {} combinations", examined);

    let (travel_time, mut chosen) = best.unwrap_or_default();
    chosen.sort_by_key(|r| r.key());

    multi_floor_selection(
        chosen.iter().map(|r| r.id).collect(),
        travel_time,
        Strategy::ExactMultiFloor,
    )
}

fn greedy_multi_floor(rooms: &[&Room], requested: usize) -> Selection {
    let mut remaining: Vec<&Room> = rooms.to_vec();
    let mut selected: Vec<&Room> = Vec::with_capacity(requested);
    let mut travel_time = 0;

    if let Some((index, _)) = closest_to_stairs(&remaining) {
        selected.push(remaining.remove(index));
    }

    while selected.len() < requested {
        let best = remaining
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let cost = span_cost(selected.iter().copied().chain(std::iter::once(*candidate)));
                (index, cost)
            })
            .min_by_key(|&(_, cost)| cost);

        let Some((index, cost)) = best else {
            break;
        };
        trace!("Greedy step adds room {} at cost {}", remaining[index].id, cost);
        selected.push(remaining.remove(index));
        travel_time = cost;
    }

    multi_floor_selection(
        selected.iter().map(|r| r.id).collect(),
        travel_time,
        Strategy::GreedyMultiFloor,
    )
}

fn multi_floor_selection(rooms: Vec<RoomId>, travel_time: u32, strategy: Strategy) -> Selection {
    Selection {
        rooms,
        travel_time,
        strategy,
        message: format!(
            "Multi-floor selection optimized for minimum travel time ({})",
            strategy
        ),
    }
}
