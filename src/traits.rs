//! Collaborator seams for the dispatch engine.
//!
//! These are intentionally minimal. The embedding application implements
//! them for its own persistence and transport; the engine only ever sees
//! these interfaces. [`crate::store::InMemoryStore`] is a complete reference
//! implementation used by the test suites.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::{
    PoiEdge, PoiId, RideId, RideRequest, RouteStop, StopId, StopType, Vehicle, VehicleId,
};
use crate::error::{StoreError, TravelTimeError};
use crate::notify::DispatchEvent;

/// Provides the full persisted edge set for graph builds.
pub trait EdgeSource {
    fn edges(&self) -> Result<Vec<PoiEdge>, StoreError>;
}

/// Answers shortest travel time queries between two POIs.
///
/// Implemented by [`crate::graph::GraphCache`]; tests may substitute fixed
/// matrices.
pub trait TravelTimes {
    fn travel_time_s(&self, from: PoiId, to: PoiId) -> Result<u32, TravelTimeError>;
}

impl<T: TravelTimes + ?Sized> TravelTimes for &T {
    fn travel_time_s(&self, from: PoiId, to: PoiId) -> Result<u32, TravelTimeError> {
        (**self).travel_time_s(from, to)
    }
}

impl<T: TravelTimes + ?Sized> TravelTimes for std::sync::Arc<T> {
    fn travel_time_s(&self, from: PoiId, to: PoiId) -> Result<u32, TravelTimeError> {
        (**self).travel_time_s(from, to)
    }
}

/// A stop to be inserted by [`DispatchStore::commit_assignment`]. The store
/// allocates the [`StopId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewStop {
    pub ride_id: RideId,
    pub stop_type: StopType,
    pub poi: PoiId,
    pub sequence_index: u32,
}

/// The full set of writes produced by one successful ride assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub ride_id: RideId,
    pub vehicle_id: VehicleId,
    /// Unix epoch seconds.
    pub assigned_at: i64,
    pub pickup: NewStop,
    pub dropoff: NewStop,
}

/// Persistence boundary for vehicles, rides, and route stops.
///
/// Writes issued within a single engine operation must be applied
/// transactionally by the implementation: [`Self::commit_assignment`] is one
/// unit, and the `save_*` calls made during one stop transition form one
/// unit. Implementations backed by a database are expected to wrap each unit
/// in a transaction; the engine never issues partial commits.
pub trait DispatchStore {
    fn active_vehicles(&self) -> Result<Vec<Vehicle>, StoreError>;

    fn vehicle(&self, id: VehicleId) -> Result<Vehicle, StoreError>;

    fn ride(&self, id: RideId) -> Result<RideRequest, StoreError>;

    fn stop(&self, id: StopId) -> Result<RouteStop, StoreError>;

    /// A vehicle's not-yet-completed stops, ordered by `sequence_index`.
    fn uncompleted_stops(&self, vehicle: VehicleId) -> Result<Vec<RouteStop>, StoreError>;

    /// Not-yet-completed stops referencing a ride, across all vehicles.
    fn uncompleted_stops_for_ride(&self, ride: RideId) -> Result<Vec<RouteStop>, StoreError>;

    /// Highest `sequence_index` ever issued for a vehicle, completed stops
    /// included. `None` for a vehicle that was never routed.
    fn last_sequence_index(&self, vehicle: VehicleId) -> Result<Option<u32>, StoreError>;

    /// Apply one assignment atomically: insert both stops as planned and
    /// mark the ride assigned to the vehicle at `assigned_at`.
    fn commit_assignment(&self, assignment: &Assignment) -> Result<(), StoreError>;

    fn save_stop(&self, stop: &RouteStop) -> Result<(), StoreError>;

    fn save_ride(&self, ride: &RideRequest) -> Result<(), StoreError>;

    fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError>;
}

/// Push-notification sink for assignment and stop-transition events.
///
/// Called after the underlying state change has been committed; a failed
/// delivery must never affect engine state, so implementations log and
/// swallow their own failures.
pub trait Notifier {
    fn notify(&self, event: &DispatchEvent);
}

/// Time source, unix epoch seconds.
pub trait Clock {
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}
