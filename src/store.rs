//! In-memory reference implementation of the persistence boundary.
//!
//! Always available: the integration suites run on it, and embeddings can
//! use it as a starting point before wiring a real database behind
//! [`DispatchStore`]. Single-process only; every operation takes one lock,
//! which makes each commit trivially atomic.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{
    Poi, PoiEdge, PoiId, RideId, RideRequest, RideStatus, RouteStop, StopId, StopStatus, Vehicle,
    VehicleId,
};
use crate::error::StoreError;
use crate::traits::{Assignment, DispatchStore, EdgeSource, NewStop};

#[derive(Debug, Default)]
struct Inner {
    pois: BTreeMap<PoiId, Poi>,
    edges: Vec<PoiEdge>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    rides: BTreeMap<RideId, RideRequest>,
    stops: BTreeMap<StopId, RouteStop>,
    next_stop_id: i64,
}

/// Shared-handle in-memory store. Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn insert_poi(&self, poi: Poi) {
        self.lock().pois.insert(poi.id, poi);
    }

    pub fn poi(&self, id: PoiId) -> Option<Poi> {
        self.lock().pois.get(&id).cloned()
    }

    /// Insert or replace the edge for the pair of endpoints. At most one
    /// edge exists per unordered pair.
    pub fn insert_edge(&self, edge: PoiEdge) {
        let mut inner = self.lock();
        inner.edges.retain(|e| e.endpoints() != edge.endpoints());
        inner.edges.push(edge);
    }

    pub fn insert_vehicle(&self, vehicle: Vehicle) {
        self.lock().vehicles.insert(vehicle.id, vehicle);
    }

    pub fn insert_ride(&self, ride: RideRequest) {
        self.lock().rides.insert(ride.id, ride);
    }

    /// Every stop ever created for a vehicle, in queue order. Test and
    /// inspection helper.
    pub fn stops_for_vehicle(&self, vehicle: VehicleId) -> Vec<RouteStop> {
        let inner = self.lock();
        let mut stops: Vec<RouteStop> = inner
            .stops
            .values()
            .filter(|s| s.vehicle_id == vehicle)
            .cloned()
            .collect();
        stops.sort_by_key(|s| s.sequence_index);
        stops
    }

    pub fn stop_count(&self) -> usize {
        self.lock().stops.len()
    }
}

impl Inner {
    fn insert_new_stop(&mut self, new: &NewStop, vehicle_id: VehicleId, created_at: i64) -> StopId {
        self.next_stop_id += 1;
        let id = StopId(self.next_stop_id);
        self.stops.insert(
            id,
            RouteStop {
                id,
                vehicle_id,
                ride_id: new.ride_id,
                stop_type: new.stop_type,
                status: StopStatus::Planned,
                poi: new.poi,
                sequence_index: new.sequence_index,
                created_at,
                completed_at: None,
            },
        );
        id
    }
}

impl EdgeSource for InMemoryStore {
    fn edges(&self) -> Result<Vec<PoiEdge>, StoreError> {
        Ok(self.lock().edges.clone())
    }
}

impl DispatchStore for InMemoryStore {
    fn active_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self
            .lock()
            .vehicles
            .values()
            .filter(|v| v.is_active())
            .cloned()
            .collect())
    }

    fn vehicle(&self, id: VehicleId) -> Result<Vehicle, StoreError> {
        self.lock()
            .vehicles
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "vehicle",
                id: id.0,
            })
    }

    fn ride(&self, id: RideId) -> Result<RideRequest, StoreError> {
        self.lock()
            .rides
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "ride",
                id: id.0,
            })
    }

    fn stop(&self, id: StopId) -> Result<RouteStop, StoreError> {
        self.lock()
            .stops
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "stop",
                id: id.0,
            })
    }

    fn uncompleted_stops(&self, vehicle: VehicleId) -> Result<Vec<RouteStop>, StoreError> {
        let inner = self.lock();
        let mut stops: Vec<RouteStop> = inner
            .stops
            .values()
            .filter(|s| s.vehicle_id == vehicle && s.status != StopStatus::Completed)
            .cloned()
            .collect();
        stops.sort_by_key(|s| s.sequence_index);
        Ok(stops)
    }

    fn uncompleted_stops_for_ride(&self, ride: RideId) -> Result<Vec<RouteStop>, StoreError> {
        let inner = self.lock();
        let mut stops: Vec<RouteStop> = inner
            .stops
            .values()
            .filter(|s| s.ride_id == ride && s.status != StopStatus::Completed)
            .cloned()
            .collect();
        stops.sort_by_key(|s| s.sequence_index);
        Ok(stops)
    }

    fn last_sequence_index(&self, vehicle: VehicleId) -> Result<Option<u32>, StoreError> {
        Ok(self
            .lock()
            .stops
            .values()
            .filter(|s| s.vehicle_id == vehicle)
            .map(|s| s.sequence_index)
            .max())
    }

    fn commit_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        let mut inner = self.lock();

        let ride = inner
            .rides
            .get_mut(&assignment.ride_id)
            .ok_or(StoreError::NotFound {
                entity: "ride",
                id: assignment.ride_id.0,
            })?;
        ride.status = RideStatus::Assigned;
        ride.assigned_vehicle = Some(assignment.vehicle_id);
        ride.assigned_at = Some(assignment.assigned_at);

        inner.insert_new_stop(&assignment.pickup, assignment.vehicle_id, assignment.assigned_at);
        inner.insert_new_stop(&assignment.dropoff, assignment.vehicle_id, assignment.assigned_at);
        Ok(())
    }

    fn save_stop(&self, stop: &RouteStop) -> Result<(), StoreError> {
        self.lock().stops.insert(stop.id, stop.clone());
        Ok(())
    }

    fn save_ride(&self, ride: &RideRequest) -> Result<(), StoreError> {
        self.lock().rides.insert(ride.id, ride.clone());
        Ok(())
    }

    fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError> {
        self.lock().vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }
}
