//! Test fixtures for buggy-dispatch.
//!
//! Provides:
//! - A realistic resort map (named POIs + travel-time edges)
//! - Builders for vehicles and pending rides
//! - A fully wired dispatcher over the in-memory store

pub mod resort_map;

pub use resort_map::*;

use std::sync::{Arc, Mutex};

use buggy_dispatch::dispatch::{DispatchOptions, Dispatcher};
use buggy_dispatch::domain::{
    DriverId, PoiId, RideId, RideRequest, Vehicle, VehicleId, VehicleStatus, generate_public_code,
};
use buggy_dispatch::graph::GraphCache;
use buggy_dispatch::notify::DispatchEvent;
use buggy_dispatch::store::InMemoryStore;
use buggy_dispatch::traits::{Clock, Notifier};

pub const NOW: i64 = 1_755_000_000;

/// Builder for test vehicles with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestVehicle {
    vehicle: Vehicle,
}

impl TestVehicle {
    pub fn new(id: i64) -> Self {
        Self {
            vehicle: Vehicle {
                id: VehicleId(id),
                code: format!("BUGGY_{id}"),
                display_name: format!("Buggy #{id}"),
                capacity: 4,
                status: VehicleStatus::Active,
                current_poi: None,
                onboard_guests: 0,
                driver: Some(DriverId(id)),
            },
        }
    }

    pub fn at(mut self, poi: PoiId) -> Self {
        self.vehicle.current_poi = Some(poi);
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.vehicle.capacity = capacity;
        self
    }

    pub fn onboard(mut self, guests: u32) -> Self {
        self.vehicle.onboard_guests = guests;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.vehicle.status = VehicleStatus::Inactive;
        self
    }

    pub fn build(self) -> Vehicle {
        self.vehicle
    }

    pub fn insert(self, store: &InMemoryStore) -> Vehicle {
        let vehicle = self.vehicle;
        store.insert_vehicle(vehicle.clone());
        vehicle
    }
}

/// A pending ride persisted into the store, as ride intake would leave it.
pub fn pending_ride(
    store: &InMemoryStore,
    id: i64,
    pickup: PoiId,
    dropoff: PoiId,
    guests: u32,
) -> RideRequest {
    let ride = RideRequest::pending(
        RideId(id),
        generate_public_code(&mut rand::thread_rng()),
        pickup,
        dropoff,
        guests,
        NOW,
    );
    store.insert_ride(ride.clone());
    ride
}

/// Notifier that records every event for assertion.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<DispatchEvent>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<DispatchEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &DispatchEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Deterministic clock.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

pub type TestDispatcher =
    Dispatcher<InMemoryStore, Arc<GraphCache<InMemoryStore>>, RecordingNotifier, FixedClock>;

/// A dispatcher wired over the store with a recording notifier and a clock
/// pinned to [`NOW`].
pub fn dispatcher(store: &InMemoryStore, notifier: &RecordingNotifier) -> TestDispatcher {
    Dispatcher::new(
        store.clone(),
        Arc::new(GraphCache::new(store.clone())),
        notifier.clone(),
        FixedClock(NOW),
    )
}

pub fn dispatcher_with_options(
    store: &InMemoryStore,
    notifier: &RecordingNotifier,
    options: DispatchOptions,
) -> TestDispatcher {
    dispatcher(store, notifier).with_options(options)
}
