//! Stop lifecycle tests
//!
//! Queue-order enforcement, wrong-state rejections, and the full
//! pickup-to-dropoff flow including ride transitions, vehicle position,
//! and onboard-guest accounting.

mod fixtures;

use buggy_dispatch::domain::{RideStatus, StopStatus, StopType};
use buggy_dispatch::error::StopTransitionError;
use buggy_dispatch::notify::EventAction;
use buggy_dispatch::store::InMemoryStore;
use buggy_dispatch::traits::DispatchStore;

use fixtures::*;

/// One active vehicle at Reception with one assigned ride to the Beach Bar.
/// Returns the engine plus the ride's (pickup, dropoff) stop ids.
fn assigned_ride_setup() -> (
    InMemoryStore,
    RecordingNotifier,
    TestDispatcher,
    buggy_dispatch::domain::StopId,
    buggy_dispatch::domain::StopId,
) {
    let store = InMemoryStore::new();
    seed_map(&store);
    let notifier = RecordingNotifier::default();
    let vehicle = TestVehicle::new(1).at(RECEPTION).insert(&store);
    let ride = pending_ride(&store, 1, RECEPTION, BEACH_BAR, 2);

    let engine = dispatcher(&store, &notifier);
    engine.assign_ride(ride.id).unwrap();

    let stops = store.stops_for_vehicle(vehicle.id);
    let pickup = stops[0].id;
    let dropoff = stops[1].id;
    (store, notifier, engine, pickup, dropoff)
}

// ============================================================================
// Rejected transitions
// ============================================================================

#[test]
fn starting_a_non_head_stop_is_rejected() {
    let (store, _notifier, engine, pickup, dropoff) = assigned_ride_setup();

    let err = engine.start_stop(dropoff).unwrap_err();
    assert_eq!(err, StopTransitionError::NotNextInQueue { stop: dropoff });

    // Nothing persisted: both stops still planned.
    assert_eq!(store.stop(pickup).unwrap().status, StopStatus::Planned);
    assert_eq!(store.stop(dropoff).unwrap().status, StopStatus::Planned);
}

#[test]
fn starting_an_already_started_stop_is_rejected() {
    let (_store, _notifier, engine, pickup, _dropoff) = assigned_ride_setup();

    engine.start_stop(pickup).unwrap();
    let err = engine.start_stop(pickup).unwrap_err();
    assert_eq!(err, StopTransitionError::NotPlanned { stop: pickup });
}

#[test]
fn completing_a_planned_stop_is_rejected() {
    let (store, _notifier, engine, pickup, _dropoff) = assigned_ride_setup();

    let err = engine.complete_stop(pickup).unwrap_err();
    assert_eq!(err, StopTransitionError::NotOnRoute { stop: pickup });
    assert_eq!(store.stop(pickup).unwrap().status, StopStatus::Planned);
}

// ============================================================================
// The full flow
// ============================================================================

#[test]
fn starting_a_pickup_moves_the_ride_to_picking_up() {
    let (store, _notifier, engine, pickup, _dropoff) = assigned_ride_setup();

    let stop = engine.start_stop(pickup).unwrap();
    assert_eq!(stop.status, StopStatus::OnRoute);
    assert_eq!(
        store.ride(stop.ride_id).unwrap().status,
        RideStatus::PickingUp
    );
}

#[test]
fn completing_a_pickup_loads_guests_and_starts_the_ride() {
    let (store, _notifier, engine, pickup, _dropoff) = assigned_ride_setup();

    engine.start_stop(pickup).unwrap();
    let stop = engine.complete_stop(pickup).unwrap();

    assert_eq!(stop.status, StopStatus::Completed);
    assert_eq!(stop.completed_at, Some(NOW));

    let vehicle = store.vehicle(stop.vehicle_id).unwrap();
    assert_eq!(vehicle.current_poi, Some(RECEPTION));
    assert_eq!(vehicle.onboard_guests, 2);

    let ride = store.ride(stop.ride_id).unwrap();
    assert_eq!(ride.status, RideStatus::InProgress);
    assert_eq!(ride.pickup_completed_at, Some(NOW));
    assert_eq!(ride.dropoff_completed_at, None);
}

#[test]
fn completing_the_final_dropoff_completes_the_ride() {
    let (store, _notifier, engine, pickup, dropoff) = assigned_ride_setup();

    engine.start_stop(pickup).unwrap();
    engine.complete_stop(pickup).unwrap();
    engine.start_stop(dropoff).unwrap();
    let stop = engine.complete_stop(dropoff).unwrap();

    let vehicle = store.vehicle(stop.vehicle_id).unwrap();
    assert_eq!(vehicle.current_poi, Some(BEACH_BAR));
    // Round trip: back to the pre-ride load.
    assert_eq!(vehicle.onboard_guests, 0);

    let ride = store.ride(stop.ride_id).unwrap();
    assert_eq!(ride.status, RideStatus::Completed);
    assert_eq!(ride.dropoff_completed_at, Some(NOW));
}

#[test]
fn the_flow_emits_events_with_resulting_ride_status() {
    let (_store, notifier, engine, pickup, dropoff) = assigned_ride_setup();

    engine.start_stop(pickup).unwrap();
    engine.complete_stop(pickup).unwrap();
    engine.start_stop(dropoff).unwrap();
    engine.complete_stop(dropoff).unwrap();

    let sequence: Vec<(EventAction, RideStatus)> = notifier
        .events()
        .iter()
        .map(|e| (e.action, e.ride_status))
        .collect();
    assert_eq!(
        sequence,
        vec![
            (EventAction::RideAssigned, RideStatus::Assigned),
            (EventAction::StopStarted, RideStatus::PickingUp),
            (EventAction::StopCompleted, RideStatus::InProgress),
            (EventAction::StopStarted, RideStatus::InProgress),
            (EventAction::StopCompleted, RideStatus::Completed),
        ]
    );
}

#[test]
fn interleaved_rides_complete_independently() {
    let store = InMemoryStore::new();
    seed_map(&store);
    let notifier = RecordingNotifier::default();
    let vehicle = TestVehicle::new(1).at(RECEPTION).insert(&store);

    let first = pending_ride(&store, 1, RECEPTION, BEACH_BAR, 2);
    let second = pending_ride(&store, 2, BEACH_BAR, SPA, 3);

    let engine = dispatcher(&store, &notifier);
    engine.assign_ride(first.id).unwrap();
    engine.assign_ride(second.id).unwrap();

    // Queue: first pickup, first dropoff, second pickup, second dropoff.
    let stops = store.stops_for_vehicle(vehicle.id);
    assert_eq!(stops.len(), 4);
    assert_eq!(stops[2].stop_type, StopType::Pickup);

    for stop in &stops[..3] {
        engine.start_stop(stop.id).unwrap();
        engine.complete_stop(stop.id).unwrap();
    }

    // First ride done, second mid-flight with its guests onboard.
    assert_eq!(store.ride(first.id).unwrap().status, RideStatus::Completed);
    assert_eq!(store.ride(second.id).unwrap().status, RideStatus::InProgress);
    assert_eq!(store.vehicle(vehicle.id).unwrap().onboard_guests, 3);

    engine.start_stop(stops[3].id).unwrap();
    engine.complete_stop(stops[3].id).unwrap();

    assert_eq!(store.ride(second.id).unwrap().status, RideStatus::Completed);
    assert_eq!(store.vehicle(vehicle.id).unwrap().onboard_guests, 0);
    assert_eq!(store.vehicle(vehicle.id).unwrap().current_poi, Some(SPA));
}
