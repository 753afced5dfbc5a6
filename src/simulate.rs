//! Route simulation: the marginal cost of appending a ride to a vehicle's
//! existing itinerary.
//!
//! Purely an estimate over a hypothetical future; nothing here mutates
//! state. New stops are only ever appended at the end of the queue;
//! in-queue insertion and reordering are deliberately not attempted.

use crate::domain::{PoiId, RideId, RideRequest, RouteStop, StopType};
use crate::error::TravelTimeError;
use crate::traits::TravelTimes;

/// Dwell time applied once per stop for loading or unloading guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimOptions {
    pub pickup_service_s: u32,
    pub dropoff_service_s: u32,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            pickup_service_s: 25,
            dropoff_service_s: 25,
        }
    }
}

/// One uncompleted leg of a vehicle's itinerary, as the simulator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedStop {
    pub ride_id: RideId,
    pub stop_type: StopType,
    pub poi: PoiId,
    pub num_guests: u32,
}

impl SimulatedStop {
    /// Project a persisted stop into simulator form. The guest count comes
    /// from the stop's ride.
    pub fn from_stop(stop: &RouteStop, num_guests: u32) -> Self {
        Self {
            ride_id: stop.ride_id,
            stop_type: stop.stop_type,
            poi: stop.poi,
            num_guests,
        }
    }
}

/// Projected cost of appending a ride to a vehicle's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimResult {
    /// Elapsed seconds until the vehicle reaches the new ride's pickup POI.
    /// The sole ranking key for assignment.
    pub pickup_time_s: u32,
    /// Elapsed seconds until the new ride's dropoff completes.
    pub total_time_s: u32,
    /// Maximum simultaneous onboard guests over the simulated route,
    /// candidate ride included. Feeds the optional capacity filter.
    pub peak_onboard: u32,
}

/// Walk a vehicle's uncompleted queue from its current position, then append
/// the candidate ride's pickup and dropoff legs.
///
/// A vehicle with no recorded position starts at the candidate's own pickup
/// POI, so an idle, never-dispatched vehicle bootstraps at zero travel cost.
pub fn simulate_append<T: TravelTimes>(
    times: &T,
    start_poi: Option<PoiId>,
    onboard: u32,
    route: &[SimulatedStop],
    ride: &RideRequest,
    options: &SimOptions,
) -> Result<SimResult, TravelTimeError> {
    let mut current_poi = start_poi.unwrap_or(ride.pickup_poi);
    let mut time_s: u32 = 0;
    let mut onboard = onboard;
    let mut peak_onboard = onboard;

    for stop in route {
        time_s += times.travel_time_s(current_poi, stop.poi)?;
        current_poi = stop.poi;

        match stop.stop_type {
            StopType::Pickup => {
                time_s += options.pickup_service_s;
                onboard += stop.num_guests;
            }
            StopType::Dropoff => {
                time_s += options.dropoff_service_s;
                onboard = onboard.saturating_sub(stop.num_guests);
            }
        }
        peak_onboard = peak_onboard.max(onboard);
    }

    time_s += times.travel_time_s(current_poi, ride.pickup_poi)?;
    let pickup_time_s = time_s;
    time_s += options.pickup_service_s;
    onboard += ride.num_guests;
    peak_onboard = peak_onboard.max(onboard);

    time_s += times.travel_time_s(ride.pickup_poi, ride.dropoff_poi)?;
    time_s += options.dropoff_service_s;

    Ok(SimResult {
        pickup_time_s,
        total_time_s: time_s,
        peak_onboard,
    })
}
