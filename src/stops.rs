//! Stop and ride lifecycle transitions.
//!
//! A stop moves planned -> on route -> completed, strictly in queue order,
//! and drives the ride lifecycle as the driver works through pickup and
//! dropoff. Transitions attempted out of order are rejected without being
//! persisted; they signal a stale client, not a transient fault.

use tracing::info;

use crate::domain::{RideStatus, RouteStop, StopId, StopStatus, StopType};
use crate::error::StopTransitionError;
use crate::notify::{DispatchEvent, EventAction};
use crate::traits::{Clock, DispatchStore, Notifier, TravelTimes};

use crate::dispatch::Dispatcher;

impl<S, T, N, C> Dispatcher<S, T, N, C>
where
    S: DispatchStore,
    T: TravelTimes + Sync,
    N: Notifier,
    C: Clock,
{
    /// Begin driving toward a stop.
    ///
    /// Only the lowest-sequence uncompleted stop of the vehicle may start,
    /// and only from planned. Starting a pickup moves the ride to
    /// `PickingUp`.
    pub fn start_stop(&self, stop_id: StopId) -> Result<RouteStop, StopTransitionError> {
        let _guard = self.lock_fleet();

        let mut stop = self.store.stop(stop_id)?;

        let queue = self.store.uncompleted_stops(stop.vehicle_id)?;
        if queue.first().map(|next| next.id) != Some(stop.id) {
            return Err(StopTransitionError::NotNextInQueue { stop: stop.id });
        }
        if stop.status != StopStatus::Planned {
            return Err(StopTransitionError::NotPlanned { stop: stop.id });
        }

        stop.status = StopStatus::OnRoute;
        self.store.save_stop(&stop)?;

        let mut ride = self.store.ride(stop.ride_id)?;
        if stop.stop_type == StopType::Pickup {
            ride.status = RideStatus::PickingUp;
            self.store.save_ride(&ride)?;
        }

        info!(
            stop = %stop.id,
            vehicle = %stop.vehicle_id,
            ride = %ride.id,
            kind = ?stop.stop_type,
            "stop started"
        );
        self.notifier.notify(&DispatchEvent::for_ride(
            EventAction::StopStarted,
            &ride,
            stop.vehicle_id,
        ));

        Ok(stop)
    }

    /// Arrive at a stop and finish serving it.
    ///
    /// Permitted only from on-route. Moves the vehicle to the stop's POI
    /// and adjusts its onboard count. Completing a pickup moves the ride to
    /// `InProgress`; completing its dropoff timestamps the dropoff and,
    /// once no other uncompleted stop references the ride, completes it.
    pub fn complete_stop(&self, stop_id: StopId) -> Result<RouteStop, StopTransitionError> {
        let _guard = self.lock_fleet();

        let mut stop = self.store.stop(stop_id)?;
        if stop.status != StopStatus::OnRoute {
            return Err(StopTransitionError::NotOnRoute { stop: stop.id });
        }

        let now = self.clock.now();
        let mut ride = self.store.ride(stop.ride_id)?;
        let mut vehicle = self.store.vehicle(stop.vehicle_id)?;

        stop.status = StopStatus::Completed;
        stop.completed_at = Some(now);
        self.store.save_stop(&stop)?;

        vehicle.current_poi = Some(stop.poi);
        match stop.stop_type {
            StopType::Pickup => {
                vehicle.onboard_guests += ride.num_guests;
                ride.status = RideStatus::InProgress;
                ride.pickup_completed_at = Some(now);
            }
            StopType::Dropoff => {
                vehicle.onboard_guests = vehicle.onboard_guests.saturating_sub(ride.num_guests);
                ride.dropoff_completed_at = Some(now);
                if self.store.uncompleted_stops_for_ride(ride.id)?.is_empty() {
                    ride.status = RideStatus::Completed;
                }
            }
        }
        self.store.save_vehicle(&vehicle)?;
        self.store.save_ride(&ride)?;

        info!(
            stop = %stop.id,
            vehicle = %vehicle.id,
            ride = %ride.id,
            kind = ?stop.stop_type,
            status = ?ride.status,
            onboard = vehicle.onboard_guests,
            "stop completed"
        );
        self.notifier.notify(&DispatchEvent::for_ride(
            EventAction::StopCompleted,
            &ride,
            vehicle.id,
        ));

        Ok(stop)
    }
}
