//! Greedy ride assignment over the active fleet.
//!
//! Every active vehicle is simulated against the candidate ride and the one
//! with the smallest projected pickup time wins. Ranking is by pickup
//! latency only, never total route time: guest wait time beats fleet
//! efficiency. A committed stop order is never revisited.

use std::sync::{Mutex, MutexGuard};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{RideId, RideStatus, StopType, Vehicle};
use crate::error::{AssignError, StoreError, TravelTimeError};
use crate::notify::{DispatchEvent, EventAction};
use crate::simulate::{SimOptions, SimResult, SimulatedStop, simulate_append};
use crate::traits::{Assignment, Clock, DispatchStore, NewStop, Notifier, TravelTimes};

/// Assignment behavior knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    pub sim: SimOptions,
    /// Exclude vehicles whose projected peak load would exceed their
    /// capacity before ranking. Off by default: capacity stays
    /// informational and never changes ranking.
    pub enforce_capacity: bool,
}

/// The dispatch engine: owns the collaborator seams and serializes fleet
/// mutations.
///
/// Two assignments evaluated concurrently against the same queue state
/// would both append stops as if they were first, so every
/// read-simulate-commit sequence and every stop transition runs under one
/// fleet-wide lock. Cross-process serialization is the store
/// implementation's obligation (see [`DispatchStore`]).
pub struct Dispatcher<S, T, N, C> {
    pub(crate) store: S,
    pub(crate) times: T,
    pub(crate) notifier: N,
    pub(crate) clock: C,
    pub(crate) options: DispatchOptions,
    fleet_lock: Mutex<()>,
}

impl<S, T, N, C> Dispatcher<S, T, N, C>
where
    S: DispatchStore,
    T: TravelTimes + Sync,
    N: Notifier,
    C: Clock,
{
    pub fn new(store: S, times: T, notifier: N, clock: C) -> Self {
        Self {
            store,
            times,
            notifier,
            clock,
            options: DispatchOptions::default(),
            fleet_lock: Mutex::new(()),
        }
    }

    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn lock_fleet(&self) -> MutexGuard<'_, ()> {
        match self.fleet_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Choose a vehicle for a pending ride and commit the choice: two
    /// planned stops appended to the winner's queue, the ride marked
    /// assigned, and a `RideAssigned` event emitted.
    ///
    /// Fails with [`AssignError::NoActiveVehicles`] when no vehicle is
    /// eligible; nothing is persisted in that case and the caller is
    /// expected to discard the pending ride.
    pub fn assign_ride(&self, ride_id: RideId) -> Result<Vehicle, AssignError> {
        let _guard = self.lock_fleet();

        let mut ride = self.store.ride(ride_id)?;
        let vehicles = self.store.active_vehicles()?;
        if vehicles.is_empty() {
            return Err(AssignError::NoActiveVehicles);
        }

        let routes: Vec<Vec<SimulatedStop>> = vehicles
            .iter()
            .map(|vehicle| self.current_route(vehicle))
            .collect::<Result<_, _>>()?;

        let times = &self.times;
        let sim_options = self.options.sim;
        let simulations: Vec<Result<SimResult, TravelTimeError>> = vehicles
            .par_iter()
            .zip(routes.par_iter())
            .map(|(vehicle, route)| {
                simulate_append(
                    times,
                    vehicle.current_poi,
                    vehicle.onboard_guests,
                    route,
                    &ride,
                    &sim_options,
                )
            })
            .collect();

        // Sequential reduction over the order the store returned vehicles:
        // strictly-smaller comparison keeps the earliest candidate on ties.
        // That order is an implementation detail, not a contract.
        let mut best: Option<(usize, SimResult)> = None;
        for (index, result) in simulations.into_iter().enumerate() {
            let sim = result?;
            let vehicle = &vehicles[index];
            debug!(
                vehicle = %vehicle.id,
                pickup_s = sim.pickup_time_s,
                total_s = sim.total_time_s,
                peak = sim.peak_onboard,
                "simulated candidate"
            );

            if self.options.enforce_capacity && sim.peak_onboard > vehicle.capacity {
                debug!(vehicle = %vehicle.id, capacity = vehicle.capacity, "over capacity, excluded");
                continue;
            }

            match &best {
                Some((_, best_sim)) if sim.pickup_time_s >= best_sim.pickup_time_s => {}
                _ => best = Some((index, sim)),
            }
        }

        let (winner, sim) = best.ok_or(AssignError::NoActiveVehicles)?;
        let vehicle = vehicles[winner].clone();

        let start_index = self
            .store
            .last_sequence_index(vehicle.id)?
            .map_or(0, |last| last + 1);
        let assignment = Assignment {
            ride_id: ride.id,
            vehicle_id: vehicle.id,
            assigned_at: self.clock.now(),
            pickup: NewStop {
                ride_id: ride.id,
                stop_type: StopType::Pickup,
                poi: ride.pickup_poi,
                sequence_index: start_index,
            },
            dropoff: NewStop {
                ride_id: ride.id,
                stop_type: StopType::Dropoff,
                poi: ride.dropoff_poi,
                sequence_index: start_index + 1,
            },
        };
        self.store.commit_assignment(&assignment)?;

        ride.status = RideStatus::Assigned;
        ride.assigned_vehicle = Some(vehicle.id);
        ride.assigned_at = Some(assignment.assigned_at);

        info!(
            ride = %ride.id,
            code = %ride.public_code,
            vehicle = %vehicle.id,
            pickup_s = sim.pickup_time_s,
            "ride assigned"
        );
        self.notifier.notify(&DispatchEvent::for_ride(
            EventAction::RideAssigned,
            &ride,
            vehicle.id,
        ));

        Ok(vehicle)
    }

    /// A vehicle's uncompleted queue in simulator form, guest counts joined
    /// in from each stop's ride.
    fn current_route(&self, vehicle: &Vehicle) -> Result<Vec<SimulatedStop>, StoreError> {
        let stops = self.store.uncompleted_stops(vehicle.id)?;
        let mut route = Vec::with_capacity(stops.len());
        for stop in &stops {
            let ride = self.store.ride(stop.ride_id)?;
            route.push(SimulatedStop::from_stop(stop, ride.num_guests));
        }
        Ok(route)
    }
}
