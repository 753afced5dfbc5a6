//! Domain entities for the dispatch engine.
//!
//! These mirror what the embedding application persists. The engine never
//! talks to a database directly; it reads and writes these records through
//! the [`crate::traits::DispatchStore`] boundary.

use rand::Rng;
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Stable key of a point of interest.
    PoiId
);
id_type!(
    /// Stable key of a dispatchable vehicle.
    VehicleId
);
id_type!(
    /// Stable key of a ride request.
    RideId
);
id_type!(
    /// Stable key of a route stop.
    StopId
);
id_type!(
    /// Stable key of a driver account (owned by the auth collaborator).
    DriverId
);

/// A named location in the venue graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poi {
    pub id: PoiId,
    /// Short stable mnemonic, e.g. "RECEPTION".
    pub code: String,
    /// Display name, e.g. "Reception".
    pub name: String,
}

/// An undirected travel-time relation between two POIs.
///
/// Stored under a canonical endpoint ordering (smaller id first) so each
/// unordered pair exists exactly once. Construct via [`PoiEdge::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiEdge {
    pub from_poi: PoiId,
    pub to_poi: PoiId,
    pub travel_time_s: u32,
}

impl PoiEdge {
    /// Build an edge with canonical endpoint ordering.
    pub fn new(a: PoiId, b: PoiId, travel_time_s: u32) -> Self {
        let (from_poi, to_poi) = if a <= b { (a, b) } else { (b, a) };
        Self {
            from_poi,
            to_poi,
            travel_time_s,
        }
    }

    /// The unordered endpoint pair, in canonical order.
    pub fn endpoints(&self) -> (PoiId, PoiId) {
        (self.from_poi, self.to_poi)
    }
}

/// Whether a vehicle may receive new assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Active,
    Inactive,
}

/// A dispatchable shuttle with a driver, position, and guest load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Short internal identifier, e.g. "BUGGY_1".
    pub code: String,
    pub display_name: String,
    pub capacity: u32,
    pub status: VehicleStatus,
    /// Last known position. `None` until the vehicle completes its first
    /// stop.
    pub current_poi: Option<PoiId>,
    pub onboard_guests: u32,
    pub driver: Option<DriverId>,
}

impl Vehicle {
    pub fn is_active(&self) -> bool {
        self.status == VehicleStatus::Active
    }
}

/// Where a ride request stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Pending,
    Assigned,
    PickingUp,
    InProgress,
    Completed,
    Cancelled,
}

/// A guest's transportation request between two POIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: RideId,
    /// Short externally unique code shown to guests and dispatchers,
    /// distinct from the internal id. See [`generate_public_code`].
    pub public_code: String,
    pub pickup_poi: PoiId,
    pub dropoff_poi: PoiId,
    pub num_guests: u32,
    pub room_number: Option<String>,
    pub guest_name: Option<String>,
    pub status: RideStatus,
    pub assigned_vehicle: Option<VehicleId>,
    /// Unix epoch seconds.
    pub requested_at: i64,
    pub assigned_at: Option<i64>,
    pub pickup_completed_at: Option<i64>,
    pub dropoff_completed_at: Option<i64>,
}

impl RideRequest {
    /// A freshly created, unassigned request.
    pub fn pending(
        id: RideId,
        public_code: String,
        pickup_poi: PoiId,
        dropoff_poi: PoiId,
        num_guests: u32,
        requested_at: i64,
    ) -> Self {
        Self {
            id,
            public_code,
            pickup_poi,
            dropoff_poi,
            num_guests,
            room_number: None,
            guest_name: None,
            status: RideStatus::Pending,
            assigned_vehicle: None,
            requested_at,
            assigned_at: None,
            pickup_completed_at: None,
            dropoff_completed_at: None,
        }
    }
}

/// Generate a public ride code: 6 uppercase hex characters.
pub fn generate_public_code<R: Rng>(rng: &mut R) -> String {
    format!("{:06X}", rng.gen_range(0u32..0x100_0000))
}

/// Whether a stop picks guests up or drops them off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopType {
    Pickup,
    Dropoff,
}

/// Lifecycle of a single stop. Transitions are strictly linear:
/// planned, then on route, then completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopStatus {
    Planned,
    OnRoute,
    Completed,
}

/// One ordered pickup or dropoff leg in a vehicle's itinerary.
///
/// Exactly one pickup and one dropoff stop exist per ride, with the pickup
/// sequenced before the dropoff. `sequence_index` is unique per vehicle and
/// defines queue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStop {
    pub id: StopId,
    pub vehicle_id: VehicleId,
    pub ride_id: RideId,
    pub stop_type: StopType,
    pub status: StopStatus,
    pub poi: PoiId,
    pub sequence_index: u32,
    /// Unix epoch seconds.
    pub created_at: i64,
    pub completed_at: Option<i64>,
}
