//! Error types for the dispatch engine.

use thiserror::Error;

use crate::domain::{PoiId, StopId};

/// The venue graph has no path between two POIs.
///
/// Under a correctly maintained edge set this never fires; treat it as a
/// data-integrity fault rather than a user-facing condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no route between POI {from} and POI {to}")]
pub struct NoRouteError {
    pub from: PoiId,
    pub to: PoiId,
}

/// Failures at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Failure answering a travel-time query.
///
/// A cached graph query can fail either because the graph is disconnected
/// or because the backing edge set could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelTimeError {
    #[error(transparent)]
    NoRoute(#[from] NoRouteError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a ride assignment failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    /// No vehicle is eligible to serve the ride. Recoverable: the caller is
    /// expected to discard the pending ride and report "no vehicles
    /// available".
    #[error("no active vehicles available")]
    NoActiveVehicles,
    #[error(transparent)]
    NoRoute(#[from] NoRouteError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TravelTimeError> for AssignError {
    fn from(err: TravelTimeError) -> Self {
        match err {
            TravelTimeError::NoRoute(e) => AssignError::NoRoute(e),
            TravelTimeError::Store(e) => AssignError::Store(e),
        }
    }
}

/// Why a stop transition was rejected.
///
/// These signal a client/UI synchronization bug, not a transient fault;
/// callers must surface them without retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopTransitionError {
    /// Only the lowest-sequence uncompleted stop of a vehicle may start.
    #[error("stop {stop} is not the next stop in the vehicle's queue")]
    NotNextInQueue { stop: StopId },
    /// Starting requires the stop to still be planned.
    #[error("stop {stop} is not planned")]
    NotPlanned { stop: StopId },
    /// Completing requires the stop to be on route.
    #[error("stop {stop} is not on route")]
    NotOnRoute { stop: StopId },
    #[error(transparent)]
    Store(#[from] StoreError),
}
