//! Weighted POI graph and shortest-path queries.
//!
//! The adjacency structure is derived from the persisted edge set and held
//! as an immutable snapshot behind [`GraphCache`]. The persistence
//! collaborator calls [`GraphCache::invalidate`] after any POI or edge
//! write; no polling.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use pathfinding::prelude::dijkstra;
use tracing::debug;

use crate::domain::{PoiEdge, PoiId};
use crate::error::{NoRouteError, StoreError, TravelTimeError};
use crate::traits::{EdgeSource, TravelTimes};

/// Result of a shortest-path query: total cost plus the POI sequence from
/// start to end inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    pub travel_time_s: u32,
    pub poi_ids: Vec<PoiId>,
}

/// Immutable adjacency view of the venue graph.
#[derive(Debug, Clone, Default)]
pub struct PoiGraph {
    adjacency: HashMap<PoiId, Vec<(PoiId, u32)>>,
}

impl PoiGraph {
    /// Build the adjacency map, inserting every edge in both directions.
    pub fn from_edges(edges: &[PoiEdge]) -> Self {
        let mut adjacency: HashMap<PoiId, Vec<(PoiId, u32)>> = HashMap::new();
        for edge in edges {
            adjacency
                .entry(edge.from_poi)
                .or_default()
                .push((edge.to_poi, edge.travel_time_s));
            adjacency
                .entry(edge.to_poi)
                .or_default()
                .push((edge.from_poi, edge.travel_time_s));
        }
        Self { adjacency }
    }

    /// Number of POIs with at least one edge.
    pub fn poi_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Shortest travel time and path between two POIs.
    ///
    /// `start == end` is zero cost with a single-node path. Equal-cost
    /// alternatives may resolve to either path; the total cost is the
    /// contract, the chosen path is not.
    pub fn shortest_path(&self, start: PoiId, end: PoiId) -> Result<PathResult, NoRouteError> {
        if start == end {
            return Ok(PathResult {
                travel_time_s: 0,
                poi_ids: vec![start],
            });
        }

        let (poi_ids, travel_time_s) = dijkstra(
            &start,
            |poi| self.adjacency.get(poi).into_iter().flatten().copied(),
            |poi| *poi == end,
        )
        .ok_or(NoRouteError {
            from: start,
            to: end,
        })?;

        Ok(PathResult {
            travel_time_s,
            poi_ids,
        })
    }
}

impl TravelTimes for PoiGraph {
    fn travel_time_s(&self, from: PoiId, to: PoiId) -> Result<u32, TravelTimeError> {
        Ok(self.shortest_path(from, to)?.travel_time_s)
    }
}

/// Shared, invalidate-on-write cache over the persisted edge set.
///
/// Readers take an `Arc` snapshot and never block each other; a rebuild
/// swaps the snapshot in one write. The cached structure is derived state,
/// never the source of truth.
pub struct GraphCache<E> {
    source: E,
    snapshot: RwLock<Option<Arc<PoiGraph>>>,
}

impl<E: EdgeSource> GraphCache<E> {
    pub fn new(source: E) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
        }
    }

    /// Current graph snapshot, building it from the edge source if no valid
    /// snapshot exists.
    pub fn snapshot(&self) -> Result<Arc<PoiGraph>, StoreError> {
        {
            let slot = match self.snapshot.read() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(graph) = slot.as_ref() {
                return Ok(Arc::clone(graph));
            }
        }

        let mut slot = match self.snapshot.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Another writer may have rebuilt while we waited for the lock.
        if let Some(graph) = slot.as_ref() {
            return Ok(Arc::clone(graph));
        }

        let edges = self.source.edges()?;
        let graph = Arc::new(PoiGraph::from_edges(&edges));
        debug!(
            edges = edges.len(),
            pois = graph.poi_count(),
            "rebuilt poi graph snapshot"
        );
        *slot = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// Drop the cached snapshot; the next query rebuilds from the source.
    ///
    /// Invoked by the persistence collaborator whenever a POI or edge is
    /// created, updated, or deleted.
    pub fn invalidate(&self) {
        let mut slot = match self.snapshot.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = None;
    }
}

impl<E: EdgeSource> TravelTimes for GraphCache<E> {
    fn travel_time_s(&self, from: PoiId, to: PoiId) -> Result<u32, TravelTimeError> {
        let graph = self.snapshot()?;
        Ok(graph.shortest_path(from, to)?.travel_time_s)
    }
}
