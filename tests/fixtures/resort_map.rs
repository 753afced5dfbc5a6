//! Resort map fixture: named POIs and travel-time edges.
//!
//! Small but intentionally non-trivial: the direct Reception-Beach Bar
//! edge is slower than going via the Activity Center, so shortest-path
//! choices actually matter.

use buggy_dispatch::domain::{Poi, PoiEdge, PoiId};
use buggy_dispatch::store::InMemoryStore;

pub const RECEPTION: PoiId = PoiId(1);
pub const ACTIVITY_CENTER: PoiId = PoiId(2);
pub const BEACH_BAR: PoiId = PoiId(3);
pub const SPA: PoiId = PoiId(4);
pub const KIDS_CLUB: PoiId = PoiId(5);
/// No edges; unreachable from everywhere.
pub const OLD_PIER: PoiId = PoiId(6);

pub const POIS: &[(PoiId, &str, &str)] = &[
    (RECEPTION, "RECEPTION", "Reception"),
    (ACTIVITY_CENTER, "ACTIVITY_CENTER", "Activity Center"),
    (BEACH_BAR, "BEACH_BAR", "Beach Bar"),
    (SPA, "SPA", "Spa"),
    (KIDS_CLUB, "KIDS_CLUB", "Kids Club"),
    (OLD_PIER, "OLD_PIER", "Old Pier"),
];

pub const EDGES: &[(PoiId, PoiId, u32)] = &[
    (RECEPTION, ACTIVITY_CENTER, 60),
    (ACTIVITY_CENTER, BEACH_BAR, 120),
    (RECEPTION, BEACH_BAR, 300),
    (BEACH_BAR, SPA, 90),
    (RECEPTION, KIDS_CLUB, 210),
    (KIDS_CLUB, BEACH_BAR, 210),
];

/// Seed the resort map into a store.
pub fn seed_map(store: &InMemoryStore) {
    for &(id, code, name) in POIS {
        store.insert_poi(Poi {
            id,
            code: code.to_string(),
            name: name.to_string(),
        });
    }
    for &(a, b, travel_time_s) in EDGES {
        store.insert_edge(PoiEdge::new(a, b, travel_time_s));
    }
}
