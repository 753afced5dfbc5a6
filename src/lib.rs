//! buggy-dispatch core engine
//!
//! Shortest-path routing over a resort's POI graph plus greedy
//! assignment of guest ride requests to shuttle vehicles.

pub mod traits;
pub mod domain;
pub mod error;
pub mod graph;
pub mod simulate;
pub mod dispatch;
pub mod stops;
pub mod notify;
pub mod store;
