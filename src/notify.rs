//! Notification payloads and delivery adapters.
//!
//! The engine emits one event per committed assignment or stop transition.
//! Delivery is fire-and-forget: adapters own their failures, and a lost
//! event never rolls back the state change it describes.

use serde::Serialize;
use tracing::warn;

use crate::domain::{RideId, RideRequest, RideStatus, VehicleId};
use crate::traits::Notifier;

/// What a [`DispatchEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventAction {
    RideAssigned,
    StopStarted,
    StopCompleted,
}

/// Opaque payload pushed to the notification collaborator after a committed
/// state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEvent {
    pub ride_id: RideId,
    pub public_code: String,
    pub vehicle_id: VehicleId,
    pub action: EventAction,
    pub ride_status: RideStatus,
}

impl DispatchEvent {
    /// Snapshot an event from the ride's post-commit state.
    pub fn for_ride(action: EventAction, ride: &RideRequest, vehicle_id: VehicleId) -> Self {
        Self {
            ride_id: ride.id,
            public_code: ride.public_code.clone(),
            vehicle_id,
            action,
            ride_status: ride.status,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ride_id": self.ride_id,
            "public_code": self.public_code,
            "vehicle_id": self.vehicle_id,
            "action": self.action,
            "ride_status": self.ride_status,
        })
    }
}

/// Discards every event. For embeddings without a push channel, and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: &DispatchEvent) {}
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint receiving the JSON event body via POST.
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000/internal/dispatch-events".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Pushes events to an HTTP endpoint.
///
/// The pub/sub fan-out behind that endpoint (SSE streams, mobile push) is
/// the collaborator's concern; this adapter only hands the payload over.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    config: WebhookConfig,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, event: &DispatchEvent) {
        let result = self
            .client
            .post(&self.config.url)
            .json(event)
            .send()
            .and_then(|resp| resp.error_for_status());

        if let Err(err) = result {
            warn!(?err, ride = %event.ride_id, action = ?event.action, "event delivery failed");
        }
    }
}
