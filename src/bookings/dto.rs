use serde::Serialize;

use crate::bookings::gateway::CheckoutSession;

#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub status: &'static str,
    pub session: CheckoutSession,
}

/// Acknowledgement contract for the gateway; sent for every event that
/// passed signature verification.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}
