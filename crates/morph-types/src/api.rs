//! Request / response envelopes for the `/animate` endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success body for `POST /animate`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimateResponse {
    /// Public relative path of the stored artifact, directly fetchable from
    /// the relay, e.g. `/animations/1712000000000_animation.gif`.
    pub animation_url: String,
    /// Human-readable label of the provider that produced the artifact.
    pub service_used: String,
}

/// Error envelope returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// User-facing error message.  Internal failure detail is logged
    /// server-side only and never appears here.
    pub error: String,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn animate_response_uses_camel_case_field_names() {
        let body = AnimateResponse {
            animation_url: "/animations/1_animation.gif".into(),
            service_used: "Runway ML".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["animationUrl"], "/animations/1_animation.gif");
        assert_eq!(json["serviceUsed"], "Runway ML");
    }
}
