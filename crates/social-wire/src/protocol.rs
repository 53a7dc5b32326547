//! Physics Backend Protocol
//!
//! Request and response bodies for the snapshot-fetch/step-request cycle.
//!
//! - `GET  /state`          liveness probe
//! - `POST /reset`          body [`ResetRequest`], answers [`ResetResponse`]
//! - `POST /step?count=N`   answers a sequence of `AgentSnapshot`
//! - `POST /glitch`         may answer [`StatusResponse`]
//! - `POST /observer`       may answer [`StatusResponse`]
//!
//! Trigger replies are judged by status code alone; the body is optional.

use serde::{Deserialize, Serialize};

pub const STATE_PATH: &str = "/state";
pub const RESET_PATH: &str = "/reset";
pub const STEP_PATH: &str = "/step";
pub const GLITCH_PATH: &str = "/glitch";
pub const OBSERVER_PATH: &str = "/observer";

/// Re-initialize the remote world to the given bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    pub width: u32,
    pub height: u32,
}

impl ResetRequest {
    /// Bounds are sent as whole units, rounded.
    pub fn from_bounds(width: f64, height: f64) -> Self {
        Self {
            width: width.round().max(1.0) as u32,
            height: height.round().max(1.0) as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub status: String,
    pub width: u32,
    pub height: u32,
}

/// Acknowledgement body for stateless triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_request_rounds_bounds() {
        let req = ResetRequest::from_bounds(799.6, 600.2);
        assert_eq!(req, ResetRequest { width: 800, height: 600 });
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"width":800,"height":600}"#
        );
    }

    #[test]
    fn test_status_response_decodes() {
        let resp: StatusResponse = serde_json::from_str(r#"{"status": "glitched"}"#).unwrap();
        assert_eq!(resp.status, "glitched");
    }
}
