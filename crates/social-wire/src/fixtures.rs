//! Sample payloads for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // [dev-dependencies]
//! // social-wire = { path = "../social-wire", features = ["test-fixtures"] }
//!
//! use social_wire::fixtures;
//!
//! let snapshots = fixtures::sample_step_response();
//! ```

use crate::AgentSnapshot;

/// Raw body of a backend step response for three agents.
pub fn sample_step_response_json() -> &'static str {
    include_str!("../tests/fixtures/step_response.json")
}

/// Returns the decoded sample step response.
///
/// Contains 3 agents:
/// - an Entropics hunter
/// - an agent reported as Luminaries (useful for faction-mismatch sync)
/// - a deactivated Luminaries agent with negative resource
pub fn sample_step_response() -> Vec<AgentSnapshot> {
    AgentSnapshot::parse_sequence(sample_step_response_json())
        .expect("Failed to parse step_response.json")
}
