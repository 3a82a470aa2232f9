//! Request types for the daemon protocol.

use serde::{Deserialize, Serialize};

/// A request from a client.
///
/// Callers are authenticated by socket peer credentials, so the request body
/// carries only the command and its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// The command to execute (e.g., "service.control", "unit_file.write").
    pub command: String,

    /// Command parameters as a JSON object.
    #[serde(default)]
    pub params: serde_json::Value,
}
