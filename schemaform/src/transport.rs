//! Boundary to whatever carries requests to the gateway.

use async_trait::async_trait;
use serde_json::Value;

/// Fetch the current config snapshot.
pub const CONFIG_GET: &str = "config.get";
/// Fetch the schema, UI hints and version.
pub const CONFIG_SCHEMA: &str = "config.schema";
/// Store a new config text.
pub const CONFIG_SET: &str = "config.set";
/// Store a new config text and restart the gateway with it.
pub const CONFIG_APPLY: &str = "config.apply";

/// A request/response client.
///
/// Implementations own timeouts and reconnection; callers never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> anyhow::Result<Value>;
}
