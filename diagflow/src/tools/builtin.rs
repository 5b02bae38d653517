//! Built-in tools shipped with the server binary.

use super::ToolCapability;
use async_trait::async_trait;
use serde_json::Value;

/// Slug the echo tool is registered under by default.
pub const ECHO_SLUG: &str = "echo";

/// Returns its input unchanged. Used for connectivity checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTool;

#[async_trait]
impl ToolCapability for EchoTool {
    async fn process(&self, input: Value) -> anyhow::Result<Value> {
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_echo_returns_input() {
        let input = json!({"nested": {"values": [1, 2, 3]}});
        assert_eq!(EchoTool.process(input.clone()).await.unwrap(), input);
        assert!(EchoTool.config().is_none());
    }
}
