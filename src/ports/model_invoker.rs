//! Model invoker port for single-turn chat calls.

use serde::{Deserialize, Serialize};

use super::PortFuture;

/// A single-turn conversation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseRequest {
    /// Inference profile ARN (or model id) to invoke.
    pub model_id: String,
    /// System instruction sent ahead of the user message.
    pub system_prompt: String,
    /// The user's message.
    pub user_message: String,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input_tokens: u32,
    /// Completion tokens.
    pub output_tokens: u32,
    /// Sum of both.
    pub total_tokens: u32,
}

/// The provider's reply, reduced to what the gateway reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverseReply {
    /// First text segment of the reply, if the reply carried one.
    pub text: Option<String>,
    /// Token usage, when reported.
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Sends chat-style requests to a hosted model.
pub trait ModelInvoker: Send + Sync {
    /// Submit one system instruction and one user message.
    fn converse(&self, request: &ConverseRequest) -> PortFuture<'_, ConverseReply>;
}
