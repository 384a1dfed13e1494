//! Single-turn conversations through the Bedrock runtime `Converse` API.

use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::types::{ContentBlock, ConversationRole, Message, SystemContentBlock};

use super::sdk_failure;
use crate::error::GatewayError;
use crate::ports::{ConverseReply, ConverseRequest, ModelInvoker, PortFuture, TokenUsage};

const SERVICE: &str = "bedrock-runtime";

/// Sends one user message to a model or inference profile.
#[derive(Debug, Clone)]
pub struct BedrockInvoker {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockInvoker {
    /// Create a client from shared SDK configuration.
    #[must_use]
    pub fn new(sdk: &SdkConfig) -> Self {
        Self { client: aws_sdk_bedrockruntime::Client::new(sdk) }
    }
}

impl ModelInvoker for BedrockInvoker {
    fn converse(&self, request: &ConverseRequest) -> PortFuture<'_, ConverseReply> {
        let request = request.clone();
        Box::pin(async move {
            let message = Message::builder()
                .role(ConversationRole::User)
                .content(ContentBlock::Text(request.user_message.clone()))
                .build()
                .map_err(|e| GatewayError::upstream(SERVICE, format!("invalid message: {e}")))?;

            let output = self
                .client
                .converse()
                .model_id(&request.model_id)
                .system(SystemContentBlock::Text(request.system_prompt.clone()))
                .messages(message)
                .send()
                .await
                .map_err(|e| sdk_failure(SERVICE, "Converse", e))?;

            let text = output
                .output()
                .and_then(|o| o.as_message().ok())
                .and_then(|m| m.content().iter().find_map(|block| block.as_text().ok()))
                .cloned();
            let usage = output.usage().map(|u| TokenUsage {
                input_tokens: token_count(u.input_tokens()),
                output_tokens: token_count(u.output_tokens()),
                total_tokens: token_count(u.total_tokens()),
            });

            Ok(ConverseReply { text, usage })
        })
    }
}

fn token_count(raw: i32) -> u32 {
    u32::try_from(raw).unwrap_or(0)
}
