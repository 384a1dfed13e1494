//! Stateless single-turn conversations against a provisioned profile.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::GatewayError;
use crate::ports::{bounded, ConverseRequest, ModelInvoker, TokenUsage};

/// System prompt used when a request does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a personal AI assistant, try to provide most accurate answers to the user query";

/// Result of a `use` operation.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    /// Plain text of the model's reply.
    pub conversation_response: String,
    /// Profile ARN the request was sent to.
    pub profile_used: String,
    /// Token usage, when the provider reported it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Forwards one user message (plus system prompt) to a model.
///
/// No history is kept between calls.
#[derive(Clone)]
pub struct ConversationProxy {
    invoker: Arc<dyn ModelInvoker>,
    default_system_prompt: String,
    timeout_secs: u64,
}

impl ConversationProxy {
    /// Create a proxy over `invoker`, taking prompt and deadline from `config`.
    #[must_use]
    pub fn new(invoker: Arc<dyn ModelInvoker>, config: &Config) -> Self {
        let default_system_prompt = config
            .profiles
            .default_system_prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        Self { invoker, default_system_prompt, timeout_secs: config.timeouts.invocation }
    }

    /// Send `user_message` to `profile_id` and return the first text segment.
    ///
    /// An empty `system_prompt` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns the invoker's error (or a timeout) if the call fails, and
    /// [`GatewayError::MalformedReply`] if the reply carries no text.
    pub async fn converse(
        &self,
        profile_id: &str,
        user_message: &str,
        system_prompt: Option<&str>,
    ) -> Result<Conversation, GatewayError> {
        let system_prompt = system_prompt
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.default_system_prompt)
            .to_string();
        let request = ConverseRequest {
            model_id: profile_id.to_string(),
            system_prompt,
            user_message: user_message.to_string(),
        };

        let reply = bounded("converse", self.timeout_secs, self.invoker.converse(&request))
            .await
            .inspect_err(|e| error!(profile_id, error = %e, "failed to converse with model"))?;

        let text = reply.text.ok_or_else(|| {
            GatewayError::MalformedReply(format!("reply from {profile_id} has no text content"))
        })?;
        debug!(profile_id, chars = text.len(), "conversation completed");

        Ok(Conversation {
            conversation_response: text,
            profile_used: profile_id.to_string(),
            usage: reply.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::EchoInvoker;

    const PROFILE: &str = "arn:aws:bedrock:us-west-2:111122223333:application-inference-profile/p1";

    #[tokio::test]
    async fn uses_default_system_prompt() {
        let invoker = Arc::new(EchoInvoker::new());
        let proxy = ConversationProxy::new(invoker.clone(), &Config::sample());

        let conversation = proxy.converse(PROFILE, "hello there", None).await.unwrap();
        assert_eq!(conversation.conversation_response, "echo: hello there");
        assert_eq!(conversation.profile_used, PROFILE);
        assert!(conversation.usage.is_some());

        let sent = invoker.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(sent[0].model_id, PROFILE);
    }

    #[tokio::test]
    async fn empty_system_prompt_counts_as_absent() {
        let invoker = Arc::new(EchoInvoker::new());
        let proxy = ConversationProxy::new(invoker.clone(), &Config::sample());

        proxy.converse(PROFILE, "hi", Some("")).await.unwrap();
        proxy.converse(PROFILE, "hi", Some("Answer in French.")).await.unwrap();

        let sent = invoker.requests();
        assert_eq!(sent[0].system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(sent[1].system_prompt, "Answer in French.");
    }

    #[tokio::test]
    async fn configured_default_prompt_wins() {
        let mut config = Config::sample();
        config.profiles.default_system_prompt = Some("Be brief.".into());
        let invoker = Arc::new(EchoInvoker::new());
        let proxy = ConversationProxy::new(invoker.clone(), &config);

        proxy.converse(PROFILE, "hi", None).await.unwrap();
        assert_eq!(invoker.requests()[0].system_prompt, "Be brief.");
    }

    #[tokio::test]
    async fn reply_without_text_is_malformed() {
        let proxy =
            ConversationProxy::new(Arc::new(EchoInvoker::without_text()), &Config::sample());
        let err = proxy.converse(PROFILE, "hi", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedReply(_)));
    }

    #[tokio::test]
    async fn invoker_failure_is_upstream() {
        let invoker = Arc::new(EchoInvoker::new());
        invoker.fail();
        let proxy = ConversationProxy::new(invoker, &Config::sample());
        let err = proxy.converse(PROFILE, "hi", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { .. }));
    }
}
