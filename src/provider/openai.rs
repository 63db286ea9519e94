//! OpenAI provider over the Chat Completions client
//!
//! Built without a credential, the provider still constructs; every call
//! then fails with `MissingCredential`, which the chat view renders as
//! assistant text instead of crashing.

use anyhow::Result;
use async_trait::async_trait;

use super::CompletionProvider;
use crate::completions::Client;
use crate::conversation::Turn;
use crate::error::ChatError;

pub struct OpenAiProvider {
    client: Option<Client>,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>, api_base: Option<String>, model: Option<String>) -> Self {
        let client = api_key.map(|key| {
            let mut client = Client::new(key);
            if let Some(base) = api_base {
                client = client.with_api_base(base);
            }
            if let Some(model) = model {
                client = client.with_model(model);
            }
            client
        });
        Self { client }
    }

    pub fn has_credential(&self) -> bool {
        self.client.is_some()
    }

    pub fn model(&self) -> &str {
        self.client
            .as_ref()
            .map(|c| c.model())
            .unwrap_or(crate::completions::DEFAULT_MODEL)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, system_prompt: &str, turns: &[Turn]) -> Result<String> {
        let client = self.client.as_ref().ok_or(ChatError::MissingCredential)?;

        let response = client.create(system_prompt, turns).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "completion usage"
            );
        }

        let text = response
            .text()
            .ok_or_else(|| ChatError::Gateway("service returned no text".into()))?;

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_fails_every_call() {
        let provider = OpenAiProvider::new(None, None, None);
        assert!(!provider.has_credential());

        let err = provider.complete("prompt", &[]).await.unwrap_err();
        let chat_err = err.downcast_ref::<ChatError>().unwrap();
        assert!(matches!(chat_err, ChatError::MissingCredential));
    }

    #[test]
    fn test_configured_provider_reports_model() {
        let provider = OpenAiProvider::new(Some("key".into()), None, Some("gpt-4o-mini".into()));
        assert!(provider.has_credential());
        assert_eq!(provider.model(), "gpt-4o-mini");
    }
}
