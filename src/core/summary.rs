use crate::config::ProviderConfig;
use crate::core::prompt::Prompt;
use crate::error::{Error, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
};
use std::future::Future;

pub const TEMPERATURE: f32 = 1.0;
pub const TOP_P: f32 = 1.0;
pub const MAX_TOKENS: u32 = 1000;

/// A chat-completion backend returning the first choice's text.
pub trait Completer {
    fn complete(&self, prompt: &Prompt) -> impl Future<Output = Result<String>> + Send;
}

/// OpenAI-compatible chat client pointed at the configured provider.
#[derive(Clone)]
pub struct SummaryClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl SummaryClient {
    pub fn new(provider: &ProviderConfig) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(provider.endpoint.trim_end_matches('/'))
            .with_api_key(&provider.api_key);

        Self {
            client: Client::with_config(config),
            model: provider.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Completer for SummaryClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = build_request(&self.model, prompt)?;

        tracing::info!(model = %self.model, prompt_chars = prompt.user.len(), "Requesting completion");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .inspect_err(|e| tracing::error!(error = %e, model = %self.model, "Completion failed"))?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::EmptyCompletion {
                model: self.model.clone(),
            })
    }
}

#[allow(deprecated)]
fn build_request(model: &str, prompt: &Prompt) -> Result<CreateChatCompletionRequest> {
    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.system.as_str())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user.as_str())
                .build()?
                .into(),
        ])
        .temperature(TEMPERATURE)
        .top_p(TOP_P)
        .max_tokens(MAX_TOKENS)
        .build()?;

    Ok(request)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::Completer;
    use crate::core::prompt::Prompt;
    use crate::error::{Error, Result};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct MockCompleter {
        pub reply: String,
        pub fail: bool,
        pub panic: bool,
        pub calls: Arc<Mutex<Vec<Prompt>>>,
    }

    impl MockCompleter {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn panicking() -> Self {
            Self {
                panic: true,
                ..Default::default()
            }
        }
    }

    impl Completer for MockCompleter {
        async fn complete(&self, prompt: &Prompt) -> Result<String> {
            self.calls.lock().unwrap().push(prompt.clone());
            if self.panic {
                panic!("mock completer panicked");
            }
            if self.fail {
                return Err(Error::EmptyCompletion {
                    model: "mock".into(),
                });
            }
            Ok(self.reply.clone())
        }
    }
}
