use super::{Generation, GenerationRequest, LLM, LLMBuilder};
use crate::provider::{DeploymentMap, ResolvedProvider};
use crate::utils::preview;
use crate::{LLMError, TranslationError};
use anyhow::anyhow;
use async_openai::Client;
use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use backoff::ExponentialBackoff;
use std::error::Error;
use std::time::Duration;

const RETRY_BASE_MS: u64 = 500;

/// Builder for the chat-completion client. Validation of the model or
/// deployment identifier happens here, at construction, so an unsupported
/// identifier never reaches the network.
#[derive(Debug)]
pub struct OpenAiChatBuilder {
    provider: ResolvedProvider,
    credentials: Credentials,
    max_retries: u32,
}

#[derive(Debug)]
enum Credentials {
    OpenAi {
        api_key: String,
    },
    Azure {
        endpoint: String,
        api_key: String,
        api_version: String,
    },
}

impl OpenAiChatBuilder {
    /// Direct-hosting path: a plain model name is sent as the model field.
    pub fn open_ai(model: &str, api_key: &str) -> Result<Self, TranslationError> {
        Ok(OpenAiChatBuilder {
            provider: ResolvedProvider::direct(model)?,
            credentials: Credentials::OpenAi {
                api_key: api_key.to_owned(),
            },
            max_retries: 3,
        })
    }

    /// Enterprise-hosted path: a pre-provisioned deployment alias stands in
    /// for the model name. The alias must come from the configured allow-list.
    pub fn azure(
        name_or_alias: &str,
        deployments: &DeploymentMap,
        endpoint: &str,
        api_key: &str,
        api_version: &str,
    ) -> Result<Self, TranslationError> {
        Ok(OpenAiChatBuilder {
            provider: ResolvedProvider::hosted(name_or_alias, deployments)?,
            credentials: Credentials::Azure {
                endpoint: endpoint.to_owned(),
                api_key: api_key.to_owned(),
                api_version: api_version.to_owned(),
            },
            max_retries: 3,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl LLMBuilder for OpenAiChatBuilder {
    type Built = OpenAiChat;

    fn build(&self) -> Result<Self::Built, TranslationError> {
        let backoff = retry_policy(self.max_retries);

        let client = match &self.credentials {
            Credentials::OpenAi { api_key } => {
                let config = OpenAIConfig::new().with_api_key(api_key);
                ChatClient::Direct(Client::with_config(config).with_backoff(backoff))
            }
            Credentials::Azure {
                endpoint,
                api_key,
                api_version,
            } => {
                let config = AzureConfig::new()
                    .with_api_base(endpoint)
                    .with_api_key(api_key)
                    .with_api_version(api_version)
                    .with_deployment_id(self.provider.identifier());
                ChatClient::Hosted(Client::with_config(config).with_backoff(backoff))
            }
        };

        Ok(OpenAiChat {
            client,
            model: self.provider.identifier().to_owned(),
        })
    }
}

/// Retries (rate limits, transient failures) belong to the remote client, not
/// the orchestrator; the budget is bounded by capping the total elapsed time.
fn retry_policy(max_retries: u32) -> ExponentialBackoff {
    let mut backoff = ExponentialBackoff::default();
    backoff.initial_interval = Duration::from_millis(RETRY_BASE_MS);
    backoff.max_elapsed_time =
        Some(Duration::from_millis(RETRY_BASE_MS * 2u64.saturating_pow(max_retries)));
    backoff
}

pub struct OpenAiChat {
    client: ChatClient,
    model: String,
}

/// The two provider paths differ only in the client configuration; request
/// construction and response handling are shared.
enum ChatClient {
    Direct(Client<OpenAIConfig>),
    Hosted(Client<AzureConfig>),
}

impl ChatClient {
    async fn create(
        &self,
        req: CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse, OpenAIError> {
        match self {
            ChatClient::Direct(client) => client.chat().create(req).await,
            ChatClient::Hosted(client) => client.chat().create(req).await,
        }
    }
}

impl LLM for OpenAiChat {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, req: GenerationRequest) -> Result<Generation, LLMError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(req.system.as_str())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(req.user.as_str())
                    .build()?
                    .into(),
            ])
            .temperature(req.temperature)
            .max_completion_tokens(req.max_output_tokens)
            .build()?;

        log::info!(r#"Requesting completion for "{}""#, preview(&req.user, 20));

        let response = tokio::time::timeout(req.timeout, self.client.create(request))
            .await
            .map_err(|_| LLMError::Timeout { after: req.timeout })??;

        let usage = response.usage;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ApiError(anyhow!("Response contained no choices")))?;
        let text = choice
            .message
            .content
            .ok_or_else(|| LLMError::ApiError(anyhow!("Response message had no content")))?;

        Ok(Generation {
            text,
            prompt_tokens: usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: usage.as_ref().map(|u| u.completion_tokens),
        })
    }
}

impl From<OpenAIError> for LLMError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Reqwest(e) => LLMError::ConnectionError(if let Some(e) = e.source() {
                anyhow!("{e}")
            } else {
                e.into()
            }),
            OpenAIError::ApiError(e) => LLMError::ApiError(anyhow!("{e}")),
            OpenAIError::JSONDeserialize(e) => LLMError::OtherError(e.into()),
            OpenAIError::FileSaveError(e) => LLMError::OtherError(anyhow!("{e}")),
            OpenAIError::FileReadError(e) => LLMError::OtherError(anyhow!("{e}")),
            OpenAIError::StreamError(e) => LLMError::ConnectionError(anyhow!("{e}")),
            OpenAIError::InvalidArgument(e) => LLMError::OtherError(anyhow!("{e}")),
        }
    }
}
