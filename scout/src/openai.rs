use anyhow::{Context, Result};
use async_openai::{
    config::AzureConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;
use tracing::debug;

use crate::{
    agent::{ChatBackend, Message, Reply, ToolCall},
    config::AzureSettings,
    ToolSpec,
};

pub struct AzureOpenAI {
    client: Client<AzureConfig>,
    deployment: String,
    temperature: f32,
    max_tokens: u16,
}

impl AzureOpenAI {
    /// Creates a chat client for an Azure OpenAI deployment.
    ///
    /// # Errors
    ///
    /// Fails if any of the endpoint, key, deployment or API version is missing,
    /// or if the temperature or token limit cannot be parsed.
    pub fn new(settings: &AzureSettings) -> Result<Self> {
        let endpoint = settings
            .endpoint
            .as_deref()
            .context("$AZURE_OPENAI_ENDPOINT not set")?;
        let api_key = settings
            .api_key
            .as_deref()
            .context("$AZURE_OPENAI_API_KEY not set")?;
        let deployment = settings
            .deployment
            .as_deref()
            .context("$AZURE_OPENAI_GPT4O_DEPLOYMENT_NAME not set")?;
        let api_version = settings
            .api_version
            .as_deref()
            .context("$AZURE_OPENAI_API_VERSION not set")?;

        let temperature = settings.temperature()?;
        let max_tokens = settings.max_tokens()?;

        let config = AzureConfig::new()
            .with_api_base(endpoint)
            .with_api_key(api_key)
            .with_deployment_id(deployment)
            .with_api_version(api_version);

        let backoff = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::from_secs(60)))
            .build();

        Ok(Self {
            client: Client::with_config(config).with_backoff(backoff),
            deployment: deployment.to_string(),
            temperature,
            max_tokens,
        })
    }
}

#[async_trait]
impl ChatBackend for AzureOpenAI {
    async fn complete(&self, history: &[Message], tools: &[ToolSpec]) -> Result<Reply> {
        let messages = history
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;
        let tools = tools.iter().map(to_tool).collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.deployment)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .messages(messages)
            .tools(tools)
            .build()?;

        debug!("Requesting completion over {} messages", history.len());
        let response = self.client.chat().create(request).await?;
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Could not find completion"))?
            .message;

        match message.tool_calls {
            Some(calls) if !calls.is_empty() => Ok(Reply::ToolCalls(
                calls
                    .into_iter()
                    .map(|call| ToolCall {
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    })
                    .collect(),
            )),
            _ => Ok(Reply::Answer(message.content.unwrap_or_default())),
        }
    }
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    Ok(match message {
        Message::System(content) => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.as_str())
            .build()?
            .into(),
        Message::User(content) => ChatCompletionRequestUserMessageArgs::default()
            .content(content.as_str())
            .build()?
            .into(),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();

            if let Some(content) = content {
                builder.content(content.as_str());
            }

            if !tool_calls.is_empty() {
                builder.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }

            builder.build()?.into()
        }
        Message::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.as_str())
            .content(content.as_str())
            .build()?
            .into(),
    })
}

fn to_tool(spec: &ToolSpec) -> Result<ChatCompletionTool> {
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(
            FunctionObjectArgs::default()
                .name(spec.name.as_str())
                .description(spec.description.as_str())
                .parameters(spec.parameters.clone())
                .build()?,
        )
        .build()?)
}
