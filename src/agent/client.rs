//! Agent client: drives one conversational turn at a time.
//!
//! A turn is the agentic loop: call the model with the conversation and the
//! allowed tool definitions, run any requested tools, feed the results back,
//! and repeat until the model answers with text or the turn budget runs out.
//! Each step is yielded to the caller as an [`AgentMessage`] on a stream.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::agent::message::{AgentMessage, ResultMessage, TokenUsage};
use crate::config::{ChatConfig, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
use crate::error::{Error, ToolError};
use crate::llm::{
    ChatMessage, ContentBlock, FinishReason, LlmProvider, ToolCall, ToolCompletionRequest,
    ToolDefinition,
};
use crate::tools::ToolRegistry;

/// Stream of messages for one turn.
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<AgentMessage, Error>> + Send>>;

/// Something the interactive loop can talk to.
#[async_trait]
pub trait Conversation: Send + Sync {
    /// Send a user prompt and stream the response for this turn.
    async fn query(&self, prompt: &str) -> Result<ResponseStream, Error>;
}

/// Agent options.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: String,
    pub system_prompt: Option<String>,
    /// Qualified names of the tools the model may call.
    pub allowed_tools: Vec<String>,
    /// Maximum model calls per turn.
    pub max_turns: u32,
    pub max_tokens: u32,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            allowed_tools: Vec::new(),
            max_turns: 10,
            max_tokens: 1024,
        }
    }
}

impl AgentOptions {
    pub fn from_config(config: &ChatConfig, allowed_tools: Vec<String>) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: Some(config.system_prompt.clone()),
            allowed_tools,
            max_turns: config.max_turns,
            max_tokens: config.max_tokens,
        }
    }
}

/// Agent client holding the conversation history across turns.
pub struct AgentClient {
    inner: Arc<Inner>,
    history: Arc<Mutex<Vec<ChatMessage>>>,
}

struct Inner {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    options: AgentOptions,
    session_id: String,
}

impl AgentClient {
    pub fn new(llm: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, options: AgentOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                llm,
                tools,
                options,
                session_id: Uuid::new_v4().to_string(),
            }),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Snapshot of the conversation so far.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }
}

#[async_trait]
impl Conversation for AgentClient {
    async fn query(&self, prompt: &str) -> Result<ResponseStream, Error> {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::clone(&self.inner);
        let history = Arc::clone(&self.history);
        let prompt = prompt.to_string();

        tokio::spawn(async move {
            // Held for the whole turn so turns never interleave.
            let mut history = history.lock_owned().await;
            let checkpoint = history.len();
            if let Err(e) = inner.run_turn(&mut history, prompt, &tx).await {
                tracing::error!(error = %e, "Agent turn failed");
                history.truncate(checkpoint);
                let _ = tx.send(Err(e));
            }
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

type Sender = mpsc::UnboundedSender<Result<AgentMessage, Error>>;

impl Inner {
    async fn run_turn(
        &self,
        history: &mut Vec<ChatMessage>,
        prompt: String,
        tx: &Sender,
    ) -> Result<(), Error> {
        let started = Instant::now();
        let mut usage = TokenUsage::default();
        let definitions = self
            .tools
            .tool_definitions_for(&self.options.allowed_tools)
            .await;

        history.push(ChatMessage::user(prompt));

        for turn in 1..=self.options.max_turns {
            if tx.is_closed() {
                tracing::debug!("Response stream dropped, abandoning turn");
                return Ok(());
            }

            let response = self
                .llm
                .complete_with_tools(self.request(history, &definitions))
                .await?;
            usage.add(response.input_tokens, response.output_tokens);

            let tool_calls = response.tool_calls();
            history.push(ChatMessage::assistant(response.content.clone()));

            if !response.content.is_empty() {
                let _ = tx.send(Ok(AgentMessage::Assistant {
                    content: response.content.clone(),
                    model: self.llm.model_name().to_string(),
                }));
            }

            if tool_calls.is_empty() {
                let text = response
                    .content
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let refused = response.finish_reason == FinishReason::Refusal;
                let _ = tx.send(Ok(AgentMessage::Result(ResultMessage {
                    subtype: if refused { "error_refusal" } else { "success" }.to_string(),
                    is_error: refused,
                    result: Some(if refused && text.is_empty() {
                        "The model declined to respond.".to_string()
                    } else {
                        text
                    }),
                    num_turns: turn,
                    duration_ms: started.elapsed().as_millis() as u64,
                    session_id: self.session_id.clone(),
                    usage,
                })));
                tracing::debug!(turns = turn, tokens = usage.total(), "Turn complete");
                return Ok(());
            }

            let mut results = Vec::with_capacity(tool_calls.len());
            for call in &tool_calls {
                results.push(self.run_tool(call).await);
            }
            history.push(ChatMessage::tool_results(results.clone()));
            let _ = tx.send(Ok(AgentMessage::User { content: results }));
        }

        tracing::warn!(
            max_turns = self.options.max_turns,
            "Turn ended without a final answer"
        );
        let _ = tx.send(Ok(AgentMessage::Result(ResultMessage {
            subtype: "error_max_turns".to_string(),
            is_error: true,
            result: Some(format!(
                "Reached maximum number of turns ({})",
                self.options.max_turns
            )),
            num_turns: self.options.max_turns,
            duration_ms: started.elapsed().as_millis() as u64,
            session_id: self.session_id.clone(),
            usage,
        })));
        Ok(())
    }

    fn request(
        &self,
        history: &[ChatMessage],
        definitions: &[ToolDefinition],
    ) -> ToolCompletionRequest {
        let mut request = ToolCompletionRequest::new(history.to_vec(), definitions.to_vec())
            .with_max_tokens(self.options.max_tokens);
        if let Some(ref system) = self.options.system_prompt {
            request = request.with_system(system.clone());
        }
        request
    }

    /// Run one tool call. Failures are reported to the model, not raised.
    async fn run_tool(&self, call: &ToolCall) -> ContentBlock {
        let outcome = if self.options.allowed_tools.iter().any(|t| t == &call.name) {
            self.tools.execute(&call.name, call.arguments.clone()).await
        } else {
            Err(ToolError::NotAuthorized {
                name: call.name.clone(),
            })
        };

        match outcome {
            Ok(output) => {
                tracing::debug!(
                    tool = %call.name,
                    elapsed_ms = output.duration.as_millis() as u64,
                    "Tool executed"
                );
                ContentBlock::ToolResult {
                    tool_use_id: call.id.clone(),
                    content: output.content,
                    is_error: false,
                }
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                ContentBlock::ToolResult {
                    tool_use_id: call.id.clone(),
                    content: vec![ContentBlock::text(e.to_string())],
                    is_error: true,
                }
            }
        }
    }
}
