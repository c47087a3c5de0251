//! CLI channel, the stdin/stdout chat loop.
//!
//! Two states: awaiting input and streaming a response. A line reading
//! `exit` (any case) or end of input ends the session; a blank line
//! re-prompts; anything else is forwarded to the conversation and its
//! streamed messages are rendered until the turn's stream ends.

use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::agent::{AgentMessage, Conversation};
use crate::channels::sink::OutputSink;
use crate::error::{ChannelError, Error};
use crate::llm::ContentBlock;

/// Banner printed when the session starts.
pub const BANNER: &str = "Note-Taking Chatbot: Type 'exit' to quit.\n\n";

/// Prompt printed before each line of input.
pub const PROMPT: &str = "You: ";

/// Placeholder for a tool result without text.
const EXECUTED: &str = "Executed";

/// Reads lines from `input` and renders responses to `sink`.
pub struct CliChannel<R, S> {
    input: R,
    sink: S,
}

impl<R, S> CliChannel<R, S>
where
    R: AsyncBufRead + Unpin + Send,
    S: OutputSink,
{
    pub fn new(input: R, sink: S) -> Self {
        Self { input, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run until `exit` or end of input. Returns the number of turns sent.
    ///
    /// Errors from the conversation are not caught; they end the session.
    pub async fn run<C>(&mut self, conversation: &C) -> Result<usize, Error>
    where
        C: Conversation + ?Sized,
    {
        self.sink.write(BANNER).await?;
        let mut turns = 0;

        loop {
            self.sink.write(PROMPT).await?;
            let Some(line) = self.read_line().await? else {
                self.sink.write("\n").await?;
                tracing::debug!("End of input");
                break;
            };

            if line.is_empty() {
                continue;
            }
            if is_exit(&line) {
                break;
            }

            turns += 1;
            tracing::debug!(turn = turns, chars = line.len(), "Forwarding input");
            let mut stream = conversation.query(&line).await?;
            while let Some(message) = stream.next().await {
                self.render(&message?).await?;
            }
        }

        Ok(turns)
    }

    async fn read_line(&mut self) -> Result<Option<String>, ChannelError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .map_err(ChannelError::Read)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    async fn render(&mut self, message: &AgentMessage) -> Result<(), ChannelError> {
        match message {
            AgentMessage::Assistant { content, .. } | AgentMessage::User { content } => {
                for block in content {
                    self.render_block(block).await?;
                }
            }
            AgentMessage::Result(result) => {
                if result.is_error {
                    let detail = result.result.as_deref().unwrap_or(&result.subtype);
                    self.sink.write(&format!("\nError: {}\n", detail)).await?;
                }
            }
        }
        Ok(())
    }

    async fn render_block(&mut self, block: &ContentBlock) -> Result<(), ChannelError> {
        match block {
            ContentBlock::Text { text } => {
                self.sink.write_paced(text).await?;
                self.sink.write("\n").await
            }
            ContentBlock::ToolUse { name, input, .. } => {
                self.sink
                    .write(&format!("\n[Tool: {} called with {}]\n", name, input))
                    .await
            }
            ContentBlock::ToolResult { .. } => {
                let text = block.first_result_text().unwrap_or(EXECUTED);
                self.sink.write(&format!("[Result: {}]\n\n", text)).await
            }
        }
    }
}

/// Whether a trimmed input line ends the session.
pub fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit")
}
