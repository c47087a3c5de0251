//! Messages yielded by the agent runtime for one conversational turn.

use crate::llm::ContentBlock;

/// Token usage accumulated over a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    pub fn add(&mut self, input_tokens: u32, output_tokens: u32) {
        self.input_tokens += input_tokens;
        self.output_tokens += output_tokens;
    }
}

/// Terminal message of a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMessage {
    /// `success`, `error_max_turns` or `error_refusal`.
    pub subtype: String,
    pub is_error: bool,
    /// Final assistant text, or the error description.
    pub result: Option<String>,
    /// Number of model calls made during the turn.
    pub num_turns: u32,
    pub duration_ms: u64,
    pub session_id: String,
    pub usage: TokenUsage,
}

/// One streamed item of a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentMessage {
    /// Model output: text and tool-use blocks.
    Assistant {
        content: Vec<ContentBlock>,
        model: String,
    },
    /// Tool results fed back to the model.
    User { content: Vec<ContentBlock> },
    /// End of the turn.
    Result(ResultMessage),
}

impl AgentMessage {
    /// Content blocks carried by this message (empty for results).
    pub fn blocks(&self) -> &[ContentBlock] {
        match self {
            Self::Assistant { content, .. } | Self::User { content } => content,
            Self::Result(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates() {
        let mut usage = TokenUsage::default();
        usage.add(10, 5);
        usage.add(3, 2);
        assert_eq!(usage.input_tokens, 13);
        assert_eq!(usage.output_tokens, 7);
        assert_eq!(usage.total(), 20);
    }

    #[test]
    fn blocks_of_result_are_empty() {
        let msg = AgentMessage::Result(ResultMessage {
            subtype: "success".into(),
            is_error: false,
            result: None,
            num_turns: 1,
            duration_ms: 0,
            session_id: "s".into(),
            usage: TokenUsage::default(),
        });
        assert!(msg.blocks().is_empty());
    }
}
