//! Output sinks for the interactive loop.
//!
//! Assistant text is written through [`OutputSink::write_paced`], which a
//! terminal sink renders as a typewriter effect and a test sink records
//! instantly.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::ChannelError;

/// Destination for chat output.
#[async_trait]
pub trait OutputSink: Send {
    /// Write text at once.
    async fn write(&mut self, text: &str) -> Result<(), ChannelError>;

    /// Write text with whatever pacing the sink applies.
    async fn write_paced(&mut self, text: &str) -> Result<(), ChannelError> {
        self.write(text).await
    }
}

/// Prints one character at a time with a fixed delay.
pub struct Typewriter<W> {
    writer: W,
    delay: Duration,
}

impl<W> Typewriter<W> {
    pub fn new(writer: W, delay: Duration) -> Self {
        Self { writer, delay }
    }

    /// A typewriter with no delay.
    pub fn instant(writer: W) -> Self {
        Self::new(writer, Duration::ZERO)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> OutputSink for Typewriter<W> {
    async fn write(&mut self, text: &str) -> Result<(), ChannelError> {
        self.writer
            .write_all(text.as_bytes())
            .await
            .map_err(ChannelError::Write)?;
        self.writer.flush().await.map_err(ChannelError::Write)
    }

    async fn write_paced(&mut self, text: &str) -> Result<(), ChannelError> {
        if self.delay.is_zero() {
            return self.write(text).await;
        }
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.write(ch.encode_utf8(&mut buf)).await?;
            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }
}

/// Records everything written, for tests and non-interactive use.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[async_trait]
impl OutputSink for Transcript {
    async fn write(&mut self, text: &str) -> Result<(), ChannelError> {
        self.text.push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transcript_records_writes() {
        let mut sink = Transcript::new();
        sink.write("You: ").await.unwrap();
        sink.write_paced("hello").await.unwrap();
        assert_eq!(sink.as_str(), "You: hello");
    }

    #[tokio::test]
    async fn instant_typewriter_writes_everything() {
        let mut sink = Typewriter::instant(Vec::new());
        sink.write_paced("héllo ✓").await.unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "héllo ✓");
    }

    #[tokio::test(start_paused = true)]
    async fn typewriter_sleeps_between_characters() {
        let mut sink = Typewriter::new(Vec::new(), Duration::from_millis(50));
        let start = tokio::time::Instant::now();
        sink.write_paced("abcd").await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(200));
        assert_eq!(sink.into_inner(), b"abcd");
    }

    #[tokio::test(start_paused = true)]
    async fn unpaced_write_does_not_sleep() {
        let mut sink = Typewriter::new(Vec::new(), Duration::from_millis(50));
        let start = tokio::time::Instant::now();
        sink.write("You: ").await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
