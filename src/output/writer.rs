//! Line-delimited message writer

use super::message::Message;
use crate::error::Result;
use std::io::Write;

/// Number of messages written, per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounts {
    pub schema: usize,
    pub record: usize,
    pub state: usize,
}

impl MessageCounts {
    /// Total messages written
    pub fn total(&self) -> usize {
        self.schema + self.record + self.state
    }
}

/// Writes one JSON message per line, flushing after each one
#[derive(Debug)]
pub struct MessageWriter<W: Write> {
    out: W,
    counts: MessageCounts,
}

impl MessageWriter<std::io::Stdout> {
    /// Writer on standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> MessageWriter<W> {
    /// Create a writer around any sink
    pub fn new(out: W) -> Self {
        Self {
            out,
            counts: MessageCounts::default(),
        }
    }

    /// Write a message and flush it
    pub fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;

        match message {
            Message::Schema { .. } => self.counts.schema += 1,
            Message::Record { .. } => self.counts.record += 1,
            Message::State { .. } => self.counts.state += 1,
        }
        Ok(())
    }

    /// Messages written so far
    pub fn counts(&self) -> MessageCounts {
        self.counts
    }

    /// Borrow the underlying sink
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Consume the writer and return the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}
