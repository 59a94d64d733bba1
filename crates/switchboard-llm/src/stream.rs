//! Stream re-framing
//!
//! Provider streams are OpenAI-style SSE: `data: {chunk}` lines ending with
//! a `data: [DONE]` sentinel. Network reads split that text at arbitrary
//! byte offsets, so input is buffered until a full line is available.
//! Output is a sequence of canonical events; the router encodes each one as
//! an `event: message` SSE frame.
//!
//! A re-framer emits exactly one `message_stop`, whether the provider sent
//! the sentinel or simply closed the connection.

use std::sync::Arc;

use futures_util::{Stream, StreamExt, stream};

use crate::error::LlmError;
use crate::protocol::canonical::{
    CanonicalStreamEvent, CanonicalUsage, ResponseBlock, Role, StreamMessage,
};
use crate::protocol::provider::ProviderStreamChunk;
use crate::provider::{ByteStream, Provider};

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// The `message_start` and `content_block_start` events that open every stream
pub fn header_events(message_id: &str, model: &str) -> [CanonicalStreamEvent; 2] {
    let start = CanonicalStreamEvent::MessageStart {
        message: StreamMessage {
            id: message_id.to_owned(),
            message_type: "message".to_owned(),
            role: Role::Assistant,
            content: Vec::new(),
            model: model.to_owned(),
            stop_reason: None,
            stop_sequence: None,
            usage: CanonicalUsage::default(),
        },
    };
    let block = CanonicalStreamEvent::ContentBlockStart {
        index: 0,
        content_block: ResponseBlock::Text { text: String::new() },
    };

    [start, block]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReframeState {
    /// Accepting provider bytes
    Open,
    /// `message_stop` has been emitted; further input is ignored
    Closed,
}

enum Line {
    Skip,
    Event(CanonicalStreamEvent),
    Done,
}

/// Incremental provider-stream to canonical-stream converter
///
/// Feed it raw body bytes as they arrive. The events produced do not depend
/// on how the body was split into chunks.
pub struct StreamReframer {
    provider: Arc<dyn Provider>,
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to contain no newline
    scanned: usize,
    state: ReframeState,
    usage: CanonicalUsage,
    block_open: bool,
}

impl StreamReframer {
    /// Create a re-framer for a stream whose header events were already sent
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            buffer: Vec::new(),
            scanned: 0,
            state: ReframeState::Open,
            usage: CanonicalUsage::default(),
            block_open: true,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == ReframeState::Closed
    }

    /// Consume a chunk of provider bytes and return the events it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<CanonicalStreamEvent> {
        let mut events = Vec::new();
        if self.is_closed() {
            return events;
        }

        self.buffer.extend_from_slice(chunk);

        let mut start = 0;
        let mut search = self.scanned;
        while let Some(offset) = self.buffer[search..].iter().position(|&b| b == b'\n') {
            let end = search + offset;
            let line = self.buffer[start..end].to_vec();
            start = end + 1;
            search = start;

            match self.parse_line(&line) {
                Line::Skip => {}
                Line::Event(event) => self.emit(event, &mut events),
                Line::Done => {
                    self.close(&mut events);
                    break;
                }
            }
        }

        if self.is_closed() {
            self.buffer.clear();
            self.scanned = 0;
        } else {
            self.buffer.drain(..start);
            self.scanned = self.buffer.len();
        }

        events
    }

    /// Flush at end of input, synthesizing the terminal events if needed
    ///
    /// A trailing line without a newline is processed as a complete line.
    pub fn finish(&mut self) -> Vec<CanonicalStreamEvent> {
        let mut events = Vec::new();
        if self.is_closed() {
            return events;
        }

        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        match self.parse_line(&rest) {
            Line::Skip | Line::Done => {}
            Line::Event(event) => self.emit(event, &mut events),
        }

        self.close(&mut events);
        events
    }

    fn parse_line(&mut self, line: &[u8]) -> Line {
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        let Ok(line) = std::str::from_utf8(line) else {
            tracing::warn!(provider = self.provider.name(), "discarding non UTF-8 stream line");
            return Line::Skip;
        };

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return Line::Skip;
        };
        let payload = payload.strip_prefix(' ').unwrap_or(payload);

        if payload.trim_end() == DONE_SENTINEL {
            return Line::Done;
        }

        match serde_json::from_str::<ProviderStreamChunk>(payload) {
            Ok(chunk) => {
                if let Some(usage) = &chunk.usage {
                    if let Some(input) = usage.prompt_tokens {
                        self.usage.input_tokens = input;
                    }
                    if let Some(output) = usage.completion_tokens {
                        self.usage.output_tokens = output;
                    }
                }

                self.provider.transform_stream_chunk(&chunk).map_or(Line::Skip, Line::Event)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %e,
                    data = %payload,
                    "discarding malformed stream chunk"
                );
                Line::Skip
            }
        }
    }

    fn emit(&mut self, event: CanonicalStreamEvent, events: &mut Vec<CanonicalStreamEvent>) {
        let event = match event {
            CanonicalStreamEvent::MessageDelta { delta, .. } => {
                self.close_block(events);
                CanonicalStreamEvent::MessageDelta { delta, usage: self.usage }
            }
            other => other,
        };

        tracing::trace!(event = event.kind(), "emitting stream event");
        events.push(event);
    }

    fn close_block(&mut self, events: &mut Vec<CanonicalStreamEvent>) {
        if self.block_open {
            self.block_open = false;
            events.push(CanonicalStreamEvent::ContentBlockStop { index: 0 });
        }
    }

    fn close(&mut self, events: &mut Vec<CanonicalStreamEvent>) {
        self.close_block(events);
        events.push(CanonicalStreamEvent::MessageStop);
        self.state = ReframeState::Closed;
    }
}

impl Drop for StreamReframer {
    fn drop(&mut self) {
        if !self.is_closed() {
            tracing::debug!(provider = self.provider.name(), "stream ended before completion");
        }
    }
}

/// Build the full canonical event stream for an opened provider stream
///
/// Reading stops at the sentinel, which drops the upstream body. An upstream
/// read error ends the stream with that error, aborting the client
/// connection without further events.
pub fn canonical_event_stream(
    upstream: ByteStream,
    provider: Arc<dyn Provider>,
    message_id: &str,
    model: &str,
) -> impl Stream<Item = Result<CanonicalStreamEvent, LlmError>> + Send + use<> {
    let header = stream::iter(header_events(message_id, model).map(Ok));
    let reframer = StreamReframer::new(provider);

    let body = stream::unfold(Some((upstream, reframer)), |state| async move {
        let (mut upstream, mut reframer) = state?;

        let Some(next) = upstream.next().await else {
            let events: Vec<Result<CanonicalStreamEvent, LlmError>> =
                reframer.finish().into_iter().map(Ok).collect();
            return Some((events, None));
        };

        match next {
            Ok(bytes) => {
                let events = reframer.feed(&bytes).into_iter().map(Ok).collect();
                let state = (!reframer.is_closed()).then_some((upstream, reframer));
                Some((events, state))
            }
            Err(error) => {
                tracing::warn!(error = %error, "upstream stream failed; aborting client stream");
                Some((vec![Err(error)], None))
            }
        }
    })
    .flat_map(stream::iter);

    header.chain(body)
}
