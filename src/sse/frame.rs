//! Transport reader: turns a chunked response body into `data:` frames.
//!
//! Events are blocks terminated by a blank line (`\n\n`, or `\r\n\r\n`
//! since `\r\n` is folded to `\n` on arrival). Only lines that
//! start with the literal `data:` prefix carry payload; `event:`, `id:`,
//! `:` comments and keep-alive blocks are dropped.

use bytes::{Buf, BufMut, BytesMut};
use futures::stream::{self, Stream};
use futures_util::StreamExt;
use tracing::debug;

use crate::error::StreamError;
use crate::traits::HttpError;

const DELIMITER: &[u8] = b"\n\n";
const DATA_PREFIX: &str = "data:";

/// Payload of one complete `data:` event block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Text after the `data:` prefix, trimmed. Several `data:` lines in one
    /// block are joined with `\n`.
    pub payload: String,
}

impl Frame {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Incremental frame decoder.
///
/// Buffers raw bytes and only decodes a block once its delimiter has
/// arrived. The delimiter is ASCII, so a block boundary can never fall
/// inside a multi-byte UTF-8 sequence and chunk boundaries never corrupt
/// text.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
    /// A chunk ended in `\r`; whether it starts a `\r\n` depends on the
    /// next chunk.
    pending_cr: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every frame it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        // A delimiter may straddle the previous chunk boundary.
        let search_from = self.buffer.len().saturating_sub(DELIMITER.len() - 1);
        self.extend_normalized(chunk);

        let mut frames = Vec::new();
        let mut from = search_from;
        while let Some(pos) = find_delimiter(&self.buffer[from..]) {
            let end = from + pos;
            let block = self.buffer.split_to(end);
            self.buffer.advance(DELIMITER.len());
            if let Some(frame) = parse_block(&block) {
                frames.push(frame);
            }
            from = 0;
        }
        frames
    }

    /// Number of bytes held back waiting for a delimiter.
    pub fn pending_len(&self) -> usize {
        self.buffer.len() + usize::from(self.pending_cr)
    }

    fn extend_normalized(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        self.buffer.reserve(chunk.len() + 1);
        if std::mem::take(&mut self.pending_cr) && chunk.first() != Some(&b'\n') {
            self.buffer.put_u8(b'\r');
        }
        for (i, &byte) in chunk.iter().enumerate() {
            if byte != b'\r' {
                self.buffer.put_u8(byte);
                continue;
            }
            match chunk.get(i + 1) {
                Some(b'\n') => {}
                Some(_) => self.buffer.put_u8(b'\r'),
                None => self.pending_cr = true,
            }
        }
    }

    /// End of stream. An unterminated trailing block cannot be a complete
    /// frame and is discarded; returns how many bytes were dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.pending_len();
        self.buffer.clear();
        self.pending_cr = false;
        dropped
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
}

/// Extract the `data:` payload of one event block, if it has any.
fn parse_block(block: &[u8]) -> Option<Frame> {
    let text = String::from_utf8_lossy(block);
    let mut data_lines = text
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter_map(|line| line.strip_prefix(DATA_PREFIX))
        .map(str::trim)
        .peekable();

    data_lines.peek()?;
    Some(Frame::new(data_lines.collect::<Vec<_>>().join("\n")))
}

/// Adapt a response body into a lazy, ordered stream of frames.
///
/// A body read failure is yielded once as [`StreamError::ConnectionLost`]
/// and ends the stream; frames already yielded stay yielded.
pub fn frames<S>(body: S) -> impl Stream<Item = Result<Frame, StreamError>>
where
    S: Stream<Item = Result<bytes::Bytes, HttpError>> + Unpin,
{
    stream::unfold(
        Some((body, FrameDecoder::new(), std::collections::VecDeque::new())),
        |state| async move {
            let (mut body, mut decoder, mut ready) = state?;
            loop {
                if let Some(frame) = ready.pop_front() {
                    return Some((Ok(frame), Some((body, decoder, ready))));
                }

                match body.next().await {
                    Some(Ok(chunk)) => ready.extend(decoder.push(&chunk)),
                    Some(Err(e)) => {
                        let err = StreamError::ConnectionLost {
                            message: e.to_string(),
                        };
                        return Some((Err(err), None));
                    }
                    None => {
                        let dropped = decoder.finish();
                        if dropped > 0 {
                            debug!(dropped, "Discarding unterminated trailing SSE block");
                        }
                        return None;
                    }
                }
            }
        },
    )
}
