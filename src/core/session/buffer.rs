use bytes::{Bytes, BytesMut};

/// Ordered accumulation of audio chunks for the utterance in progress.
///
/// Silence chunks seen while silence accumulates are kept apart as pending
/// silence. They become part of the utterance if speech resumes (a pause in
/// the middle of a sentence) and are dropped when the utterance closes, so
/// trailing silence is never transcribed.
#[derive(Debug, Default)]
pub struct UtteranceBuffer {
    chunks: Vec<Bytes>,
    pending_silence: Vec<Bytes>,
    byte_len: usize,
}

impl UtteranceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the utterance
    pub fn append(&mut self, chunk: Bytes) {
        self.byte_len += chunk.len();
        self.chunks.push(chunk);
    }

    /// Hold a silence chunk until it is known whether speech resumes
    pub fn hold_silence(&mut self, chunk: Bytes) {
        self.pending_silence.push(chunk);
    }

    /// Move held silence into the utterance, preserving order
    pub fn commit_pending(&mut self) {
        for chunk in self.pending_silence.drain(..) {
            self.byte_len += chunk.len();
            self.chunks.push(chunk);
        }
    }

    /// Concatenate the committed chunks and empty the buffer
    pub fn flush(&mut self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.byte_len);
        for chunk in self.chunks.drain(..) {
            out.extend_from_slice(&chunk);
        }
        self.pending_silence.clear();
        self.byte_len = 0;
        out.freeze()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.pending_silence.clear();
        self.byte_len = 0;
    }

    /// Number of committed chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes of committed chunks
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    #[cfg(test)]
    fn pending_count(&self) -> usize {
        self.pending_silence.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.chunks.is_empty() && self.pending_silence.is_empty()
    }
}
