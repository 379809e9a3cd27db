//! Byte stream to sentence framing
//!
//! Transports deliver arbitrary chunks: a TCP read may end mid-sentence, a UDP
//! datagram may hold several sentences. [`SentenceFramer`] buffers the bytes and
//! yields complete lines in arrival order, independent of chunk boundaries.

use tracing::{trace, warn};

/// Largest partial line kept while waiting for a terminator.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10 * 1024;

/// Sentences completed by one [`SentenceFramer::push`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Framed {
    /// Complete lines, trimmed and starting at `$` or `!`
    pub sentences: Vec<String>,
    /// Bytes discarded because the partial line outgrew the buffer
    pub overflow: Option<usize>,
}

/// Accumulates bytes and splits them on CR/LF.
#[derive(Debug)]
pub struct SentenceFramer {
    buffer: Vec<u8>,
    capacity: usize,
}

impl Default for SentenceFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceFramer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Framer that overflows once a partial line exceeds `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: Vec::with_capacity(256), capacity }
    }

    /// Bytes currently held waiting for a terminator.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partial line, e.g. after the link was lost.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Append `chunk` and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Framed {
        let mut framed = Framed::default();
        self.buffer.extend_from_slice(chunk);

        let mut start = 0;
        for (index, byte) in self.buffer.iter().enumerate() {
            if matches!(byte, b'\r' | b'\n') {
                if let Some(sentence) = clean_line(&self.buffer[start..index]) {
                    framed.sentences.push(sentence);
                }
                start = index + 1;
            }
        }
        self.buffer.drain(..start);

        if self.buffer.len() > self.capacity {
            let discarded = self.buffer.len();
            warn!(
                discarded,
                capacity = self.capacity,
                "No line terminator found, discarding buffer"
            );
            self.buffer.clear();
            framed.overflow = Some(discarded);
        }

        trace!(
            chunk = chunk.len(),
            sentences = framed.sentences.len(),
            retained = self.buffer.len(),
            "Framed chunk"
        );
        framed
    }
}

/// Trim a raw line and resynchronise on its last start delimiter.
///
/// `$` and `!` are reserved in NMEA 0183, so anything before the last one is
/// noise from a corrupted or truncated previous sentence.
fn clean_line(raw: &[u8]) -> Option<String> {
    let start = raw.iter().rposition(|b| matches!(b, b'$' | b'!'))?;
    let line = String::from_utf8_lossy(&raw[start..]);
    let line = line.trim();
    if line.len() <= 1 {
        return None;
    }
    Some(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const STREAM: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n\
$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n\
$SDDPT,2.4,0.5,*78\n\
$WIMWV,214.8,R,0.1,K,A*28\r\n";

    fn frame_all(chunks: &[&[u8]]) -> Vec<String> {
        let mut framer = SentenceFramer::new();
        chunks.iter().flat_map(|chunk| framer.push(chunk).sentences).collect()
    }

    #[test]
    fn splits_crlf_and_bare_lf() {
        let sentences = frame_all(&[STREAM]);
        assert_eq!(sentences.len(), 4);
        assert!(sentences[0].starts_with("$GPGGA"));
        assert_eq!(sentences[2], "$SDDPT,2.4,0.5,*78");
        assert!(sentences.iter().all(|s| !s.ends_with('\r')));
    }

    #[test]
    fn retains_partial_line_between_chunks() {
        let mut framer = SentenceFramer::new();
        let first = framer.push(b"$SDDPT,2.4,");
        assert!(first.sentences.is_empty());
        assert_eq!(framer.buffered(), 11);

        let second = framer.push(b"0.5,*78\r");
        assert_eq!(second.sentences, vec!["$SDDPT,2.4,0.5,*78".to_string()]);

        let third = framer.push(b"\n");
        assert!(third.sentences.is_empty());
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn leading_noise_is_dropped() {
        let sentences = frame_all(&[b"\x00\xffgarbage$SDDPT,2.4,0.5,*78\r\nno delimiter here\r\n"]);
        assert_eq!(sentences, vec!["$SDDPT,2.4,0.5,*78".to_string()]);
    }

    #[test]
    fn overflow_without_terminator_fires_once() {
        let mut framer = SentenceFramer::new();
        let junk = vec![b'A'; 15_000];

        let framed = framer.push(&junk);
        assert_eq!(framed.overflow, Some(15_000));
        assert_eq!(framer.buffered(), 0);

        let next = framer.push(b"$SDDPT,2.4,0.5,*78\r\n");
        assert_eq!(next.overflow, None);
        assert_eq!(next.sentences, vec!["$SDDPT,2.4,0.5,*78".to_string()]);
    }

    #[test]
    fn chunked_overflow_fires_once_and_recovers() {
        let mut framer = SentenceFramer::new();
        let junk = vec![b'A'; 15_000];

        let overflows =
            junk.chunks(1000).filter(|chunk| framer.push(chunk).overflow.is_some()).count();
        assert_eq!(overflows, 1);

        let next = framer.push(b"\r\n$SDDPT,2.4,0.5,*78\r\n");
        assert_eq!(next.sentences, vec!["$SDDPT,2.4,0.5,*78".to_string()]);
    }

    #[test]
    fn long_stream_with_terminators_never_overflows() {
        let mut framer = SentenceFramer::new();
        for _ in 0..1000 {
            assert_eq!(framer.push(STREAM).overflow, None);
        }
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_output(
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..12)
        ) {
            let mut points: Vec<usize> = cuts.iter().map(|i| i.index(STREAM.len() + 1)).collect();
            points.sort_unstable();

            let mut chunks = Vec::new();
            let mut last = 0;
            for point in points {
                chunks.push(&STREAM[last..point]);
                last = point;
            }
            chunks.push(&STREAM[last..]);

            prop_assert_eq!(frame_all(&chunks), frame_all(&[STREAM]));
        }
    }
}
