//! Incremental decoder for the newline-delimited event stream
//!
//! Network chunks split lines (and multi-byte characters) at arbitrary
//! points, so the decoder keeps the unterminated tail as raw bytes across
//! feeds and only parses newline-terminated lines. An incomplete tail is
//! not an error; a complete line that fails to parse is reported as
//! [`DecodedLine::Malformed`] rather than dropped on the floor.

use super::types::SyncEvent;

/// Outcome of decoding one complete line
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedLine {
    Event(SyncEvent),
    /// Newline-terminated but not a valid event; surfaced as a warning
    Malformed { line: String, error: String },
}

/// Buffering NDJSON decoder
#[derive(Debug, Default)]
pub struct EventDecoder {
    tail: Vec<u8>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a network chunk and decode every now-complete line
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DecodedLine> {
        self.tail.extend_from_slice(chunk);

        let mut decoded = Vec::new();
        while let Some(newline) = self.tail.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.tail.drain(..=newline).collect();
            // Drop the newline and an optional preceding carriage return
            let line = &line[..line.len() - 1];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if let Some(result) = Self::decode_line(line) {
                decoded.push(result);
            }
        }
        decoded
    }

    /// Flush at end of stream: a leftover tail is treated as a final,
    /// complete line (servers often omit the trailing newline).
    pub fn finish(&mut self) -> Option<DecodedLine> {
        let tail = std::mem::take(&mut self.tail);
        Self::decode_line(&tail)
    }

    /// Bytes currently buffered as an incomplete line
    pub fn pending_len(&self) -> usize {
        self.tail.len()
    }

    fn decode_line(line: &[u8]) -> Option<DecodedLine> {
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            return None;
        }
        match serde_json::from_slice::<SyncEvent>(line) {
            Ok(event) => Some(DecodedLine::Event(event)),
            Err(err) => Some(DecodedLine::Malformed {
                line: String::from_utf8_lossy(line).into_owned(),
                error: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complete_line() {
        let mut decoder = EventDecoder::new();
        let decoded = decoder.feed(b"{\"type\":\"start\",\"total\":10}\n");
        assert_eq!(decoded, vec![DecodedLine::Event(SyncEvent::Start { total: 10 })]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_line_split_across_chunks_is_buffered_not_surfaced() {
        let mut decoder = EventDecoder::new();
        let first = decoder.feed(b"{\"type\":\"start\",");
        assert!(first.is_empty());
        assert!(decoder.pending_len() > 0);

        let second = decoder.feed(b"\"total\":3}\n{\"type\":\"info\",");
        assert_eq!(second, vec![DecodedLine::Event(SyncEvent::Start { total: 3 })]);

        let third = decoder.feed(b"\"message\":\"ok\"}\n");
        assert_eq!(
            third,
            vec![DecodedLine::Event(SyncEvent::Info {
                message: "ok".into()
            })]
        );
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let full = "{\"type\":\"info\",\"message\":\"고객명 매핑\"}\n".as_bytes();
        // Split inside the first Korean character
        let cut = full.iter().position(|&b| b > 0x7f).unwrap() + 1;

        let mut decoder = EventDecoder::new();
        assert!(decoder.feed(&full[..cut]).is_empty());
        let decoded = decoder.feed(&full[cut..]);
        assert_eq!(
            decoded,
            vec![DecodedLine::Event(SyncEvent::Info {
                message: "고객명 매핑".into()
            })]
        );
    }

    #[test]
    fn test_complete_malformed_line_is_reported_not_dropped() {
        let mut decoder = EventDecoder::new();
        let decoded = decoder.feed(b"{\"type\":\"start\",\"total\":oops}\n");
        match &decoded[0] {
            DecodedLine::Malformed { line, .. } => {
                assert!(line.contains("oops"));
            }
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_crlf_lines_are_tolerated() {
        let mut decoder = EventDecoder::new();
        let decoded = decoder.feed(b"{\"type\":\"start\",\"total\":1}\r\n");
        assert_eq!(decoded, vec![DecodedLine::Event(SyncEvent::Start { total: 1 })]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut decoder = EventDecoder::new();
        let decoded = decoder.feed(b"\n  \n{\"type\":\"start\",\"total\":1}\n");
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_finish_parses_unterminated_final_line() {
        let mut decoder = EventDecoder::new();
        assert!(decoder.feed(b"{\"type\":\"result\",\"success\":true}").is_empty());
        match decoder.finish() {
            Some(DecodedLine::Event(SyncEvent::Result { success: true, .. })) => {}
            other => panic!("expected result event, got {:?}", other),
        }
    }

    #[test]
    fn test_finish_with_empty_tail_yields_nothing() {
        let mut decoder = EventDecoder::new();
        decoder.feed(b"{\"type\":\"start\",\"total\":1}\n");
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_many_events_in_one_chunk() {
        let mut decoder = EventDecoder::new();
        let chunk = b"{\"type\":\"start\",\"total\":2}\n{\"type\":\"progress\",\"processed\":1,\"total\":2}\n{\"type\":\"progress\",\"processed\":2,\"total\":2}\n";
        let decoded = decoder.feed(chunk);
        assert_eq!(decoded.len(), 3);
    }
}
