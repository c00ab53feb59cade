//! Incremental Server-Sent Events decoding.
//!
//! Bytes arrive in arbitrary chunks; complete frames are split on a blank
//! line (`\n\n` or `\r\n\r\n`) and their `data:` lines joined with `\n`.

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    /// Bytes already searched for a terminator without finding one.
    scanned: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the data payload of every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        // A terminator may straddle the previous chunk boundary by up to 3 bytes.
        let mut from = self.scanned.saturating_sub(3);
        while let Some((end, sep_len)) = find_frame_end(&self.buf, from) {
            let frame: Vec<u8> = self.buf.drain(..end + sep_len).take(end).collect();
            from = 0;
            match std::str::from_utf8(&frame) {
                Ok(text) => {
                    if let Some(data) = parse_frame_data(text) {
                        payloads.push(data);
                    }
                }
                Err(e) => tracing::debug!("dropping non-utf8 sse frame: {e}"),
            }
        }
        self.scanned = self.buf.len();
        payloads
    }
}

/// Position of the first frame terminator and its length.
fn find_frame_end(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    for i in from..buf.len() {
        if buf[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        if buf[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
    }
    None
}

fn parse_frame_data(frame: &str) -> Option<String> {
    let mut data_lines = Vec::new();
    for line in frame.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_split_across_chunks() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"data: {\"a\":").is_empty());
        assert_eq!(dec.push(b"1}\n\n"), vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn several_frames_in_one_chunk() {
        let mut dec = SseDecoder::new();
        let out = dec.push(b"data: one\n\ndata: two\r\n\r\ndata: thr");
        assert_eq!(out, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(dec.push(b"ee\n\n"), vec!["three".to_string()]);
    }

    #[test]
    fn large_frame_fed_bytewise_is_scanned_once() {
        let payload = "x".repeat(4096);
        let frame = format!("data: {payload}\r\n\r\n");
        let mut dec = SseDecoder::new();
        let mut out = Vec::new();
        for (i, byte) in frame.as_bytes().iter().enumerate() {
            out.extend(dec.push(std::slice::from_ref(byte)));
            if out.is_empty() {
                assert_eq!(dec.scanned, i + 1);
            }
        }
        assert_eq!(out, vec![payload]);
        assert_eq!(dec.scanned, 0);
    }

    #[test]
    fn terminator_split_across_chunks() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"data: a\r\n").is_empty());
        assert!(dec.push(b"\r").is_empty());
        assert_eq!(dec.push(b"\ndata: b\n"), vec!["a".to_string()]);
        assert_eq!(dec.push(b"\n"), vec!["b".to_string()]);
    }

    #[test]
    fn comments_and_other_fields_are_ignored() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b": keepalive\n\n").is_empty());
        let out = dec.push(b"event: flow\nid: 7\ndata: x\ndata: y\n\n");
        assert_eq!(out, vec!["x\ny".to_string()]);
    }
}
