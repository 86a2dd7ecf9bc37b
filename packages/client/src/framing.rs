//! Splitting the inbound byte stream into reported messages.

use std::io;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

/// Longest inbound line accepted in [`Framing::Lines`] mode, in bytes
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Policy for turning socket reads into messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Framing {
    /// One message per newline-terminated segment; partial segments are
    /// buffered until the next read
    #[default]
    Lines,
    /// Every raw read is one message, regardless of embedded newlines
    Chunk,
}

/// Codec for one connection's inbound stream, driven by `FramedRead`.
///
/// Messages are decoded as lossy UTF-8 with trailing whitespace removed;
/// blank messages are never yielded. Lines longer than `max_length` are
/// dropped up to and including their terminating newline.
#[derive(Debug)]
pub struct MessageCodec {
    framing: Framing,
    max_length: usize,
    /// Index in the buffer up to which no newline was found yet
    next_index: usize,
    /// Set while skipping the rest of an over-long line
    discarding: bool,
}

impl MessageCodec {
    pub fn new(framing: Framing) -> Self {
        Self::with_max_length(framing, MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom line length limit (zero is bumped to one)
    pub fn with_max_length(framing: Framing, max_length: usize) -> Self {
        Self {
            framing,
            max_length: max_length.max(1),
            next_index: 0,
            discarding: false,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn decode_chunk(&mut self, buf: &mut BytesMut) -> Option<String> {
        if buf.is_empty() {
            return None;
        }
        let chunk = buf.split();
        normalize(&chunk)
    }

    fn decode_line(&mut self, buf: &mut BytesMut) -> Option<String> {
        loop {
            // Never look further than one byte past the limit
            let read_to = buf.len().min(self.max_length.saturating_add(1));
            let newline = buf[self.next_index..read_to]
                .iter()
                .position(|&b| b == b'\n')
                .map(|offset| self.next_index + offset);

            match (self.discarding, newline) {
                (true, Some(end)) => {
                    buf.advance(end + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    buf.advance(read_to);
                    self.next_index = 0;
                    if buf.is_empty() {
                        return None;
                    }
                }
                (false, Some(end)) => {
                    self.next_index = 0;
                    let line = buf.split_to(end + 1);
                    if let Some(message) = normalize(&line) {
                        return Some(message);
                    }
                }
                (false, None) if buf.len() > self.max_length => {
                    tracing::warn!(
                        "Discarding inbound line longer than {} bytes",
                        self.max_length
                    );
                    self.discarding = true;
                }
                (false, None) => {
                    self.next_index = read_to;
                    return None;
                }
            }
        }
    }
}

impl Decoder for MessageCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, io::Error> {
        Ok(match self.framing {
            Framing::Chunk => self.decode_chunk(buf),
            Framing::Lines => self.decode_line(buf),
        })
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, io::Error> {
        if let Some(message) = self.decode(buf)? {
            return Ok(Some(message));
        }

        // Flush a trailing partial line once the stream has ended
        let rest = buf.split();
        self.next_index = 0;
        if std::mem::take(&mut self.discarding) {
            return Ok(None);
        }
        Ok(normalize(&rest))
    }
}

fn normalize(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_end();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::StreamExt;
    use tokio_util::codec::FramedRead;

    fn decode_all(codec: &mut MessageCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut messages = Vec::new();
        while let Some(message) = codec.decode(buf).unwrap() {
            messages.push(message);
        }
        messages
    }

    #[test]
    fn test_lines_splits_multiple_messages_in_one_read() {
        // テスト項目: 1 回の読み込みに含まれる複数行がそれぞれ別メッセージになる
        // given (前提条件):
        let mut codec = MessageCodec::new(Framing::Lines);
        let mut buf = BytesMut::from(&b"first message\nsecond message\n"[..]);

        // when (操作):
        let messages = decode_all(&mut codec, &mut buf);

        // then (期待する結果):
        assert_eq!(messages, vec!["first message", "second message"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_lines_buffers_partial_message_across_reads() {
        // テスト項目: 2 回の読み込みに分割された行が 1 つのメッセージに結合される
        // given (前提条件):
        let mut codec = MessageCodec::new(Framing::Lines);
        let mut buf = BytesMut::new();

        // when (操作):
        buf.extend_from_slice(b"Just one");
        let first = decode_all(&mut codec, &mut buf);
        buf.extend_from_slice(b" more thing\r\n");
        let second = decode_all(&mut codec, &mut buf);

        // then (期待する結果):
        assert!(first.is_empty());
        assert_eq!(second, vec!["Just one more thing"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_lines_drops_blank_lines() {
        // テスト項目: 空行や空白のみの行は報告されない
        // given (前提条件):
        let mut codec = MessageCodec::new(Framing::Lines);
        let mut buf = BytesMut::from(&b"\n   \nhello\n\n"[..]);

        // when (操作):
        let messages = decode_all(&mut codec, &mut buf);

        // then (期待する結果):
        assert_eq!(messages, vec!["hello"]);
    }

    #[test]
    fn test_lines_reassembles_split_utf8_character() {
        // テスト項目: 読み込み境界で分割されたマルチバイト文字が正しく復元される
        // given (前提条件):
        let mut codec = MessageCodec::new(Framing::Lines);
        let bytes = "こんにちは\n".as_bytes();
        let mut buf = BytesMut::new();

        // when (操作):
        buf.extend_from_slice(&bytes[..4]);
        let first = decode_all(&mut codec, &mut buf);
        buf.extend_from_slice(&bytes[4..]);
        let second = decode_all(&mut codec, &mut buf);

        // then (期待する結果):
        assert!(first.is_empty());
        assert_eq!(second, vec!["こんにちは"]);
    }

    #[test]
    fn test_lines_discards_overlong_line_with_bounded_buffer() {
        // テスト項目: 改行のない長大な入力はバッファを上限内に保ったまま破棄され、次の行から再開される
        // given (前提条件):
        let max_length = 1024;
        let mut codec = MessageCodec::with_max_length(Framing::Lines, max_length);
        let mut buf = BytesMut::new();
        let read = vec![b'x'; 1024];

        // when (操作):
        let mut reported = Vec::new();
        for _ in 0..4096 {
            buf.extend_from_slice(&read);
            reported.extend(decode_all(&mut codec, &mut buf));
            assert!(buf.len() <= max_length);
        }
        buf.extend_from_slice(b"tail of the long line\nhello\n");
        reported.extend(decode_all(&mut codec, &mut buf));

        // then (期待する結果):
        assert_eq!(reported, vec!["hello"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_lines_accepts_line_at_max_length() {
        // テスト項目: 上限ちょうどの長さの行は破棄されずに報告される
        // given (前提条件):
        let mut codec = MessageCodec::with_max_length(Framing::Lines, 8);
        let mut buf = BytesMut::from(&b"12345678\n123456789\nok\n"[..]);

        // when (操作):
        let messages = decode_all(&mut codec, &mut buf);

        // then (期待する結果):
        assert_eq!(messages, vec!["12345678", "ok"]);
    }

    #[test]
    fn test_decode_eof_flushes_partial_line() {
        // テスト項目: ストリーム終了時に改行なしの残りデータが報告される
        // given (前提条件):
        let mut codec = MessageCodec::new(Framing::Lines);
        let mut buf = BytesMut::from(&b"complete\nincomplete  "[..]);

        // when (操作):
        let complete = codec.decode_eof(&mut buf).unwrap();
        let rest = codec.decode_eof(&mut buf).unwrap();
        let end = codec.decode_eof(&mut buf).unwrap();

        // then (期待する結果):
        assert_eq!(complete.as_deref(), Some("complete"));
        assert_eq!(rest.as_deref(), Some("incomplete"));
        assert_eq!(end, None);
    }

    #[test]
    fn test_chunk_treats_each_read_as_one_message() {
        // テスト項目: Chunk 方式では 1 回の読み込みが 1 メッセージとして扱われる
        // given (前提条件):
        let mut codec = MessageCodec::new(Framing::Chunk);
        let mut buf = BytesMut::from(&b"first message\nsecond message\n"[..]);

        // when (操作):
        let messages = decode_all(&mut codec, &mut buf);

        // then (期待する結果):
        assert_eq!(messages, vec!["first message\nsecond message"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_chunk_ignores_whitespace_only_read() {
        // テスト項目: Chunk 方式で空白のみの読み込みは報告されない
        // given (前提条件):
        let mut codec = MessageCodec::new(Framing::Chunk);
        let mut buf = BytesMut::from(&b" \r\n"[..]);

        // when (操作):
        let messages = decode_all(&mut codec, &mut buf);

        // then (期待する結果):
        assert!(messages.is_empty());
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn test_framed_read_yields_lines_and_trailing_partial() {
        // テスト項目: FramedRead 経由で各行と末尾の未終端行が順に報告される
        // given (前提条件):
        let input: &[u8] = b"alpha\r\nbeta\n\ngamma";

        // when (操作):
        let messages: Vec<String> = FramedRead::new(input, MessageCodec::new(Framing::Lines))
            .map(|message| message.unwrap())
            .collect()
            .await;

        // then (期待する結果):
        assert_eq!(messages, vec!["alpha", "beta", "gamma"]);
    }
}
