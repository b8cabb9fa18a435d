//! Line scanning over a child's output stream.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Write a line to stdout as-is. Used when no handler is configured.
#[allow(clippy::needless_pass_by_value)]
pub fn default_print(line: String) {
    let mut stdout = std::io::stdout().lock();
    // A closed stdout must not take the stream task down with it
    let _ = writeln!(stdout, "{line}");
}

/// Feed every line of `reader` to `handler`, in order.
///
/// Lines are split on `\n` with a trailing `\r` also removed, and decoded
/// as lossy UTF-8. A final line without a terminator is still delivered.
/// Scanning stops at end-of-stream or at the first read error; read errors
/// are logged and otherwise treated like end-of-stream.
///
/// Returns the number of lines delivered.
pub async fn scan_lines<R, F>(mut reader: R, handler: F) -> usize
where
    R: AsyncBufRead + Unpin,
    F: Fn(String),
{
    let mut buf = Vec::new();
    let mut count = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                handler(decode_line(&buf));
                count += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, lines = count, "stream read failed, treating as end of stream");
                break;
            }
        }
    }

    count
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, BufReader, ReadBuf};

    /// Reader whose every read fails.
    struct Broken;

    impl AsyncRead for Broken {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::other("pipe broke")))
        }
    }

    async fn collect(input: &[u8]) -> (usize, Vec<String>) {
        let lines = Mutex::new(Vec::new());
        let count = scan_lines(input, |line| lines.lock().unwrap().push(line)).await;
        (count, lines.into_inner().unwrap())
    }

    #[tokio::test]
    async fn test_splits_lines_in_order() {
        let (count, lines) = collect(b"Line 1\nLine 2\n").await;
        assert_eq!(count, 2);
        assert_eq!(lines, vec!["Line 1", "Line 2"]);
    }

    #[tokio::test]
    async fn test_strips_crlf() {
        let (_, lines) = collect(b"one\r\ntwo\r\n").await;
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_keeps_blank_lines_and_unterminated_tail() {
        let (count, lines) = collect(b"a\n\nb").await;
        assert_eq!(count, 3);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let (count, lines) = collect(b"").await;
        assert_eq!(count, 0);
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let (_, lines) = collect(b"ok \xff\n").await;
        assert_eq!(lines, vec!["ok \u{fffd}"]);
    }

    #[tokio::test]
    async fn test_small_buffer_does_not_split_lines() {
        let input: &[u8] = b"a fairly long line that spans many reads\nshort\n";
        let reader = BufReader::with_capacity(4, input);
        let lines = Mutex::new(Vec::new());

        scan_lines(reader, |line| lines.lock().unwrap().push(line)).await;

        assert_eq!(
            lines.into_inner().unwrap(),
            vec!["a fairly long line that spans many reads", "short"]
        );
    }

    #[tokio::test]
    async fn test_read_error_ends_scan_quietly() {
        let reader = BufReader::new((&b"first\n"[..]).chain(Broken));
        let lines = Mutex::new(Vec::new());

        let count = scan_lines(reader, |line| lines.lock().unwrap().push(line)).await;

        assert_eq!(count, 1);
        assert_eq!(lines.into_inner().unwrap(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_partial_line_before_read_error_is_dropped() {
        let reader = BufReader::new((&b"whole\nhal"[..]).chain(Broken));
        let lines = Mutex::new(Vec::new());

        let count = scan_lines(reader, |line| lines.lock().unwrap().push(line)).await;

        assert_eq!(count, 1);
        assert_eq!(lines.into_inner().unwrap(), vec!["whole"]);
    }

    #[test]
    fn test_default_print_does_not_panic() {
        default_print("hello from default_print".to_string());
    }
}
