// src/archive/http_message.rs

//! Decoding of captured HTTP messages stored in response records.

use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

/// Content body of a captured HTTP response.
///
/// Strips the status line and headers, undoes chunked transfer encoding and
/// gzip/deflate content encoding. A step that fails leaves the bytes as they
/// were, since archived headers do not always describe the stored body.
pub fn decode_body(message: &[u8]) -> Vec<u8> {
    let Some((head_end, body_start)) = find_header_end(message) else {
        return message.to_vec();
    };

    let head = String::from_utf8_lossy(&message[..head_end]);
    let mut chunked = false;
    let mut encoding = None;
    for line in head.lines().skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_ascii_lowercase();
        match name.trim().to_ascii_lowercase().as_str() {
            "transfer-encoding" => chunked = value.contains("chunked"),
            "content-encoding" => encoding = Some(value),
            _ => {}
        }
    }

    let raw = &message[body_start..];
    let body = if chunked {
        dechunk(raw).unwrap_or_else(|| {
            log::debug!("Chunked body could not be decoded, keeping raw bytes");
            raw.to_vec()
        })
    } else {
        raw.to_vec()
    };

    match encoding.as_deref() {
        Some("gzip" | "x-gzip") => decompress(GzDecoder::new(body.as_slice())).unwrap_or(body),
        Some("deflate") => decompress(ZlibDecoder::new(body.as_slice()))
            .or_else(|| decompress(DeflateDecoder::new(body.as_slice())))
            .unwrap_or(body),
        _ => body,
    }
}

/// Offsets of the end of the header block and the start of the body.
fn find_header_end(message: &[u8]) -> Option<(usize, usize)> {
    if let Some(pos) = message.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some((pos, pos + 4));
    }
    message
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| (pos, pos + 2))
}

fn dechunk(mut data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let line_end = data.windows(2).position(|w| w == b"\r\n")?;
        let size_line = std::str::from_utf8(&data[..line_end]).ok()?;
        let size = usize::from_str_radix(size_line.split(';').next()?.trim(), 16).ok()?;
        data = &data[line_end + 2..];

        if size == 0 {
            return Some(out);
        }
        if data.len() < size {
            return None;
        }
        out.extend_from_slice(&data[..size]);
        data = &data[size..];
        data = data.strip_prefix(b"\r\n").unwrap_or(data);
    }
}

fn decompress(mut decoder: impl Read) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    #[test]
    fn test_plain_body() {
        let msg = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<p>hi</p>";
        assert_eq!(decode_body(msg), b"<p>hi</p>");
    }

    #[test]
    fn test_chunked_body() {
        let msg = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5;ext=1\r\npedia\r\n0\r\n\r\n";
        assert_eq!(decode_body(msg), b"Wikipedia");
    }

    #[test]
    fn test_broken_chunked_body_kept_raw() {
        let msg = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nnot chunked";
        assert_eq!(decode_body(msg), b"not chunked");
    }

    #[test]
    fn test_gzip_body() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"<html>compressed</html>").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut msg = b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\r\n".to_vec();
        msg.extend_from_slice(&compressed);
        assert_eq!(decode_body(&msg), b"<html>compressed</html>");
    }

    #[test]
    fn test_bad_gzip_kept_raw() {
        let msg = b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\r\nplain";
        assert_eq!(decode_body(msg), b"plain");
    }

    #[test]
    fn test_no_header_terminator() {
        assert_eq!(decode_body(b"just bytes"), b"just bytes");
    }

    #[test]
    fn test_bare_newlines() {
        assert_eq!(decode_body(b"HTTP/1.0 200 OK\nX: y\n\nbody"), b"body");
    }
}
