// src/archive/record.rs

//! Blocking WARC record decoding.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::bufread::GzDecoder;
use warc::{WarcHeader, WarcReader};

use crate::archive::http_message;
use crate::error::{AppError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read the record at the start of `reader` and return its content body if it
/// is a response record.
///
/// A gzip member at the start of the stream is decompressed transparently.
/// Only the first record is inspected; an empty stream yields `None`.
pub fn read_first_response<R: Read>(reader: R) -> Result<Option<Vec<u8>>> {
    let mut reader = BufReader::new(reader);
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if gzipped {
        first_response(BufReader::new(GzDecoder::new(reader)))
    } else {
        first_response(reader)
    }
}

/// Seek into a local WARC file and decode the record found there.
///
/// The file handle is closed on every return path.
pub fn extract_payload_from_file(path: &Path, offset: u64) -> Result<Option<Vec<u8>>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    read_first_response(file)
}

fn first_response<B: BufRead>(reader: B) -> Result<Option<Vec<u8>>> {
    let Some(record) = WarcReader::new(reader).iter_records().next() else {
        log::debug!("No WARC record before end of stream");
        return Ok(None);
    };
    let record = record.map_err(AppError::warc)?;

    let warc_type = record.header(WarcHeader::WarcType);
    if warc_type.as_deref() != Some("response") {
        log::debug!(
            "First record is {:?}, not a response",
            warc_type.as_deref().unwrap_or("untyped")
        );
        return Ok(None);
    }

    let is_http = record
        .header(WarcHeader::ContentType)
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("application/http"));

    if is_http {
        Ok(Some(http_message::decode_body(record.body())))
    } else {
        Ok(Some(record.body().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::NamedTempFile;

    use super::*;

    fn warc_record(warc_type: &str, content_type: &str, block: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "WARC/1.0\r\n\
             WARC-Type: {warc_type}\r\n\
             WARC-Record-ID: <urn:uuid:12345678-1234-1234-1234-123456789abc>\r\n\
             WARC-Date: 2023-01-01T00:00:00Z\r\n\
             WARC-Target-URI: http://example.com/\r\n\
             Content-Type: {content_type}\r\n\
             Content-Length: {}\r\n\
             \r\n",
            block.len()
        )
        .into_bytes();
        out.extend_from_slice(block);
        out.extend_from_slice(b"\r\n\r\n");
        out
    }

    fn http_response(body: &str) -> Vec<u8> {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        )
        .into_bytes()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_response_record_returns_body() {
        let data = warc_record(
            "response",
            "application/http; msgtype=response",
            &http_response("<p>hello</p>"),
        );
        let payload = read_first_response(data.as_slice()).unwrap();
        assert_eq!(payload, Some(b"<p>hello</p>".to_vec()));
    }

    #[test]
    fn test_request_record_returns_none() {
        let mut data = warc_record(
            "request",
            "application/http; msgtype=request",
            b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n",
        );
        // a response after the request must not be reached
        data.extend(warc_record(
            "response",
            "application/http; msgtype=response",
            &http_response("later"),
        ));
        assert_eq!(read_first_response(data.as_slice()).unwrap(), None);
    }

    #[test]
    fn test_empty_stream_returns_none() {
        assert_eq!(read_first_response(&b""[..]).unwrap(), None);
    }

    #[test]
    fn test_non_http_response_returns_raw_block() {
        let data = warc_record("response", "text/dns", b"example.com. 300 IN A 1.2.3.4");
        let payload = read_first_response(data.as_slice()).unwrap();
        assert_eq!(payload, Some(b"example.com. 300 IN A 1.2.3.4".to_vec()));
    }

    #[test]
    fn test_gzipped_record() {
        let data = gzip(&warc_record(
            "response",
            "application/http; msgtype=response",
            &http_response("zipped"),
        ));
        let payload = read_first_response(data.as_slice()).unwrap();
        assert_eq!(payload, Some(b"zipped".to_vec()));
    }

    #[test]
    fn test_local_file_at_offset() {
        let first = gzip(&warc_record(
            "warcinfo",
            "application/warc-fields",
            b"software: test\r\n",
        ));
        let second = gzip(&warc_record(
            "response",
            "application/http; msgtype=response",
            &http_response("second"),
        ));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&first).unwrap();
        file.write_all(&second).unwrap();
        file.flush().unwrap();

        assert_eq!(extract_payload_from_file(file.path(), 0).unwrap(), None);
        assert_eq!(
            extract_payload_from_file(file.path(), first.len() as u64).unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[test]
    fn test_offset_past_end_returns_none() {
        let data = warc_record("response", "application/http", &http_response("x"));
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let past_end = data.len() as u64 + 10;
        assert_eq!(extract_payload_from_file(file.path(), past_end).unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = extract_payload_from_file(Path::new("/nonexistent/x.warc"), 0).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
