//! Streaming multipart bodies that report upload progress.

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::multipart::Part;

use crate::blob::Blob;
use crate::error::ClientError;
use crate::progress::ProgressReporter;

/// Size of each body chunk handed to the HTTP transport: 64 KiB.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Builds a file part that streams `blob` in chunks.
///
/// Progress is reported as each chunk is pulled by the transport, so
/// the percentage follows what has actually been handed to the socket.
/// `0` is reported up front.
pub fn progress_part(blob: &Blob, reporter: ProgressReporter) -> Result<Part, ClientError> {
    let data = payload(blob);
    let total = data.len();
    reporter.report(0);

    let stream = futures_util::stream::iter(chunk_ranges(total)).map(move |(offset, end)| {
        reporter.report_bytes(end as u64, total as u64);
        Ok::<_, std::io::Error>(data.slice(offset..end))
    });

    Part::stream_with_length(reqwest::Body::wrap_stream(stream), total as u64)
        .file_name(blob.name().to_string())
        .mime_str(blob.content_type())
        .map_err(|e| {
            ClientError::Configuration(format!(
                "invalid content type {:?}: {e}",
                blob.content_type()
            ))
        })
}

/// The blob's bytes as a `Bytes` sharing the same allocation.
fn payload(blob: &Blob) -> Bytes {
    Bytes::from_owner(blob.shared_data())
}

/// `[offset, end)` ranges covering `total` bytes in upload-sized chunks.
fn chunk_ranges(total: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..total)
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(move |offset| (offset, (offset + UPLOAD_CHUNK_SIZE).min(total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn reports_zero_before_streaming() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(Arc::new(move |p| sink.lock().unwrap().push(p)));

        let blob = Blob::new("app.apk", vec![7u8; UPLOAD_CHUNK_SIZE * 3]);
        let part = progress_part(&blob, reporter);

        assert!(part.is_ok());
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn chunks_cover_payload_exactly() {
        let ranges: Vec<_> = chunk_ranges(UPLOAD_CHUNK_SIZE * 2 + 10).collect();
        assert_eq!(
            ranges,
            vec![
                (0, UPLOAD_CHUNK_SIZE),
                (UPLOAD_CHUNK_SIZE, UPLOAD_CHUNK_SIZE * 2),
                (UPLOAD_CHUNK_SIZE * 2, UPLOAD_CHUNK_SIZE * 2 + 10),
            ]
        );
        assert_eq!(chunk_ranges(0).count(), 0);
    }

    #[test]
    fn payload_shares_blob_allocation() {
        let blob = Blob::new("app.apk", vec![3u8; 1024]);
        let bytes = payload(&blob);
        let chunk = bytes.slice(512..1024);
        assert_eq!(bytes.as_ptr(), blob.data().as_ptr());
        assert_eq!(chunk.as_ptr(), blob.data()[512..].as_ptr());
    }

    #[test]
    fn rejects_malformed_content_type() {
        let blob = Blob::new("app.apk", vec![1u8]).with_content_type("not a mime\n");
        let err = progress_part(&blob, ProgressReporter::silent()).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }
}
