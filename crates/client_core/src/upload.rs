use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use bytes::Bytes;
use futures::stream;
use reqwest::multipart::Part;
use tokio::sync::broadcast;

use crate::{draft::AudioAttachment, error::ClientError, ClientEvent, Result};

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;
const FALLBACK_MIME: &str = "application/octet-stream";

/// Wraps the audio payload in a streamed multipart part that reports a
/// cumulative bytes-sent percentage as the transport pulls chunks. The
/// percentage only ever grows; the caller resets it to zero once the
/// request finishes either way.
pub(crate) fn progress_part(
    audio: &AudioAttachment,
    events: broadcast::Sender<ClientEvent>,
) -> Result<Part> {
    let total = audio.bytes.len() as u64;
    let chunks: Vec<Bytes> = audio
        .bytes
        .chunks(UPLOAD_CHUNK_BYTES)
        .map(Bytes::copy_from_slice)
        .collect();

    let sent = Arc::new(AtomicU64::new(0));
    let body = stream::iter(chunks.into_iter().map(move |chunk| {
        let sent_so_far = sent.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
        let percent = if total == 0 {
            100
        } else {
            ((sent_so_far * 100) / total) as u8
        };
        let _ = events.send(ClientEvent::UploadProgress { percent });
        Ok::<Bytes, std::io::Error>(chunk)
    }));

    let mime = audio.mime_type.as_deref().unwrap_or(FALLBACK_MIME);
    Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
        .file_name(audio.filename.clone())
        .mime_str(mime)
        .map_err(|_| {
            ClientError::Validation(vec![format!("invalid audio mime type: {mime}")])
        })
}
