//! Binary assets (thumbnails, avatars) and the upload event stream.
//!
//! Uploads are pre-checked locally so a non-image or oversized file never
//! reaches the blob store. Adapter streams are wrapped by [`guard_upload`]
//! which enforces the event contract consumers rely on.

use futures_util::stream::{self, BoxStream, StreamExt};
use thiserror::Error;

/// Default upload ceiling: 2 MiB.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

const BYTES_PER_MIB: usize = 1024 * 1024;

/// Failures raised before or during an asset upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// No file content was provided.
    #[error("File not found")]
    MissingFile,
    /// Content type is not an image.
    #[error("File must be an image")]
    NotAnImage { content_type: String },
    /// Payload exceeds the configured ceiling.
    #[error("File must be smaller than {}", describe_limit(.limit))]
    TooLarge { size: usize, limit: usize },
    /// The blob store reported a failure mid-transfer.
    #[error("{message}")]
    Transfer { message: String },
}

/// Whole mebibytes read as `2MB`; any other limit is spelled in bytes.
fn describe_limit(limit: &usize) -> String {
    let limit = *limit;
    if limit > 0 && limit % BYTES_PER_MIB == 0 {
        format!("{}MB", limit / BYTES_PER_MIB)
    } else {
        format!("{limit} bytes")
    }
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl Asset {
    /// Wrap file content with its name and MIME type.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Declared MIME type.
    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    /// File content.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Run the pre-upload checks against `max_bytes`.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{Asset, UploadError, MAX_UPLOAD_BYTES};
    ///
    /// let pdf = Asset::new("cv.pdf", "application/pdf", vec![1, 2, 3]);
    /// assert!(matches!(pdf.check(MAX_UPLOAD_BYTES), Err(UploadError::NotAnImage { .. })));
    /// ```
    pub fn check(&self, max_bytes: usize) -> Result<(), UploadError> {
        if self.is_empty() {
            return Err(UploadError::MissingFile);
        }
        if !self.content_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(UploadError::NotAnImage {
                content_type: self.content_type.clone(),
            });
        }
        if self.len() > max_bytes {
            return Err(UploadError::TooLarge {
                size: self.len(),
                limit: max_bytes,
            });
        }
        Ok(())
    }
}

/// One event of an upload in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// Percentage transferred, 0 to 100.
    Progress(u8),
    /// Transfer finished; carries the retrievable URI.
    Done(String),
    /// Transfer failed; carries the backend message.
    Failed(String),
}

impl UploadEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Stream of upload events for a single transfer.
pub type UploadStream = BoxStream<'static, UploadEvent>;

const MISSING_TERMINAL: &str = "upload ended without a result";

struct GuardState {
    inner: UploadStream,
    last_progress: u8,
    finished: bool,
}

/// Wrap an adapter stream so consumers see non-decreasing progress capped
/// at 100 followed by exactly one terminal event.
///
/// Events after the first terminal one are discarded; an inner stream that
/// ends without a terminal event yields a synthesised [`UploadEvent::Failed`].
pub fn guard_upload(inner: UploadStream) -> UploadStream {
    let state = GuardState {
        inner,
        last_progress: 0,
        finished: false,
    };
    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        loop {
            match state.inner.next().await {
                Some(UploadEvent::Progress(percent)) => {
                    let percent = percent.min(100);
                    if percent < state.last_progress {
                        continue;
                    }
                    state.last_progress = percent;
                    return Some((UploadEvent::Progress(percent), state));
                }
                Some(terminal) => {
                    state.finished = true;
                    return Some((terminal, state));
                }
                None => {
                    state.finished = true;
                    return Some((UploadEvent::Failed(MISSING_TERMINAL.to_owned()), state));
                }
            }
        }
    })
    .boxed()
}

/// Percentage of `total` represented by `transferred`, clamped to 100.
pub fn progress_percent(transferred: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = transferred.saturating_mul(100) / total;
    u8::try_from(percent.min(100)).unwrap_or(100)
}
