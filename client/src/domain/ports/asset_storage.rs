//! Port abstraction for the blob store.
use crate::domain::{Asset, UploadStream};

/// Uploads binary assets and reports progress as a stream.
///
/// Implementations should emit progress in 0 to 100 followed by one
/// terminal event; callers wrap the stream with
/// [`crate::domain::guard_upload`] so minor deviations are tolerated.
#[cfg_attr(test, mockall::automock)]
pub trait AssetStorage: Send + Sync {
    /// Start uploading `asset`.
    fn upload(&self, asset: Asset) -> UploadStream;
}
