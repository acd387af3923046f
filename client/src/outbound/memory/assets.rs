//! Blob store half of the in-memory backend.

use futures_util::stream::{self, StreamExt};
use tracing::debug;
use uuid::Uuid;

use super::{BackendOperation, MemoryBackend};
use crate::domain::ports::AssetStorage;
use crate::domain::{Asset, UploadEvent, UploadStream, progress_percent};

impl AssetStorage for MemoryBackend {
    fn upload(&self, asset: Asset) -> UploadStream {
        let total = asset.len();
        let uri = format!(
            "{}/{}-{}",
            self.asset_base_url.trim_end_matches('/'),
            Uuid::new_v4().simple(),
            asset.name()
        );
        let stored = self.with_data(BackendOperation::Upload, |data| {
            data.assets.insert(uri.clone(), asset.bytes().to_vec());
            Ok(())
        });

        let mut events = vec![UploadEvent::Progress(0)];
        match stored {
            Ok(()) => {
                let mut transferred = 0;
                while transferred < total {
                    transferred = (transferred + self.upload_chunk_bytes).min(total);
                    events.push(UploadEvent::Progress(progress_percent(transferred, total)));
                }
                debug!(uri = %uri, size = total, "asset stored");
                events.push(UploadEvent::Done(uri));
            }
            Err(error) => events.push(UploadEvent::Failed(error.user_message())),
        }
        stream::iter(events).boxed()
    }
}
