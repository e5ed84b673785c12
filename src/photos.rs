//! Concurrent photo decoding.
//!
//! Every photo decodes on the blocking pool at the same time; the render
//! waits for all of them and gets the results back in upload order. A photo
//! that fails or runs out of time only loses its own slot.

use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use crate::error::ReportError;
use crate::image_loader::{load_photo, LoadedImage};
use crate::model::PhotoBlob;

/// One photo after decoding: its upload name and the decoded image, or why
/// it couldn't be decoded.
#[derive(Debug)]
pub struct PhotoEntry {
    pub name: String,
    pub image: Result<LoadedImage, ReportError>,
}

/// Decode all photos concurrently. The output has one entry per input, in
/// input order.
pub async fn decode_photos(photos: &[PhotoBlob], timeout: Option<Duration>) -> Vec<PhotoEntry> {
    let tasks = photos.iter().enumerate().map(|(index, blob)| {
        let blob = blob.clone();
        async move {
            let name = blob.name.clone();
            let image = decode_one(blob, timeout).await;
            match &image {
                Ok(img) => debug!(index, name = %name, width = img.width_px, height = img.height_px, "photo decoded"),
                Err(e) => debug!(index, name = %name, error = %e, "photo decode failed"),
            }
            PhotoEntry { name, image }
        }
    });
    join_all(tasks).await
}

async fn decode_one(blob: PhotoBlob, timeout: Option<Duration>) -> Result<LoadedImage, ReportError> {
    let name = blob.name.clone();
    let task = tokio::task::spawn_blocking(move || load_photo(&blob.source));

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| ReportError::PhotoTimeout {
                name,
                millis: limit.as_millis() as u64,
            })?,
        None => task.await,
    };

    joined.map_err(|e| ReportError::Image(format!("Photo decode task failed: {}", e)))?
}
