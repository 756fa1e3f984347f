use futures::future::join_all;

use crate::element::Raster;
use crate::error::{CollageError, Result};

/// A successfully decoded image file, ready to become an image element
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub name: String,
    pub raster: Raster,
}

/// Check if a file is an image based on its extension
pub fn is_image_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    [".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Decode one file. Failure rejects only this file.
pub async fn decode_image(name: String, bytes: Vec<u8>) -> Result<DecodedImage> {
    match image::load_from_memory(&bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            log::info!("Decoded {} ({}x{})", name, rgba.width(), rgba.height());
            Ok(DecodedImage {
                name,
                raster: Raster::new(rgba),
            })
        }
        Err(source) => {
            log::error!("Failed to decode {}: {}", name, source);
            Err(CollageError::Decode { name, source })
        }
    }
}

/// Decode a batch. Results keep input order and each file succeeds or fails
/// on its own.
pub async fn decode_batch(files: Vec<(String, Vec<u8>)>) -> Vec<Result<DecodedImage>> {
    join_all(files.into_iter().map(|(name, bytes)| decode_image(name, bytes))).await
}

/// Split batch results into the decoded images and the failures
pub fn partition_decoded(results: Vec<Result<DecodedImage>>) -> (Vec<DecodedImage>, Vec<CollageError>) {
    let mut decoded = Vec::new();
    let mut failed = Vec::new();
    for result in results {
        match result {
            Ok(image) => decoded.push(image),
            Err(err) => failed.push(err),
        }
    }
    (decoded, failed)
}
