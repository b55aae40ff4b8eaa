//! `extract_frame` orchestration (C9): decode → scale → flood-fill →
//! min-area rectangle → smart crop → frame registration, in that order.

use std::path::Path;

use crate::cache::{DecodeCache, LoadVariant, ScaleCache};
use crate::collab::{Clock, ImageDecoder};
use crate::config::ProcessingConfig;
use crate::crop::smart_crop;
use crate::error::CoreError;
use crate::floodfill::flood_fill;
use crate::geometry::Vector2;
use crate::rect::min_area_rect;
use crate::registry::{FrameRecord, FrameRegistry};
use crate::transform::scale_box;

/// Runs the full seed-to-frame pipeline and registers the result.
///
/// `seed` is in display-space coordinates -- the same space a caller sees
/// after [`crate::ScanChop::load_image_for_display`]. Flood-fill and the
/// minimum-area rectangle run entirely in that same display/processing
/// space per the data model's invariants (this is also what keeps
/// flood-fill tractable on a large scanned sheet); only the final rectangle
/// is scaled up to original-space coordinates before cropping.
pub async fn extract_frame(
    path: &Path,
    seed: Vector2,
    label: String,
    config: &ProcessingConfig,
    decoder: &dyn ImageDecoder,
    clock: &dyn Clock,
    decode_cache: &DecodeCache,
    scale_cache: &ScaleCache,
    registry: &FrameRegistry,
) -> Result<FrameRecord, CoreError> {
    let original = decode_cache.get_or_decode(path, LoadVariant::Original, decoder, clock).await?.image;
    let scale_entry = scale_cache.get_or_compute(path, &original, clock).await;

    let predicate = config.predicate();
    let region = flood_fill(&scale_entry.display, seed, &predicate, config.max_pixels)?;

    let points: Vec<Vector2> = region.iter().map(|&(x, y)| Vector2::from((x, y))).collect();
    let display_rect = min_area_rect(&points, &config.rect_config())?;

    let original_rect = scale_box(display_rect, scale_entry.scale_display_to_original);
    let cropped = smart_crop(&original, original_rect, &config.crop_config())?;

    let record = registry
        .insert(label, display_rect, path.to_path_buf(), scale_entry.scale_display_to_original, cropped)
        .await;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use image::{DynamicImage, Rgba, RgbaImage};

    use super::*;
    use crate::collab::testutil::{CountingDecoder, StepClock};
    use crate::image::RasterImage;

    fn black_square_on_white(size: u32, inset: u32) -> RasterImage {
        let mut buf = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]));
        for y in inset..(size - inset) {
            for x in inset..(size - inset) {
                buf.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        RasterImage::decode_bytes(&{
            let mut out = std::io::Cursor::new(Vec::new());
            DynamicImage::ImageRgba8(buf).write_to(&mut out, image::ImageFormat::Png).unwrap();
            out.into_inner()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn axis_aligned_square_extracts_a_non_trivial_frame() {
        let path = PathBuf::from("/sheet.png");
        let mut images = HashMap::new();
        images.insert(path.clone(), black_square_on_white(200, 40));
        let decoder = CountingDecoder::new(images);
        let clock = StepClock::default();
        let decode_cache = DecodeCache::new(10);
        let scale_cache = ScaleCache::new(3);
        let registry = FrameRegistry::new();
        let config = ProcessingConfig::default();

        let record = extract_frame(
            &path,
            Vector2::new(100.0, 100.0),
            "frame-a".into(),
            &config,
            &decoder,
            &clock,
            &decode_cache,
            &scale_cache,
            &registry,
        )
        .await
        .unwrap();

        assert!(record.image.width() > 1 && record.image.height() > 1);
        assert_eq!(record.id, "frame-1");
    }

    #[tokio::test]
    async fn second_extraction_on_same_path_reuses_the_decode_cache() {
        let path = PathBuf::from("/sheet.png");
        let mut images = HashMap::new();
        images.insert(path.clone(), black_square_on_white(200, 40));
        let decoder = CountingDecoder::new(images);
        let clock = StepClock::default();
        let decode_cache = DecodeCache::new(10);
        let scale_cache = ScaleCache::new(3);
        let registry = FrameRegistry::new();
        let config = ProcessingConfig::default();

        for _ in 0..2 {
            extract_frame(
                &path,
                Vector2::new(100.0, 100.0),
                "frame".into(),
                &config,
                &decoder,
                &clock,
                &decode_cache,
                &scale_cache,
                &registry,
            )
            .await
            .unwrap();
        }

        assert_eq!(decoder.decode_count(), 1);
    }

    #[tokio::test]
    async fn seed_on_white_background_fails_with_empty_region() {
        let path = PathBuf::from("/sheet.png");
        let mut images = HashMap::new();
        images.insert(path.clone(), black_square_on_white(200, 40));
        let decoder = CountingDecoder::new(images);
        let clock = StepClock::default();
        let decode_cache = DecodeCache::new(10);
        let scale_cache = ScaleCache::new(3);
        let registry = FrameRegistry::new();
        let config = ProcessingConfig::default();

        let err = extract_frame(
            &path,
            Vector2::new(1.0, 1.0),
            "frame".into(),
            &config,
            &decoder,
            &clock,
            &decode_cache,
            &scale_cache,
            &registry,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, crate::error::ErrorKind::EmptyRegion);
    }
}
