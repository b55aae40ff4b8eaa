//! Frame registry (C12): the set of extracted frames a caller is tracking,
//! keyed by a monotonically-assigned `"frame-N"` id.

use std::path::PathBuf;

use ahash::AHashMap;
use tokio::sync::Mutex;

use crate::error::{CoreError, ErrorKind};
use crate::image::RasterImage;
use crate::rect::BoundingBox;

/// One extracted frame: `BoundingBox` (in *display* coordinates, per the
/// data model -- the rectangle a UI overlays on the image the user actually
/// sees) plus the cropped image and the bookkeeping a consumer needs to map
/// it back to its source and re-save it.
#[derive(Clone)]
pub struct FrameRecord {
    pub id: String,
    pub label: String,
    /// The minimum-area oriented rectangle, in display-space coordinates.
    /// Never mutated by [`FrameRegistry::rotate_cycle`] -- `orientation` is
    /// a render-time "up" indicator layered on top of it, not a change to
    /// the rectangle itself.
    pub bounding_box: BoundingBox,
    /// User-facing "up" indicator, in degrees, one of `{0, 90, 180, 270}`.
    /// Advances by +90 per [`FrameRegistry::rotate_cycle`] call -- see the
    /// resolved open question in the design ledger. Pure metadata: applied
    /// to `image` only when rendering or saving, via [`FrameRecord::oriented_image`].
    pub orientation: u16,
    pub source_path: PathBuf,
    pub scale_factor_display_to_original: f64,
    /// The cropped image exactly as produced by the smart-crop stage, at
    /// `orientation = 0`. Never itself rotated -- repeated `rotate_cycle`
    /// calls only change `orientation`, so this bitmap never re-interpolates.
    pub image: RasterImage,
}

impl FrameRecord {
    /// The image as it should be rendered or saved, with `orientation`
    /// applied. Computed fresh from the stored crop each time rather than
    /// accumulated, so repeated rotation never compounds interpolation loss.
    pub fn oriented_image(&self) -> RasterImage {
        match self.orientation {
            0 => self.image.clone(),
            angle => self.image.rotate(angle as f64),
        }
    }
}

struct Inner {
    records: AHashMap<String, FrameRecord>,
    next_id: u64,
}

pub struct FrameRegistry {
    inner: Mutex<Inner>,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { records: AHashMap::new(), next_id: 1 }) }
    }

    /// Registers a freshly extracted frame and returns its assigned record.
    pub async fn insert(
        &self,
        label: String,
        bounding_box: BoundingBox,
        source_path: PathBuf,
        scale_factor_display_to_original: f64,
        image: RasterImage,
    ) -> FrameRecord {
        let mut inner = self.inner.lock().await;
        let id = format!("frame-{}", inner.next_id);
        inner.next_id += 1;
        let record = FrameRecord {
            id: id.clone(),
            label,
            bounding_box,
            orientation: 0,
            source_path,
            scale_factor_display_to_original,
            image,
        };
        inner.records.insert(id, record.clone());
        record
    }

    pub async fn get(&self, id: &str) -> Option<FrameRecord> {
        self.inner.lock().await.records.get(id).cloned()
    }

    pub async fn list(&self) -> Vec<FrameRecord> {
        self.inner.lock().await.records.values().cloned().collect()
    }

    /// Updates a frame's label. `None` leaves the label unchanged.
    pub async fn update(&self, id: &str, label: Option<String>) -> Result<FrameRecord, CoreError> {
        let mut inner = self.inner.lock().await;
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound, "update_frame", "no such frame id"))?;
        if let Some(label) = label {
            record.label = label;
        }
        Ok(record.clone())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound, "delete_frame", "no such frame id"))
    }

    /// Advances a frame's `orientation` a quarter turn clockwise. Purely a
    /// metadata change -- the stored `image` is untouched; callers that want
    /// the rotated pixels use [`FrameRecord::oriented_image`].
    pub async fn rotate_cycle(&self, id: &str) -> Result<FrameRecord, CoreError> {
        let mut inner = self.inner.lock().await;
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound, "rotate_frame", "no such frame id"))?;
        record.orientation = (record.orientation + 90) % 360;
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn test_box() -> BoundingBox {
        BoundingBox { x: 0.0, y: 0.0, width: 10.0, height: 10.0, rotation: 0.0 }
    }

    fn fixture(w: u32, h: u32) -> RasterImage {
        let buf = RgbaImage::from_pixel(w, h, Rgba([9, 9, 9, 255]));
        RasterImage::decode_bytes(&{
            let mut out = std::io::Cursor::new(Vec::new());
            DynamicImage::ImageRgba8(buf).write_to(&mut out, image::ImageFormat::Png).unwrap();
            out.into_inner()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn inserted_frames_get_sequential_ids() {
        let reg = FrameRegistry::new();
        let a = reg.insert("a".into(), test_box(), PathBuf::from("/x.png"), 1.0, fixture(10, 10)).await;
        let b = reg.insert("b".into(), test_box(), PathBuf::from("/x.png"), 1.0, fixture(10, 10)).await;
        assert_eq!(a.id, "frame-1");
        assert_eq!(b.id, "frame-2");
    }

    #[tokio::test]
    async fn update_changes_only_the_label() {
        let reg = FrameRegistry::new();
        let a = reg.insert("a".into(), test_box(), PathBuf::from("/x.png"), 1.0, fixture(10, 10)).await;
        let updated = reg.update(&a.id, Some("renamed".into())).await.unwrap();
        assert_eq!(updated.label, "renamed");
        assert_eq!(updated.orientation, 0);
    }

    #[tokio::test]
    async fn update_missing_id_fails() {
        let reg = FrameRegistry::new();
        let err = reg.update("frame-404", Some("x".into())).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn rotate_cycle_advances_orientation_without_touching_the_stored_image() {
        let reg = FrameRegistry::new();
        let a = reg.insert("a".into(), test_box(), PathBuf::from("/x.png"), 1.0, fixture(10, 20)).await;
        let rotated = reg.rotate_cycle(&a.id).await.unwrap();
        assert_eq!(rotated.orientation, 90);
        assert_eq!((rotated.image.width(), rotated.image.height()), (10, 20));
        assert_eq!(rotated.bounding_box, test_box());
    }

    #[tokio::test]
    async fn oriented_image_applies_orientation_without_mutating_storage() {
        let reg = FrameRegistry::new();
        let a = reg.insert("a".into(), test_box(), PathBuf::from("/x.png"), 1.0, fixture(10, 20)).await;
        let rotated = reg.rotate_cycle(&a.id).await.unwrap();

        let rendered = rotated.oriented_image();
        assert_eq!((rendered.width(), rendered.height()), (20, 10));
        // The stored record is untouched -- orientation is metadata only.
        assert_eq!((rotated.image.width(), rotated.image.height()), (10, 20));
    }

    #[tokio::test]
    async fn four_rotations_return_to_zero_orientation() {
        let reg = FrameRegistry::new();
        let a = reg.insert("a".into(), test_box(), PathBuf::from("/x.png"), 1.0, fixture(10, 20)).await;
        for _ in 0..4 {
            reg.rotate_cycle(&a.id).await.unwrap();
        }
        let record = reg.get(&a.id).await.unwrap();
        assert_eq!(record.orientation, 0);
    }

    #[tokio::test]
    async fn delete_removes_the_frame() {
        let reg = FrameRegistry::new();
        let a = reg.insert("a".into(), test_box(), PathBuf::from("/x.png"), 1.0, fixture(10, 10)).await;
        reg.delete(&a.id).await.unwrap();
        assert!(reg.get(&a.id).await.is_none());
    }
}
