//! The `Image` primitive from the data model: a thin wrapper around
//! [`image::DynamicImage`] that centralizes the operations the pipeline
//! needs (random-access pixel read, crop, arbitrary-angle rotate, resize,
//! PNG encode) so the rest of the crate never touches `image` types
//! directly.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::error::{CoreError, ErrorKind};
use crate::predicate::Rgb;

/// Background used for the canvas padding introduced by [`RasterImage::rotate`].
/// The background color is undefined but must stay consistent across calls;
/// fully transparent black satisfies that and composites cleanly for callers
/// that flatten onto a white page afterwards.
const ROTATE_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone)]
pub struct RasterImage {
    inner: DynamicImage,
}

impl RasterImage {
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let inner = image::load_from_memory(bytes)
            .map_err(|e| CoreError::new(ErrorKind::DecodeFailed, "decode", e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn open(path: &std::path::Path) -> Result<Self, CoreError> {
        let inner = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                CoreError::new(ErrorKind::NotFound, "decode", "image file not found").with_path(path)
            }
            image::ImageError::Unsupported(_) => {
                CoreError::new(ErrorKind::InvalidInput, "decode", "path is not a decodable image")
                    .with_path(path)
            }
            other => CoreError::new(ErrorKind::DecodeFailed, "decode", other.to_string()).with_path(path),
        })?;
        Ok(Self { inner })
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Reads the pixel at `(x, y)`. Panics if out of bounds -- callers are
    /// expected to have already checked [`crate::geometry::in_bounds`].
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        self.inner.get_pixel(x, y).into()
    }

    /// Axis-aligned crop. `(x, y)` becomes the origin of the returned image.
    pub fn crop(&self, x: i64, y: i64, w: u32, h: u32) -> Result<Self, CoreError> {
        if w == 0 || h == 0 {
            return Err(CoreError::new(ErrorKind::CropOutOfImage, "crop", "empty crop region"));
        }
        if x < 0 || y < 0 {
            return Err(CoreError::new(ErrorKind::CropOutOfImage, "crop", "crop origin out of image"));
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width() || y >= self.height() {
            return Err(CoreError::new(ErrorKind::CropOutOfImage, "crop", "crop origin out of image"));
        }
        let w = w.min(self.width() - x);
        let h = h.min(self.height() - y);
        if w == 0 || h == 0 {
            return Err(CoreError::new(ErrorKind::CropOutOfImage, "crop", "empty crop region"));
        }
        Ok(Self { inner: self.inner.crop_imm(x, y, w, h) })
    }

    /// Rotates the image by an arbitrary angle, returning a new, larger
    /// image with the rotated content centered. Matches the data model's
    /// "rotation produces a new larger image" contract.
    pub fn rotate(&self, angle_deg: f64) -> Self {
        if angle_deg == 0.0 {
            return self.clone();
        }

        let (w, h) = (self.width() as f64, self.height() as f64);
        let theta = angle_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        let new_w = (w * cos.abs() + h * sin.abs()).ceil() as u32;
        let new_h = (w * sin.abs() + h * cos.abs()).ceil() as u32;
        let new_w = new_w.max(1);
        let new_h = new_h.max(1);

        let mut canvas: RgbaImage = RgbaImage::from_pixel(new_w, new_h, ROTATE_BACKGROUND);
        let ox = (new_w - self.width()) / 2;
        let oy = (new_h - self.height()) / 2;
        image::imageops::overlay(&mut canvas, &self.inner.to_rgba8(), ox as i64, oy as i64);

        let rotated = rotate_about_center(
            &canvas,
            theta as f32,
            Interpolation::Bilinear,
            ROTATE_BACKGROUND,
        );

        Self { inner: DynamicImage::ImageRgba8(rotated) }
    }

    /// Resizes to an exact integer size (no aspect-ratio preservation --
    /// callers compute the target size themselves).
    pub fn resize_exact(&self, w: u32, h: u32) -> Self {
        let w = w.max(1);
        let h = h.max(1);
        Self { inner: self.inner.resize_exact(w, h, image::imageops::FilterType::Lanczos3) }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = std::io::Cursor::new(Vec::new());
        self.inner
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| CoreError::new(ErrorKind::IoError, "encode", e.to_string()))?;
        Ok(buf.into_inner())
    }
}
