//! Tensor and image conversion.
//!
//! Node-facing image tensors are `(batch, height, width, channel)` with
//! values in `[0, 1]`; masks are `(batch, height, width)`. The converters in
//! this module work on `(batch, channel, height, width)`, so callers permute
//! images and give masks a channel axis of one. Only batches of one are
//! converted.

use crate::core::error::NodeError;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use ndarray::{Array3, Array4, ArrayView4, Axis};
use std::fmt;
use std::io::Cursor;

/// Image tensor in NHWC layout.
pub type ImageTensor = Array4<f32>;

/// Mask tensor in NHW layout.
pub type MaskTensor = Array3<f32>;

/// Pixel layouts the skills exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Single channel, used for masks.
    L,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn of(image: &DynamicImage) -> Option<ColorMode> {
        match image {
            DynamicImage::ImageLuma8(_) => Some(ColorMode::L),
            DynamicImage::ImageRgb8(_) => Some(ColorMode::Rgb),
            DynamicImage::ImageRgba8(_) => Some(ColorMode::Rgba),
            _ => None,
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            ColorMode::L => 1,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::L => "L",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn dimension(value: usize, axis: &str) -> Result<u32, NodeError> {
    u32::try_from(value)
        .map_err(|_| NodeError::Validation(format!("{axis} {value} does not fit an image")))
}

/// Converts a `(1, C, H, W)` tensor into an image; `C` selects L, RGB or RGBA.
pub fn tensor_to_image(tensor: ArrayView4<'_, f32>) -> Result<DynamicImage, NodeError> {
    let (batch, channels, height, width) = tensor.dim();
    if batch != 1 {
        return Err(NodeError::Validation(format!(
            "expected a batch of one, got {batch}"
        )));
    }
    let (w, h) = (dimension(width, "width")?, dimension(height, "height")?);
    let at = |c: usize, x: u32, y: u32| to_u8(tensor[[0, c, y as usize, x as usize]]);

    let image = match channels {
        1 => DynamicImage::ImageLuma8(GrayImage::from_fn(w, h, |x, y| Luma([at(0, x, y)]))),
        3 => DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            Rgb([at(0, x, y), at(1, x, y), at(2, x, y)])
        })),
        4 => DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([at(0, x, y), at(1, x, y), at(2, x, y), at(3, x, y)])
        })),
        other => {
            return Err(NodeError::Validation(format!(
                "cannot build an image from {other} channels"
            )));
        }
    };
    Ok(image)
}

/// Converts an image into a `(1, C, H, W)` tensor.
///
/// Images outside L/RGB/RGBA are first normalised to the nearest of the
/// three (anything with alpha becomes RGBA).
pub fn image_to_tensor(image: &DynamicImage) -> Array4<f32> {
    let (channels, raw) = match image {
        DynamicImage::ImageLuma8(img) => (1, img.as_raw().clone()),
        DynamicImage::ImageRgb8(img) => (3, img.as_raw().clone()),
        DynamicImage::ImageRgba8(img) => (4, img.as_raw().clone()),
        other if other.color().has_alpha() => (4, other.to_rgba8().into_raw()),
        other if other.color().channel_count() == 1 => (1, other.to_luma8().into_raw()),
        other => (3, other.to_rgb8().into_raw()),
    };
    let (height, width) = (image.height() as usize, image.width() as usize);

    Array4::from_shape_fn((1, channels, height, width), |(_, c, y, x)| {
        raw[(y * width + x) * channels + c] as f32 / 255.0
    })
}

/// Encodes an image as PNG.
pub fn image_to_bytes(image: &DynamicImage) -> Result<Vec<u8>, NodeError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// Decodes an encoded image, sniffing its format.
pub fn bytes_to_image(bytes: &[u8]) -> Result<DynamicImage, NodeError> {
    Ok(image::load_from_memory(bytes)?)
}

/// NHWC image tensor to image.
pub fn image_tensor_to_image(tensor: &ImageTensor) -> Result<DynamicImage, NodeError> {
    tensor_to_image(tensor.view().permuted_axes([0, 3, 1, 2]))
}

/// NHW mask tensor to a single-channel image.
pub fn mask_tensor_to_image(mask: &MaskTensor) -> Result<DynamicImage, NodeError> {
    tensor_to_image(mask.view().insert_axis(Axis(1)))
}

/// Image to NHWC image tensor.
pub fn image_to_image_tensor(image: &DynamicImage) -> ImageTensor {
    image_to_tensor(image)
        .permuted_axes([0, 2, 3, 1])
        .as_standard_layout()
        .into_owned()
}

/// Image to `(1, H, W)` mask tensor, collapsing colour images to luminance.
pub fn image_to_mask_tensor(image: &DynamicImage) -> MaskTensor {
    let gray = match image {
        DynamicImage::ImageLuma8(_) => image_to_tensor(image),
        other => image_to_tensor(&DynamicImage::ImageLuma8(other.to_luma8())),
    };
    gray.index_axis_move(Axis(1), 0)
}

/// Fails unless `image` is in one of the `allowed` modes.
pub fn expect_mode(
    image: &DynamicImage,
    allowed: &[ColorMode],
    what: &str,
) -> Result<ColorMode, NodeError> {
    match ColorMode::of(image) {
        Some(mode) if allowed.contains(&mode) => Ok(mode),
        found => {
            let expected: Vec<&str> = allowed.iter().map(ColorMode::as_str).collect();
            let found = found.map_or("unsupported", |mode| mode.as_str());
            Err(NodeError::Validation(format!(
                "{what} must be {}, got {found}",
                expected.join(" or ")
            )))
        }
    }
}

/// Fails unless both images have identical pixel dimensions.
pub fn expect_same_size(
    image: &DynamicImage,
    mask: &DynamicImage,
) -> Result<(), NodeError> {
    if (image.width(), image.height()) != (mask.width(), mask.height()) {
        return Err(NodeError::Validation(format!(
            "Image and mask sizes do not match: {}x{} vs {}x{}",
            image.width(),
            image.height(),
            mask.width(),
            mask.height()
        )));
    }
    Ok(())
}
