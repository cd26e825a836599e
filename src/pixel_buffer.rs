use image::{Rgb, RgbImage};
use ndarray::{Array3, ErrorKind, ShapeError};

use crate::error::{HistError, Result};

pub type RgbColor = Rgb<u8>;

pub const BLACK: RgbColor = Rgb([0, 0, 0]);
pub const WHITE: RgbColor = Rgb([255, 255, 255]);

/// Raster with three 8-bit channels per pixel.
///
/// Coordinates are 0-based, `x` in `[0, width)` and `y` in `[0, height)`.
/// Out of range coordinates panic, same as `image::ImageBuffer::get_pixel`.
pub trait PixelBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn channel_at(&self, x: u32, y: u32) -> RgbColor;
    fn set_pixel(&mut self, x: u32, y: u32, color: RgbColor);

    fn pixel_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }
}

impl PixelBuffer for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn channel_at(&self, x: u32, y: u32) -> RgbColor {
        *self.get_pixel(x, y)
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: RgbColor) {
        self.put_pixel(x, y, color);
    }
}

/// `(height, width, 3)` array, the layout produced by [`rgb_array_from_image`].
///
/// Only constructed through `TryFrom<Array3<u8>>`, which rejects any other
/// channel count, so pixel access never indexes past the third channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbArray(Array3<u8>);

impl TryFrom<Array3<u8>> for RgbArray {
    type Error = HistError;

    fn try_from(array: Array3<u8>) -> Result<Self> {
        if array.shape()[2] != 3 {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }
        Ok(RgbArray(array))
    }
}

impl RgbArray {
    pub fn as_array(&self) -> &Array3<u8> {
        &self.0
    }

    pub fn into_inner(self) -> Array3<u8> {
        self.0
    }
}

impl PixelBuffer for RgbArray {
    fn width(&self) -> u32 {
        self.0.shape()[1] as u32
    }

    fn height(&self) -> u32 {
        self.0.shape()[0] as u32
    }

    fn channel_at(&self, x: u32, y: u32) -> RgbColor {
        let (x, y) = (x as usize, y as usize);
        Rgb([self.0[[y, x, 0]], self.0[[y, x, 1]], self.0[[y, x, 2]]])
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: RgbColor) {
        let (x, y) = (x as usize, y as usize);
        for (c, v) in color.0.iter().enumerate() {
            self.0[[y, x, c]] = *v;
        }
    }
}

pub fn rgb_array_from_image(image: &RgbImage) -> Result<RgbArray> {
    let (w, h) = image.dimensions();
    let array = Array3::from_shape_vec((h as usize, w as usize, 3), image.as_raw().clone())?;
    RgbArray::try_from(array)
}

pub fn image_from_rgb_array(array: &RgbArray) -> Result<RgbImage> {
    let (w, h) = (array.width(), array.height());
    // iter() walks in logical order, so non-standard layouts come out row-major too
    RgbImage::from_raw(w, h, array.as_array().iter().copied().collect::<Vec<u8>>())
        .ok_or_else(|| ShapeError::from_kind(ErrorKind::IncompatibleShape).into())
}
