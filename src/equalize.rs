use image::Rgb;
use itertools::iproduct;
use ndarray::Array1;

use crate::error::{HistError, Result};
use crate::histogram::{calc_hist_cdf, calc_rgb_hist, Channel, RgbHistogram};
use crate::pixel_buffer::PixelBuffer;

/// Lookup table mapping an input intensity to its equalized value for one channel.
///
/// Each entry is `255 * (cdf[v] - min_cdf) / (total - min_cdf)`, truncated,
/// where `min_cdf` is the first nonzero cumulative count.
pub fn equalization_lut(hist: &RgbHistogram, channel: Channel) -> Result<Array1<u8>> {
    let cdf = calc_hist_cdf(&hist.channel(channel));
    let total = cdf[cdf.len() - 1];
    if total == 0 {
        return Err(HistError::EmptyImage);
    }
    let min_cdf = cdf.iter().copied().find(|&c| c != 0).unwrap_or(0);
    log::debug!("{} channel: min cdf {} of {} pixels", channel, min_cdf, total);
    if total == min_cdf {
        return Err(HistError::DegenerateHistogram { channel });
    }
    let range = total - min_cdf;
    Ok(cdf.mapv(|c| (255 * c.saturating_sub(min_cdf) / range).min(255) as u8))
}

/// Equalize every channel of `buffer` independently, in place.
///
/// Fails before touching any pixel, so on error the buffer is unchanged.
pub fn equalize_mut<B>(buffer: &mut B) -> Result<()>
where B: PixelBuffer + ?Sized
{
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(HistError::EmptyImage);
    }
    let hist = calc_rgb_hist(&*buffer);
    let red = equalization_lut(&hist, Channel::Red)?;
    let green = equalization_lut(&hist, Channel::Green)?;
    let blue = equalization_lut(&hist, Channel::Blue)?;

    for (y, x) in iproduct!(0..buffer.height(), 0..buffer.width()) {
        let Rgb([r, g, b]) = buffer.channel_at(x, y);
        let equalized = Rgb([red[usize::from(r)], green[usize::from(g)], blue[usize::from(b)]]);
        buffer.set_pixel(x, y, equalized);
    }
    Ok(())
}

pub fn equalize<B>(buffer: &B) -> Result<B>
where B: PixelBuffer + Clone
{
    let mut output = buffer.clone();
    equalize_mut(&mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::rgb_array_from_image;
    use image::RgbImage;
    use more_asserts::{assert_ge, assert_le};

    fn row_image(values: &[u8]) -> RgbImage {
        RgbImage::from_fn(values.len() as u32, 1, |x, _| {
            let v = values[x as usize];
            Rgb([v, v, v])
        })
    }

    #[test]
    fn test_single_intensity_is_degenerate() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([100, 100, 100]));
        let err = equalize_mut(&mut img).unwrap_err();
        assert!(matches!(err, HistError::DegenerateHistogram { channel: Channel::Red }));
        assert_eq!(*img.get_pixel(0, 0), Rgb([100, 100, 100]));
    }

    #[test]
    fn test_one_flat_channel_is_degenerate() {
        let img = RgbImage::from_fn(4, 1, |x, _| Rgb([x as u8 * 10, 7, x as u8]));
        assert!(matches!(
            equalize(&img),
            Err(HistError::DegenerateHistogram { channel: Channel::Green })
        ));
    }

    #[test]
    fn test_empty_image() {
        let mut img = RgbImage::new(0, 3);
        assert!(matches!(equalize_mut(&mut img), Err(HistError::EmptyImage)));
    }

    #[test]
    fn test_four_levels_spread_to_full_range() {
        let img = row_image(&[10, 20, 30, 40]);
        let out = equalize(&img).unwrap();
        let reds: Vec<u8> = out.pixels().map(|p| p[0]).collect();
        assert_eq!(reds, vec![0, 85, 170, 255]);
    }

    #[test]
    fn test_values_are_truncated() {
        // cdf 2,3,4 with min 2 -> 255*1/2 = 127.5 truncates to 127
        let img = row_image(&[50, 50, 60, 70]);
        let out = equalize(&img).unwrap();
        let reds: Vec<u8> = out.pixels().map(|p| p[0]).collect();
        assert_eq!(reds, vec![0, 0, 127, 255]);
    }

    #[test]
    fn test_equalize_twice_is_fixed_point() {
        let img = row_image(&[3, 3, 9, 9, 9, 120, 121, 200]);
        let once = equalize(&img).unwrap();
        let twice = equalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    /// Deterministic pseudo-random image with channel values in `lo..lo + span`.
    fn noise_image(seed: u64, w: u32, h: u32, lo: u8, span: u16) -> RgbImage {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            lo + ((state >> 33) % u64::from(span)) as u8
        };
        RgbImage::from_fn(w, h, |_, _| Rgb([next(), next(), next()]))
    }

    #[test]
    fn test_equalize_twice_is_fixed_point_up_to_rounding() {
        for seed in 0..200u64 {
            let (lo, span) = match seed % 3 {
                0 => (0, 256),
                1 => (90, 40),
                _ => (10, 120),
            };
            let img = noise_image(seed, 40, 30, lo, span);
            let once = equalize(&img).unwrap();
            let twice = equalize(&once).unwrap();
            for (a, b) in once.pixels().zip(twice.pixels()) {
                for c in 0..3 {
                    assert_le!(a[c].abs_diff(b[c]), 1, "seed {} channel {}", seed, c);
                }
            }
        }
    }

    #[test]
    fn test_output_covers_range_and_keeps_order() {
        let img = RgbImage::from_fn(16, 16, |x, y| Rgb([(100 + x) as u8, (60 + y * 2) as u8, (x * y) as u8]));
        let out = equalize(&img).unwrap();
        assert_eq!(out.dimensions(), img.dimensions());
        let mut lowest = [255u8; 3];
        let mut highest = [0u8; 3];
        for p in out.pixels() {
            for c in 0..3 {
                lowest[c] = lowest[c].min(p[c]);
                highest[c] = highest[c].max(p[c]);
            }
        }
        assert_eq!(lowest, [0, 0, 0]);
        assert_eq!(highest, [255, 255, 255]);
        for (x, y) in iproduct!(0..15u32, 0..16u32) {
            assert_le!(out.get_pixel(x, y)[0], out.get_pixel(x + 1, y)[0]);
        }
    }

    #[test]
    fn test_array_buffer_equalizes_like_image() {
        let img = RgbImage::from_fn(8, 5, |x, y| Rgb([(x * 30) as u8, (y * 40) as u8, (x + y * 8) as u8]));
        let mut array = rgb_array_from_image(&img).unwrap();
        equalize_mut(&mut array).unwrap();
        let expected = equalize(&img).unwrap();
        for (x, y) in iproduct!(0..8u32, 0..5u32) {
            assert_eq!(array.channel_at(x, y), *expected.get_pixel(x, y));
        }
    }

    #[test]
    fn test_lut_is_monotonic() {
        let img = RgbImage::from_fn(20, 20, |x, y| Rgb([(x * y) as u8, (x + y) as u8, (x * 3) as u8]));
        let hist = calc_rgb_hist(&img);
        for channel in Channel::ALL {
            let lut = equalization_lut(&hist, channel).unwrap();
            for i in 1..lut.len() {
                assert_ge!(lut[i], lut[i - 1]);
            }
        }
    }
}
