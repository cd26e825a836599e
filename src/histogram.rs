use std::fmt;
use std::ops::{Add, AddAssign};

use image::Rgb;
use itertools::iproduct;
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;

use crate::error::{HistError, Result};
use crate::pixel_buffer::{PixelBuffer, RgbColor};

/// Number of bins per channel, one per 8-bit intensity.
pub const LEVELS: usize = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Pure color of this channel at full intensity.
    pub fn color(self) -> RgbColor {
        let mut rgb = [0; 3];
        rgb[self.index()] = 255;
        Rgb(rgb)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Per-channel frequency table over intensities 0..=255.
///
/// Every channel sums to the pixel count of the image it was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbHistogram {
    channels: [Array1<u64>; 3],
}

impl RgbHistogram {
    pub fn zeros() -> Self {
        RgbHistogram {
            channels: [
                Array1::zeros((LEVELS,)),
                Array1::zeros((LEVELS,)),
                Array1::zeros((LEVELS,)),
            ],
        }
    }

    pub fn from_counts(red: Array1<u64>, green: Array1<u64>, blue: Array1<u64>) -> Result<Self> {
        for counts in [&red, &green, &blue] {
            if counts.len() != LEVELS {
                return Err(HistError::InvalidBinCount(counts.len()));
            }
        }
        Ok(RgbHistogram { channels: [red, green, blue] })
    }

    pub fn channel(&self, channel: Channel) -> ArrayView1<'_, u64> {
        self.channels[channel.index()].view()
    }

    /// Number of samples counted in `channel`.
    pub fn total(&self, channel: Channel) -> u64 {
        self.channels[channel.index()].sum()
    }

    fn count_pixel(&mut self, px: RgbColor) {
        for (hist, v) in self.channels.iter_mut().zip(px.0) {
            hist[usize::from(v)] += 1;
        }
    }
}

impl AddAssign<&RgbHistogram> for RgbHistogram {
    fn add_assign(&mut self, other: &RgbHistogram) {
        for (hist, other_hist) in self.channels.iter_mut().zip(&other.channels) {
            *hist += other_hist;
        }
    }
}

impl Add for RgbHistogram {
    type Output = RgbHistogram;

    fn add(mut self, other: RgbHistogram) -> RgbHistogram {
        self += &other;
        self
    }
}

/// Scan every pixel once. Zero-sized buffers give an all-zero histogram.
pub fn calc_rgb_hist<B>(buffer: &B) -> RgbHistogram
where B: PixelBuffer + ?Sized
{
    let (w, h) = (buffer.width(), buffer.height());
    log::trace!("building histogram over {}x{} pixels", w, h);
    let mut hist = RgbHistogram::zeros();
    for (y, x) in iproduct!(0..h, 0..w) {
        hist.count_pixel(buffer.channel_at(x, y));
    }
    hist
}

/// Same as [`calc_rgb_hist`], with rows split across the rayon pool and the
/// partial histograms summed.
pub fn par_calc_rgb_hist<B>(buffer: &B) -> RgbHistogram
where B: PixelBuffer + Sync + ?Sized
{
    let w = buffer.width();
    log::trace!("building histogram over {}x{} pixels in parallel", w, buffer.height());
    (0..buffer.height())
        .into_par_iter()
        .fold(RgbHistogram::zeros, |mut hist, y| {
            for x in 0..w {
                hist.count_pixel(buffer.channel_at(x, y));
            }
            hist
        })
        .reduce(RgbHistogram::zeros, |a, b| a + b)
}

/// Running prefix sum of one histogram channel.
pub fn calc_hist_cdf(hist: &ArrayView1<u64>) -> Array1<u64> {
    Array1::from_iter(hist.iter().scan(0u64, |acc, &count| {
        *acc += count;
        Some(*acc)
    }))
}

/// Index of the largest value, lowest index on ties. Empty or all-zero input gives 0.
pub(crate) fn first_peak<I>(values: I) -> usize
where I: IntoIterator<Item = u64>
{
    values
        .into_iter()
        .enumerate()
        .fold((0, 0), |(best_i, best_v), (i, v)| if v > best_v { (i, v) } else { (best_i, best_v) })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use itertools::Itertools;
    use ndarray::Array1;

    fn gradient_image(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8]))
    }

    #[test]
    fn test_channel_sums_equal_pixel_count() {
        let img = gradient_image(37, 19);
        let hist = calc_rgb_hist(&img);
        for channel in Channel::ALL {
            assert_eq!(hist.total(channel), 37 * 19);
        }
    }

    #[test]
    fn test_two_by_two_red_split() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([0, 5, 5]));
        img.put_pixel(0, 1, Rgb([255, 5, 5]));
        img.put_pixel(1, 1, Rgb([255, 5, 5]));
        let hist = calc_rgb_hist(&img);
        let red = hist.channel(Channel::Red);
        assert_eq!(red[0], 2);
        assert_eq!(red[255], 2);
        assert_eq!(red.iter().filter(|&&c| c != 0).count(), 2);
        assert_eq!(hist.channel(Channel::Green)[5], 3);
        assert_eq!(hist.channel(Channel::Green)[0], 1);
    }

    #[test]
    fn test_empty_buffer_gives_zero_histogram() {
        let img = RgbImage::new(0, 10);
        let hist = calc_rgb_hist(&img);
        assert_eq!(hist, RgbHistogram::zeros());
        assert_eq!(hist.total(Channel::Blue), 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let img = gradient_image(64, 41);
        assert_eq!(par_calc_rgb_hist(&img), calc_rgb_hist(&img));
    }

    #[test]
    fn test_add_merges_partial_histograms() {
        let top = gradient_image(5, 3);
        let bottom = RgbImage::from_pixel(5, 2, Rgb([9, 9, 9]));
        let merged = calc_rgb_hist(&top) + calc_rgb_hist(&bottom);
        assert_eq!(merged.total(Channel::Red), 25);
        assert_eq!(merged.channel(Channel::Green)[9], calc_rgb_hist(&top).channel(Channel::Green)[9] + 10);
    }

    #[test]
    fn test_from_counts_checks_bin_count() {
        let ok = Array1::zeros((LEVELS,));
        let short = Array1::zeros((10,));
        assert!(RgbHistogram::from_counts(ok.clone(), ok.clone(), ok.clone()).is_ok());
        assert!(matches!(
            RgbHistogram::from_counts(ok.clone(), short, ok),
            Err(HistError::InvalidBinCount(10))
        ));
    }

    #[test]
    fn test_cdf_is_prefix_sum() {
        let mut counts = Array1::zeros((LEVELS,));
        counts[3] = 2;
        counts[10] = 5;
        counts[255] = 1;
        let cdf = calc_hist_cdf(&counts.view());
        assert_eq!(cdf.len(), LEVELS);
        assert_eq!(cdf[2], 0);
        assert_eq!(cdf[3], 2);
        assert_eq!(cdf[9], 2);
        assert_eq!(cdf[10], 7);
        assert_eq!(cdf[255], 8);
        assert!(cdf.iter().tuple_windows().all(|(a, b)| a <= b));
    }

    #[test]
    fn test_first_peak_prefers_lowest_index() {
        assert_eq!(first_peak([1, 4, 2, 4]), 1);
        assert_eq!(first_peak([0, 0, 0]), 0);
        assert_eq!(first_peak(Vec::<u64>::new()), 0);
    }

    #[test]
    fn test_channel_color_and_name() {
        assert_eq!(Channel::Green.color(), Rgb([0, 255, 0]));
        assert_eq!(Channel::Blue.to_string(), "blue");
    }
}
