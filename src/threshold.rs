use std::fmt;
use std::str::FromStr;

use image::Rgb;
use itertools::iproduct;
use ndarray::ArrayView1;

use crate::error::{HistError, Result};
use crate::histogram::{calc_rgb_hist, first_peak, Channel, RgbHistogram};
use crate::pixel_buffer::PixelBuffer;

/// Default cut point of [`ThresholdStrategy::FixedCutout`].
pub const FIXED_CUTOUT: u8 = 128;

/// How the per-channel cut point is chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ThresholdStrategy {
    /// Same constant for every channel.
    FixedCutout { cutout: u8 },
    /// Midpoint between the dominant intensity and the intensity farthest
    /// from it, weighted by population.
    TwoPeaks,
    /// Half the distance between the darkest present intensity and the
    /// dominant one. Measured from zero, not from the darkest intensity.
    MedianGreyLevel,
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        ThresholdStrategy::FixedCutout { cutout: FIXED_CUTOUT }
    }
}

impl FromStr for ThresholdStrategy {
    type Err = HistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fixed" | "fixed_cutout" => Ok(ThresholdStrategy::default()),
            "two_peaks" | "two-peaks" => Ok(ThresholdStrategy::TwoPeaks),
            "median_grey_level" | "median-grey" | "median_grey" => Ok(ThresholdStrategy::MedianGreyLevel),
            _ => Err(HistError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for ThresholdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdStrategy::FixedCutout { cutout } => write!(f, "fixed({})", cutout),
            ThresholdStrategy::TwoPeaks => f.write_str("two_peaks"),
            ThresholdStrategy::MedianGreyLevel => f.write_str("median_grey_level"),
        }
    }
}

/// One binarization threshold per channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CutPoints([u8; 3]);

impl CutPoints {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        CutPoints([red, green, blue])
    }

    pub fn splat(cut: u8) -> Self {
        CutPoints([cut; 3])
    }

    pub fn get(&self, channel: Channel) -> u8 {
        self.0[channel.index()]
    }
}

pub fn two_peaks_cut(hist: &ArrayView1<u64>) -> u8 {
    let peak1 = first_peak(hist.iter().copied());
    let peak2 = first_peak(hist.iter().enumerate().map(|(i, &count)| {
        let d = i.abs_diff(peak1) as u64;
        (d * d).saturating_mul(count)
    }));
    log::debug!("two peaks: {} and {}", peak1, peak2);
    ((peak1 + peak2) >> 1) as u8
}

pub fn median_grey_level_cut(hist: &ArrayView1<u64>) -> u8 {
    let min_intensity = hist.iter().position(|&count| count != 0).unwrap_or(0);
    let max_intensity = first_peak(hist.iter().copied());
    log::debug!("median grey level: min {} peak {}", min_intensity, max_intensity);
    (max_intensity.saturating_sub(min_intensity) >> 1) as u8
}

pub fn cut_points(hist: &RgbHistogram, strategy: ThresholdStrategy) -> CutPoints {
    let cut_for = |channel: Channel| match strategy {
        ThresholdStrategy::FixedCutout { cutout } => cutout,
        ThresholdStrategy::TwoPeaks => two_peaks_cut(&hist.channel(channel)),
        ThresholdStrategy::MedianGreyLevel => median_grey_level_cut(&hist.channel(channel)),
    };
    let cuts = CutPoints::new(cut_for(Channel::Red), cut_for(Channel::Green), cut_for(Channel::Blue));
    log::debug!("{} cut points: {:?}", strategy, cuts);
    cuts
}

/// Set each channel to 0 below its cut point and 255 otherwise.
pub fn binarize_mut<B>(buffer: &mut B, cuts: &CutPoints)
where B: PixelBuffer + ?Sized
{
    let level = |v: u8, channel: Channel| if v < cuts.get(channel) { 0 } else { 255 };
    for (y, x) in iproduct!(0..buffer.height(), 0..buffer.width()) {
        let Rgb([r, g, b]) = buffer.channel_at(x, y);
        let binary = Rgb([level(r, Channel::Red), level(g, Channel::Green), level(b, Channel::Blue)]);
        buffer.set_pixel(x, y, binary);
    }
}

pub fn binarize<B>(buffer: &B, cuts: &CutPoints) -> B
where B: PixelBuffer + Clone
{
    let mut output = buffer.clone();
    binarize_mut(&mut output, cuts);
    output
}

/// Derive cut points with `strategy` and binarize in place. The histogram is
/// only scanned for strategies that need it.
pub fn threshold_mut<B>(buffer: &mut B, strategy: ThresholdStrategy) -> CutPoints
where B: PixelBuffer + ?Sized
{
    let cuts = match strategy {
        ThresholdStrategy::FixedCutout { cutout } => CutPoints::splat(cutout),
        _ => cut_points(&calc_rgb_hist(&*buffer), strategy),
    };
    binarize_mut(buffer, &cuts);
    cuts
}

pub fn threshold<B>(buffer: &B, strategy: ThresholdStrategy) -> B
where B: PixelBuffer + Clone
{
    let mut output = buffer.clone();
    threshold_mut(&mut output, strategy);
    output
}
