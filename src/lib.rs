use std::path::Path;

use image::{GenericImageView, RgbImage};

pub mod chart;
pub mod equalize;
pub mod error;
pub mod histogram;
pub mod pixel_buffer;
pub mod plot_histogram;
pub mod threshold;

pub use chart::{render_histogram_chart, ChartLayout, Rectangle};
pub use equalize::{equalize, equalize_mut};
pub use error::{HistError, Result};
pub use histogram::{calc_rgb_hist, par_calc_rgb_hist, Channel, RgbHistogram};
pub use pixel_buffer::{image_from_rgb_array, rgb_array_from_image, PixelBuffer, RgbArray, RgbColor};
pub use plot_histogram::plot_rgb_histogram;
pub use threshold::{binarize, binarize_mut, cut_points, threshold, threshold_mut, CutPoints, ThresholdStrategy, FIXED_CUTOUT};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Render the stacked per-channel histogram chart.
    Histogram(ChartLayout),
    Equalize,
    Binarize(ThresholdStrategy),
}

impl Command {
    /// Resolve a method name. `strategy` is only consulted for `binarize`;
    /// `median_grey_level` is shorthand for binarizing with that strategy.
    pub fn from_method(method: &str, strategy: ThresholdStrategy) -> Result<Self> {
        match method.to_lowercase().as_str() {
            "histogram" => Ok(Command::Histogram(ChartLayout::default())),
            "equalize" => Ok(Command::Equalize),
            "binarize" => Ok(Command::Binarize(strategy)),
            "median_grey_level" => Ok(Command::Binarize(ThresholdStrategy::MedianGreyLevel)),
            _ => Err(HistError::UnknownCommand(method.to_string())),
        }
    }
}

pub fn process_image(command: &Command, input: &RgbImage) -> Result<RgbImage> {
    match command {
        Command::Histogram(layout) => render_histogram_chart(&par_calc_rgb_hist(input), layout),
        Command::Equalize => equalize(input),
        Command::Binarize(strategy) => Ok(threshold(input, *strategy)),
    }
}

pub fn load_rgb_image(filename: &Path) -> Result<RgbImage> {
    let image = image::open(filename).map_err(|source| HistError::ImageLoad {
        path: filename.to_path_buf(),
        source,
    })?;
    log::info!("loaded {} ({}x{})", filename.display(), image.width(), image.height());
    Ok(image.to_rgb8())
}

pub fn save_rgb_image(image: &RgbImage, filename: &Path) -> Result<()> {
    image.save(filename).map_err(|source| HistError::ImageSave {
        path: filename.to_path_buf(),
        source,
    })?;
    log::info!("saved {}", filename.display());
    Ok(())
}

pub fn transform_image_file(filename_in: &Path, filename_out: &Path, command: &Command) -> Result<()> {
    let input = load_rgb_image(filename_in)?;
    log::info!("running {:?}", command);
    let output = process_image(command, &input)?;
    save_rgb_image(&output, filename_out)
}
