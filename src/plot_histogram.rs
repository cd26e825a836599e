use std::error::Error;
use std::path::Path;

use ndarray_stats::QuantileExt;
use plotters::prelude::{AreaSeries, BitMapBackend, ChartBuilder, Color, IntoDrawingArea, RGBColor, BLUE, GREEN, RED, WHITE};

use crate::error::{HistError, Result};
use crate::histogram::{Channel, RgbHistogram, LEVELS};

const PLOT_WIDTH: u32 = 1024;
const PLOT_HEIGHT: u32 = 768;

fn plot_color(channel: Channel) -> RGBColor {
    match channel {
        Channel::Red => RED,
        Channel::Green => GREEN,
        Channel::Blue => BLUE,
    }
}

/// Write a conventional bottom-anchored area chart of all three channels to `filename`.
pub fn plot_rgb_histogram(filename: &Path, hist: &RgbHistogram) -> Result<()> {
    let mut max_value = 0u64;
    for channel in Channel::ALL {
        max_value = max_value.max(*hist.channel(channel).max().map_err(|_| HistError::EmptyImage)?);
    }
    if max_value == 0 {
        return Err(HistError::EmptyImage);
    }
    draw(filename, hist, max_value).map_err(|e| HistError::Plot(e.to_string()))?;
    log::info!("histogram plot written to {}", filename.display());
    Ok(())
}

fn draw(filename: &Path, hist: &RgbHistogram, max_value: u64) -> std::result::Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(filename, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0..LEVELS, 0..max_value + 1)?;

    for channel in Channel::ALL {
        let color = plot_color(channel);
        chart.draw_series(
            AreaSeries::new(
                (0..).zip(hist.channel(channel).iter()).map(|(x, y)| (x, *y)),
                0,
                color.mix(0.2),
            )
            .border_style(color),
        )?;
    }
    root.present()?;
    Ok(())
}
