use image::RgbImage;
use ndarray_stats::QuantileExt;

use crate::error::{HistError, Result};
use crate::histogram::{Channel, RgbHistogram, LEVELS};
use crate::pixel_buffer::{PixelBuffer, RgbColor, BLACK, WHITE};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Geometry of the stacked histogram chart, in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChartLayout {
    /// Left and right margin.
    pub lr_border: u32,
    /// Top and bottom margin.
    pub tb_border: u32,
    /// Vertical gap between two panels.
    pub in_between_border: u32,
    pub graph_width: u32,
    pub graph_height: u32,
}

impl Default for ChartLayout {
    fn default() -> Self {
        ChartLayout {
            lr_border: 30,
            tb_border: 10,
            in_between_border: 30,
            graph_width: 256,
            graph_height: 256,
        }
    }
}

impl ChartLayout {
    pub fn width(&self) -> u32 {
        2 * self.lr_border + self.graph_width
    }

    pub fn height(&self) -> u32 {
        2 * self.tb_border + 2 * self.in_between_border + 3 * self.graph_height
    }

    /// Panel of `channel`; red on top, blue at the bottom.
    pub fn panel(&self, channel: Channel) -> Rectangle {
        let row = channel.index() as u32;
        Rectangle {
            x: self.lr_border,
            y: self.tb_border + row * (self.graph_height + self.in_between_border),
            width: self.graph_width,
            height: self.graph_height,
        }
    }
}

fn clear_image<B: PixelBuffer + ?Sized>(img: &mut B, color: RgbColor) {
    for x in 0..img.width() {
        for y in 0..img.height() {
            img.set_pixel(x, y, color);
        }
    }
}

/// One pixel wide outline along the inside of `rect`.
fn draw_rectangle<B: PixelBuffer + ?Sized>(img: &mut B, rect: &Rectangle, color: RgbColor) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let (right, bottom) = (rect.x + rect.width - 1, rect.y + rect.height - 1);
    for x in rect.x..=right {
        img.set_pixel(x, rect.y, color);
        img.set_pixel(x, bottom, color);
    }
    for y in rect.y..=bottom {
        img.set_pixel(rect.x, y, color);
        img.set_pixel(right, y, color);
    }
}

/// `length` pixels from `(x, y)` downward, end exclusive.
///
/// A zero length draws nothing, and a full-height bar ends on the panel's
/// last row. An inclusive `y..=y + length` would paint the top row over empty
/// bins and run the tallest bar one row past the frame.
fn draw_vertical_line<B: PixelBuffer + ?Sized>(img: &mut B, x: u32, y: u32, length: u32, color: RgbColor) {
    for j in y..y + length {
        img.set_pixel(x, j, color);
    }
}

/// Draw the three channel histograms as bar charts hanging from the top
/// edge of their panels, each normalized to its own highest bin.
pub fn render_histogram_chart(hist: &RgbHistogram, layout: &ChartLayout) -> Result<RgbImage> {
    let mut maxima = [0u64; 3];
    for channel in Channel::ALL {
        let max = *hist.channel(channel).max().map_err(|_| HistError::EmptyImage)?;
        if max == 0 {
            return Err(HistError::EmptyImage);
        }
        maxima[channel.index()] = max;
    }

    let mut graph = RgbImage::new(layout.width(), layout.height());
    clear_image(&mut graph, BLACK);

    for channel in Channel::ALL {
        draw_rectangle(&mut graph, &layout.panel(channel), WHITE);
    }

    for channel in Channel::ALL {
        let rect = layout.panel(channel);
        let max = maxima[channel.index()];
        for (i, &count) in hist.channel(channel).iter().enumerate() {
            let column = rect.x + (i as u64 * u64::from(rect.width) / LEVELS as u64) as u32;
            let length = (u64::from(rect.height) * count / max) as u32;
            draw_vertical_line(&mut graph, column, rect.y, length, channel.color());
        }
    }
    log::debug!("rendered {}x{} histogram chart", layout.width(), layout.height());
    Ok(graph)
}
