use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use image::{Rgb, RgbImage};

#[derive(Parser, Debug)]
#[command(author, version, about = "Write synthetic inputs for rgbhist", long_about = None)]
struct Parameters {
    ///Image height.
    #[arg(long, default_value_t = 256)]
    height: u32,
    ///Image width.
    #[arg(long, default_value_t = 256)]
    width: u32,
    ///Directory the images are written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

/// Diagonal gradients squeezed into a narrow band per channel, a good equalization input.
fn low_contrast(width: u32, height: u32) -> RgbImage {
    let step = 1.0 / (width + height).max(1) as f32;
    RgbImage::from_fn(width, height, |x, y| {
        let t = (x + y) as f32 * step;
        Rgb([
            100 + (t * 40.0).round() as u8,
            60 + ((1.0 - t) * 30.0).round() as u8,
            140 + (t * 20.0).round() as u8,
        ])
    })
}

/// Dark background with a bright centered square, both slightly dithered,
/// a good thresholding input.
fn bimodal(width: u32, height: u32) -> RgbImage {
    let (x0, x1) = (width / 4, width - width / 4);
    let (y0, y1) = (height / 4, height - height / 4);
    RgbImage::from_fn(width, height, |x, y| {
        let jitter = ((x * 7 + y * 13) % 9) as u8;
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            Rgb([200 + jitter, 180 + jitter, 220 + jitter])
        } else {
            Rgb([30 + jitter, 50 + jitter, 20 + jitter])
        }
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let params = Parameters::parse();

    for (name, img) in [
        ("low_contrast.png", low_contrast(params.width, params.height)),
        ("bimodal.png", bimodal(params.width, params.height)),
    ] {
        let path = params.output_dir.join(name);
        img.save(&path).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}
