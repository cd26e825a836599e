use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use rgbhist::{load_rgb_image, par_calc_rgb_hist, plot_rgb_histogram, process_image, save_rgb_image, Command, ThresholdStrategy, FIXED_CUTOUT};

#[derive(Parser, Debug)]
#[command(author, version, about = "Histogram chart, equalization and binarization of RGB images", long_about = None)]
struct Parameters {
    ///Path to the input image.
    #[arg(short, long)]
    input: PathBuf,
    ///One of histogram, equalize, binarize, median_grey_level.
    #[arg(short, long)]
    method: String,
    ///Output image path.
    #[arg(short, long)]
    output: PathBuf,
    ///Binarization strategy: fixed, two_peaks or median_grey_level.
    #[arg(short, long, default_value = "fixed")]
    strategy: String,
    ///Cut point of the fixed strategy.
    #[arg(long, default_value_t = FIXED_CUTOUT)]
    cutout: u8,
    ///Also plot the input histogram to this file.
    #[arg(long)]
    plot: Option<PathBuf>,
    ///More log output, repeat for more.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let params = Parameters::parse();
    init_logging(params.verbose);
    log::info!("Using args: {} {} {}", params.input.display(), params.method, params.output.display());

    let strategy = match params.strategy.parse::<ThresholdStrategy>()? {
        ThresholdStrategy::FixedCutout { .. } => ThresholdStrategy::FixedCutout { cutout: params.cutout },
        other => other,
    };
    let command = Command::from_method(&params.method, strategy)?;

    let input = load_rgb_image(&params.input)?;
    if let Some(plot) = &params.plot {
        plot_rgb_histogram(plot, &par_calc_rgb_hist(&input))
            .with_context(|| format!("plotting histogram of {}", params.input.display()))?;
    }
    let output = process_image(&command, &input)
        .with_context(|| format!("processing {} with {:?}", params.input.display(), command))?;
    save_rgb_image(&output, &params.output)?;
    Ok(())
}
