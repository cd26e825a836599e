use std::path::PathBuf;

use thiserror::Error;

use crate::histogram::Channel;

#[derive(Error, Debug)]
pub enum HistError {
    #[error("image has no pixels")]
    EmptyImage,

    #[error("{channel} channel holds a single intensity, nothing to equalize")]
    DegenerateHistogram { channel: Channel },

    #[error("unknown threshold strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("histogram channel must have 256 bins, got {0}")]
    InvalidBinCount(usize),

    #[error("failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("array shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("failed to plot histogram: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, HistError>;
