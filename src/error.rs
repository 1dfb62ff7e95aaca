//! Error type shared by the loader, the input layer and the window.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An input image could not be opened or decoded.
    #[error("image not found or unreadable at {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Source image and mask differ in size. Shapes are (rows, cols).
    #[error(
        "image and mask must have the same dimensions: image is {}x{}, mask is {}x{}",
        image.0, image.1, mask.0, mask.1
    )]
    ShapeMismatch {
        image: (usize, usize),
        mask: (usize, usize),
    },

    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize input file {path}: {source}")]
    InputParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to save input file to {path}: {reason}")]
    InputSave { path: PathBuf, reason: String },

    #[error("'{0}' is not a valid threshold mode, expected `above` or `below`")]
    InvalidMode(String),

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    #[error("failed to draw panel: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
