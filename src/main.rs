use std::process::exit;

extern crate nalgebra as na;

mod analysis;
mod error;
mod preprocessing;
mod session;

use clap::Parser;
use na::DMatrix;
use tracing::error;

use crate::{
    error::Result,
    preprocessing::{cli::CliArgs, image_input::load_images},
    session::{InteractiveSession, display},
};

/// Grayscale source image, rows x columns
type GrayscaleImage = DMatrix<u8>;

/// Region-of-interest mask; 255 marks a selected pixel
type Mask = DMatrix<u8>;

fn start(args: &CliArgs) -> Result<()> {
    let input = args.crate_input()?;
    input.log();

    if let Some(savepath) = &args.input_json_savepath {
        input.save(savepath)?;
    }

    let (image, mask) = load_images(&input.image_path, &input.mask_path)?;
    let session = InteractiveSession::new(image, mask, input.initial_state());

    display::run(session)
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();

    if let Err(err) = start(&args) {
        error!("{}", err);
        exit(1);
    }
}
