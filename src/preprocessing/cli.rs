use std::{fs::File, io::BufReader, path::PathBuf};

use clap::Parser;
use tracing::{info, warn};

use crate::{
    analysis::{DEFAULT_THRESHOLD, ThresholdMode},
    error::{Error, Result},
    preprocessing::{DEFAULT_IMAGE_PATH, DEFAULT_MASK_PATH, SessionInput},
};

// Raw, CLI input
#[derive(Parser, Debug)]
#[command(version, about = "Interactive fat thresholding for MRI regions of interest", long_about = None)]
pub struct CliArgs {
    #[arg(help = "The grayscale source image.", default_value = DEFAULT_IMAGE_PATH)]
    image_path: PathBuf,

    #[arg(
        help = "The region-of-interest mask; pixels equal to 255 are selected.",
        default_value = DEFAULT_MASK_PATH
    )]
    mask_path: PathBuf,

    #[arg(
        short,
        long,
        help = "Initial grayscale threshold (0-255).",
        default_value_t = DEFAULT_THRESHOLD
    )]
    threshold: u8,

    #[arg(
        short,
        long,
        help = "Which side of the threshold counts as fat: `above` or `below`",
        default_value = "above"
    )]
    mode: String,

    #[arg(long, help = "An input file with pre-loaded parameters.")]
    input_json: Option<PathBuf>,

    #[arg(long, help = "Optional path to save the effective input file to.")]
    pub input_json_savepath: Option<PathBuf>,
}

impl CliArgs {
    pub fn crate_input(&self) -> Result<SessionInput> {
        // if the input file is supplied, just use that
        if let Some(input_filepath) = &self.input_json {
            info!("Using input file {}", input_filepath.display());

            let input_file = File::open(input_filepath).map_err(|source| Error::InputFile {
                path: input_filepath.clone(),
                source,
            })?;

            let reader = BufReader::new(input_file);
            let loaded_input: SessionInput =
                serde_json::from_reader(reader).map_err(|source| Error::InputParse {
                    path: input_filepath.clone(),
                    source,
                })?;

            if self.threshold != DEFAULT_THRESHOLD || self.mode != "above" {
                warn!("--threshold and --mode are ignored when --input-json is given");
            }

            return Ok(loaded_input);
        }

        // otherwise, build the input from the other arguments
        let mode: ThresholdMode = self.mode.parse()?;

        Ok(SessionInput {
            image_path: self.image_path.clone(),
            mask_path: self.mask_path.clone(),
            threshold: self.threshold,
            mode,
        })
    }
}
