use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    analysis::{DEFAULT_THRESHOLD, ThresholdMode, ThresholdState},
    error::{Error, Result},
};

pub mod cli;
pub mod image_input;

pub const DEFAULT_IMAGE_PATH: &str = "images/mri_image.png";
pub const DEFAULT_MASK_PATH: &str = "images/mask.png";

/// Everything needed to start a session: where the inputs live and the
/// state the controls start in.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionInput {
    pub image_path: PathBuf,
    pub mask_path: PathBuf,

    #[serde(default = "default_threshold")]
    pub threshold: u8,

    #[serde(default)]
    pub mode: ThresholdMode,
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

impl Default for SessionInput {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
            mask_path: PathBuf::from(DEFAULT_MASK_PATH),
            threshold: DEFAULT_THRESHOLD,
            mode: ThresholdMode::default(),
        }
    }
}

impl SessionInput {
    pub fn initial_state(&self) -> ThresholdState {
        ThresholdState::new(self.threshold, self.mode)
    }

    /// Write this input as pretty JSON so it can be passed back with `--input-json`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let save_err = |reason: String| Error::InputSave {
            path: path.to_path_buf(),
            reason,
        };

        let serialized = serde_json::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        fs::write(path, serialized).map_err(|e| save_err(e.to_string()))?;

        info!("Saved session input to {}", path.display());
        Ok(())
    }

    pub fn log(&self) {
        info!(
            "Session input is shown below:\n\n\
        \t image:      {}\n\
        \t mask:       {}\n\
        \t threshold:  {}\n\
        \t mode:       {}\n\n\
        ",
            self.image_path.display(),
            self.mask_path.display(),
            self.threshold,
            self.mode,
        );
    }
}
