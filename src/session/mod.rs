// Interactive thresholding session and its window

pub mod controls;
pub mod display;

use tracing::debug;

use crate::{
    GrayscaleImage, Mask,
    analysis::{ThresholdMode, ThresholdState, classifier::ClassificationResult},
    session::controls::ControlEvent,
};

/// Owns the loaded arrays, the user-controlled state and the result derived
/// from them. The result always reflects the current state: every setter
/// recomputes it before returning.
pub struct InteractiveSession {
    /// The grayscale source image
    image: GrayscaleImage,

    /// The region-of-interest mask
    mask: Mask,

    /// Current threshold and comparison mode
    state: ThresholdState,

    /// Classification for `state`
    result: ClassificationResult,
}

impl InteractiveSession {
    /// Start a session. The initial classification is computed here, so the
    /// first paint already shows it.
    pub fn new(image: GrayscaleImage, mask: Mask, state: ThresholdState) -> Self {
        let result = ClassificationResult::compute(&image, &mask, &state);

        Self {
            image,
            mask,
            state,
            result,
        }
    }

    pub fn state(&self) -> &ThresholdState {
        &self.state
    }

    pub fn result(&self) -> &ClassificationResult {
        &self.result
    }

    /// Image dimensions as (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.image.ncols(), self.image.nrows())
    }

    pub fn set_threshold(&mut self, threshold: u8) {
        self.state.threshold = threshold;
        self.recompute();
    }

    pub fn set_mode(&mut self, mode: ThresholdMode) {
        self.state.mode = mode;
        self.recompute();
    }

    /// Move the threshold by `delta`, saturating at 0 and 255.
    pub fn nudge_threshold(&mut self, delta: i16) {
        let next = ControlEvent::Nudge(delta).applied_to(&self.state);
        self.set_threshold(next.threshold);
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.state.mode.toggled());
    }

    /// Route a control event to the matching setter.
    pub fn apply(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::SetThreshold(t) => self.set_threshold(t),
            ControlEvent::Nudge(delta) => self.nudge_threshold(delta),
            ControlEvent::SetMode(mode) => self.set_mode(mode),
            ControlEvent::ToggleMode => self.toggle_mode(),
        }
    }

    /// The one-line summary shown under the image.
    pub fn status_line(&self) -> String {
        format!(
            "Mode: {} | Threshold: {} → Fat %: {:.2}%",
            self.state.mode, self.state.threshold, self.result.fat_percentage
        )
    }

    /// Number of region-of-interest pixels currently classified as fat.
    pub fn fat_pixels(&self) -> usize {
        self.result.qualifying.iter().filter(|&&q| q).count()
    }

    /// Gray level of the current threshold, for the swatch.
    pub fn swatch_color(&self) -> [u8; 3] {
        [self.state.threshold; 3]
    }

    fn recompute(&mut self) {
        self.result = ClassificationResult::compute(&self.image, &self.mask, &self.state);

        debug!(
            "Recomputed at threshold {} ({}): {} pixels, {:.2}% fat",
            self.state.threshold,
            self.state.mode,
            self.fat_pixels(),
            self.result.fat_percentage
        );
    }
}
