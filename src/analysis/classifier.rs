/// Classifies region-of-interest pixels against the grayscale threshold

use image::{Rgb, RgbImage};
use na::DMatrix;

use crate::{
    GrayscaleImage, Mask,
    analysis::{SELECTED, ThresholdState},
};

/// Color painted over qualifying pixels
pub const HIGHLIGHT: Rgb<u8> = Rgb([255, 0, 0]);

/// Mark every pixel inside the region of interest that satisfies the
/// threshold condition, and report the share of the region so marked.
///
/// Parameters
/// - `image` - The grayscale source image
/// - `mask` - The region-of-interest mask, same shape as `image`
/// - `state` - The threshold and comparison mode to apply
///
/// Returns
/// - The qualifying-pixel mask and the fat percentage in [0, 100]
pub fn classify(
    image: &GrayscaleImage,
    mask: &Mask,
    state: &ThresholdState,
) -> (DMatrix<bool>, f32) {
    debug_assert_eq!(image.shape(), mask.shape());

    let ThresholdState { threshold, mode } = *state;

    let qualifying = image.zip_map(mask, |value, roi| {
        roi == SELECTED && mode.admits(value, threshold)
    });

    let percentage = fat_percentage(&qualifying, mask);

    (qualifying, percentage)
}

/// Percentage of selected mask pixels flagged in `qualifying`. An empty
/// region yields 0.
pub fn fat_percentage(qualifying: &DMatrix<bool>, mask: &Mask) -> f32 {
    let roi_count = mask.iter().filter(|&&m| m == SELECTED).count();
    if roi_count == 0 {
        return 0.0;
    }

    let fat_count = qualifying
        .iter()
        .zip(mask.iter())
        .filter(|&(&q, &m)| q && m == SELECTED)
        .count();

    100.0 * fat_count as f32 / roi_count as f32
}

/// Expand the grayscale image to RGB and paint qualifying pixels red.
pub fn apply_highlight(image: &GrayscaleImage, qualifying: &DMatrix<bool>) -> RgbImage {
    let (rows, cols) = image.shape();

    RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
        let (r, c) = (y as usize, x as usize);
        if qualifying[(r, c)] {
            HIGHLIGHT
        } else {
            let v = image[(r, c)];
            Rgb([v, v, v])
        }
    })
}

/// Everything derived from one threshold state. Rebuilt from scratch on
/// every state change.
#[derive(Clone, Debug)]
pub struct ClassificationResult {
    pub highlighted: RgbImage,
    pub qualifying: DMatrix<bool>,
    pub fat_percentage: f32,
}

impl ClassificationResult {
    pub fn compute(image: &GrayscaleImage, mask: &Mask, state: &ThresholdState) -> Self {
        let (qualifying, fat_percentage) = classify(image, mask, state);
        let highlighted = apply_highlight(image, &qualifying);

        Self {
            highlighted,
            qualifying,
            fat_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use na::{DMatrix, dmatrix};
    use rand::Rng;

    use super::*;
    use crate::analysis::ThresholdMode;

    fn sample_image() -> GrayscaleImage {
        dmatrix![
            50, 100;
            150, 200;
        ]
    }

    #[test]
    fn test_below_full_mask() {
        let mask: Mask = DMatrix::from_element(2, 2, 255);
        let state = ThresholdState::new(100, ThresholdMode::Below);

        let (qualifying, percentage) = classify(&sample_image(), &mask, &state);

        assert_eq!(
            qualifying,
            dmatrix![
                true, false;
                false, false;
            ]
        );
        assert_eq!(percentage, 25.0);
    }

    #[test]
    fn test_above_top_row_mask() {
        let mask: Mask = dmatrix![
            255, 255;
            0, 0;
        ];
        let state = ThresholdState::new(100, ThresholdMode::Above);

        let (qualifying, percentage) = classify(&sample_image(), &mask, &state);

        assert_eq!(qualifying, DMatrix::from_element(2, 2, false));
        assert_eq!(percentage, 0.0);
    }

    #[test]
    fn test_empty_region() {
        let mask: Mask = DMatrix::zeros(2, 2);

        for t in [0u8, 100, 255] {
            for mode in [ThresholdMode::Above, ThresholdMode::Below] {
                let (qualifying, percentage) =
                    classify(&sample_image(), &mask, &ThresholdState::new(t, mode));

                assert!(qualifying.iter().all(|q| !q));
                assert_eq!(percentage, 0.0);
            }
        }
    }

    #[test]
    fn test_only_exact_255_selects() {
        let image: GrayscaleImage = DMatrix::from_element(1, 4, 200);
        let mask: Mask = dmatrix![255, 254, 1, 128];
        let state = ThresholdState::new(10, ThresholdMode::Above);

        let (qualifying, percentage) = classify(&image, &mask, &state);

        assert_eq!(qualifying, dmatrix![true, false, false, false]);
        assert_eq!(percentage, 100.0);
    }

    #[test]
    fn test_random_properties() {
        let mut rng = rand::rng();

        for _ in 0..50 {
            let (rows, cols) = (rng.random_range(1..20), rng.random_range(1..20));
            let image: GrayscaleImage = DMatrix::from_fn(rows, cols, |_, _| rng.random());
            let mask: Mask =
                DMatrix::from_fn(rows, cols, |_, _| if rng.random_bool(0.6) { 255 } else { 0 });
            let state = ThresholdState::new(
                rng.random(),
                if rng.random_bool(0.5) {
                    ThresholdMode::Above
                } else {
                    ThresholdMode::Below
                },
            );

            let (qualifying, percentage) = classify(&image, &mask, &state);

            assert!((0.0..=100.0).contains(&percentage));

            for r in 0..rows {
                for c in 0..cols {
                    let v = image[(r, c)];
                    let expected = mask[(r, c)] == 255
                        && match state.mode {
                            ThresholdMode::Above => v > state.threshold,
                            ThresholdMode::Below => v < state.threshold,
                        };
                    assert_eq!(qualifying[(r, c)], expected);
                    if v == state.threshold {
                        assert!(!qualifying[(r, c)]);
                    }
                }
            }

            // no hidden state between calls
            let (again, again_pct) = classify(&image, &mask, &state);
            assert_eq!(qualifying, again);
            assert_eq!(percentage, again_pct);
        }
    }

    #[test]
    fn test_highlight() {
        let qualifying = dmatrix![
            true, false;
            false, true;
        ];

        let highlighted = apply_highlight(&sample_image(), &qualifying);

        assert_eq!(highlighted.dimensions(), (2, 2));
        assert_eq!(*highlighted.get_pixel(0, 0), HIGHLIGHT);
        assert_eq!(*highlighted.get_pixel(1, 0), Rgb([100, 100, 100]));
        assert_eq!(*highlighted.get_pixel(0, 1), Rgb([150, 150, 150]));
        assert_eq!(*highlighted.get_pixel(1, 1), HIGHLIGHT);
    }

    #[test]
    fn test_result_bundles_all_outputs() {
        let mask: Mask = DMatrix::from_element(2, 2, 255);
        let state = ThresholdState::new(120, ThresholdMode::Above);

        let result = ClassificationResult::compute(&sample_image(), &mask, &state);

        assert_eq!(result.fat_percentage, 50.0);
        assert_eq!(*result.highlighted.get_pixel(0, 1), HIGHLIGHT);
        assert_eq!(*result.highlighted.get_pixel(0, 0), Rgb([50, 50, 50]));
        assert_eq!(result.qualifying.iter().filter(|&&q| q).count(), 2);
    }
}
