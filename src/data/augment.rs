// ============================================================
// Layer 4 — Augmentation
// ============================================================
// Randomized, label-preserving transforms applied to training
// images at batch-assembly time: a small rotation, an optional
// horizontal mirror, and a small translation. Each sample gets
// independent draws, so every pass over the dataset sees a
// different rendition of the same underlying images.
//
// Geometry is done by inverse mapping with nearest-pixel
// sampling; coordinates that fall outside the image clamp to the
// nearest border pixel.

use rand::Rng;

use crate::data::dataset::{CHANNELS, IMAGE_PIXELS, IMAGE_SIDE};

#[derive(Debug, Clone)]
pub struct Augmenter {
    /// Maximum rotation in degrees; the angle is drawn uniformly
    /// from ±this bound.
    pub rotation_degrees: f32,

    /// Maximum translation as a fraction of the image side, drawn
    /// uniformly from ±this bound on each axis.
    pub shift_fraction: f32,

    /// Mirror the image left-to-right with probability 1/2.
    pub horizontal_flip: bool,
}

impl Default for Augmenter {
    fn default() -> Self {
        Self {
            rotation_degrees: 10.0,
            shift_fraction: 0.1,
            horizontal_flip: true,
        }
    }
}

impl Augmenter {
    /// Apply one random draw of the configured transforms.
    /// `image` is a CHW pixel buffer of length IMAGE_PIXELS.
    pub fn transform(&self, image: &[f32], rng: &mut impl Rng) -> Vec<f32> {
        debug_assert_eq!(image.len(), IMAGE_PIXELS);

        let mirrored;
        let source: &[f32] = if self.horizontal_flip && rng.gen_bool(0.5) {
            mirrored = mirror_horizontal(image);
            &mirrored
        } else {
            image
        };

        let angle = if self.rotation_degrees > 0.0 {
            rng.gen_range(-self.rotation_degrees..=self.rotation_degrees)
                .to_radians()
        } else {
            0.0
        };

        let max_shift = self.shift_fraction * IMAGE_SIDE as f32;
        let (dx, dy) = if self.shift_fraction > 0.0 {
            (
                rng.gen_range(-max_shift..=max_shift),
                rng.gen_range(-max_shift..=max_shift),
            )
        } else {
            (0.0, 0.0)
        };

        if angle == 0.0 && dx == 0.0 && dy == 0.0 {
            return source.to_vec();
        }
        warp(source, angle, dx, dy)
    }
}

/// Mirror an image left-to-right, channel by channel.
pub(crate) fn mirror_horizontal(image: &[f32]) -> Vec<f32> {
    let plane = IMAGE_SIDE * IMAGE_SIDE;
    let mut out = vec![0.0; IMAGE_PIXELS];
    for c in 0..CHANNELS {
        for y in 0..IMAGE_SIDE {
            for x in 0..IMAGE_SIDE {
                out[c * plane + y * IMAGE_SIDE + x] =
                    image[c * plane + y * IMAGE_SIDE + (IMAGE_SIDE - 1 - x)];
            }
        }
    }
    out
}

/// Rotate about the image centre and translate, by inverse mapping:
/// for each output pixel, undo the shift, rotate back by `angle`,
/// and sample the nearest source pixel (clamped at the border).
fn warp(source: &[f32], angle: f32, dx: f32, dy: f32) -> Vec<f32> {
    let side = IMAGE_SIDE as f32;
    let centre = (side - 1.0) / 2.0;
    let (sin, cos) = angle.sin_cos();
    let plane = IMAGE_SIDE * IMAGE_SIDE;

    let mut out = vec![0.0; IMAGE_PIXELS];
    for y in 0..IMAGE_SIDE {
        for x in 0..IMAGE_SIDE {
            let ux = x as f32 - dx - centre;
            let uy = y as f32 - dy - centre;
            let sx = (cos * ux + sin * uy + centre)
                .round()
                .clamp(0.0, side - 1.0) as usize;
            let sy = (-sin * ux + cos * uy + centre)
                .round()
                .clamp(0.0, side - 1.0) as usize;
            for c in 0..CHANNELS {
                out[c * plane + y * IMAGE_SIDE + x] = source[c * plane + sy * IMAGE_SIDE + sx];
            }
        }
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn gradient_image() -> Vec<f32> {
        (0..IMAGE_PIXELS)
            .map(|i| i as f32 / IMAGE_PIXELS as f32)
            .collect()
    }

    #[test]
    fn disabled_augmenter_is_identity() {
        let augmenter = Augmenter {
            rotation_degrees: 0.0,
            shift_fraction: 0.0,
            horizontal_flip: false,
        };
        let image = gradient_image();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(augmenter.transform(&image, &mut rng), image);
    }

    #[test]
    fn mirror_swaps_left_and_right_columns() {
        let mut image = vec![0.0; IMAGE_PIXELS];
        image[0] = 1.0; // red channel, top-left pixel

        let mirrored = mirror_horizontal(&image);
        assert_eq!(mirrored[IMAGE_SIDE - 1], 1.0); // now top-right
        assert_eq!(mirrored[0], 0.0);

        // Mirroring twice restores the original.
        assert_eq!(mirror_horizontal(&mirrored), image);
    }

    #[test]
    fn transform_preserves_length_and_pixel_bounds() {
        let augmenter = Augmenter::default();
        let image = gradient_image();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..8 {
            let out = augmenter.transform(&image, &mut rng);
            assert_eq!(out.len(), IMAGE_PIXELS);
            // Nearest sampling only copies existing values, so the
            // output stays inside the normalized pixel range.
            assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn pure_translation_moves_pixels() {
        let mut image = vec![0.0; IMAGE_PIXELS];
        let centre = IMAGE_SIDE / 2;
        image[centre * IMAGE_SIDE + centre] = 1.0;

        // Shift right by two pixels, no rotation.
        let out = warp(&image, 0.0, 2.0, 0.0);
        assert_eq!(out[centre * IMAGE_SIDE + centre + 2], 1.0);
        assert_eq!(out[centre * IMAGE_SIDE + centre], 0.0);
    }
}
