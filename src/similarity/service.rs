//! Mean RGB structural similarity.
//!
//! Each channel uses a 7x7 uniform window with sample covariance,
//! `K1 = 0.01`, `K2 = 0.03` and an 8-bit data range. The SSIM map is averaged
//! over window positions that fit entirely inside the image, then the three
//! channel means are averaged without weighting.

use image::RgbImage;
use ndarray::Array2;

use super::domain::{SimilarityError, SimilarityScore, SimilarityScorer};

pub const WINDOW: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Summed-area tables of x, y, x^2, y^2 and xy for one channel pair.
struct Moments {
    x: Array2<f64>,
    y: Array2<f64>,
    xx: Array2<f64>,
    yy: Array2<f64>,
    xy: Array2<f64>,
}

impl Moments {
    fn new(a: &RgbImage, b: &RgbImage, channel: usize) -> Self {
        let (w, h) = (a.width() as usize, a.height() as usize);
        let mut m = Self {
            x: Array2::zeros((h + 1, w + 1)),
            y: Array2::zeros((h + 1, w + 1)),
            xx: Array2::zeros((h + 1, w + 1)),
            yy: Array2::zeros((h + 1, w + 1)),
            xy: Array2::zeros((h + 1, w + 1)),
        };
        for r in 0..h {
            for c in 0..w {
                let x = a.get_pixel(c as u32, r as u32)[channel] as f64;
                let y = b.get_pixel(c as u32, r as u32)[channel] as f64;
                for (table, v) in [
                    (&mut m.x, x),
                    (&mut m.y, y),
                    (&mut m.xx, x * x),
                    (&mut m.yy, y * y),
                    (&mut m.xy, x * y),
                ] {
                    table[[r + 1, c + 1]] =
                        v + table[[r, c + 1]] + table[[r + 1, c]] - table[[r, c]];
                }
            }
        }
        m
    }
}

fn window_sum(t: &Array2<f64>, r: usize, c: usize) -> f64 {
    t[[r + WINDOW, c + WINDOW]] - t[[r, c + WINDOW]] - t[[r + WINDOW, c]] + t[[r, c]]
}

fn channel_ssim(a: &RgbImage, b: &RgbImage, channel: usize) -> f64 {
    let (w, h) = (a.width() as usize, a.height() as usize);
    let m = Moments::new(a, b, channel);

    let np = (WINDOW * WINDOW) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let mut total = 0.0;
    let mut count = 0usize;
    for r in 0..=(h - WINDOW) {
        for c in 0..=(w - WINDOW) {
            let ux = window_sum(&m.x, r, c) / np;
            let uy = window_sum(&m.y, r, c) / np;
            let uxx = window_sum(&m.xx, r, c) / np;
            let uyy = window_sum(&m.yy, r, c) / np;
            let uxy = window_sum(&m.xy, r, c) / np;

            let vx = cov_norm * (uxx - ux * ux);
            let vy = cov_norm * (uyy - uy * uy);
            let vxy = cov_norm * (uxy - ux * uy);

            let num = (2.0 * (ux * uy) + c1) * (2.0 * vxy + c2);
            let den = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += num / den;
            count += 1;
        }
    }
    total / count as f64
}

/// Mean of the per-channel SSIM of two RGB images of identical size.
pub fn ssim_rgb(original: &RgbImage, adversarial: &RgbImage) -> Result<f64, SimilarityError> {
    if original.dimensions() != adversarial.dimensions() {
        return Err(SimilarityError::DimensionMismatch {
            orig: original.dimensions(),
            adv: adversarial.dimensions(),
        });
    }
    let (width, height) = original.dimensions();
    if (width.min(height) as usize) < WINDOW {
        return Err(SimilarityError::TooSmall {
            width,
            height,
            window: WINDOW,
        });
    }

    let mean = (0..3)
        .map(|ch| channel_ssim(original, adversarial, ch))
        .sum::<f64>()
        / 3.0;
    if mean.is_finite() {
        Ok(mean)
    } else {
        Err(SimilarityError::NonFinite)
    }
}

/// Similarity of a pair, degrading to the sentinel on failure.
pub fn score_pair(original: &RgbImage, adversarial: &RgbImage) -> SimilarityScore {
    ssim_rgb(original, adversarial).into()
}

/// Mean RGB SSIM scorer.
#[derive(Copy, Clone, Debug, Default)]
pub struct Ssim;

impl SimilarityScorer for Ssim {
    fn score(&self, original: &RgbImage, adversarial: &RgbImage) -> SimilarityScore {
        score_pair(original, adversarial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::domain::SIMILARITY_SENTINEL;
    use approx::assert_relative_eq;
    use image::Rgb;
    use proptest::prelude::*;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x + y) * 5 % 256) as u8])
        })
    }

    fn noisy(base: &RgbImage, seed: u32) -> RgbImage {
        let mut out = base.clone();
        let mut s = seed.wrapping_mul(2_654_435_761).max(1);
        for p in out.pixels_mut() {
            for v in p.0.iter_mut() {
                s ^= s << 13;
                s ^= s >> 17;
                s ^= s << 5;
                let delta = (s % 41) as i16 - 20;
                *v = (*v as i16 + delta).clamp(0, 255) as u8;
            }
        }
        out
    }

    #[test]
    fn identical_images_score_one() {
        let img = gradient(32, 24);
        assert_relative_eq!(ssim_rgb(&img, &img).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_images_score_one() {
        let img = RgbImage::from_pixel(10, 10, Rgb([128, 0, 255]));
        assert_relative_eq!(ssim_rgb(&img, &img).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn perturbation_lowers_similarity() {
        let img = gradient(40, 40);
        let adv = noisy(&img, 7);
        let s = ssim_rgb(&img, &adv).unwrap();
        assert!(s < 1.0);
        assert!(s > -1.0);
    }

    #[test]
    fn inverted_structure_can_go_negative() {
        let img = gradient(32, 32);
        let mut inv = img.clone();
        for p in inv.pixels_mut() {
            for v in p.0.iter_mut() {
                *v = 255 - *v;
            }
        }
        assert!(ssim_rgb(&img, &inv).unwrap() < 0.0);
    }

    #[test]
    fn dimension_mismatch_degrades_to_sentinel() {
        let a = gradient(16, 16);
        let b = gradient(16, 17);
        let score = score_pair(&a, &b);
        assert_eq!(score.value, SIMILARITY_SENTINEL);
        assert!(matches!(
            score.failure,
            Some(SimilarityError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn images_smaller_than_window_fail() {
        let a = gradient(6, 30);
        assert!(matches!(
            ssim_rgb(&a, &a),
            Err(SimilarityError::TooSmall { window: WINDOW, .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn similarity_is_symmetric(w in 7u32..20, h in 7u32..20, s1 in 1u32..1000, s2 in 1u32..1000) {
            let base = gradient(w, h);
            let a = noisy(&base, s1);
            let b = noisy(&base, s2);
            let ab = ssim_rgb(&a, &b).unwrap();
            let ba = ssim_rgb(&b, &a).unwrap();
            prop_assert!((ab - ba).abs() < 1e-12);
            prop_assert!(ab <= 1.0 + 1e-9);
        }
    }
}
