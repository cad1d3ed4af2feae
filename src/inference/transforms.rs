//! Input preprocessing for the supported architectures.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use ndarray::{Array2, Array3};

use crate::common::error::EvalResult;

use super::domain::{Tensor, Transform};

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

const SPATIAL_SIZE: u32 = 256;
const VIT_CROP: u32 = 224;
const DCT_MAX_SIDE: u32 = 256;
const DCT_CROP: usize = 128;
const LOG_EPS: f64 = 1e-6;

/// Resize to 256x256, optional center crop, ImageNet normalization.
#[derive(Clone, Debug)]
pub struct SpatialTransform {
    crop: Option<u32>,
}

impl SpatialTransform {
    pub fn resize_only() -> Self {
        Self { crop: None }
    }

    pub fn resize_and_crop() -> Self {
        Self {
            crop: Some(VIT_CROP),
        }
    }
}

impl Transform for SpatialTransform {
    fn apply(&self, image: &RgbImage) -> EvalResult<Tensor> {
        let mut img = imageops::resize(image, SPATIAL_SIZE, SPATIAL_SIZE, FilterType::Triangle);
        if let Some(side) = self.crop {
            let off = (SPATIAL_SIZE - side) / 2;
            img = imageops::crop_imm(&img, off, off, side, side).to_image();
        }
        let (w, h) = img.dimensions();
        Ok(Array3::from_shape_fn(
            (3, h as usize, w as usize),
            |(c, y, x)| {
                let v = img.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
                (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c]
            },
        ))
    }
}

/// Grayscale, bounded resize, 128x128 center crop, orthonormal 2-D DCT-II.
#[derive(Clone, Debug)]
pub struct DctTransform {
    log_scale: bool,
    basis: Array2<f64>,
}

impl DctTransform {
    pub fn new(log_scale: bool) -> Self {
        Self {
            log_scale,
            basis: dct_basis(DCT_CROP),
        }
    }

    fn center_crop(gray: &GrayImage) -> Array2<f64> {
        let (w, h) = (gray.width() as i64, gray.height() as i64);
        let left = (w - DCT_CROP as i64).div_euclid(2);
        let top = (h - DCT_CROP as i64).div_euclid(2);
        // regions outside the source are zero
        Array2::from_shape_fn((DCT_CROP, DCT_CROP), |(r, c)| {
            let (x, y) = (left + c as i64, top + r as i64);
            if (0..w).contains(&x) && (0..h).contains(&y) {
                gray.get_pixel(x as u32, y as u32)[0] as f64
            } else {
                0.0
            }
        })
    }
}

/// Row `k` holds the k-th orthonormal DCT-II basis vector.
fn dct_basis(n: usize) -> Array2<f64> {
    let nf = n as f64;
    Array2::from_shape_fn((n, n), |(k, i)| {
        let scale = if k == 0 {
            (1.0 / nf).sqrt()
        } else {
            (2.0 / nf).sqrt()
        };
        scale * (std::f64::consts::PI * (2.0 * i as f64 + 1.0) * k as f64 / (2.0 * nf)).cos()
    })
}

/// ITU-R 601 luma in 16-bit fixed point, rounded half up.
fn luma601(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

impl Transform for DctTransform {
    fn apply(&self, image: &RgbImage) -> EvalResult<Tensor> {
        let mut gray = luma601(image);
        if gray.width().max(gray.height()) > DCT_MAX_SIDE {
            gray = imageops::resize(&gray, DCT_MAX_SIDE, DCT_MAX_SIDE, FilterType::Lanczos3);
        }
        let block = Self::center_crop(&gray);
        let mut coeffs = self.basis.dot(&block).dot(&self.basis.t());
        if self.log_scale {
            coeffs.mapv_inplace(|v| (v.abs() + LOG_EPS).ln());
        }
        Ok(coeffs.mapv(|v| v as f32).insert_axis(ndarray::Axis(0)))
    }
}
