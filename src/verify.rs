//! Floating-point reference model for validating the fixed-point pipeline.
//!
//! Not on the encode path. The direct orthonormal DCT here is the textbook
//! matrix definition; comparing it against the descaled output of
//! [`crate::dct::forward_dct_8x8`] bounds the precision loss of the 12-bit
//! butterfly.

use crate::consts::{DCTSIZE, DCTSIZE2};
use crate::dct::FRAC_BITS;
use crate::quant::AanScale;

/// Direct orthonormal 2-D DCT of a level-shifted block.
///
/// `F(u,v) = C(u)C(v)/4 * sum f(x,y) cos((2x+1)u*pi/16) cos((2y+1)v*pi/16)`
/// with `C(0) = 1/sqrt(2)`. O(n^4) and exact up to f64 precision; fine for a
/// reference.
pub fn reference_dct_8x8(block: &[i16; DCTSIZE2]) -> [f64; DCTSIZE2] {
    let mut output = [0.0f64; DCTSIZE2];
    for v in 0..DCTSIZE {
        for u in 0..DCTSIZE {
            let mut sum = 0.0;
            for y in 0..DCTSIZE {
                for x in 0..DCTSIZE {
                    sum += f64::from(block[y * DCTSIZE + x])
                        * ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / 16.0).cos()
                        * ((2 * y + 1) as f64 * v as f64 * std::f64::consts::PI / 16.0).cos();
                }
            }
            let cu = if u == 0 { std::f64::consts::FRAC_1_SQRT_2 } else { 1.0 };
            let cv = if v == 0 { std::f64::consts::FRAC_1_SQRT_2 } else { 1.0 };
            output[v * DCTSIZE + u] = sum * cu * cv / 4.0;
        }
    }
    output
}

/// Put fixed-point butterfly output on the orthonormal scale by multiplying
/// each coefficient by the outer product of the 1-D descale factors.
pub fn descale(coeffs: &[i32; DCTSIZE2], scale: &AanScale) -> [f64; DCTSIZE2] {
    let unit = f64::from(1u32 << FRAC_BITS);
    let mut output = [0.0f64; DCTSIZE2];
    for v in 0..DCTSIZE {
        for u in 0..DCTSIZE {
            let s2d = (scale.s[v] as f64 / unit) * (scale.s[u] as f64 / unit);
            output[v * DCTSIZE + u] = f64::from(coeffs[v * DCTSIZE + u]) * s2d;
        }
    }
    output
}

/// Peak signal-to-noise ratio between two coefficient blocks, in dB, with an
/// 8-bit peak of 255. Identical blocks approach +inf (capped by the epsilon
/// in the denominator).
pub fn psnr(a: &[f64; DCTSIZE2], b: &[f64; DCTSIZE2]) -> f64 {
    let mut sq = 0.0;
    for k in 0..DCTSIZE2 {
        let d = a[k] - b[k];
        sq += d * d;
    }
    let rmse = (sq / DCTSIZE2 as f64).sqrt();
    20.0 * (255.0f64.log10() - (rmse + 1e-12).log10())
}
