//! Quantization and zig-zag reordering.
//!
//! The AAN butterfly in [`crate::dct`] is non-unitary: every output
//! frequency carries a known gain. Rather than descaling the transform
//! output, the per-frequency descale factor is folded into the
//! quantization step, giving one fixed-point multiplier per coefficient
//! position. The multiply-accumulate rounds half-to-even to match the
//! hardware quantizer pipeline.

use crate::consts::{DCTSIZE, DCTSIZE2, Q50_CHROMA, Q50_LUMA, ZIGZAG};
use crate::dct::FRAC_BITS;
use crate::error::{Error, Result};

/// Fractional bits of the combined quantizer multipliers. Matches the
/// hardware multiplier operand width.
pub const QUANT_FRAC_BITS: u32 = 13;

/// Component class selecting which quantization table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentClass {
    /// Luminance (full-resolution plane)
    Luma,
    /// Chrominance (subsampled planes, shared table)
    Chroma,
}

/// The eight 1-D AAN descale factors, reduced to 12 fractional bits.
///
/// `s[u] = cos(u*pi/16) / (2 * gain(u))` where `gain(u)` is the butterfly's
/// non-unitary gain at frequency `u`. The 2-D descale used for quantization
/// is the outer product `s (x) s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AanScale {
    /// Factors at a 2^12 fixed-point scale
    pub s: [u32; DCTSIZE],
}

impl Default for AanScale {
    fn default() -> Self {
        Self::new()
    }
}

impl AanScale {
    /// Derive the factors from their closed forms at the default 12-bit
    /// reduction.
    pub fn new() -> Self {
        Self::with_precision(FRAC_BITS)
    }

    /// Derive the factors reduced to `bits` fractional bits, half-up.
    pub fn with_precision(bits: u32) -> Self {
        use std::f64::consts::PI;

        let unit = f64::from(1u32 << bits);
        let reduce = |a: f64| (0.5 + a * unit).floor() / unit;

        // The butterfly multiplies by precision-reduced constants, so its
        // real per-frequency gains come from the reduced values, not the
        // exact ones.
        let a1 = reduce(0.5f64.sqrt());
        let a4 = reduce(2.0f64.sqrt() * (PI / 8.0).cos());
        let a5 = reduce((3.0 * PI / 8.0).cos());

        // Denominators are the butterfly gains at each frequency; the DC
        // entry folds in the 1/sqrt(2) basis normalization, which is why
        // s[0] lands on the same value as s[4].
        let gains = [
            2.0f64.sqrt(),
            -a5 + a4 + 1.0,
            a1 + 1.0,
            a5 + 1.0,
            1.0,
            1.0 - a5,
            1.0 - a1,
            a5 - a4 + 1.0,
        ];

        let mut s = [0u32; DCTSIZE];
        for (u, v) in s.iter_mut().enumerate() {
            let exact = ((u as f64) * PI / 16.0).cos() / (2.0 * gains[u]);
            *v = (0.5 + exact * unit).floor() as u32;
        }
        debug_assert_eq!(s[0], s[4]);
        Self { s }
    }
}

/// Quantization step table for a single component class.
///
/// Steps are stored in natural order as `u16`; the container field is a
/// single byte per step, so values outside 1..=255 are rejected at
/// container-write time.
#[derive(Debug, Clone)]
pub struct QuantTable {
    /// Step values in natural order
    pub values: [u16; DCTSIZE2],
    /// Table slot (0 = luma, 1 = chroma)
    pub slot: u8,
}

impl QuantTable {
    /// Quantization step at a zigzag position.
    #[inline]
    pub fn at_zigzag(&self, pos: usize) -> u16 {
        self.values[ZIGZAG[pos]]
    }
}

/// Named compression-aggressiveness presets.
///
/// Each preset scales the Q50 baseline tables by a power of two, the same
/// scaling the original header generator applies to its Q50 template.
/// Larger steps compress harder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantPreset {
    /// Q50 steps x4
    VeryLow,
    /// Q50 steps x2
    Low,
    /// The Q50 baseline tables unchanged
    #[default]
    Medium,
    /// Q50 steps / 2
    High,
    /// Q50 steps / 4
    VeryHigh,
}

impl QuantPreset {
    /// Look up a preset by index (0 = VeryLow .. 4 = VeryHigh).
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::VeryLow),
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            4 => Some(Self::VeryHigh),
            _ => None,
        }
    }

    /// Look up a preset by name, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "VERY_LOW" => Some(Self::VeryLow),
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "VERY_HIGH" => Some(Self::VeryHigh),
            _ => None,
        }
    }

    /// Power-of-two exponent applied to the Q50 steps.
    fn log2_scale(self) -> i32 {
        match self {
            Self::VeryLow => 2,
            Self::Low => 1,
            Self::Medium => 0,
            Self::High => -1,
            Self::VeryHigh => -2,
        }
    }
}

/// Scale one Q50 step by `2^f`, rounding half-up on right shifts and
/// clamping to the 1..=255 byte range of the table segment.
fn scale_step(q50: u16, f: i32) -> u16 {
    let v = if f >= 0 {
        u32::from(q50) << f as u32
    } else {
        let shift = (-f) as u32;
        (u32::from(q50) + (1 << (shift - 1))) >> shift
    };
    v.clamp(1, 255) as u16
}

/// Luma/chroma quantization table pair.
#[derive(Debug, Clone)]
pub struct QuantTableSet {
    pub luma: QuantTable,
    pub chroma: QuantTable,
}

impl QuantTableSet {
    /// Build the table pair for a quality preset.
    pub fn for_preset(preset: QuantPreset) -> Self {
        let f = preset.log2_scale();
        let mut luma = [0u16; DCTSIZE2];
        let mut chroma = [0u16; DCTSIZE2];
        for k in 0..DCTSIZE2 {
            luma[k] = scale_step(Q50_LUMA[k], f);
            chroma[k] = scale_step(Q50_CHROMA[k], f);
        }
        Self {
            luma: QuantTable { values: luma, slot: 0 },
            chroma: QuantTable { values: chroma, slot: 1 },
        }
    }

    /// Table for a component class.
    pub fn table(&self, class: ComponentClass) -> &QuantTable {
        match class {
            ComponentClass::Luma => &self.luma,
            ComponentClass::Chroma => &self.chroma,
        }
    }
}

/// Combined descale-and-quantize multipliers for one component class.
///
/// `m[k] = round_half_up(s[u] * s[v] * 2^13 / q[k])`, derived by exact
/// integer arithmetic from the 12-bit reduced scale factors. Built once,
/// immutable, safe to share across worker threads.
#[derive(Debug, Clone)]
pub struct Quantizer {
    /// Multipliers in natural order at a 2^13 fixed-point scale
    m: [u32; DCTSIZE2],
}

impl Quantizer {
    /// Fold the AAN descale factors and a step table into one multiplier
    /// per coefficient position.
    ///
    /// Fails with [`Error::TableOverflow`] if any step is outside the
    /// 1..=255 range the table segment can carry.
    pub fn new(scale: &AanScale, table: &QuantTable) -> Result<Self> {
        let mut m = [0u32; DCTSIZE2];
        for r in 0..DCTSIZE {
            for c in 0..DCTSIZE {
                let k = r * DCTSIZE + c;
                let q = table.values[k];
                if q == 0 || q > 255 {
                    return Err(Error::TableOverflow {
                        table: "quantization step",
                        value: u32::from(q),
                        max: 255,
                    });
                }
                // round_half_up(s2d * 2^13 / (q * 2^24)) where s2d carries
                // 2 x 12 fractional bits from the outer product.
                let s2d = u64::from(scale.s[r]) * u64::from(scale.s[c]);
                let num = (s2d << (QUANT_FRAC_BITS + 1)) + (u64::from(q) << 24);
                let den = u64::from(q) << 25;
                m[k] = (num / den) as u32;
            }
        }
        Ok(Self { m })
    }

    /// Multiplier at a natural coefficient position.
    #[inline]
    pub fn multiplier(&self, k: usize) -> u32 {
        self.m[k]
    }
}

/// Round-half-even reduction of `p` by `n` fractional bits, exact over the
/// full signed range.
#[inline]
fn round_half_even_shift(p: i64, n: u32) -> i64 {
    let floor = p >> n;
    let rem = p - (floor << n);
    let half = 1i64 << (n - 1);
    if rem > half {
        floor + 1
    } else if rem < half {
        floor
    } else {
        floor + (floor & 1)
    }
}

/// Quantize a transformed block and reorder it into zig-zag scan order.
///
/// Each coefficient is multiplied by the combined fixed-point multiplier
/// for its position and rounded half-to-even. Position 0 of the output is
/// the DC coefficient.
pub fn quantize(coeffs: &[i32; DCTSIZE2], quantizer: &Quantizer) -> [i16; DCTSIZE2] {
    let mut natural = [0i16; DCTSIZE2];
    for k in 0..DCTSIZE2 {
        let p = i64::from(coeffs[k]) * i64::from(quantizer.m[k]);
        natural[k] = round_half_even_shift(p, QUANT_FRAC_BITS) as i16;
    }

    let mut zigzag = [0i16; DCTSIZE2];
    for (z, &k) in ZIGZAG.iter().enumerate() {
        zigzag[z] = natural[k];
    }
    zigzag
}
