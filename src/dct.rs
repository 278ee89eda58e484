//! Forward DCT (Discrete Cosine Transform) on 8x8 sample blocks.
//!
//! Fixed-point AAN (Arai/Agui/Nakajima) butterfly network matching the
//! hardware pipeline bit-for-bit. The five multiplier constants are
//! pre-rounded to 12 fractional bits, every intermediate value carries a
//! 2^12 scale, and the final descale is `floor((x + 2048) / 4096)`.
//!
//! Outputs are *unscaled* AAN coefficients in natural frequency order; the
//! per-frequency gain of the butterfly is folded into the quantizer
//! multipliers (see [`crate::quant`]).

use crate::consts::{DCTSIZE, DCTSIZE2};

/// Fractional bits carried by the butterfly constants and intermediates.
pub const FRAC_BITS: u32 = 12;

const HALF: i32 = 1 << (FRAC_BITS - 1);

// AAN multiplier constants, rounded half-up to 12 fractional bits:
// floor(0.5 + a * 4096).
const A1: i32 = 2896; // sqrt(1/2)
const A2: i32 = 2217; // sqrt(2) * cos(3*pi/8)
const A3: i32 = A1;
const A4: i32 = 5352; // sqrt(2) * cos(pi/8)
const A5: i32 = 1567; // cos(3*pi/8)

/// Level-shift a block of unsigned 8-bit samples for the transform
/// (subtract 128).
pub fn level_shift(pixels: &[u8; DCTSIZE2]) -> [i16; DCTSIZE2] {
    let mut output = [0i16; DCTSIZE2];
    for i in 0..DCTSIZE2 {
        output[i] = pixels[i] as i16 - 128;
    }
    output
}

/// One 8-point AAN pass.
///
/// The butterfly's internal output slots are un-swizzled to natural
/// frequency order (slot -> frequency: 0->0, 1->4, 2->2, 3->6, 4->5,
/// 5->1, 6->7, 7->3) before the rounding shift.
fn fdct_1d(i: &[i32; DCTSIZE]) -> [i32; DCTSIZE] {
    // Stage 0a: even/odd split
    let b0 = i[0] + i[7];
    let b1 = i[1] + i[6];
    let b2 = i[2] + i[5];
    let b3 = i[3] + i[4];
    let b4 = -i[4] + i[3];
    let b5 = -i[5] + i[2];
    let b6 = -i[6] + i[1];
    let b7 = -i[7] + i[0];

    // Stage 0b
    let c0 = b0 + b3;
    let c1 = b1 + b2;
    let c2 = -b2 + b1;
    let c3 = -b3 + b0;
    let c4 = -b4 - b5;
    let c5 = b5 + b6;
    let c6 = b6 + b7;
    let c7 = b7;

    // Stages 1 + 2: the only multiplies in the network. Paths without a
    // multiplier are shifted up so everything carries the 2^12 scale.
    let d0 = (c0 + c1) << FRAC_BITS;
    let d1 = (-c1 + c0) << FRAC_BITS;
    let d2 = (c2 + c3) * A1;
    let d3 = c3 << FRAC_BITS;
    let d4 = -c4 * A2;
    let d5 = c5 * A3;
    let d6 = c6 * A4;
    let d7 = c7 << FRAC_BITS;
    let d8 = (c4 + c6) * A5;

    // Stage 3a
    let e0 = d0;
    let e1 = d1;
    let e2 = d2;
    let e3 = d3;
    let e4 = d4 - d8;
    let e5 = d5 + d7;
    let e6 = d6 - d8;
    let e7 = d7 - d5;

    // Stage 3b
    let g0 = e0;
    let g1 = e1;
    let g2 = e2 + e3;
    let g3 = e3 - e2;
    let g4 = e4 + e7;
    let g5 = e5 + e6;
    let g6 = -e6 + e5;
    let g7 = e7 - e4;

    // Un-swizzle to natural frequency order, then round. The arithmetic
    // right shift is exactly floor((x + 2048) / 4096), which is the
    // hardware's rounding (floor of the half-adjusted value, not a
    // symmetric round).
    let mut o = [0i32; DCTSIZE];
    o[0] = g0;
    o[4] = g1;
    o[2] = g2;
    o[6] = g3;
    o[5] = g4;
    o[1] = g5;
    o[7] = g6;
    o[3] = g7;
    for v in o.iter_mut() {
        *v = (*v + HALF) >> FRAC_BITS;
    }
    o
}

/// Forward 8x8 DCT on a level-shifted sample block.
///
/// Applies the 1-D AAN pass to each row, then to each column of the row
/// result. Output coefficients are in natural (row, column) frequency
/// order at unscaled AAN gain.
pub fn forward_dct_8x8(block: &[i16; DCTSIZE2]) -> [i32; DCTSIZE2] {
    // Row passes
    let mut rows = [[0i32; DCTSIZE]; DCTSIZE];
    for r in 0..DCTSIZE {
        let mut row = [0i32; DCTSIZE];
        for c in 0..DCTSIZE {
            row[c] = block[r * DCTSIZE + c] as i32;
        }
        rows[r] = fdct_1d(&row);
    }

    // Column passes on the transposed row result
    let mut output = [0i32; DCTSIZE2];
    for c in 0..DCTSIZE {
        let mut col = [0i32; DCTSIZE];
        for r in 0..DCTSIZE {
            col[r] = rows[r][c];
        }
        let col = fdct_1d(&col);
        for r in 0..DCTSIZE {
            output[r * DCTSIZE + c] = col[r];
        }
    }
    output
}
