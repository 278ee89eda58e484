//! Transform and quantization accuracy against the floating-point reference.

use femtojpeg::verify::{descale, psnr, reference_dct_8x8};
use femtojpeg::{
    forward_dct_8x8, level_shift, quantize, AanScale, QuantPreset, QuantTableSet, Quantizer,
    DCTSIZE2, ZIGZAG,
};

/// 8x8 luma block from the Wallace JPEG paper.
const WALLACE_BLOCK: [u8; DCTSIZE2] = [
    139, 144, 149, 153, 155, 155, 155, 155, //
    144, 151, 153, 156, 159, 156, 156, 156, //
    150, 155, 160, 163, 158, 156, 156, 156, //
    159, 161, 162, 160, 160, 159, 159, 159, //
    159, 160, 161, 162, 162, 155, 155, 155, //
    161, 161, 161, 161, 160, 157, 157, 157, //
    162, 162, 161, 163, 162, 157, 157, 157, //
    162, 162, 161, 161, 163, 158, 158, 158,
];

#[test]
fn test_fixed_point_transform_tracks_reference() {
    let shifted = level_shift(&WALLACE_BLOCK);
    let fixed = descale(&forward_dct_8x8(&shifted), &AanScale::new());
    let reference = reference_dct_8x8(&shifted);
    let db = psnr(&fixed, &reference);
    assert!(db >= 60.0, "12-bit transform PSNR {:.2} dB below 60 dB", db);
}

#[test]
fn test_wallace_block_quantizes_to_published_values() {
    let tables = QuantTableSet::for_preset(QuantPreset::Medium);
    let quantizer = Quantizer::new(&AanScale::new(), &tables.luma).unwrap();
    let zz = quantize(&forward_dct_8x8(&level_shift(&WALLACE_BLOCK)), &quantizer);

    // Zig-zag stream for the reference block at the 50% tables.
    let expected_prefix = [15i16, 0, -2, -1, -1, -1, 0, 0, -1, -1];
    assert_eq!(&zz[..10], &expected_prefix);
    assert!(zz[10..].iter().all(|&c| c == 0), "unexpected tail coefficients");

    // Same data back in natural order: first row of the coefficient matrix.
    let mut natural = [0i16; DCTSIZE2];
    for (pos, &k) in ZIGZAG.iter().enumerate() {
        natural[k] = zz[pos];
    }
    assert_eq!(&natural[..8], &[15, 0, -1, 0, 0, 0, 0, 0]);
}

#[test]
fn test_transform_accuracy_across_presets() {
    // Quantization error stays under one step at every position, for every
    // preset, relative to exact rational quantization of the descaled
    // transform (half a step of final rounding plus the multiplier's own
    // rounding error scaled by the coefficient).
    let shifted = level_shift(&WALLACE_BLOCK);
    let fixed = forward_dct_8x8(&shifted);
    let scale = AanScale::new();
    let descaled = descale(&fixed, &scale);
    for preset in [
        QuantPreset::VeryLow,
        QuantPreset::Low,
        QuantPreset::Medium,
        QuantPreset::High,
        QuantPreset::VeryHigh,
    ] {
        let tables = QuantTableSet::for_preset(preset);
        let quantizer = Quantizer::new(&scale, &tables.luma).unwrap();
        let zz = quantize(&fixed, &quantizer);
        for (pos, &k) in ZIGZAG.iter().enumerate() {
            let exact = descaled[k] / f64::from(tables.luma.values[k]);
            assert!(
                (f64::from(zz[pos]) - exact).abs() <= 0.75,
                "{:?} position {}: {} vs exact {:.3}",
                preset,
                k,
                zz[pos],
                exact
            );
        }
    }
}
