//! # femtojpeg - Fixed-Point Baseline JPEG Core
//!
//! femtojpeg is the image-compression core of a low-power capture pipeline:
//! it turns 8x8 blocks of sensor samples into quantized coefficients and
//! wraps an externally produced entropy stream in a standards-compliant
//! baseline JPEG container. The arithmetic is bit-exact with the hardware
//! encoder it models, so every intermediate stage can be validated against
//! silicon output.
//!
//! ## Pipeline
//!
//! - **Forward transform** ([`forward_dct_8x8`]): AAN fast DCT at 12-bit
//!   fixed-point precision, output at unscaled butterfly gain
//! - **Quantization** ([`Quantizer`], [`quantize`]): one multiplier per
//!   position folding the transform gain and the quantization step together,
//!   round-half-even, zig-zag reorder
//! - **Huffman tables** ([`CodeTable`]): canonical code assignment from the
//!   baseline (offsets, symbols) table layouts
//! - **Container** ([`write_container`]): byte-exact segment assembly around
//!   the opaque entropy payload
//!
//! The [`verify`] module carries a floating-point orthonormal DCT and PSNR
//! comparison for host-side validation; it is not on the encode path.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use femtojpeg::{forward_dct_8x8, level_shift, quantize, AanScale, ComponentClass,
//!     QuantPreset, QuantTableSet, Quantizer};
//!
//! let tables = QuantTableSet::for_preset(QuantPreset::Medium);
//! let quantizer = Quantizer::new(&AanScale::new(), &tables.luma)?;
//! let coeffs = quantize(&forward_dct_8x8(&level_shift(&block)), &quantizer);
//! ```

mod consts;
mod error;

// Encoding pipeline
mod container;
mod dct;
mod huffman;
mod quant;

// Host-side validation
pub mod verify;

// Public API
pub use container::{write_container, CodeSpecSet};
pub use dct::{forward_dct_8x8, level_shift, FRAC_BITS};
pub use error::{Error, Result};
pub use huffman::{
    ac_symbol, CanonicalCode, CodeTable, CodeTableSet, CodeTableSpec, TableClass, EOB,
    MAX_CODE_LENGTH, ZRL,
};
pub use quant::{
    quantize, AanScale, ComponentClass, QuantPreset, QuantTable, QuantTableSet, Quantizer,
    QUANT_FRAC_BITS,
};

pub use consts::{ZIGZAG, DCTSIZE, DCTSIZE2};
