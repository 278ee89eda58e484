//! Baseline JPEG container assembly.
//!
//! Emits the fixed segment sequence around an externally produced
//! entropy-coded payload: SOI, APP0, DQT x2, SOF0, DHT x4, SOS, payload,
//! EOI. Every multi-byte field is big-endian and every variable-length
//! segment is preceded by a length that counts itself plus its payload
//! (not the marker). All validation happens before the first byte is
//! written; a failed call never yields a partial container.

use byteorder::{BigEndian, WriteBytesExt};
use log::debug;

use crate::consts::{marker, DCTSIZE2};
use crate::error::{Error, Result};
use crate::huffman::{CodeTableSpec, TableClass, MAX_CODE_LENGTH};
use crate::quant::{ComponentClass, QuantTable, QuantTableSet};

/// Upper bound on total container size, so downstream transports can
/// address any byte with a 32-bit offset.
const MAX_CONTAINER_BYTES: usize = u32::MAX as usize;

/// Header/trailer overhead around the entropy payload: SOI + APP0 + 2xDQT
/// + SOF0 + 4xDHT + SOS + EOI for the standard tables.
const SEGMENT_OVERHEAD: usize = 2 + 18 + 2 * 69 + 19 + 2 * (2 + 19 + 12) + 2 * (2 + 19 + 162) + 14 + 2;

/// Longest entropy payload that still fits under [`MAX_CONTAINER_BYTES`].
const MAX_PAYLOAD_BYTES: usize = MAX_CONTAINER_BYTES - SEGMENT_OVERHEAD;

/// The four code table specs written into the container, in segment order.
pub struct CodeSpecSet {
    pub dc_luma: CodeTableSpec,
    pub dc_chroma: CodeTableSpec,
    pub ac_luma: CodeTableSpec,
    pub ac_chroma: CodeTableSpec,
}

impl CodeSpecSet {
    /// The standard baseline table layouts.
    pub fn standard() -> Self {
        Self {
            dc_luma: CodeTableSpec::standard(TableClass::Dc, ComponentClass::Luma),
            dc_chroma: CodeTableSpec::standard(TableClass::Dc, ComponentClass::Chroma),
            ac_luma: CodeTableSpec::standard(TableClass::Ac, ComponentClass::Luma),
            ac_chroma: CodeTableSpec::standard(TableClass::Ac, ComponentClass::Chroma),
        }
    }
}

/// Assemble a complete baseline 4:2:0 container around an entropy payload.
///
/// The payload is copied verbatim with no reinterpretation; producing it
/// (including byte stuffing) is the entropy stage's responsibility.
pub fn write_container(
    width: usize,
    height: usize,
    quant_tables: &QuantTableSet,
    code_specs: &CodeSpecSet,
    entropy_payload: &[u8],
) -> Result<Vec<u8>> {
    validate_dimensions(width, height)?;
    validate_quant_table(&quant_tables.luma)?;
    validate_quant_table(&quant_tables.chroma)?;
    code_specs.dc_luma.validate()?;
    code_specs.dc_chroma.validate()?;
    code_specs.ac_luma.validate()?;
    code_specs.ac_chroma.validate()?;
    validate_payload_length(entropy_payload.len())?;

    let mut out = Vec::with_capacity(SEGMENT_OVERHEAD + entropy_payload.len());

    write_marker(&mut out, marker::SOI);
    write_app0(&mut out);
    write_dqt(&mut out, &quant_tables.luma);
    write_dqt(&mut out, &quant_tables.chroma);
    write_sof0(&mut out, width as u16, height as u16);
    write_dht(&mut out, TableClass::Dc, 0, &code_specs.dc_luma);
    write_dht(&mut out, TableClass::Dc, 1, &code_specs.dc_chroma);
    write_dht(&mut out, TableClass::Ac, 0, &code_specs.ac_luma);
    write_dht(&mut out, TableClass::Ac, 1, &code_specs.ac_chroma);
    write_sos(&mut out);
    out.extend_from_slice(entropy_payload);
    write_marker(&mut out, marker::EOI);

    debug!(
        "assembled {}x{} container: {} header bytes, {} payload bytes",
        width,
        height,
        out.len() - entropy_payload.len(),
        entropy_payload.len()
    );
    Ok(out)
}

fn validate_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions {
            width,
            height,
            reason: "width and height must be non-zero",
        });
    }
    // 4:2:0 chroma planes are half-resolution in both axes.
    if width % 2 != 0 || height % 2 != 0 {
        return Err(Error::InvalidDimensions {
            width,
            height,
            reason: "4:2:0 subsampling requires even width and height",
        });
    }
    if width > u16::MAX as usize || height > u16::MAX as usize {
        return Err(Error::InvalidDimensions {
            width,
            height,
            reason: "dimensions exceed the 16-bit frame header fields",
        });
    }
    Ok(())
}

fn validate_payload_length(length: usize) -> Result<()> {
    if length > MAX_PAYLOAD_BYTES {
        return Err(Error::PayloadTooLarge {
            length,
            max: MAX_PAYLOAD_BYTES,
        });
    }
    Ok(())
}

fn validate_quant_table(table: &QuantTable) -> Result<()> {
    for &q in &table.values {
        if q == 0 || q > 255 {
            return Err(Error::TableOverflow {
                table: "quantization step",
                value: u32::from(q),
                max: 255,
            });
        }
    }
    Ok(())
}

fn write_marker(out: &mut Vec<u8>, code: u8) {
    out.push(0xFF);
    out.push(code);
}

/// APP0: fixed 16-byte JFIF payload, version 1.2, unitless 100x100 pixel
/// aspect, no thumbnail.
fn write_app0(out: &mut Vec<u8>) {
    write_marker(out, marker::APP0);
    out.write_u16::<BigEndian>(16).unwrap();
    out.extend_from_slice(b"JFIF\0");
    out.push(1); // version major
    out.push(2); // version minor
    out.push(0); // density units: none
    out.write_u16::<BigEndian>(100).unwrap();
    out.write_u16::<BigEndian>(100).unwrap();
    out.push(0); // thumbnail width
    out.push(0); // thumbnail height
}

/// DQT: table id byte plus the 64 steps in zig-zag byte order.
fn write_dqt(out: &mut Vec<u8>, table: &QuantTable) {
    write_marker(out, marker::DQT);
    out.write_u16::<BigEndian>(2 + 1 + DCTSIZE2 as u16).unwrap();
    out.push(table.slot);
    for pos in 0..DCTSIZE2 {
        out.push(table.at_zigzag(pos) as u8);
    }
}

/// SOF0: 8-bit precision, dimensions, and the three-component 4:2:0
/// layout (luma 2x2, chroma 1x1).
fn write_sof0(out: &mut Vec<u8>, width: u16, height: u16) {
    write_marker(out, marker::SOF0);
    out.write_u16::<BigEndian>(17).unwrap();
    out.push(8); // sample precision
    out.write_u16::<BigEndian>(height).unwrap();
    out.write_u16::<BigEndian>(width).unwrap();
    out.push(3); // components
    for id in 1..=3u8 {
        out.push(id);
        out.push(if id == 1 { 0x22 } else { 0x11 }); // HxV sampling
        out.push(if id == 1 { 0 } else { 1 }); // quant table selector
    }
}

/// DHT: class/id nibble pair, 16 per-length counts (successive offset
/// differences), then the symbols in length order.
fn write_dht(out: &mut Vec<u8>, class: TableClass, id: u8, spec: &CodeTableSpec) {
    let class_nibble = match class {
        TableClass::Dc => 0u8,
        TableClass::Ac => 1u8,
    };
    write_marker(out, marker::DHT);
    out.write_u16::<BigEndian>(2 + 1 + 16 + spec.total_symbols() as u16)
        .unwrap();
    out.push(class_nibble << 4 | id);
    for l in 1..=MAX_CODE_LENGTH {
        out.push(spec.count_for_length(l) as u8);
    }
    out.extend_from_slice(&spec.symbols);
}

/// SOS: three components with their DC/AC table selectors and the
/// baseline spectral-selection footer.
fn write_sos(out: &mut Vec<u8>) {
    write_marker(out, marker::SOS);
    out.write_u16::<BigEndian>(12).unwrap();
    out.push(3); // components
    for id in 1..=3u8 {
        out.push(id);
        out.push(if id == 1 { 0x00 } else { 0x11 }); // DC/AC selectors
    }
    out.push(0); // spectral selection start
    out.push(63); // spectral selection end
    out.push(0); // successive approximation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quant::QuantPreset;

    fn tables() -> QuantTableSet {
        QuantTableSet::for_preset(QuantPreset::Medium)
    }

    #[test]
    fn test_starts_and_ends_with_markers() {
        let out = write_container(640, 400, &tables(), &CodeSpecSet::standard(), &[0xAB; 7])
            .unwrap();
        assert_eq!(&out[..2], &[0xFF, marker::SOI]);
        assert_eq!(&out[out.len() - 2..], &[0xFF, marker::EOI]);
    }

    #[test]
    fn test_payload_copied_verbatim() {
        let payload = [0x12u8, 0xFF, 0x00, 0x34];
        let out =
            write_container(2, 2, &tables(), &CodeSpecSet::standard(), &payload).unwrap();
        let start = out.len() - 2 - payload.len();
        assert_eq!(&out[start..start + payload.len()], &payload);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let specs = CodeSpecSet::standard();
        for (w, h) in [(0, 2), (2, 0), (3, 2), (2, 3), (70_000, 2), (2, 70_000)] {
            assert!(
                matches!(
                    write_container(w, h, &tables(), &specs, &[]),
                    Err(Error::InvalidDimensions { .. })
                ),
                "{}x{}",
                w,
                h
            );
        }
        // Smallest valid frame.
        assert!(write_container(2, 2, &tables(), &specs, &[]).is_ok());
    }

    #[test]
    fn test_rejects_oversized_quant_step() {
        let mut t = tables();
        t.chroma.values[5] = 256;
        assert!(matches!(
            write_container(2, 2, &t, &CodeSpecSet::standard(), &[]),
            Err(Error::TableOverflow { .. })
        ));
    }

    #[test]
    fn test_payload_length_boundary() {
        // The accepted maximum brings the finished container to exactly
        // u32::MAX bytes; one more byte loses 32-bit addressability.
        assert!(validate_payload_length(0).is_ok());
        assert!(validate_payload_length(MAX_PAYLOAD_BYTES).is_ok());
        assert!(matches!(
            validate_payload_length(MAX_PAYLOAD_BYTES + 1),
            Err(Error::PayloadTooLarge { length, max })
                if length == MAX_PAYLOAD_BYTES + 1 && max == MAX_PAYLOAD_BYTES
        ));
        assert_eq!(MAX_PAYLOAD_BYTES + SEGMENT_OVERHEAD, u32::MAX as usize);
    }

    #[test]
    fn test_header_overhead_constant_matches_reality() {
        let out = write_container(2, 2, &tables(), &CodeSpecSet::standard(), &[]).unwrap();
        assert_eq!(out.len(), SEGMENT_OVERHEAD);
    }

    #[test]
    fn test_dqt_is_zigzag_ordered() {
        let out = write_container(2, 2, &tables(), &CodeSpecSet::standard(), &[]).unwrap();
        // First DQT starts right after SOI + APP0.
        let dqt = 2 + 18;
        assert_eq!(&out[dqt..dqt + 4], &[0xFF, marker::DQT, 0x00, 67]);
        assert_eq!(out[dqt + 4], 0); // luma slot
        let t = tables();
        let steps = &out[dqt + 5..dqt + 5 + 64];
        for pos in 0..64 {
            assert_eq!(steps[pos], t.luma.at_zigzag(pos) as u8, "zigzag {}", pos);
        }
    }
}
