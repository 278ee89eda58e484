//! Canonical Huffman table construction.
//!
//! Baseline encoding uses four table identities: {luma, chroma} x {DC, AC}.
//! Each is specified as cumulative per-length symbol counts (`offsets`) plus
//! the symbols in length order; the code values themselves are never
//! transmitted. Both this encoder and any conforming decoder regenerate
//! identical codes by the same length-first assignment.

use std::borrow::Cow;

use log::debug;

use crate::consts::{
    AC_CHROMA_OFFSETS, AC_CHROMA_SYMBOLS, AC_LUMA_OFFSETS, AC_LUMA_SYMBOLS, DC_CHROMA_OFFSETS,
    DC_CHROMA_SYMBOLS, DC_LUMA_OFFSETS, DC_LUMA_SYMBOLS,
};
use crate::error::{Error, Result};
use crate::quant::ComponentClass;

/// Maximum code length allowed by baseline encoding (16 bits)
pub const MAX_CODE_LENGTH: usize = 16;

/// AC end-of-block symbol (run 0, category 0)
pub const EOB: u8 = 0x00;

/// AC sixteen-zero-run symbol (run 15, category 0)
pub const ZRL: u8 = 0xF0;

/// Pack an AC zero-run length and magnitude category into one symbol.
#[inline]
pub fn ac_symbol(run: u8, category: u8) -> u8 {
    run << 4 | category
}

/// Table class nibble written into the table segment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClass {
    /// DC magnitude-category table
    Dc,
    /// AC run/category table
    Ac,
}

/// A code table in its transmitted form: cumulative symbol counts per code
/// length and the symbols in length order.
#[derive(Debug, Clone)]
pub struct CodeTableSpec {
    /// `offsets[L]` is the number of symbols with code length <= L;
    /// `offsets[0]` is 0 and `offsets[16]` the total symbol count.
    pub offsets: [u16; MAX_CODE_LENGTH + 1],
    /// Symbols ordered by increasing code length; borrowed for the built-in
    /// layouts, owned when reconstructed from a parsed table segment
    pub symbols: Cow<'static, [u8]>,
}

impl CodeTableSpec {
    /// Standard table spec for a class/component identity.
    pub fn standard(class: TableClass, component: ComponentClass) -> Self {
        let (offsets, symbols): (_, &'static [u8]) = match (class, component) {
            (TableClass::Dc, ComponentClass::Luma) => (DC_LUMA_OFFSETS, &DC_LUMA_SYMBOLS),
            (TableClass::Dc, ComponentClass::Chroma) => (DC_CHROMA_OFFSETS, &DC_CHROMA_SYMBOLS),
            (TableClass::Ac, ComponentClass::Luma) => (AC_LUMA_OFFSETS, &AC_LUMA_SYMBOLS),
            (TableClass::Ac, ComponentClass::Chroma) => (AC_CHROMA_OFFSETS, &AC_CHROMA_SYMBOLS),
        };
        Self {
            offsets,
            symbols: Cow::Borrowed(symbols),
        }
    }

    /// Number of symbols with code length exactly `length`.
    #[inline]
    pub fn count_for_length(&self, length: usize) -> u16 {
        self.offsets[length] - self.offsets[length - 1]
    }

    /// Total symbol count.
    #[inline]
    pub fn total_symbols(&self) -> usize {
        self.offsets[MAX_CODE_LENGTH] as usize
    }

    /// Reject specs a conforming decoder could not reconstruct codes from.
    pub fn validate(&self) -> Result<()> {
        if self.offsets[0] != 0 {
            return Err(Error::MalformedCodeSpec("offsets must start at zero"));
        }
        for l in 1..=MAX_CODE_LENGTH {
            if self.offsets[l] < self.offsets[l - 1] {
                return Err(Error::MalformedCodeSpec("offsets must be non-decreasing"));
            }
        }
        if self.total_symbols() > 256 {
            return Err(Error::MalformedCodeSpec("more than 256 symbols"));
        }
        if self.total_symbols() != self.symbols.len() {
            return Err(Error::MalformedCodeSpec(
                "symbol list length disagrees with offsets",
            ));
        }
        // Over-subscription: after assigning all codes of length L the
        // running code value must still fit in L bits.
        let mut code = 0u32;
        for l in 1..=MAX_CODE_LENGTH {
            code += u32::from(self.count_for_length(l));
            if code > 1 << l {
                return Err(Error::MalformedCodeSpec("over-subscribed code lengths"));
            }
            code <<= 1;
        }
        Ok(())
    }
}

/// Canonical code for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalCode {
    /// Code value, right-aligned
    pub code: u16,
    /// Code length in bits (1..=16)
    pub length: u8,
}

/// A built code table: canonical codes addressable by symbol value.
///
/// Built once per table identity at encoder initialization and immutable
/// afterward; the entropy producer and the table-segment writer both read
/// it without synchronization.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Option<CanonicalCode>; 256],
    spec: CodeTableSpec,
}

impl CodeTable {
    /// Run the canonical assignment over a validated spec.
    ///
    /// The running code value starts at 0; symbols of each length receive
    /// consecutive values, and the running value shifts left one bit per
    /// length step.
    pub fn build(spec: CodeTableSpec) -> Result<Self> {
        spec.validate()?;

        let mut codes = [None; 256];
        // u32 so the shift after the last length cannot overflow; validate()
        // already guarantees every assigned value fits in its length.
        let mut code = 0u32;
        for l in 1..=MAX_CODE_LENGTH {
            for j in spec.offsets[l - 1]..spec.offsets[l] {
                let symbol = spec.symbols[j as usize];
                if codes[symbol as usize].is_some() {
                    return Err(Error::MalformedCodeSpec("duplicate symbol"));
                }
                codes[symbol as usize] = Some(CanonicalCode {
                    code: code as u16,
                    length: l as u8,
                });
                code += 1;
            }
            code <<= 1;
        }
        debug!(
            "built canonical code table: {} symbols",
            spec.total_symbols()
        );
        Ok(Self { codes, spec })
    }

    /// Canonical code for a symbol, or `None` if the table does not define
    /// one.
    #[inline]
    pub fn code(&self, symbol: u8) -> Option<CanonicalCode> {
        self.codes[symbol as usize]
    }

    /// The transmitted spec this table was built from.
    pub fn spec(&self) -> &CodeTableSpec {
        &self.spec
    }

    /// Codes in assignment (length, then spec) order, paired with their
    /// symbols.
    pub fn iter(&self) -> impl Iterator<Item = (u8, CanonicalCode)> + '_ {
        self.spec.symbols.iter().map(move |&s| {
            // Every spec symbol was assigned during build.
            (s, self.codes[s as usize].unwrap())
        })
    }
}

/// The four built code tables used by one encoding session.
#[derive(Debug, Clone)]
pub struct CodeTableSet {
    pub dc_luma: CodeTable,
    pub dc_chroma: CodeTable,
    pub ac_luma: CodeTable,
    pub ac_chroma: CodeTable,
}

impl CodeTableSet {
    /// Build all four standard tables.
    pub fn standard() -> Result<Self> {
        Ok(Self {
            dc_luma: CodeTable::build(CodeTableSpec::standard(
                TableClass::Dc,
                ComponentClass::Luma,
            ))?,
            dc_chroma: CodeTable::build(CodeTableSpec::standard(
                TableClass::Dc,
                ComponentClass::Chroma,
            ))?,
            ac_luma: CodeTable::build(CodeTableSpec::standard(
                TableClass::Ac,
                ComponentClass::Luma,
            ))?,
            ac_chroma: CodeTable::build(CodeTableSpec::standard(
                TableClass::Ac,
                ComponentClass::Chroma,
            ))?,
        })
    }

    /// Table for a class/component identity.
    pub fn table(&self, class: TableClass, component: ComponentClass) -> &CodeTable {
        match (class, component) {
            (TableClass::Dc, ComponentClass::Luma) => &self.dc_luma,
            (TableClass::Dc, ComponentClass::Chroma) => &self.dc_chroma,
            (TableClass::Ac, ComponentClass::Luma) => &self.ac_luma,
            (TableClass::Ac, ComponentClass::Chroma) => &self.ac_chroma,
        }
    }
}
