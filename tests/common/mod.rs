//! Common test utilities.
//!
//! A minimal sequential entropy producer. The runtime scan encoder lives
//! outside this crate, so integration tests that need a decodable container
//! bring their own: MSB-first bit packing with 0xFF byte stuffing, DC
//! difference coding, and run-length AC coding against the built code
//! tables.

use femtojpeg::{ac_symbol, CodeTable, DCTSIZE2, ZRL};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// MSB-first bit packer with JPEG byte stuffing (0x00 after every emitted
/// 0xFF).
pub struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    nbits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            acc: 0,
            nbits: 0,
        }
    }

    pub fn put(&mut self, code: u16, length: u8) {
        assert!(length >= 1 && length <= 16);
        self.acc = (self.acc << length) | u32::from(code);
        self.nbits += u32::from(length);
        while self.nbits >= 8 {
            let byte = (self.acc >> (self.nbits - 8)) as u8;
            self.out.push(byte);
            if byte == 0xFF {
                self.out.push(0x00);
            }
            self.nbits -= 8;
        }
    }

    /// Pad the final partial byte with 1 bits and return the stuffed stream.
    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            self.acc = (self.acc << pad) | ((1 << pad) - 1);
            let byte = (self.acc & 0xFF) as u8;
            self.out.push(byte);
            if byte == 0xFF {
                self.out.push(0x00);
            }
        }
        self.out
    }
}

/// Magnitude category: number of bits needed for |v|.
fn category(v: i16) -> u8 {
    (16 - v.unsigned_abs().leading_zeros()) as u8
}

/// Low `cat` bits of the magnitude, one's complement for negative values.
fn value_bits(v: i16, cat: u8) -> u16 {
    if v >= 0 {
        v as u16
    } else {
        (i32::from(v) + (1i32 << cat) - 1) as u16
    }
}

/// Entropy-code one quantized block (zig-zag order). Returns the block's DC
/// for the next block's difference.
pub fn encode_block(
    bw: &mut BitWriter,
    zz: &[i16; DCTSIZE2],
    prev_dc: i16,
    dc_table: &CodeTable,
    ac_table: &CodeTable,
) -> i16 {
    let diff = zz[0] - prev_dc;
    let cat = category(diff);
    let code = dc_table.code(cat).unwrap();
    bw.put(code.code, code.length);
    if cat > 0 {
        bw.put(value_bits(diff, cat), cat);
    }

    let mut run = 0u8;
    for &coeff in &zz[1..] {
        if coeff == 0 {
            run += 1;
            continue;
        }
        while run >= 16 {
            let zrl = ac_table.code(ZRL).unwrap();
            bw.put(zrl.code, zrl.length);
            run -= 16;
        }
        let cat = category(coeff);
        let code = ac_table.code(ac_symbol(run, cat)).unwrap();
        bw.put(code.code, code.length);
        bw.put(value_bits(coeff, cat), cat);
        run = 0;
    }
    if run > 0 {
        let eob = ac_table.code(femtojpeg::EOB).unwrap();
        bw.put(eob.code, eob.length);
    }
    zz[0]
}
