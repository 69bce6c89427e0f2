//! Fixed lookup tables for the texture codec
//!
//! The literal tables in this module describe the bitstream and must be kept
//! exactly as written: a single changed entry desynchronises every tile that
//! follows. The segmented control table and the dequantisation multipliers
//! are derived from them once, on first use.
//!
//! The DC size prefixes and the run/level alphabet follow the MPEG-1 intra
//! code layout (ISO/IEC 11172-2 tables B.12 and B.14), including the `10`
//! end code and the `000001` escape.

use crate::common::{FIXED_SHIFT, TILE_AREA};
use once_cell::sync::Lazy;

/// DC delta jump table, indexed by the next 8 bits of the stream.
///
/// Each entry packs `skip_bits << 4 | value_bits`: the prefix length to skip
/// and the width of the biased signed delta that follows it.
pub static DC_JUMP: [u8; 256] = [
    0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21,
    0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21,
    0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21,
    0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21, 0x21,
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22,
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22,
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22,
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22,
    0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30,
    0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30,
    0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33,
    0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33,
    0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34,
    0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34, 0x34,
    0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45, 0x45,
    0x56, 0x56, 0x56, 0x56, 0x56, 0x56, 0x56, 0x56, 0x67, 0x67, 0x67, 0x67, 0x78, 0x78, 0x89, 0x8A,
];

/// Prefix length stored in the high nibble of a [`DC_JUMP`] entry
pub fn dc_skip_bits(entry: u8) -> u32 {
    (entry >> 4) as u32
}

/// Delta width stored in the low nibble of a [`DC_JUMP`] entry
pub fn dc_value_bits(entry: u8) -> u32 {
    (entry & 0x0F) as u32
}

/// One run/level code of the coefficient alphabet, without its sign bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlcCode {
    /// Code bits, right-aligned
    pub bits: u32,
    /// Code length in bits
    pub len: u8,
    /// Zero coefficients skipped before this one
    pub run: u8,
    /// Absolute coefficient level
    pub level: u8,
}

impl VlcCode {
    const fn new(bits: u32, len: u8, run: u8, level: u8) -> Self {
        Self {
            bits,
            len,
            run,
            level,
        }
    }
}

/// End-of-block code and its length
pub const END_CODE: (u32, u8) = (0b10, 2);

/// Escape code and its length; followed by a 14-bit run/level literal
pub const ESCAPE_CODE: (u32, u8) = (0b000001, 6);

/// Width of the run/level literal following an escape
pub const ESCAPE_LITERAL_BITS: u32 = 14;

/// Width of the extension byte read when the escape level byte is 0x00 or 0x80
pub const ESCAPE_EXTENSION_BITS: u32 = 8;

/// Bits of lookahead used to index the control table (longest code plus sign)
pub const LOOKAHEAD_BITS: u32 = 17;

/// Coefficient codes, sign bit excluded. A trailing `0` sign bit means a
/// positive level, `1` a negative one.
pub static AC_CODES: [VlcCode; 111] = [
    VlcCode::new(0b11, 2, 0, 1),
    VlcCode::new(0b011, 3, 1, 1),
    VlcCode::new(0b0100, 4, 0, 2),
    VlcCode::new(0b0101, 4, 2, 1),
    VlcCode::new(0b00101, 5, 0, 3),
    VlcCode::new(0b00111, 5, 3, 1),
    VlcCode::new(0b00110, 5, 4, 1),
    VlcCode::new(0b000110, 6, 1, 2),
    VlcCode::new(0b000111, 6, 5, 1),
    VlcCode::new(0b000101, 6, 6, 1),
    VlcCode::new(0b000100, 6, 7, 1),
    VlcCode::new(0b0000110, 7, 0, 4),
    VlcCode::new(0b0000100, 7, 2, 2),
    VlcCode::new(0b0000111, 7, 8, 1),
    VlcCode::new(0b0000101, 7, 9, 1),
    VlcCode::new(0b00100110, 8, 0, 5),
    VlcCode::new(0b00100001, 8, 0, 6),
    VlcCode::new(0b00100101, 8, 1, 3),
    VlcCode::new(0b00100100, 8, 3, 2),
    VlcCode::new(0b00100111, 8, 10, 1),
    VlcCode::new(0b00100011, 8, 11, 1),
    VlcCode::new(0b00100010, 8, 12, 1),
    VlcCode::new(0b00100000, 8, 13, 1),
    VlcCode::new(0b0000001010, 10, 0, 7),
    VlcCode::new(0b0000001100, 10, 1, 4),
    VlcCode::new(0b0000001011, 10, 2, 3),
    VlcCode::new(0b0000001111, 10, 4, 2),
    VlcCode::new(0b0000001001, 10, 5, 2),
    VlcCode::new(0b0000001110, 10, 14, 1),
    VlcCode::new(0b0000001101, 10, 15, 1),
    VlcCode::new(0b0000001000, 10, 16, 1),
    VlcCode::new(0b000000011101, 12, 0, 8),
    VlcCode::new(0b000000011000, 12, 0, 9),
    VlcCode::new(0b000000010011, 12, 0, 10),
    VlcCode::new(0b000000010000, 12, 0, 11),
    VlcCode::new(0b000000011011, 12, 1, 5),
    VlcCode::new(0b000000010100, 12, 2, 4),
    VlcCode::new(0b000000011100, 12, 3, 3),
    VlcCode::new(0b000000010010, 12, 4, 3),
    VlcCode::new(0b000000011110, 12, 6, 2),
    VlcCode::new(0b000000010101, 12, 7, 2),
    VlcCode::new(0b000000010001, 12, 8, 2),
    VlcCode::new(0b000000011111, 12, 17, 1),
    VlcCode::new(0b000000011010, 12, 18, 1),
    VlcCode::new(0b000000011001, 12, 19, 1),
    VlcCode::new(0b000000010111, 12, 20, 1),
    VlcCode::new(0b000000010110, 12, 21, 1),
    VlcCode::new(0b0000000011010, 13, 0, 12),
    VlcCode::new(0b0000000011001, 13, 0, 13),
    VlcCode::new(0b0000000011000, 13, 0, 14),
    VlcCode::new(0b0000000010111, 13, 0, 15),
    VlcCode::new(0b0000000010110, 13, 1, 6),
    VlcCode::new(0b0000000010101, 13, 1, 7),
    VlcCode::new(0b0000000010100, 13, 2, 5),
    VlcCode::new(0b0000000010011, 13, 3, 4),
    VlcCode::new(0b0000000010010, 13, 5, 3),
    VlcCode::new(0b0000000010001, 13, 9, 2),
    VlcCode::new(0b0000000010000, 13, 10, 2),
    VlcCode::new(0b0000000011111, 13, 22, 1),
    VlcCode::new(0b0000000011110, 13, 23, 1),
    VlcCode::new(0b0000000011101, 13, 24, 1),
    VlcCode::new(0b0000000011100, 13, 25, 1),
    VlcCode::new(0b0000000011011, 13, 26, 1),
    VlcCode::new(0b00000000011111, 14, 0, 16),
    VlcCode::new(0b00000000011110, 14, 0, 17),
    VlcCode::new(0b00000000011101, 14, 0, 18),
    VlcCode::new(0b00000000011100, 14, 0, 19),
    VlcCode::new(0b00000000011011, 14, 0, 20),
    VlcCode::new(0b00000000011010, 14, 0, 21),
    VlcCode::new(0b00000000011001, 14, 0, 22),
    VlcCode::new(0b00000000011000, 14, 0, 23),
    VlcCode::new(0b00000000010111, 14, 0, 24),
    VlcCode::new(0b00000000010110, 14, 0, 25),
    VlcCode::new(0b00000000010101, 14, 0, 26),
    VlcCode::new(0b00000000010100, 14, 0, 27),
    VlcCode::new(0b00000000010011, 14, 0, 28),
    VlcCode::new(0b00000000010010, 14, 0, 29),
    VlcCode::new(0b00000000010001, 14, 0, 30),
    VlcCode::new(0b00000000010000, 14, 0, 31),
    VlcCode::new(0b000000000011000, 15, 0, 32),
    VlcCode::new(0b000000000010111, 15, 0, 33),
    VlcCode::new(0b000000000010110, 15, 0, 34),
    VlcCode::new(0b000000000010101, 15, 0, 35),
    VlcCode::new(0b000000000010100, 15, 0, 36),
    VlcCode::new(0b000000000010011, 15, 0, 37),
    VlcCode::new(0b000000000010010, 15, 0, 38),
    VlcCode::new(0b000000000010001, 15, 0, 39),
    VlcCode::new(0b000000000010000, 15, 0, 40),
    VlcCode::new(0b000000000011111, 15, 1, 8),
    VlcCode::new(0b000000000011110, 15, 1, 9),
    VlcCode::new(0b000000000011101, 15, 1, 10),
    VlcCode::new(0b000000000011100, 15, 1, 11),
    VlcCode::new(0b000000000011011, 15, 1, 12),
    VlcCode::new(0b000000000011010, 15, 1, 13),
    VlcCode::new(0b000000000011001, 15, 1, 14),
    VlcCode::new(0b0000000000010011, 16, 1, 15),
    VlcCode::new(0b0000000000010010, 16, 1, 16),
    VlcCode::new(0b0000000000010001, 16, 1, 17),
    VlcCode::new(0b0000000000010000, 16, 1, 18),
    VlcCode::new(0b0000000000010100, 16, 6, 3),
    VlcCode::new(0b0000000000011010, 16, 11, 2),
    VlcCode::new(0b0000000000011001, 16, 12, 2),
    VlcCode::new(0b0000000000011000, 16, 13, 2),
    VlcCode::new(0b0000000000010111, 16, 14, 2),
    VlcCode::new(0b0000000000010110, 16, 15, 2),
    VlcCode::new(0b0000000000010101, 16, 16, 2),
    VlcCode::new(0b0000000000011111, 16, 27, 1),
    VlcCode::new(0b0000000000011110, 16, 28, 1),
    VlcCode::new(0b0000000000011101, 16, 29, 1),
    VlcCode::new(0b0000000000011100, 16, 30, 1),
    VlcCode::new(0b0000000000011011, 16, 31, 1),
];

/// Decoded meaning of a control table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// No code matches this lookahead
    Invalid,
    /// No further coefficients in this block
    End,
    /// Run and level follow as a literal
    Escape,
    /// Inline coefficient; `len` includes the sign bit
    Coefficient {
        /// Zero coefficients skipped before this one
        run: u8,
        /// Signed level
        level: i16,
        /// Bits consumed by the code
        len: u8,
    },
}

/// A window of the control table selected by a lookahead threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Smallest lookahead handled by this segment
    pub threshold: u32,
    /// Right shift applied to the lookahead before indexing
    pub shift: u32,
    /// Lowest shifted lookahead value in the segment
    pub base: u32,
    /// First slot of the segment in [`CONTROL`]
    pub offset: usize,
}

impl Segment {
    const fn new(threshold: u32, shift: u32, offset: usize) -> Self {
        Self {
            threshold,
            shift,
            base: threshold >> shift,
            offset,
        }
    }

    /// Control table slot for a lookahead inside this segment
    pub fn slot(&self, lookahead: u32) -> usize {
        self.offset + ((lookahead >> self.shift) - self.base) as usize
    }
}

/// Graduated lookahead thresholds, longest-prefix codes last
pub static SEGMENTS: [Segment; 8] = [
    Segment::new(0x8000, 12, 0),
    Segment::new(0x0800, 8, 24),
    Segment::new(0x0400, 6, 144),
    Segment::new(0x0200, 4, 160),
    Segment::new(0x0100, 3, 192),
    Segment::new(0x0080, 2, 224),
    Segment::new(0x0040, 1, 256),
    Segment::new(0x0020, 0, 288),
];

/// Total number of control table slots
pub const CONTROL_LEN: usize = 320;

/// Segmented control table built from [`AC_CODES`]
pub static CONTROL: Lazy<[Control; CONTROL_LEN]> = Lazy::new(build_control_table);

/// Segment handling a 17-bit lookahead, if any
pub fn segment_for(lookahead: u32) -> Option<&'static Segment> {
    SEGMENTS.iter().find(|segment| lookahead >= segment.threshold)
}

/// Resolve a 17-bit lookahead to its control entry
pub fn lookup(lookahead: u32) -> Control {
    match segment_for(lookahead) {
        Some(segment) => CONTROL[segment.slot(lookahead)],
        None => Control::Invalid,
    }
}

fn build_control_table() -> [Control; CONTROL_LEN] {
    let mut table = [Control::Invalid; CONTROL_LEN];

    place(&mut table, END_CODE.0, END_CODE.1, Control::End);
    place(&mut table, ESCAPE_CODE.0, ESCAPE_CODE.1, Control::Escape);

    for code in AC_CODES.iter() {
        for negative in [false, true] {
            let len = code.len + 1;
            let level = if negative {
                -(code.level as i16)
            } else {
                code.level as i16
            };
            place(
                &mut table,
                (code.bits << 1) | negative as u32,
                len,
                Control::Coefficient {
                    run: code.run,
                    level,
                    len,
                },
            );
        }
    }

    table
}

/// Fill every slot whose lookahead starts with `bits`
fn place(table: &mut [Control; CONTROL_LEN], bits: u32, len: u8, entry: Control) {
    let aligned = bits << (LOOKAHEAD_BITS - len as u32);
    let Some(segment) = segment_for(aligned) else {
        debug_assert!(false, "code {bits:#b} below every segment");
        return;
    };
    debug_assert!(len as u32 + segment.shift <= LOOKAHEAD_BITS);

    let first = segment.slot(aligned);
    let span = 1usize << (LOOKAHEAD_BITS - segment.shift - len as u32);
    for slot in &mut table[first..first + span] {
        *slot = entry;
    }
}

/// Raster position of each zig-zag scan index
pub static ZIGZAG: [u8; TILE_AREA] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Quantiser step per raster position. Position 0 is the DC step, which
/// makes the DC multiplier exactly `1 << FIXED_SHIFT`.
pub static QUANT_MATRIX: [u8; TILE_AREA] = [
    8, 16, 19, 22, 26, 27, 29, 34, //
    16, 16, 22, 24, 27, 29, 34, 37, //
    19, 22, 26, 27, 29, 34, 34, 38, //
    22, 22, 26, 27, 29, 34, 37, 40, //
    22, 26, 27, 29, 32, 35, 40, 48, //
    26, 27, 29, 32, 35, 40, 48, 58, //
    26, 27, 29, 34, 38, 46, 56, 69, //
    27, 29, 35, 38, 46, 56, 69, 83, //
];

/// Per-position coefficient multipliers in 16.16 fixed point.
///
/// Folds the quantiser step, the row and column butterfly prescale and the
/// 1/8 normalisation of the two transform passes into one factor.
pub static MULTIPLIER: Lazy<[i32; TILE_AREA]> = Lazy::new(|| {
    let prescale = |k: usize| {
        if k == 0 {
            1.0
        } else {
            (k as f64 * std::f64::consts::PI / 16.0).cos() * std::f64::consts::SQRT_2
        }
    };
    let unit = (1u32 << FIXED_SHIFT) as f64 / 8.0;

    let mut table = [0i32; TILE_AREA];
    for (pos, multiplier) in table.iter_mut().enumerate() {
        let (row, col) = (pos / 8, pos % 8);
        *multiplier =
            (QUANT_MATRIX[pos] as f64 * prescale(row) * prescale(col) * unit).round() as i32;
    }
    table
});
