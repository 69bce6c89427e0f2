//! Inverse block transform
//!
//! A separable two-pass butterfly over 16.16 fixed-point values. The row
//! pass writes into an 8×9 workspace; the column pass reads it back and
//! writes contiguous output rows. Coefficients arrive already multiplied by
//! [`crate::tables::MULTIPLIER`], which carries the butterfly prescale, so a
//! block holding only a DC value `d` comes out as 64 samples equal to `d`.

use crate::common::{TILE_AREA, TILE_SIZE};

/// Row stride of the intermediate workspace
pub const WORKSPACE_STRIDE: usize = TILE_SIZE + 1;

/// Length of the intermediate workspace
pub const WORKSPACE_LEN: usize = TILE_SIZE * WORKSPACE_STRIDE;

// 16.16 rotation constants
const FIX_1_082392200: i64 = 70936;
const FIX_1_414213562: i64 = 92682;
const FIX_1_847759065: i64 = 121095;
const FIX_2_613125930: i64 = 171254;

#[inline]
fn mul_high(value: i64, constant: i64) -> i64 {
    (value * constant) >> 16
}

/// One-dimensional 8-point butterfly
fn butterfly(input: [i64; TILE_SIZE]) -> [i64; TILE_SIZE] {
    // Even part
    let tmp10 = input[0] + input[4];
    let tmp11 = input[0] - input[4];
    let tmp13 = input[2] + input[6];
    let tmp12 = mul_high(input[2] - input[6], FIX_1_414213562) - tmp13;

    let tmp0 = tmp10 + tmp13;
    let tmp3 = tmp10 - tmp13;
    let tmp1 = tmp11 + tmp12;
    let tmp2 = tmp11 - tmp12;

    // Odd part
    let z13 = input[5] + input[3];
    let z10 = input[5] - input[3];
    let z11 = input[1] + input[7];
    let z12 = input[1] - input[7];

    let tmp7 = z11 + z13;
    let tmp11 = mul_high(z11 - z13, FIX_1_414213562);
    let z5 = mul_high(z10 + z12, FIX_1_847759065);
    let tmp10 = mul_high(z12, FIX_1_082392200) - z5;
    let tmp12 = z5 - mul_high(z10, FIX_2_613125930);

    let tmp6 = tmp12 - tmp7;
    let tmp5 = tmp11 - tmp6;
    let tmp4 = tmp10 + tmp5;

    [
        tmp0 + tmp7,
        tmp1 + tmp6,
        tmp2 + tmp5,
        tmp3 - tmp4,
        tmp3 + tmp4,
        tmp2 - tmp5,
        tmp1 - tmp6,
        tmp0 - tmp7,
    ]
}

/// Transform one block of coefficients into spatial samples
///
/// Intermediate and output values wrap to `i32`; only corrupt streams come
/// near that range.
pub fn inverse_transform(
    coefficients: &[i32; TILE_AREA],
    workspace: &mut [i32; WORKSPACE_LEN],
    output: &mut [i32; TILE_AREA],
) {
    for (row, src) in coefficients.chunks_exact(TILE_SIZE).enumerate() {
        let dst = &mut workspace[row * WORKSPACE_STRIDE..row * WORKSPACE_STRIDE + TILE_SIZE];

        if src[1..].iter().all(|&c| c == 0) {
            dst.fill(src[0]);
            continue;
        }

        let samples = butterfly(std::array::from_fn(|i| src[i] as i64));
        for (slot, value) in dst.iter_mut().zip(samples) {
            *slot = value as i32;
        }
    }

    for col in 0..TILE_SIZE {
        let column: [i64; TILE_SIZE] =
            std::array::from_fn(|row| workspace[row * WORKSPACE_STRIDE + col] as i64);
        for (row, value) in butterfly(column).into_iter().enumerate() {
            output[row * TILE_SIZE + col] = value as i32;
        }
    }
}
