//! Population count strategies.
//!
//! The strategy is chosen at compile time:
//! - Default: `u64::count_ones()`, which lowers to `popcnt`/`cnt` when the
//!   target allows it.
//! - `simd` feature on aarch64: NEON `vcnt` per-byte counts summed with
//!   `vaddv`.
//! - `portable-popcount` feature: broadword (SWAR) byte sums.
//!
//! Every strategy returns the total number of set bits in the whole word,
//! even where it is built from per-byte partial counts.

/// Total number of set bits in `x`.
#[inline(always)]
pub fn population_count(x: u64) -> u32 {
    #[cfg(all(feature = "simd", target_arch = "aarch64"))]
    {
        popcount_neon(x)
    }

    #[cfg(all(
        feature = "portable-popcount",
        not(all(feature = "simd", target_arch = "aarch64"))
    ))]
    {
        popcount_broadword(x)
    }

    #[cfg(not(any(
        all(feature = "simd", target_arch = "aarch64"),
        feature = "portable-popcount"
    )))]
    {
        x.count_ones()
    }
}

/// NEON popcount: count bits per byte, then add the eight byte counts.
#[cfg(all(feature = "simd", target_arch = "aarch64"))]
#[inline(always)]
fn popcount_neon(x: u64) -> u32 {
    use core::arch::aarch64::*;

    // SAFETY: NEON is mandatory on aarch64.
    unsafe {
        let per_byte = vcnt_u8(vcreate_u8(x));
        vaddv_u8(per_byte) as u32
    }
}

/// Broadword popcount (Knuth, TAOCP 7.1.3).
#[cfg_attr(not(feature = "portable-popcount"), allow(dead_code))]
#[inline(always)]
fn popcount_broadword(x: u64) -> u32 {
    const M1: u64 = 0x5555_5555_5555_5555;
    const M2: u64 = 0x3333_3333_3333_3333;
    const M4: u64 = 0x0F0F_0F0F_0F0F_0F0F;
    const H01: u64 = 0x0101_0101_0101_0101;

    let x = x - ((x >> 1) & M1);
    let x = (x & M2) + ((x >> 2) & M2);
    let x = (x + (x >> 4)) & M4;
    // Byte sums accumulate into the top byte.
    (x.wrapping_mul(H01) >> 56) as u32
}
