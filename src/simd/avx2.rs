//! AVX2 lane (32 bytes).
//!
//! AVX2 byte shuffles and `alignr` operate within each 128-bit half, so the
//! lookup table is broadcast to both halves and the cross-register shift goes
//! through `vperm2i128` first.

use core::arch::x86_64::*;

use super::Lane;

/// A 32-byte AVX2 register.
#[derive(Debug, Clone, Copy)]
pub struct Avx2Lane(__m256i);

impl Avx2Lane {
    /// `[prev high half, self low half]`, the source for byte-granular shifts
    /// that cross the 128-bit boundary.
    #[inline(always)]
    fn straddle(self, prev: Self) -> __m256i {
        unsafe { _mm256_permute2x128_si256(prev.0, self.0, 0x21) }
    }
}

// SAFETY: values are only created by the unsafe constructors, whose contract
// requires AVX2.
unsafe impl Lane for Avx2Lane {
    const BYTES: usize = 32;

    #[inline]
    fn is_supported() -> bool {
        #[cfg(any(test, feature = "std"))]
        {
            is_x86_feature_detected!("avx2")
        }
        #[cfg(not(any(test, feature = "std")))]
        {
            cfg!(target_feature = "avx2")
        }
    }

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self(_mm256_setzero_si256())
    }

    #[inline(always)]
    unsafe fn splat(b: u8) -> Self {
        Self(_mm256_set1_epi8(b as i8))
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Self(_mm256_loadu_si256(ptr as *const __m256i))
    }

    #[inline(always)]
    unsafe fn table16(table: &[u8; 16]) -> Self {
        let half = _mm_loadu_si128(table.as_ptr() as *const __m128i);
        Self(_mm256_broadcastsi128_si256(half))
    }

    #[inline]
    fn store(self, out: &mut [u8]) {
        assert!(out.len() >= 32, "output shorter than one lane");
        unsafe { _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, self.0) }
    }

    #[inline(always)]
    fn or(self, other: Self) -> Self {
        unsafe { Self(_mm256_or_si256(self.0, other.0)) }
    }

    #[inline(always)]
    fn and(self, other: Self) -> Self {
        unsafe { Self(_mm256_and_si256(self.0, other.0)) }
    }

    #[inline(always)]
    fn wrapping_add(self, other: Self) -> Self {
        unsafe { Self(_mm256_add_epi8(self.0, other.0)) }
    }

    #[inline(always)]
    fn saturating_sub(self, other: Self) -> Self {
        unsafe { Self(_mm256_subs_epu8(self.0, other.0)) }
    }

    #[inline(always)]
    fn cmp_eq(self, other: Self) -> Self {
        unsafe { Self(_mm256_cmpeq_epi8(self.0, other.0)) }
    }

    #[inline(always)]
    fn cmp_gt_signed(self, other: Self) -> Self {
        unsafe { Self(_mm256_cmpgt_epi8(self.0, other.0)) }
    }

    #[inline(always)]
    fn max_unsigned(self, other: Self) -> Self {
        unsafe { Self(_mm256_max_epu8(self.0, other.0)) }
    }

    #[inline(always)]
    fn high_nibbles(self) -> Self {
        unsafe {
            Self(_mm256_and_si256(
                _mm256_srli_epi16(self.0, 4),
                _mm256_set1_epi8(0x0F),
            ))
        }
    }

    #[inline(always)]
    fn lookup16(self, table: Self) -> Self {
        unsafe { Self(_mm256_shuffle_epi8(table.0, self.0)) }
    }

    #[inline(always)]
    fn prev1(self, prev: Self) -> Self {
        // Low half: prev[31], self[0..15]. High half: self[15], self[16..31].
        unsafe { Self(_mm256_alignr_epi8(self.0, self.straddle(prev), 16 - 1)) }
    }

    #[inline(always)]
    fn prev2(self, prev: Self) -> Self {
        unsafe { Self(_mm256_alignr_epi8(self.0, self.straddle(prev), 16 - 2)) }
    }

    #[inline(always)]
    fn movemask(self) -> u64 {
        unsafe { _mm256_movemask_epi8(self.0) as u32 as u64 }
    }

    #[inline(always)]
    fn is_zero(self) -> bool {
        unsafe { _mm256_testz_si256(self.0, self.0) == 1 }
    }
}
