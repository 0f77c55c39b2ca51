//! SSSE3/SSE4.1 lane (16 bytes).
//!
//! `pshufb` provides the nibble table lookups, `palignr` the shifted
//! concatenation with the previous register and `ptest` the zero test.

use core::arch::x86_64::*;

use super::Lane;

/// A 16-byte SSE register.
#[derive(Debug, Clone, Copy)]
pub struct SseLane(__m128i);

// SAFETY: values are only created by the unsafe constructors, whose contract
// requires SSSE3 and SSE4.1.
unsafe impl Lane for SseLane {
    const BYTES: usize = 16;

    #[inline]
    fn is_supported() -> bool {
        #[cfg(any(test, feature = "std"))]
        {
            is_x86_feature_detected!("ssse3") && is_x86_feature_detected!("sse4.1")
        }
        #[cfg(not(any(test, feature = "std")))]
        {
            cfg!(all(target_feature = "ssse3", target_feature = "sse4.1"))
        }
    }

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self(_mm_setzero_si128())
    }

    #[inline(always)]
    unsafe fn splat(b: u8) -> Self {
        Self(_mm_set1_epi8(b as i8))
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Self(_mm_loadu_si128(ptr as *const __m128i))
    }

    #[inline(always)]
    unsafe fn table16(table: &[u8; 16]) -> Self {
        Self(_mm_loadu_si128(table.as_ptr() as *const __m128i))
    }

    #[inline]
    fn store(self, out: &mut [u8]) {
        assert!(out.len() >= 16, "output shorter than one lane");
        unsafe { _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, self.0) }
    }

    #[inline(always)]
    fn or(self, other: Self) -> Self {
        unsafe { Self(_mm_or_si128(self.0, other.0)) }
    }

    #[inline(always)]
    fn and(self, other: Self) -> Self {
        unsafe { Self(_mm_and_si128(self.0, other.0)) }
    }

    #[inline(always)]
    fn wrapping_add(self, other: Self) -> Self {
        unsafe { Self(_mm_add_epi8(self.0, other.0)) }
    }

    #[inline(always)]
    fn saturating_sub(self, other: Self) -> Self {
        unsafe { Self(_mm_subs_epu8(self.0, other.0)) }
    }

    #[inline(always)]
    fn cmp_eq(self, other: Self) -> Self {
        unsafe { Self(_mm_cmpeq_epi8(self.0, other.0)) }
    }

    #[inline(always)]
    fn cmp_gt_signed(self, other: Self) -> Self {
        unsafe { Self(_mm_cmpgt_epi8(self.0, other.0)) }
    }

    #[inline(always)]
    fn max_unsigned(self, other: Self) -> Self {
        unsafe { Self(_mm_max_epu8(self.0, other.0)) }
    }

    #[inline(always)]
    fn high_nibbles(self) -> Self {
        // There is no 8-bit shift; shift 16-bit words and drop the bits that
        // crossed in from the neighbouring byte.
        unsafe {
            Self(_mm_and_si128(
                _mm_srli_epi16(self.0, 4),
                _mm_set1_epi8(0x0F),
            ))
        }
    }

    #[inline(always)]
    fn lookup16(self, table: Self) -> Self {
        unsafe { Self(_mm_shuffle_epi8(table.0, self.0)) }
    }

    #[inline(always)]
    fn prev1(self, prev: Self) -> Self {
        unsafe { Self(_mm_alignr_epi8(self.0, prev.0, 16 - 1)) }
    }

    #[inline(always)]
    fn prev2(self, prev: Self) -> Self {
        unsafe { Self(_mm_alignr_epi8(self.0, prev.0, 16 - 2)) }
    }

    #[inline(always)]
    fn movemask(self) -> u64 {
        unsafe { (_mm_movemask_epi8(self.0) as u32 & 0xFFFF) as u64 }
    }

    #[inline(always)]
    fn is_zero(self) -> bool {
        unsafe { _mm_testz_si128(self.0, self.0) == 1 }
    }
}
