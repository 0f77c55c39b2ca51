//! NEON lane (16 bytes) for ARM64.

use core::arch::aarch64::*;

use super::Lane;

/// A 16-byte NEON register.
#[derive(Debug, Clone, Copy)]
pub struct NeonLane(uint8x16_t);

// SAFETY: NEON is mandatory on aarch64.
unsafe impl Lane for NeonLane {
    const BYTES: usize = 16;

    #[inline]
    fn is_supported() -> bool {
        true
    }

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self(vdupq_n_u8(0))
    }

    #[inline(always)]
    unsafe fn splat(b: u8) -> Self {
        Self(vdupq_n_u8(b))
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Self(vld1q_u8(ptr))
    }

    #[inline(always)]
    unsafe fn table16(table: &[u8; 16]) -> Self {
        Self(vld1q_u8(table.as_ptr()))
    }

    #[inline]
    fn store(self, out: &mut [u8]) {
        assert!(out.len() >= 16, "output shorter than one lane");
        unsafe { vst1q_u8(out.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    fn or(self, other: Self) -> Self {
        unsafe { Self(vorrq_u8(self.0, other.0)) }
    }

    #[inline(always)]
    fn and(self, other: Self) -> Self {
        unsafe { Self(vandq_u8(self.0, other.0)) }
    }

    #[inline(always)]
    fn wrapping_add(self, other: Self) -> Self {
        unsafe { Self(vaddq_u8(self.0, other.0)) }
    }

    #[inline(always)]
    fn saturating_sub(self, other: Self) -> Self {
        unsafe { Self(vqsubq_u8(self.0, other.0)) }
    }

    #[inline(always)]
    fn cmp_eq(self, other: Self) -> Self {
        unsafe { Self(vceqq_u8(self.0, other.0)) }
    }

    #[inline(always)]
    fn cmp_gt_signed(self, other: Self) -> Self {
        unsafe {
            Self(vcgtq_s8(
                vreinterpretq_s8_u8(self.0),
                vreinterpretq_s8_u8(other.0),
            ))
        }
    }

    #[inline(always)]
    fn max_unsigned(self, other: Self) -> Self {
        unsafe { Self(vmaxq_u8(self.0, other.0)) }
    }

    #[inline(always)]
    fn high_nibbles(self) -> Self {
        unsafe { Self(vshrq_n_u8::<4>(self.0)) }
    }

    #[inline(always)]
    fn lookup16(self, table: Self) -> Self {
        unsafe { Self(vqtbl1q_u8(table.0, self.0)) }
    }

    #[inline(always)]
    fn prev1(self, prev: Self) -> Self {
        unsafe { Self(vextq_u8::<15>(prev.0, self.0)) }
    }

    #[inline(always)]
    fn prev2(self, prev: Self) -> Self {
        unsafe { Self(vextq_u8::<14>(prev.0, self.0)) }
    }

    /// NEON has no movemask; gather the top bits with a multiply per half.
    #[inline(always)]
    fn movemask(self) -> u64 {
        const MAGIC: u64 = 0x0102040810204080;
        unsafe {
            let high_bits = vshrq_n_u8::<7>(self.0);
            let low_u64 = vgetq_lane_u64::<0>(vreinterpretq_u64_u8(high_bits));
            let high_u64 = vgetq_lane_u64::<1>(vreinterpretq_u64_u8(high_bits));
            let low_packed = low_u64.wrapping_mul(MAGIC) >> 56;
            let high_packed = high_u64.wrapping_mul(MAGIC) >> 56;
            low_packed | (high_packed << 8)
        }
    }

    #[inline(always)]
    fn is_zero(self) -> bool {
        unsafe { vmaxvq_u8(self.0) == 0 }
    }
}
