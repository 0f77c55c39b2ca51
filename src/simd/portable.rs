//! Portable scalar lane.
//!
//! Emulates a 16-byte register with a plain array. It is the fallback on
//! targets without a SIMD backend and the reference the hardware lanes are
//! tested against.

use super::Lane;

/// A 16-byte lane backed by `[u8; 16]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortableLane([u8; 16]);

impl PortableLane {
    /// Build a lane from explicit bytes.
    #[inline]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The lane's bytes.
    #[inline]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    #[inline(always)]
    fn zip(self, other: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        let mut out = [0u8; 16];
        for (i, o) in out.iter_mut().enumerate() {
            *o = f(self.0[i], other.0[i]);
        }
        Self(out)
    }

    #[inline(always)]
    fn mask(pred: bool) -> u8 {
        if pred {
            0xFF
        } else {
            0x00
        }
    }

    #[inline(always)]
    fn shift_in<const K: usize>(self, prev: Self) -> Self {
        let mut out = [0u8; 16];
        out[..K].copy_from_slice(&prev.0[16 - K..]);
        out[K..].copy_from_slice(&self.0[..16 - K]);
        Self(out)
    }
}

// SAFETY: the portable lane uses no CPU-specific instructions.
unsafe impl Lane for PortableLane {
    const BYTES: usize = 16;

    #[inline]
    fn is_supported() -> bool {
        true
    }

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self([0; 16])
    }

    #[inline(always)]
    unsafe fn splat(b: u8) -> Self {
        Self([b; 16])
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Self(core::ptr::read_unaligned(ptr as *const [u8; 16]))
    }

    #[inline(always)]
    unsafe fn table16(table: &[u8; 16]) -> Self {
        Self(*table)
    }

    #[inline]
    fn store(self, out: &mut [u8]) {
        out[..16].copy_from_slice(&self.0);
    }

    #[inline(always)]
    fn or(self, other: Self) -> Self {
        self.zip(other, |a, b| a | b)
    }

    #[inline(always)]
    fn and(self, other: Self) -> Self {
        self.zip(other, |a, b| a & b)
    }

    #[inline(always)]
    fn wrapping_add(self, other: Self) -> Self {
        self.zip(other, u8::wrapping_add)
    }

    #[inline(always)]
    fn saturating_sub(self, other: Self) -> Self {
        self.zip(other, u8::saturating_sub)
    }

    #[inline(always)]
    fn cmp_eq(self, other: Self) -> Self {
        self.zip(other, |a, b| Self::mask(a == b))
    }

    #[inline(always)]
    fn cmp_gt_signed(self, other: Self) -> Self {
        self.zip(other, |a, b| Self::mask((a as i8) > (b as i8)))
    }

    #[inline(always)]
    fn max_unsigned(self, other: Self) -> Self {
        self.zip(other, u8::max)
    }

    #[inline(always)]
    fn high_nibbles(self) -> Self {
        Self(self.0.map(|b| b >> 4))
    }

    #[inline(always)]
    fn lookup16(self, table: Self) -> Self {
        Self(self.0.map(|i| table.0[(i & 0x0F) as usize]))
    }

    #[inline(always)]
    fn prev1(self, prev: Self) -> Self {
        self.shift_in::<1>(prev)
    }

    #[inline(always)]
    fn prev2(self, prev: Self) -> Self {
        self.shift_in::<2>(prev)
    }

    #[inline(always)]
    fn movemask(self) -> u64 {
        self.0
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &b)| acc | (((b >> 7) as u64) << i))
    }

    #[inline(always)]
    fn is_zero(self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}
