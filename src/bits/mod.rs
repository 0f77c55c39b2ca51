//! Portable bit-manipulation primitives.
//!
//! These are the word-level building blocks used when scanning the bitmasks
//! produced by [`VectorWindow`](crate::simd::VectorWindow): find the lowest
//! set bit, clear it, repeat. They are stateless, branch-free and independent
//! of the UTF-8 validator.
//!
//! ```
//! use utf8_lanes::bits::{clear_lowest_set_bit, trailing_zero_count, SetBits};
//!
//! let mask = 0b1010u64;
//! assert_eq!(trailing_zero_count(mask), 1);
//! assert_eq!(clear_lowest_set_bit(mask), 0b1000);
//! assert_eq!(SetBits::new(mask).collect::<Vec<_>>(), vec![1, 3]);
//! ```

mod popcount;

pub use popcount::population_count;

/// Index of the lowest set bit.
///
/// The result is unspecified when `x == 0`; callers scanning a mask must
/// stop before that point (the current implementation returns 64).
#[inline(always)]
pub fn trailing_zero_count(x: u64) -> u32 {
    x.trailing_zeros()
}

/// Number of zero bits above the highest set bit. Returns 64 for `x == 0`.
#[inline(always)]
pub fn leading_zero_count(x: u64) -> u32 {
    x.leading_zeros()
}

/// `x` with its lowest set bit cleared. Zero stays zero.
#[inline(always)]
pub fn clear_lowest_set_bit(x: u64) -> u64 {
    x & x.wrapping_sub(1)
}

/// Wrapping sum of `a` and `b`, plus `true` if the true sum exceeds 64 bits.
#[inline(always)]
pub fn checked_add(a: u64, b: u64) -> (u64, bool) {
    a.overflowing_add(b)
}

/// Wrapping product of `a` and `b`, plus `true` if the true product exceeds 64 bits.
#[inline(always)]
pub fn checked_mul(a: u64, b: u64) -> (u64, bool) {
    a.overflowing_mul(b)
}

/// Iterator over the positions of set bits in a word, lowest first.
///
/// This is the usual way to walk a window bitmask: each step reads the
/// trailing zero count and then clears that bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetBits {
    remaining: u64,
}

impl SetBits {
    /// Create an iterator over the set bits of `word`.
    #[inline]
    pub fn new(word: u64) -> Self {
        Self { remaining: word }
    }
}

impl Iterator for SetBits {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let pos = trailing_zero_count(self.remaining);
        self.remaining = clear_lowest_set_bit(self.remaining);
        Some(pos)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = population_count(self.remaining) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SetBits {}

impl core::iter::FusedIterator for SetBits {}
