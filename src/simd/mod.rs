//! Hardware lanes and the vector window built on top of them.
//!
//! A [`Lane`] is one SIMD register (16 or 32 bytes). Every operation the
//! UTF-8 validator needs is a named method that each backend maps onto a
//! single native instruction (or a short fixed sequence). Portable code only
//! talks to [`VectorWindow`], which groups `N` lanes into a 64-byte window.
//!
//! ## Backends
//!
//! - [`PortableLane`]: scalar `[u8; 16]`, available everywhere
//! - `SseLane`: SSSE3 + SSE4.1, 16 bytes (x86_64)
//! - `Avx2Lane`: AVX2, 32 bytes (x86_64)
//! - `NeonLane`: NEON, 16 bytes (aarch64)
//!
//! ## Safety model
//!
//! Constructors (`zero`, `splat`, `load`, `table16`) are `unsafe`: the caller
//! must ensure the running CPU supports the backend. Once a lane value exists
//! that precondition has been met, so the operations on it are safe.

mod backend;
mod portable;
mod window;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
mod sse;

#[cfg(target_arch = "aarch64")]
mod neon;

pub use backend::{Backend, UnsupportedBackend};
pub use portable::PortableLane;
pub use window::VectorWindow;

#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Lane;
#[cfg(target_arch = "x86_64")]
pub use sse::SseLane;

#[cfg(target_arch = "aarch64")]
pub use neon::NeonLane;

/// Largest window width supported by [`VectorWindow`], in bytes.
pub const MAX_WINDOW_BYTES: usize = 64;

/// One hardware SIMD register of `BYTES` bytes.
///
/// Comparisons return lanes whose bytes are `0xFF` where the predicate holds
/// and `0x00` elsewhere.
///
/// # Safety
///
/// Implementors must only be constructible through the `unsafe`
/// constructors below, so that the existence of a value proves that the CPU
/// supports the instructions used by the safe operations.
pub unsafe trait Lane: Copy + core::fmt::Debug {
    /// Register width in bytes.
    const BYTES: usize;

    /// Whether the running CPU supports this backend.
    fn is_supported() -> bool;

    /// All bytes zero.
    ///
    /// # Safety
    ///
    /// The CPU must support this backend.
    unsafe fn zero() -> Self;

    /// Every byte set to `b`.
    ///
    /// # Safety
    ///
    /// The CPU must support this backend.
    unsafe fn splat(b: u8) -> Self;

    /// Unaligned load of `BYTES` bytes.
    ///
    /// # Safety
    ///
    /// The CPU must support this backend and `ptr` must be valid for reading
    /// `BYTES` bytes.
    unsafe fn load(ptr: *const u8) -> Self;

    /// A 16-entry lookup table, replicated into every 128-bit half.
    ///
    /// # Safety
    ///
    /// The CPU must support this backend.
    unsafe fn table16(table: &[u8; 16]) -> Self;

    /// Copy the lane into the first `BYTES` bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `BYTES`.
    fn store(self, out: &mut [u8]);

    /// Bitwise OR.
    fn or(self, other: Self) -> Self;

    /// Bitwise AND.
    fn and(self, other: Self) -> Self;

    /// Byte-wise wrapping addition.
    fn wrapping_add(self, other: Self) -> Self;

    /// Byte-wise unsigned saturating subtraction: `max(self - other, 0)`.
    fn saturating_sub(self, other: Self) -> Self;

    /// Byte-wise equality.
    fn cmp_eq(self, other: Self) -> Self;

    /// Byte-wise signed (`i8`) greater-than.
    fn cmp_gt_signed(self, other: Self) -> Self;

    /// Byte-wise unsigned maximum.
    fn max_unsigned(self, other: Self) -> Self;

    /// Top four bits of every byte, shifted down (`byte >> 4`).
    fn high_nibbles(self) -> Self;

    /// Use each byte of `self` as an index into `table` (built by
    /// [`Lane::table16`]). Indices must be below 16.
    fn lookup16(self, table: Self) -> Self;

    /// `self` shifted right by one byte, with the last byte of `prev` entering
    /// at position 0.
    fn prev1(self, prev: Self) -> Self;

    /// `self` shifted right by two bytes, with the last two bytes of `prev`
    /// entering at positions 0 and 1.
    fn prev2(self, prev: Self) -> Self;

    /// One bit per byte (the byte's top bit), bit 0 for byte 0.
    fn movemask(self) -> u64;

    /// True if every byte is zero.
    fn is_zero(self) -> bool;
}
