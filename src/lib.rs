//! # utf8-lanes
//!
//! Branchless SIMD UTF-8 validation for Rust.
//!
//! The validator checks a byte buffer 64 bytes at a time, with no
//! data-dependent branches per byte, on SSE4.1 and AVX2 (x86_64), NEON
//! (ARM64) or a portable scalar fallback.
//!
//! ## Module Organization
//!
//! - [`bits`] - Word-level bit operations (popcount, zero counts, set-bit iteration)
//! - [`simd`] - Lane backends and the fixed-width [`VectorWindow`](simd::VectorWindow)
//! - [`text`] - The UTF-8 validator and its buffer driver
//!
//! ## Quick Start
//!
//! ```
//! use utf8_lanes::{validate_utf8, Config, Utf8Checker};
//!
//! assert!(validate_utf8("Grüße, 世界 🎉".as_bytes()).is_ok());
//! assert!(validate_utf8(&[0xED, 0xA0, 0x80]).is_err()); // surrogate
//!
//! // Pin a backend; fails if the CPU lacks it.
//! let checker = Utf8Checker::with_config(&Config::default()).unwrap();
//! assert!(checker.is_valid(b"plain ASCII"));
//! ```
//!
//! ## Features
//!
//! Popcount strategies (mutually exclusive, for benchmarking):
//! - Default: Uses Rust's `count_ones()`
//! - `simd` - Use explicit NEON intrinsics on ARM
//! - `portable-popcount` - Use portable bitwise algorithm (no intrinsics)
//!
//! Other features:
//! - `std` (default) - Runtime CPU detection and `std::error::Error` impls
//! - `serde` - Enable serialization/deserialization of [`Config`] and [`Backend`]

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Core modules
// =============================================================================

/// Word-level bit operations.
pub mod bits;

/// SIMD lane backends and vector windows.
pub mod simd;

/// Text validation.
pub mod text;

// =============================================================================
// Public re-exports
// =============================================================================

pub use bits::{
    checked_add, checked_mul, clear_lowest_set_bit, leading_zero_count, population_count,
    trailing_zero_count, SetBits,
};
pub use simd::{Backend, UnsupportedBackend};
pub use text::utf8::{is_utf8, validate_utf8, InvalidUtf8, Utf8Checker, Utf8Validator};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for building a [`Utf8Checker`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Backend to use (default: `None`, detect the fastest available)
    #[cfg_attr(feature = "serde", serde(default))]
    pub backend: Option<Backend>,
}

impl Config {
    /// Create a configuration that detects the backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }
}
