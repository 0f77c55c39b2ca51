//! Text processing utilities.
//!
//! ## UTF-8 Validation
//!
//! The [`utf8`] module validates byte buffers as UTF-8 a window at a time
//! on the fastest SIMD backend the CPU supports.
//!
//! ```
//! use utf8_lanes::text::{is_utf8, validate_utf8, InvalidUtf8};
//!
//! // Valid UTF-8
//! assert!(validate_utf8(b"Hello, world!").is_ok());
//! assert!(is_utf8("日本語".as_bytes()));
//!
//! // Invalid UTF-8 (bare continuation byte)
//! assert_eq!(validate_utf8(&[0x80]), Err(InvalidUtf8));
//! ```

pub mod utf8;

// Re-export commonly used types
pub use utf8::{is_utf8, validate_utf8, InvalidUtf8, Utf8Checker};
