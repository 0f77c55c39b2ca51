//! Branchless SIMD UTF-8 validation.
//!
//! The validator walks the input one [`VectorWindow`] at a time and never
//! backtracks. Each window costs the same amount of work whatever it
//! contains; errors are OR-ed into a lane-wide accumulator that is only read
//! at the end. The result is a plain accept/reject verdict with no error
//! position.
//!
//! ## Legal byte sequences
//!
//! | Code points          | 1st     | 2nd     | 3rd     | 4th     |
//! |----------------------|---------|---------|---------|---------|
//! | U+0000..U+007F       | 00..7F  |         |         |         |
//! | U+0080..U+07FF       | C2..DF  | 80..BF  |         |         |
//! | U+0800..U+0FFF       | E0      | A0..BF  | 80..BF  |         |
//! | U+1000..U+CFFF       | E1..EC  | 80..BF  | 80..BF  |         |
//! | U+D000..U+D7FF       | ED      | 80..9F  | 80..BF  |         |
//! | U+E000..U+FFFF       | EE..EF  | 80..BF  | 80..BF  |         |
//! | U+10000..U+3FFFF     | F0      | 90..BF  | 80..BF  | 80..BF  |
//! | U+40000..U+FFFFF     | F1..F3  | 80..BF  | 80..BF  | 80..BF  |
//! | U+100000..U+10FFFF   | F4      | 80..8F  | 80..BF  | 80..BF  |
//!
//! ## Algorithm
//!
//! For every byte the validator derives, from its high nibble, the length of
//! the sequence it starts (1 for ASCII, 0 for a continuation byte, 2-4 for a
//! leader). Adding copies of that vector shifted by one and two bytes (minus
//! 1 and 2, saturating) gives the number of bytes each position is still
//! "inside" of. A byte is legal when it either starts something and is not
//! inside a sequence, or is a continuation byte and is inside one. Three more
//! checks cover what lengths cannot see:
//!
//! - no byte above `0xF4`;
//! - after `0xED` the next byte is at most `0x9F` (surrogates), after `0xF4`
//!   at most `0x8F` (above U+10FFFF);
//! - overlong forms `C0`/`C1`, `E0 80..9F` and `F0 80..8F`.
//!
//! The last processed register is kept as carry state, so sequences that
//! straddle two windows are checked exactly like the others. Windows without
//! any byte `>= 0x80` skip all of this and only check that no sequence was
//! left open by the previous window.
//!
//! ```
//! use utf8_lanes::text::utf8::{is_utf8, validate_utf8};
//!
//! assert!(is_utf8("日本語 🎉".as_bytes()));
//! assert!(validate_utf8(&[0xC0, 0x80]).is_err()); // overlong U+0000
//! assert!(validate_utf8(&[0xE2, 0x82]).is_err()); // truncated
//! ```

use core::fmt;

use crate::simd::{
    Backend, Lane, PortableLane, UnsupportedBackend, VectorWindow, MAX_WINDOW_BYTES,
};
use crate::Config;

#[cfg(target_arch = "x86_64")]
use crate::simd::{Avx2Lane, SseLane};

#[cfg(target_arch = "aarch64")]
use crate::simd::NeonLane;

// =============================================================================
// Lookup tables (indexed by high nibble)
// =============================================================================

/// Sequence length started by a byte: ASCII 1, continuation 0, leaders 2-4.
const CONTINUATION_LENGTHS: [u8; 16] = [
    1, 1, 1, 1, 1, 1, 1, 1, // 0xxx (ASCII)
    0, 0, 0, 0, // 10xx (continuation)
    2, 2, // 110x
    3, // 1110
    4, // 1111
];

/// Signed minimum for the byte *before* the current one, by its high nibble.
/// `0x80` (-128) never triggers.
const INITIAL_MINS: [u8; 16] = [
    0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, // 0xxx
    0x80, 0x80, 0x80, 0x80, // 10xx
    0xC2, 0x80, // 110x
    0xE1, // 1110
    0xF1, // 1111
];

/// Signed minimum for the current byte, keyed by the previous byte's nibble.
/// `0x7F` always triggers, so a `C0`/`C1` leader alone is enough.
const SECOND_MINS: [u8; 16] = [
    0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, // 0xxx
    0x80, 0x80, 0x80, 0x80, // 10xx
    0x7F, 0x7F, // 110x
    0xA0, // 1110
    0x90, // 1111
];

/// Largest byte that may appear anywhere.
const MAX_BYTE: u8 = 0xF4;

/// Carried length above which the last byte of a register leaves a sequence
/// open. Only the last byte is meaningful; 9 never triggers.
const CARRY_SENTINEL_FILL: u8 = 9;

// =============================================================================
// Errors
// =============================================================================

/// The input is not well-formed UTF-8.
///
/// The validator is an accept/reject filter, so the error carries no
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvalidUtf8;

impl fmt::Display for InvalidUtf8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid UTF-8")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidUtf8 {}

// =============================================================================
// Validator state
// =============================================================================

/// Per-register state kept for the next window.
#[derive(Debug, Clone, Copy)]
pub struct ProcessedWindow<L: Lane> {
    /// The bytes themselves.
    pub raw_bytes: L,
    /// `byte >> 4` for every byte.
    pub high_nibbles: L,
    /// How many bytes of a sequence each position is still inside of,
    /// including sequences started in earlier windows.
    pub carried_continuations: L,
}

/// Broadcast constants, built once per validator.
#[derive(Debug, Clone, Copy)]
struct Utf8Tables<L: Lane> {
    continuation_lengths: L,
    initial_mins: L,
    second_mins: L,
    zero: L,
    one: L,
    two: L,
    max_byte: L,
    lead_ed: L,
    max_after_ed: L,
    max_after_f4: L,
    carry_sentinel: L,
}

impl<L: Lane> Utf8Tables<L> {
    /// # Safety
    ///
    /// The CPU must support `L`.
    #[inline(always)]
    unsafe fn new() -> Self {
        let mut sentinel = [CARRY_SENTINEL_FILL; MAX_WINDOW_BYTES];
        sentinel[L::BYTES - 1] = 1;

        Self {
            continuation_lengths: L::table16(&CONTINUATION_LENGTHS),
            initial_mins: L::table16(&INITIAL_MINS),
            second_mins: L::table16(&SECOND_MINS),
            zero: L::zero(),
            one: L::splat(1),
            two: L::splat(2),
            max_byte: L::splat(MAX_BYTE),
            lead_ed: L::splat(0xED),
            max_after_ed: L::splat(0x9F),
            max_after_f4: L::splat(0x8F),
            carry_sentinel: L::load(sentinel.as_ptr()),
        }
    }
}

/// Streaming UTF-8 validator over windows of backend `L`.
///
/// Feed windows strictly in buffer order with
/// [`check_next_input`](Self::check_next_input), call
/// [`check_eof`](Self::check_eof) after the last one, then read
/// [`has_any_errors`](Self::has_any_errors). The error flag is sticky: once
/// set it stays set for the rest of the run. Use one validator per buffer.
#[derive(Debug, Clone)]
pub struct Utf8Validator<L: Lane> {
    tables: Utf8Tables<L>,
    previous: ProcessedWindow<L>,
    has_error: L,
}

impl<L: Lane> Utf8Validator<L> {
    /// Create a validator whose carry state expects no open sequence.
    ///
    /// # Safety
    ///
    /// The running CPU must support `L` (see [`Lane::is_supported`]).
    #[inline(always)]
    pub unsafe fn new() -> Self {
        let zero = L::zero();
        Self {
            tables: Utf8Tables::new(),
            previous: ProcessedWindow {
                raw_bytes: zero,
                high_nibbles: zero,
                carried_continuations: zero,
            },
            has_error: zero,
        }
    }

    /// Create a validator if the running CPU supports `L`.
    pub fn try_new() -> Option<Self> {
        if L::is_supported() {
            // SAFETY: support was just checked.
            Some(unsafe { Self::new() })
        } else {
            None
        }
    }

    /// Validate the next window.
    ///
    /// Pure ASCII windows only check that the previous window did not end
    /// inside a multi-byte sequence; others run the full checks lane by lane.
    #[inline(always)]
    pub fn check_next_input<const N: usize>(&mut self, input: &VectorWindow<L, N>) {
        if input.is_ascii() {
            self.check_carried_continuations();
            let last = input.last_lane();
            self.previous = ProcessedWindow {
                raw_bytes: last,
                high_nibbles: last.high_nibbles(),
                carried_continuations: self.tables.one,
            };
        } else {
            input.for_each_lane(|lane| self.check_lane(lane));
        }
    }

    /// Run the full checks on one register and make it the carry state.
    #[inline(always)]
    pub fn check_lane(&mut self, current: L) {
        let high_nibbles = current.high_nibbles();

        self.check_smaller_than_0xf4(current);

        let initial_lengths = high_nibbles.lookup16(self.tables.continuation_lengths);
        let carried_continuations = self.carry_continuations(initial_lengths);
        self.check_continuations(initial_lengths, carried_continuations);

        let off1_current = current.prev1(self.previous.raw_bytes);
        self.check_first_continuation_max(current, off1_current);
        self.check_overlong(current, off1_current, high_nibbles);

        self.previous = ProcessedWindow {
            raw_bytes: current,
            high_nibbles,
            carried_continuations,
        };
    }

    /// Flag an error if the previous register ended inside a sequence.
    #[inline(always)]
    pub fn check_carried_continuations(&mut self) {
        let open = self
            .previous
            .carried_continuations
            .cmp_gt_signed(self.tables.carry_sentinel);
        self.add_errors(open);
    }

    /// End-of-input check: no sequence may be left unterminated.
    #[inline(always)]
    pub fn check_eof(&mut self) {
        self.check_carried_continuations();
    }

    /// True once any check has failed.
    #[inline(always)]
    pub fn has_any_errors(&self) -> bool {
        !self.has_error.is_zero()
    }

    /// The carry state left by the last window.
    pub fn previous(&self) -> &ProcessedWindow<L> {
        &self.previous
    }

    /// Run the end-of-input check and return the verdict.
    pub fn finish(mut self) -> Result<(), InvalidUtf8> {
        self.check_eof();
        if self.has_any_errors() {
            Err(InvalidUtf8)
        } else {
            Ok(())
        }
    }

    #[inline(always)]
    fn add_errors(&mut self, errors: L) {
        self.has_error = self.has_error.or(errors);
    }

    /// Unsigned and saturating: zero for every byte up to `0xF4`.
    #[inline(always)]
    fn check_smaller_than_0xf4(&mut self, current: L) {
        let over = current.saturating_sub(self.tables.max_byte);
        self.add_errors(over);
    }

    #[inline(always)]
    fn carry_continuations(&self, initial_lengths: L) -> L {
        let prev = self.previous.carried_continuations;
        let right1 = initial_lengths.prev1(prev).saturating_sub(self.tables.one);
        let sum = initial_lengths.wrapping_add(right1);
        let right2 = sum.prev2(prev).saturating_sub(self.tables.two);
        sum.wrapping_add(right2)
    }

    /// A byte is wrong when "inside an open sequence" equals "starts
    /// something": a leader or ASCII byte inside a sequence, or a
    /// continuation byte outside one.
    #[inline(always)]
    fn check_continuations(&mut self, initial_lengths: L, carries: L) {
        let inside = carries.cmp_gt_signed(initial_lengths);
        let starts = initial_lengths.cmp_gt_signed(self.tables.zero);
        self.add_errors(inside.cmp_eq(starts));
    }

    /// After `0xED` the next byte must be `<= 0x9F`; after `0xF4`, `<= 0x8F`.
    /// The byte must be a continuation (negative as `i8`), so a signed
    /// compare is enough.
    #[inline(always)]
    fn check_first_continuation_max(&mut self, current: L, off1_current: L) {
        let t = &self.tables;
        let after_ed = off1_current.cmp_eq(t.lead_ed);
        let after_f4 = off1_current.cmp_eq(t.max_byte);

        let bad_follow_ed = current.cmp_gt_signed(t.max_after_ed).and(after_ed);
        let bad_follow_f4 = current.cmp_gt_signed(t.max_after_f4).and(after_f4);
        self.add_errors(bad_follow_ed.or(bad_follow_f4));
    }

    // off1 nibble   off1      current
    // C          => < C2  &&  true
    // E          => < E1  &&  < A0
    // F          => < F1  &&  < 90
    // other      => false &&  false
    #[inline(always)]
    fn check_overlong(&mut self, current: L, off1_current: L, high_nibbles: L) {
        let off1_high_nibbles = high_nibbles.prev1(self.previous.high_nibbles);

        let initial_mins = off1_high_nibbles.lookup16(self.tables.initial_mins);
        let initial_under = initial_mins.cmp_gt_signed(off1_current);

        let second_mins = off1_high_nibbles.lookup16(self.tables.second_mins);
        let second_under = second_mins.cmp_gt_signed(current);

        self.add_errors(initial_under.and(second_under));
    }
}

// =============================================================================
// Buffer driver
// =============================================================================

/// Validate `input` with windows of `N` lanes of `L`.
///
/// Full windows are loaded straight from the slice. The final partial window
/// is copied into a zero-filled buffer, so no load reads past `input`.
#[inline(always)]
pub fn validate_windows<L: Lane, const N: usize>(
    mut validator: Utf8Validator<L>,
    input: &[u8],
) -> bool {
    let width = VectorWindow::<L, N>::WIDTH;

    let mut chunks = input.chunks_exact(width);
    for chunk in &mut chunks {
        // SAFETY: the validator exists, so `L` is supported; the chunk holds
        // exactly `width` bytes.
        let window = unsafe { VectorWindow::<L, N>::load(chunk.as_ptr()) };
        validator.check_next_input(&window);
    }

    let rest = chunks.remainder();
    if !rest.is_empty() {
        let mut padded = [0u8; MAX_WINDOW_BYTES];
        padded[..rest.len()].copy_from_slice(rest);
        // SAFETY: as above; `padded` is at least one window wide.
        let window = unsafe { VectorWindow::<L, N>::load(padded.as_ptr()) };
        validator.check_next_input(&window);
    }

    validator.finish().is_ok()
}

fn validate_portable(input: &[u8]) -> bool {
    // SAFETY: the portable lane has no CPU requirements.
    let validator = unsafe { Utf8Validator::<PortableLane>::new() };
    validate_windows::<PortableLane, 4>(validator, input)
}

/// # Safety
///
/// The CPU must support SSSE3 and SSE4.1.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3,sse4.1")]
unsafe fn validate_sse41(input: &[u8]) -> bool {
    validate_windows::<SseLane, 4>(Utf8Validator::new(), input)
}

/// # Safety
///
/// The CPU must support AVX2.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn validate_avx2(input: &[u8]) -> bool {
    validate_windows::<Avx2Lane, 2>(Utf8Validator::new(), input)
}

#[cfg(target_arch = "aarch64")]
fn validate_neon(input: &[u8]) -> bool {
    // SAFETY: NEON is mandatory on aarch64.
    let validator = unsafe { Utf8Validator::<NeonLane>::new() };
    validate_windows::<NeonLane, 4>(validator, input)
}

// =============================================================================
// Public entry points
// =============================================================================

/// UTF-8 checker bound to one backend known to run on this CPU.
///
/// The checker holds no buffer state; each call creates a fresh validator,
/// so one checker can be shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Checker {
    backend: Backend,
}

impl Default for Utf8Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Checker {
    /// Use the fastest backend available.
    pub fn new() -> Self {
        Self {
            backend: Backend::detect(),
        }
    }

    /// Use the backend named by `config`, or detect one if it names none.
    pub fn with_config(config: &Config) -> Result<Self, UnsupportedBackend> {
        match config.backend {
            None => Ok(Self::new()),
            Some(backend) if backend.is_available() => {
                log::debug!("using configured {} backend for UTF-8 validation", backend);
                Ok(Self { backend })
            }
            Some(backend) => {
                log::warn!(
                    "configured {} backend is not supported on this CPU",
                    backend
                );
                Err(UnsupportedBackend { backend })
            }
        }
    }

    /// The backend in use.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// True if `input` is well-formed UTF-8.
    pub fn is_valid(&self, input: &[u8]) -> bool {
        match self.backend {
            Backend::Portable => validate_portable(input),
            // SAFETY: construction checked that the backend is available.
            #[cfg(target_arch = "x86_64")]
            Backend::Sse41 => unsafe { validate_sse41(input) },
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 => unsafe { validate_avx2(input) },
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => validate_neon(input),
            #[allow(unreachable_patterns)]
            _ => validate_portable(input),
        }
    }

    /// Validate `input`.
    pub fn validate(&self, input: &[u8]) -> Result<(), InvalidUtf8> {
        if self.is_valid(input) {
            Ok(())
        } else {
            Err(InvalidUtf8)
        }
    }
}

/// Validate `input` with the fastest available backend.
///
/// # Examples
///
/// ```
/// use utf8_lanes::text::utf8::validate_utf8;
///
/// assert!(validate_utf8(b"Hello, world!").is_ok());
/// assert!(validate_utf8(&[0xF4, 0x8F, 0xBF, 0xBF]).is_ok()); // U+10FFFF
/// assert!(validate_utf8(&[0xF4, 0x90, 0x80, 0x80]).is_err()); // above U+10FFFF
/// assert!(validate_utf8(&[0xED, 0xA0, 0x80]).is_err()); // surrogate
/// ```
pub fn validate_utf8(input: &[u8]) -> Result<(), InvalidUtf8> {
    Utf8Checker::new().validate(input)
}

/// True if `input` is well-formed UTF-8.
pub fn is_utf8(input: &[u8]) -> bool {
    Utf8Checker::new().is_valid(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verdicts from every window width and every available backend.
    fn verdicts(input: &[u8]) -> Vec<(&'static str, bool)> {
        let portable = || Utf8Validator::<PortableLane>::try_new().unwrap();
        let w16 = validate_windows::<PortableLane, 1>(portable(), input);
        let w32 = validate_windows::<PortableLane, 2>(portable(), input);
        let w64 = validate_windows::<PortableLane, 4>(portable(), input);

        let mut out = vec![
            ("portable/16", w16),
            ("portable/32", w32),
            ("portable/64", w64),
        ];
        for backend in Backend::ALL {
            let config = Config::default().with_backend(backend);
            if let Ok(checker) = Utf8Checker::with_config(&config) {
                out.push((backend.name(), checker.is_valid(input)));
            }
        }
        out
    }

    fn assert_valid(input: &[u8]) {
        for (name, ok) in verdicts(input) {
            assert!(ok, "{} rejected valid input {:02X?}", name, input);
        }
    }

    fn assert_invalid(input: &[u8]) {
        for (name, ok) in verdicts(input) {
            assert!(!ok, "{} accepted invalid input {:02X?}", name, input);
        }
    }

    /// `len` ASCII bytes with `seq` written at `pos`.
    fn embed(seq: &[u8], pos: usize, len: usize) -> Vec<u8> {
        let mut data = vec![b'a'; len.max(pos + seq.len())];
        data[pos..pos + seq.len()].copy_from_slice(seq);
        data
    }

    // =========================================================================
    // Valid UTF-8
    // =========================================================================

    mod valid_utf8 {
        use super::*;

        #[test]
        fn empty_input() {
            assert_valid(b"");
        }

        #[test]
        fn ascii_of_every_length() {
            let text = b"The quick brown fox jumps over the lazy dog. 0123456789!?\n\t";
            let long: Vec<u8> = text.iter().copied().cycle().take(300).collect();
            for len in 0..long.len() {
                assert_valid(&long[..len]);
            }
        }

        #[test]
        fn ascii_control_characters() {
            let all: Vec<u8> = (0x00..=0x7F).collect();
            assert_valid(&all);
        }

        #[test]
        fn boundary_code_points() {
            assert_valid(&[0x00]); // U+0000
            assert_valid(&[0x7F]); // U+007F
            assert_valid(&[0xC2, 0x80]); // U+0080
            assert_valid(&[0xDF, 0xBF]); // U+07FF
            assert_valid(&[0xE0, 0xA0, 0x80]); // U+0800
            assert_valid(&[0xED, 0x9F, 0xBF]); // U+D7FF
            assert_valid(&[0xEE, 0x80, 0x80]); // U+E000
            assert_valid(&[0xEF, 0xBF, 0xBF]); // U+FFFF
            assert_valid(&[0xF0, 0x90, 0x80, 0x80]); // U+10000
            assert_valid(&[0xF4, 0x8F, 0xBF, 0xBF]); // U+10FFFF
        }

        #[test]
        fn multilingual_text() {
            assert_valid("日本語 中文 한국어 مرحبا שלום สวัสดี".as_bytes());
            assert_valid("Hello! 你好 🌍🚀 Ñoño café €₹₿ 𝄞".as_bytes());
        }

        #[test]
        fn long_mixed_text() {
            let mut s = String::new();
            for i in 0..100 {
                s.push_str(&format!("Line {}: Hello 世界 🎉 é\n", i));
            }
            assert_valid(s.as_bytes());
        }
    }

    // =========================================================================
    // Invalid UTF-8
    // =========================================================================

    mod invalid_utf8 {
        use super::*;

        #[test]
        fn bare_continuation_bytes() {
            for byte in 0x80..=0xBF {
                assert_invalid(&[byte]);
                assert_invalid(&[b'A', byte, b'B']);
            }
        }

        #[test]
        fn bytes_above_f4() {
            for byte in 0xF5..=0xFF {
                assert_invalid(&[byte, 0x80, 0x80, 0x80]);
            }
        }

        #[test]
        fn overlong_encodings() {
            assert_invalid(&[0xC0, 0x80]); // U+0000
            assert_invalid(&[0xC1, 0xBF]); // U+007F
            assert_invalid(&[0xE0, 0x80, 0x80]); // U+0000
            assert_invalid(&[0xE0, 0x9F, 0xBF]); // U+07FF
            assert_invalid(&[0xF0, 0x80, 0x80, 0x80]); // U+0000
            assert_invalid(&[0xF0, 0x8F, 0xBF, 0xBF]); // U+FFFF
        }

        #[test]
        fn surrogates() {
            assert_invalid(&[0xED, 0xA0, 0x80]); // U+D800
            assert_invalid(&[0xED, 0xBF, 0xBF]); // U+DFFF
            assert_valid(&[0xED, 0x9F, 0xBF]); // U+D7FF
        }

        #[test]
        fn above_max_code_point() {
            assert_invalid(&[0xF4, 0x90, 0x80, 0x80]); // U+110000
            assert_invalid(&[0xF4, 0xBF, 0xBF, 0xBF]);
        }

        #[test]
        fn missing_continuations() {
            assert_invalid(&[0xC2, b'A']);
            assert_invalid(&[0xE0, b'A', 0x80]);
            assert_invalid(&[0xE0, 0xA0, b'A']);
            assert_invalid(&[0xF0, 0x90, 0x80, b'A']);
            assert_invalid(&[0xC2, 0xC2]);
        }

        #[test]
        fn too_many_continuations() {
            assert_invalid(&[0xC2, 0x80, 0x80]);
            assert_invalid(&[0xE2, 0x82, 0xAC, 0x80]);
            assert_invalid(&[0xF0, 0x9F, 0x8E, 0x89, 0x80]);
        }

        #[test]
        fn truncated_at_end() {
            assert_invalid(&[0xE2, 0x82]);
            assert_invalid(&[0xC2]);
            assert_invalid(&[0xF0, 0x9F, 0x8E]);
        }

        #[test]
        fn truncated_at_exact_window_end() {
            // The input fills whole windows, so only the end-of-input check
            // can see the open sequence.
            for len in [16, 32, 64, 128] {
                let data = embed(&[0xE2, 0x82], len - 2, len);
                assert_eq!(data.len(), len);
                assert_invalid(&data);
            }
        }

        #[test]
        fn error_is_sticky() {
            let mut data = vec![0xFFu8];
            data.extend(std::iter::repeat(b'x').take(1000));
            data.extend("日本語".repeat(50).as_bytes());
            assert_invalid(&data);
        }
    }

    // =========================================================================
    // Window boundaries
    // =========================================================================

    mod window_boundaries {
        use super::*;

        const EMOJI: [u8; 4] = [0xF0, 0x9F, 0x8E, 0x89]; // U+1F389

        #[test]
        fn four_byte_split_two_and_two() {
            // 1st/2nd bytes end one window, 3rd/4th start the next.
            for w in [16, 32, 64] {
                assert_valid(&embed(&EMOJI, w - 2, 2 * w));
            }
        }

        #[test]
        fn sequences_at_every_offset() {
            let seqs: [&[u8]; 4] = [
                &[0xC3, 0xA9],
                &[0xE2, 0x82, 0xAC],
                &EMOJI,
                &[0xF4, 0x8F, 0xBF, 0xBF],
            ];
            for seq in seqs {
                for pos in 0..140 {
                    assert_valid(&embed(seq, pos, 160));
                }
            }
        }

        #[test]
        fn invalid_sequences_at_every_offset() {
            let seqs: [&[u8]; 5] = [
                &[0xC0, 0x80],
                &[0xED, 0xA0, 0x80],
                &[0xF4, 0x90, 0x80, 0x80],
                &[0xE0, 0x9F, 0xBF],
                &[0xE2, 0x82, b'a'],
            ];
            for seq in seqs {
                for pos in 0..140 {
                    assert_invalid(&embed(seq, pos, 160));
                }
            }
        }

        #[test]
        fn open_sequence_before_ascii_window() {
            // A window ends mid-sequence and the next one is pure ASCII.
            let data = embed(&[0xE2, 0x82], 62, 128);
            assert_invalid(&data);
        }

        #[test]
        fn leader_before_ascii_window_then_continuation() {
            let mut data = embed(&[0xC3, 0xA9], 62, 192);
            data[128] = 0x80;
            assert_invalid(&data);
        }
    }

    // =========================================================================
    // Validator state
    // =========================================================================

    mod validator_state {
        use super::*;

        type Window16 = VectorWindow<PortableLane, 1>;

        fn window(bytes: &[u8; 16]) -> Window16 {
            Window16::from_lanes([PortableLane::from_bytes(*bytes)])
        }

        #[test]
        fn fresh_validator_has_no_errors() {
            let v = Utf8Validator::<PortableLane>::try_new().unwrap();
            assert!(!v.has_any_errors());
            assert!(v.finish().is_ok());
        }

        #[test]
        fn ascii_window_leaves_same_state_as_full_check() {
            let w = window(b"0123456789abcdef");
            assert!(w.is_ascii());

            // `check_next_input` skips the per-byte checks for this window;
            // `check_lane` always runs them.
            let mut skipped = Utf8Validator::<PortableLane>::try_new().unwrap();
            skipped.check_next_input(&w);
            let mut full = Utf8Validator::<PortableLane>::try_new().unwrap();
            full.check_lane(w.last_lane());

            assert!(!skipped.has_any_errors());
            assert!(!full.has_any_errors());

            let (a, b) = (skipped.previous(), full.previous());
            assert_eq!(a.raw_bytes, b.raw_bytes);
            assert_eq!(a.high_nibbles, b.high_nibbles);
            assert_eq!(a.carried_continuations, b.carried_continuations);
            assert_eq!(a.carried_continuations.to_bytes(), [1; 16]);
        }

        #[test]
        fn ascii_window_after_open_sequence_flags_either_way() {
            let mut open = *b"aaaaaaaaaaaaaaaa";
            open[15] = 0xC3;
            let ascii = window(b"no continuation!");
            assert!(ascii.is_ascii());

            let mut skipped = Utf8Validator::<PortableLane>::try_new().unwrap();
            skipped.check_next_input(&window(&open));
            assert!(!skipped.has_any_errors());
            skipped.check_next_input(&ascii);
            assert!(skipped.has_any_errors());

            let mut full = Utf8Validator::<PortableLane>::try_new().unwrap();
            full.check_lane(window(&open).last_lane());
            full.check_lane(ascii.last_lane());
            assert!(full.has_any_errors());
        }

        #[test]
        fn carried_lengths_span_windows() {
            let mut first = *b"aaaaaaaaaaaaaaaa";
            first[14] = 0xF0;
            first[15] = 0x9F;
            let mut second = *b"aaaaaaaaaaaaaaaa";
            second[0] = 0x8E;
            second[1] = 0x89;

            let mut v = Utf8Validator::<PortableLane>::try_new().unwrap();
            v.check_next_input(&window(&first));
            let carried = v.previous().carried_continuations.to_bytes();
            assert_eq!(carried[13], 1);
            assert_eq!(carried[14], 4);
            assert_eq!(carried[15], 3);
            assert!(!v.has_any_errors());

            v.check_next_input(&window(&second));
            let carried = v.previous().carried_continuations.to_bytes();
            assert!(carried[0] > 0 && carried[1] > 0);
            assert_eq!(&carried[2..], &[1; 14]);
            assert!(v.finish().is_ok());
        }

        #[test]
        fn eof_check_flags_open_sequence() {
            let mut bytes = *b"aaaaaaaaaaaaaaaa";
            bytes[14] = 0xE2;
            bytes[15] = 0x82;

            let mut v = Utf8Validator::<PortableLane>::try_new().unwrap();
            v.check_next_input(&window(&bytes));
            assert!(!v.has_any_errors());
            v.check_eof();
            assert!(v.has_any_errors());
        }

        #[test]
        fn errors_never_clear() {
            let mut v = Utf8Validator::<PortableLane>::try_new().unwrap();
            v.check_next_input(&window(&[0xFF; 16]));
            assert!(v.has_any_errors());
            for _ in 0..10 {
                v.check_next_input(&window(b"all ascii here!!"));
                assert!(v.has_any_errors());
            }
            assert_eq!(v.finish(), Err(InvalidUtf8));
        }
    }

    // =========================================================================
    // Checker and configuration
    // =========================================================================

    mod checker {
        use super::*;

        #[test]
        fn default_config_detects() {
            let checker = Utf8Checker::with_config(&Config::default()).unwrap();
            assert_eq!(checker.backend(), Backend::detect());
            assert!(checker.is_valid("ok ✓".as_bytes()));
        }

        #[test]
        fn unavailable_backend_is_rejected() {
            for backend in Backend::ALL {
                let result = Utf8Checker::with_config(&Config::default().with_backend(backend));
                if backend.is_available() {
                    assert_eq!(result.unwrap().backend(), backend);
                } else {
                    assert_eq!(result, Err(UnsupportedBackend { backend }));
                }
            }
        }

        #[test]
        fn validate_returns_error() {
            assert_eq!(validate_utf8(&[0xC0, 0x80]), Err(InvalidUtf8));
            assert_eq!(InvalidUtf8.to_string(), "invalid UTF-8");
            assert!(is_utf8(b"plain"));
        }

        #[test]
        fn independent_buffers_on_threads() {
            let checker = Utf8Checker::new();
            let inputs: Vec<Vec<u8>> = (0..8)
                .map(|i| {
                    let mut data = "🎉 日本語 abc ".repeat(40 + i).into_bytes();
                    if i % 2 == 1 {
                        data[i * 7] = 0xFF;
                    }
                    data
                })
                .collect();

            std::thread::scope(|s| {
                let handles: Vec<_> = inputs
                    .iter()
                    .map(|data| s.spawn(move || checker.is_valid(data)))
                    .collect();
                for (i, handle) in handles.into_iter().enumerate() {
                    assert_eq!(handle.join().unwrap(), i % 2 == 0, "buffer {}", i);
                }
            });
        }
    }
}
