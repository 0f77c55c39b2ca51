//! Fixed-width vector window over a byte buffer.
//!
//! A [`VectorWindow`] is `N` lanes loaded from consecutive addresses, so its
//! width is `L::BYTES * N` bytes (16, 32 or 64). It is the only type the
//! portable validation code sees; every operation returns a new value.

use super::{Lane, MAX_WINDOW_BYTES};

/// `N` consecutive lanes of backend `L`.
#[derive(Debug, Clone, Copy)]
pub struct VectorWindow<L: Lane, const N: usize> {
    lanes: [L; N],
}

impl<L: Lane, const N: usize> VectorWindow<L, N> {
    /// Window width in bytes.
    pub const WIDTH: usize = L::BYTES * N;

    // Evaluated wherever a window is built, so a bad `N` fails to compile.
    const SHAPE_OK: () = assert!(
        N > 0 && L::BYTES * N <= MAX_WINDOW_BYTES,
        "a window needs 1..=64 bytes of lanes"
    );

    /// Load `WIDTH` bytes starting at `ptr`. No alignment is required.
    ///
    /// # Safety
    ///
    /// The CPU must support `L`, and `ptr` must be valid for reading `WIDTH`
    /// bytes. Buffers are expected to carry at least one window of padding
    /// past their logical end.
    #[inline(always)]
    pub unsafe fn load(ptr: *const u8) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SHAPE_OK;
        Self {
            lanes: core::array::from_fn(|i| L::load(ptr.add(i * L::BYTES))),
        }
    }

    /// Build a window from explicit lane values.
    #[inline(always)]
    pub fn from_lanes(lanes: [L; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SHAPE_OK;
        Self { lanes }
    }

    /// The lanes, in memory order.
    #[inline(always)]
    pub fn lanes(&self) -> &[L; N] {
        &self.lanes
    }

    /// The last lane (highest addresses).
    #[inline(always)]
    pub fn last_lane(&self) -> L {
        self.lanes[N - 1]
    }

    /// Call `f` once per lane, in lane order.
    #[inline(always)]
    pub fn for_each_lane(&self, mut f: impl FnMut(L)) {
        for &lane in &self.lanes {
            f(lane);
        }
    }

    /// Apply `f` to every lane.
    #[inline(always)]
    pub fn map(&self, f: impl FnMut(L) -> L) -> Self {
        Self {
            lanes: self.lanes.map(f),
        }
    }

    /// Apply `f` lane-wise against `other`.
    #[inline(always)]
    pub fn map_with(&self, other: &Self, mut f: impl FnMut(L, L) -> L) -> Self {
        Self {
            lanes: core::array::from_fn(|i| f(self.lanes[i], other.lanes[i])),
        }
    }

    /// Fold all lanes into one with an associative operator.
    #[inline(always)]
    pub fn reduce(&self, f: impl FnMut(L, L) -> L) -> L {
        self.lanes[1..].iter().copied().fold(self.lanes[0], f)
    }

    /// One bit per byte (the byte's top bit); bit 0 is the first byte.
    #[inline(always)]
    pub fn to_bitmask(&self) -> u64 {
        self.lanes
            .iter()
            .enumerate()
            .fold(0u64, |mask, (i, lane)| {
                mask | (lane.movemask() << (i * L::BYTES))
            })
    }

    /// Bitmask of the bytes equal to `m`.
    #[inline(always)]
    pub fn equals_byte(&self, m: u8) -> u64 {
        let splat = self.splat(m);
        self.map(|lane| lane.cmp_eq(splat)).to_bitmask()
    }

    /// Bitmask of the bytes `<= m`, compared as unsigned.
    #[inline(always)]
    pub fn less_or_equal_byte(&self, m: u8) -> u64 {
        let maxval = self.splat(m);
        self.map(|lane| lane.max_unsigned(maxval).cmp_eq(maxval))
            .to_bitmask()
    }

    /// OR `m` into every byte.
    #[inline(always)]
    pub fn bitwise_or_byte(&self, m: u8) -> Self {
        let splat = self.splat(m);
        self.map(|lane| lane.or(splat))
    }

    /// True if no byte has its top bit set.
    #[inline(always)]
    pub fn is_ascii(&self) -> bool {
        let high_bit = self.splat(0x80);
        self.reduce(|a, b| a.or(b)).and(high_bit).is_zero()
    }

    /// Copy the window into the first `WIDTH` bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `WIDTH`.
    pub fn store(&self, out: &mut [u8]) {
        for (i, lane) in self.lanes.iter().enumerate() {
            lane.store(&mut out[i * L::BYTES..]);
        }
    }

    #[inline(always)]
    fn splat(&self, m: u8) -> L {
        // SAFETY: this window holds lanes of `L`, so the CPU supports `L`.
        unsafe { L::splat(m) }
    }
}
