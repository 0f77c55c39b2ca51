//! Backend identification and detection.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Lane, PortableLane};

const UNDETECTED: u8 = 0;

/// Tag of the backend picked by [`Backend::detect`], or `UNDETECTED`.
static DETECTED: AtomicU8 = AtomicU8::new(UNDETECTED);

/// A lane implementation the validator can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Backend {
    /// Scalar emulation of a 16-byte register. Always available.
    Portable,
    /// SSSE3 + SSE4.1, 16-byte registers (x86_64).
    Sse41,
    /// AVX2, 32-byte registers (x86_64).
    Avx2,
    /// NEON, 16-byte registers (aarch64).
    Neon,
}

impl Backend {
    /// All backends, fastest first.
    pub const ALL: [Backend; 4] = [
        Backend::Avx2,
        Backend::Sse41,
        Backend::Neon,
        Backend::Portable,
    ];

    /// Pick the fastest backend supported by the running CPU.
    ///
    /// Detection runs once per process; later calls return the cached choice.
    pub fn detect() -> Self {
        match Self::from_tag(DETECTED.load(Ordering::Relaxed)) {
            Some(backend) => backend,
            None => {
                let backend = Self::probe();
                // Only the thread that fills the cache logs the choice.
                if DETECTED
                    .compare_exchange(
                        UNDETECTED,
                        backend.tag(),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    )
                    .is_ok()
                {
                    log::debug!("selected {} backend for UTF-8 validation", backend);
                }
                backend
            }
        }
    }

    fn probe() -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.is_available())
            .unwrap_or(Backend::Portable)
    }

    fn tag(self) -> u8 {
        match self {
            Backend::Portable => 1,
            Backend::Sse41 => 2,
            Backend::Avx2 => 3,
            Backend::Neon => 4,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Backend::Portable),
            2 => Some(Backend::Sse41),
            3 => Some(Backend::Avx2),
            4 => Some(Backend::Neon),
            _ => None,
        }
    }

    /// Whether this backend can run on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Portable => PortableLane::is_supported(),
            #[cfg(target_arch = "x86_64")]
            Backend::Sse41 => super::SseLane::is_supported(),
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 => super::Avx2Lane::is_supported(),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => super::NeonLane::is_supported(),
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// Width of one hardware register, in bytes.
    pub fn lane_bytes(self) -> usize {
        match self {
            Backend::Avx2 => 32,
            Backend::Portable | Backend::Sse41 | Backend::Neon => 16,
        }
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Portable => "portable",
            Backend::Sse41 => "sse4.1",
            Backend::Avx2 => "avx2",
            Backend::Neon => "neon",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A configured backend is not available on this CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedBackend {
    /// The backend that was requested.
    pub backend: Backend,
}

impl fmt::Display for UnsupportedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} backend is not supported on this CPU", self.backend)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnsupportedBackend {}
