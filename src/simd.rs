//! Module for SIMD capability selection and reporting.
//!
//! The instruction set used by the vector engines is fixed when the crate is
//! compiled: `SSE_CAPABILITY` is derived from the enabled target features
//! (raise it with `RUSTFLAGS="-C target-cpu=native"` or
//! `-C target-feature=+sse4.1`) and drives `SimdEngine128`. `BUILD_CAPABILITY`
//! is what `NativeEngine` runs with: the same level, or `Portable` under the
//! `force-scalar` feature. The host can be probed at runtime to report when
//! the build leaves instructions unused.

/// Instruction set levels the 128-bit engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// No vector instructions; the portable engine is used.
    ///
    /// `BUILD_CAPABILITY` is `Portable` under `force-scalar`, but the SSE
    /// engine keeps following `SSE_CAPABILITY`, which is never `Portable`
    /// on x86_64.
    Portable,
    /// SSE2 baseline (every x86_64 CPU).
    Sse2,
    /// SSE2 + SSSE3 (`pabsb/w/d`).
    Ssse3,
    /// SSE2 + SSSE3 + SSE4.1 (`pmulld`, `pminsb/ud/uw`, `pextrd`, `pinsrd`, `pblendvb`, `pmovzxbd`).
    Sse41,
}

/// Instruction set level `SimdEngine128` is compiled for.
pub const SSE_CAPABILITY: Capability = sse_capability();

/// Capability `NativeEngine` runs with.
pub const BUILD_CAPABILITY: Capability = if cfg!(feature = "force-scalar") {
    Capability::Portable
} else {
    SSE_CAPABILITY
};

const fn sse_capability() -> Capability {
    if !cfg!(target_arch = "x86_64") {
        Capability::Portable
    } else if cfg!(target_feature = "sse4.1") {
        Capability::Sse41
    } else if cfg!(target_feature = "ssse3") {
        Capability::Ssse3
    } else {
        Capability::Sse2
    }
}

impl Capability {
    #[inline(always)]
    pub const fn has_ssse3(self) -> bool {
        matches!(self, Capability::Ssse3 | Capability::Sse41)
    }

    #[inline(always)]
    pub const fn has_sse41(self) -> bool {
        matches!(self, Capability::Sse41)
    }

    /// Returns a human-readable description of the capability
    pub fn description(self) -> &'static str {
        match self {
            Capability::Portable => "portable (scalar lanes, no vector instructions)",
            Capability::Sse2 => "SSE2 (128-bit baseline)",
            Capability::Ssse3 => "SSSE3 (128-bit, native abs)",
            Capability::Sse41 => "SSE4.1 (128-bit, native 32-bit multiply/min/max/extract)",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Detects the best capability the running CPU offers.
pub fn detect_host_capability() -> Capability {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("sse4.1") && is_x86_feature_detected!("ssse3") {
            return Capability::Sse41;
        }
        if is_x86_feature_detected!("ssse3") {
            return Capability::Ssse3;
        }
        Capability::Sse2
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        Capability::Portable
    }
}

/// Name of the engine behind `simd_abstraction::NativeEngine`.
pub fn native_engine_name() -> &'static str {
    use crate::simd_abstraction::{NativeEngine, SimdEngine};
    NativeEngine::NAME
}

/// Logs the build capability, the host capability, and the native engine.
///
/// Warns when the host supports more than the build uses.
pub fn log_capabilities() {
    let host = detect_host_capability();
    log::info!("Native engine: {}", native_engine_name());
    log::info!("Build capability: {}", BUILD_CAPABILITY);
    log::debug!("SSE engine capability: {}", SSE_CAPABILITY);
    log::info!("Host capability: {}", host);

    if host > BUILD_CAPABILITY && !cfg!(feature = "force-scalar") {
        log::warn!(
            "Host supports {:?} but this build targets {:?}; rebuild with RUSTFLAGS=\"-C target-cpu=native\" to use it",
            host,
            BUILD_CAPABILITY
        );
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_detection() {
        let host = detect_host_capability();
        println!("Host capability: {}", host);
        println!("Build capability: {}", BUILD_CAPABILITY);

        // A binary can only run on hosts that have what it was built for.
        if BUILD_CAPABILITY != Capability::Portable {
            assert!(host >= BUILD_CAPABILITY);
        }
    }

    #[test]
    fn test_capability_ordering() {
        assert!(Capability::Portable < Capability::Sse2);
        assert!(Capability::Sse2 < Capability::Ssse3);
        assert!(Capability::Ssse3 < Capability::Sse41);
        assert!(Capability::Sse41.has_ssse3());
        assert!(!Capability::Ssse3.has_sse41());
        assert!(!Capability::Sse2.has_ssse3());
    }

    #[test]
    fn test_native_engine_matches_build() {
        let name = native_engine_name();
        match BUILD_CAPABILITY {
            Capability::Portable => assert_eq!(name, "scalar"),
            _ => assert_eq!(name, "sse"),
        }
    }

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_sse_capability_follows_target_features() {
        assert!(SSE_CAPABILITY >= Capability::Sse2);
        assert!(SSE_CAPABILITY >= BUILD_CAPABILITY);
        assert_eq!(SSE_CAPABILITY.has_sse41(), cfg!(target_feature = "sse4.1"));
        assert_eq!(
            SSE_CAPABILITY.has_ssse3(),
            cfg!(target_feature = "ssse3") || cfg!(target_feature = "sse4.1")
        );

        if cfg!(feature = "force-scalar") {
            assert_eq!(BUILD_CAPABILITY, Capability::Portable);
        } else {
            assert_eq!(BUILD_CAPABILITY, SSE_CAPABILITY);
        }
    }

    #[test]
    fn test_descriptions_are_distinct() {
        let all = [Capability::Portable, Capability::Sse2, Capability::Ssse3, Capability::Sse41];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.description(), b.description());
            }
        }
    }
}
