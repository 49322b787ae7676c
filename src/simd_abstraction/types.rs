//! SIMD type aliases and architecture bindings
//!
//! This module provides a tiny portability layer so the rest of the
//! `simd_abstraction` code can refer to `simd_arch` and `__m128i` uniformly.
//!
//! - On x86_64 we re-export `std::arch::x86_64` as `simd_arch` and use the
//!   native `__m128i` register type. SSE2 is part of the x86_64 baseline, so
//!   every SSE2 intrinsic is always available there.
//! - On every other target there is no accelerated engine; only the portable
//!   engine is compiled and only `VECTOR_BYTES` is defined here.

#[cfg(target_arch = "x86_64")]
pub(crate) use std::arch::x86_64 as simd_arch;

/// Type alias for `__m128i` on x86_64.
#[allow(non_camel_case_types)]
#[cfg(target_arch = "x86_64")]
pub type __m128i = simd_arch::__m128i;

/// Size in bytes of every vector type in this crate.
pub const VECTOR_BYTES: usize = 16;
