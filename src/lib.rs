pub mod conformance; // Randomized cross-engine equivalence runner
pub mod simd; // Build/host capability selection and reporting
pub mod simd_abstraction;

pub use simd::{BUILD_CAPABILITY, Capability, SSE_CAPABILITY};
pub use simd_abstraction::{
    I32Lanes, IntVector, Lanes32, NativeEngine, ScalarEngine, SignedIntVector, SimdEngine,
};

#[cfg(target_arch = "x86_64")]
pub use simd_abstraction::SimdEngine128;
