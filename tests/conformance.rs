// tests/conformance.rs
//
// Randomized equivalence sweep over every operation, as run by `lane128 check`.

use lane128::conformance::{ConformanceConfig, run_conformance};
use lane128::simd_abstraction::{NativeEngine, ScalarEngine};

#[test]
fn test_native_engine_conforms() {
    let config = ConformanceConfig {
        iterations: 2000,
        seed: 0xA5A5_5A5A_DEAD_BEEF,
    };
    let report = run_conformance::<ScalarEngine, NativeEngine>(&config);
    for m in &report.mismatches {
        eprintln!("{m}");
    }
    assert!(report.checks > 0);
    assert_eq!(report.mismatch_count, 0);
}

#[test]
#[cfg(target_arch = "x86_64")]
fn test_sse_engine_conforms_across_seeds() {
    use lane128::simd_abstraction::SimdEngine128;

    for seed in [1u64, 2, 3, 0xffff_ffff_ffff_ffff] {
        let config = ConformanceConfig { iterations: 300, seed };
        let report = run_conformance::<ScalarEngine, SimdEngine128>(&config);
        if let Err(e) = report.into_result() {
            panic!("seed {seed:#x}: {e}");
        }
    }
}

#[test]
fn test_same_seed_same_check_count() {
    let config = ConformanceConfig { iterations: 50, seed: 99 };
    let a = run_conformance::<ScalarEngine, ScalarEngine>(&config);
    let b = run_conformance::<ScalarEngine, ScalarEngine>(&config);
    assert_eq!(a.checks, b.checks);
    assert_eq!(a.reference, "scalar");
}
