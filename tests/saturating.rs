// tests/saturating.rs
//
// Saturating add/sub against a widened clamp, for every lane width and both
// engines.

use lane128::simd_abstraction::{IntVector, NativeEngine, ScalarEngine, SimdEngine};
use rand::{Rng, SeedableRng};

fn clamp<T: TryFrom<i64> + Copy>(v: i64, lo: i64, hi: i64) -> T
where
    <T as TryFrom<i64>>::Error: core::fmt::Debug,
{
    T::try_from(v.clamp(lo, hi)).unwrap()
}

fn check_engine<E: SimdEngine>() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5A7_0AD5);

    for _ in 0..2000 {
        let a: [i8; 16] = rng.r#gen();
        let b: [i8; 16] = rng.r#gen();
        let adds = E::I8x16::from_array(a).adds(E::I8x16::from_array(b)).to_array();
        let subs = E::I8x16::from_array(a).subs(E::I8x16::from_array(b)).to_array();
        for i in 0..16 {
            let (x, y) = (a[i] as i64, b[i] as i64);
            assert_eq!(adds[i], clamp::<i8>(x + y, -128, 127));
            assert_eq!(subs[i], clamp::<i8>(x - y, -128, 127));
        }

        let a: [u16; 8] = rng.r#gen();
        let b: [u16; 8] = rng.r#gen();
        let adds = E::U16x8::from_array(a).adds(E::U16x8::from_array(b)).to_array();
        let subs = E::U16x8::from_array(a).subs(E::U16x8::from_array(b)).to_array();
        for i in 0..8 {
            let (x, y) = (a[i] as i64, b[i] as i64);
            assert_eq!(adds[i], clamp::<u16>(x + y, 0, u16::MAX as i64));
            assert_eq!(subs[i], clamp::<u16>(x - y, 0, u16::MAX as i64));
        }

        let a: [i32; 4] = rng.r#gen();
        let b: [i32; 4] = rng.r#gen();
        let adds = E::I32x4::from_array(a).adds(E::I32x4::from_array(b)).to_array();
        let subs = E::I32x4::from_array(a).subs(E::I32x4::from_array(b)).to_array();
        for i in 0..4 {
            let (x, y) = (a[i] as i64, b[i] as i64);
            assert_eq!(adds[i], clamp::<i32>(x + y, i32::MIN as i64, i32::MAX as i64), "{x} + {y}");
            assert_eq!(subs[i], clamp::<i32>(x - y, i32::MIN as i64, i32::MAX as i64), "{x} - {y}");
        }

        let a: [u32; 4] = rng.r#gen();
        let b: [u32; 4] = rng.r#gen();
        let adds = E::U32x4::from_array(a).adds(E::U32x4::from_array(b)).to_array();
        let subs = E::U32x4::from_array(a).subs(E::U32x4::from_array(b)).to_array();
        for i in 0..4 {
            assert_eq!(adds[i], a[i].saturating_add(b[i]), "{} + {}", a[i], b[i]);
            assert_eq!(subs[i], a[i].saturating_sub(b[i]), "{} - {}", a[i], b[i]);
        }
    }
}

#[test]
fn test_scalar_saturation_matches_clamp() {
    check_engine::<ScalarEngine>();
}

#[test]
fn test_native_saturation_matches_clamp() {
    check_engine::<NativeEngine>();
}

#[test]
fn test_signed_byte_scenario() {
    type I8x16 = <NativeEngine as SimdEngine>::I8x16;
    let mut a = [0i8; 16];
    let mut b = [0i8; 16];
    a[..3].copy_from_slice(&[127, -128, 100]);
    b[..3].copy_from_slice(&[1, -1, 50]);

    let mut expected = [0i8; 16];
    expected[..3].copy_from_slice(&[127, -128, 127]);
    assert_eq!(I8x16::from_array(a).adds(I8x16::from_array(b)).to_array(), expected);
}

#[test]
fn test_exhaustive_i16_against_small_operands() {
    type I16x8 = <NativeEngine as SimdEngine>::I16x8;
    for base in (i16::MIN as i32..=i16::MAX as i32).step_by(8) {
        let a: [i16; 8] = core::array::from_fn(|i| (base + i as i32) as i16);
        for d in [-3i16, -1, 1, 3, i16::MAX, i16::MIN] {
            let b = [d; 8];
            let adds = I16x8::from_array(a).adds(I16x8::from_array(b)).to_array();
            let subs = I16x8::from_array(a).subs(I16x8::from_array(b)).to_array();
            for i in 0..8 {
                assert_eq!(adds[i], a[i].saturating_add(d));
                assert_eq!(subs[i], a[i].saturating_sub(d));
            }
        }
    }
}
