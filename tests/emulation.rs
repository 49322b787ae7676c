// tests/emulation.rs
//
// The SSE2 fallback sequences are only selected by builds without SSSE3 /
// SSE4.1, so they are called directly here and compared with the lane-wise
// definition. This keeps them covered on `-C target-cpu=native` builds too.
#![cfg(target_arch = "x86_64")]

use lane128::simd_abstraction::portable_intrinsics::*;
use lane128::simd_abstraction::types::__m128i;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::arch::x86_64::{_mm_loadu_si128, _mm_storeu_si128};

fn to_reg<T: Copy, const N: usize>(lanes: [T; N]) -> __m128i {
    assert_eq!(core::mem::size_of::<[T; N]>(), 16);
    unsafe { _mm_loadu_si128(lanes.as_ptr() as *const __m128i) }
}

fn from_reg<T: Copy + Default, const N: usize>(v: __m128i) -> [T; N] {
    assert_eq!(core::mem::size_of::<[T; N]>(), 16);
    let mut out = [T::default(); N];
    unsafe { _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, v) };
    out
}

fn mask<T: Default + PartialEq>(flag: bool, ones: T) -> T {
    if flag { ones } else { T::default() }
}

const ROUNDS: usize = 5000;

fn edge_i32(rng: &mut StdRng) -> i32 {
    match rng.gen_range(0..6) {
        0 => i32::MAX,
        1 => i32::MIN,
        2 => -1,
        3 => 0,
        _ => rng.r#gen(),
    }
}

#[test]
fn test_cmpgt_unsigned() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..ROUNDS {
        let a: [u8; 16] = rng.r#gen();
        let b: [u8; 16] = rng.r#gen();
        let got: [u8; 16] = from_reg(unsafe { _mm_cmpgt_epu8(to_reg(a), to_reg(b)) });
        assert_eq!(got, core::array::from_fn(|i| mask(a[i] > b[i], 0xffu8)));

        let a: [u16; 8] = rng.r#gen();
        let b: [u16; 8] = rng.r#gen();
        let got: [u16; 8] = from_reg(unsafe { _mm_cmpgt_epu16(to_reg(a), to_reg(b)) });
        assert_eq!(got, core::array::from_fn(|i| mask(a[i] > b[i], 0xffffu16)));

        let a: [u32; 4] = rng.r#gen();
        let b: [u32; 4] = rng.r#gen();
        let got: [u32; 4] = from_reg(unsafe { _mm_cmpgt_epu32(to_reg(a), to_reg(b)) });
        assert_eq!(got, core::array::from_fn(|i| mask(a[i] > b[i], u32::MAX)));
    }
}

#[test]
fn test_mullo_emulation() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..ROUNDS {
        let a: [u8; 16] = rng.r#gen();
        let b: [u8; 16] = rng.r#gen();
        let got: [u8; 16] = from_reg(unsafe { _mm_mullo_epi8_emu(to_reg(a), to_reg(b)) });
        assert_eq!(got, core::array::from_fn(|i| a[i].wrapping_mul(b[i])));

        let a: [u32; 4] = rng.r#gen();
        let b: [u32; 4] = rng.r#gen();
        let got: [u32; 4] = from_reg(unsafe { _mm_mullo_epi32_emu(to_reg(a), to_reg(b)) });
        assert_eq!(got, core::array::from_fn(|i| a[i].wrapping_mul(b[i])));
    }
}

#[test]
fn test_min_max_emulation() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..ROUNDS {
        let a: [i8; 16] = rng.r#gen();
        let b: [i8; 16] = rng.r#gen();
        let (ra, rb) = (to_reg(a), to_reg(b));
        let min: [i8; 16] = from_reg(unsafe { _mm_min_epi8_emu(ra, rb) });
        let max: [i8; 16] = from_reg(unsafe { _mm_max_epi8_emu(ra, rb) });
        assert_eq!(min, core::array::from_fn(|i| a[i].min(b[i])));
        assert_eq!(max, core::array::from_fn(|i| a[i].max(b[i])));

        let a: [u16; 8] = rng.r#gen();
        let b: [u16; 8] = rng.r#gen();
        let (ra, rb) = (to_reg(a), to_reg(b));
        let min: [u16; 8] = from_reg(unsafe { _mm_min_epu16_emu(ra, rb) });
        let max: [u16; 8] = from_reg(unsafe { _mm_max_epu16_emu(ra, rb) });
        assert_eq!(min, core::array::from_fn(|i| a[i].min(b[i])));
        assert_eq!(max, core::array::from_fn(|i| a[i].max(b[i])));

        let a: [i32; 4] = core::array::from_fn(|_| edge_i32(&mut rng));
        let b: [i32; 4] = core::array::from_fn(|_| edge_i32(&mut rng));
        let (ra, rb) = (to_reg(a), to_reg(b));
        let min: [i32; 4] = from_reg(unsafe { _mm_min_epi32_emu(ra, rb) });
        let max: [i32; 4] = from_reg(unsafe { _mm_max_epi32_emu(ra, rb) });
        assert_eq!(min, core::array::from_fn(|i| a[i].min(b[i])));
        assert_eq!(max, core::array::from_fn(|i| a[i].max(b[i])));

        let a = a.map(|v| v as u32);
        let b = b.map(|v| v as u32);
        let min: [u32; 4] = from_reg(unsafe { _mm_min_epu32_emu(ra, rb) });
        let max: [u32; 4] = from_reg(unsafe { _mm_max_epu32_emu(ra, rb) });
        assert_eq!(min, core::array::from_fn(|i| a[i].min(b[i])));
        assert_eq!(max, core::array::from_fn(|i| a[i].max(b[i])));
    }
}

#[test]
fn test_abs_emulation() {
    let a: [i8; 16] = core::array::from_fn(|i| (i as i8).wrapping_mul(17).wrapping_add(i8::MIN));
    let got: [i8; 16] = from_reg(unsafe { _mm_abs_epi8_emu(to_reg(a)) });
    assert_eq!(got, a.map(i8::wrapping_abs));

    let a: [i16; 8] = [i16::MIN, -1, 0, 1, i16::MAX, -12345, 12345, -2];
    let got: [i16; 8] = from_reg(unsafe { _mm_abs_epi16_emu(to_reg(a)) });
    assert_eq!(got, a.map(i16::wrapping_abs));

    let a: [i32; 4] = [i32::MIN, -1, i32::MAX, -70_000];
    let got: [i32; 4] = from_reg(unsafe { _mm_abs_epi32_emu(to_reg(a)) });
    assert_eq!(got, a.map(i32::wrapping_abs));
}

#[test]
fn test_saturating_32bit_emulation() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..ROUNDS {
        let a: [i32; 4] = core::array::from_fn(|_| edge_i32(&mut rng));
        let b: [i32; 4] = core::array::from_fn(|_| edge_i32(&mut rng));
        let (ra, rb) = (to_reg(a), to_reg(b));

        let adds: [i32; 4] = from_reg(unsafe { _mm_adds_epi32_emu(ra, rb) });
        let subs: [i32; 4] = from_reg(unsafe { _mm_subs_epi32_emu(ra, rb) });
        assert_eq!(adds, core::array::from_fn(|i| a[i].saturating_add(b[i])), "{a:?} + {b:?}");
        assert_eq!(subs, core::array::from_fn(|i| a[i].saturating_sub(b[i])), "{a:?} - {b:?}");

        let (ua, ub) = (a.map(|v| v as u32), b.map(|v| v as u32));
        let adds: [u32; 4] = from_reg(unsafe { _mm_adds_epu32_emu(ra, rb) });
        let subs: [u32; 4] = from_reg(unsafe { _mm_subs_epu32_emu(ra, rb) });
        assert_eq!(adds, core::array::from_fn(|i| ua[i].saturating_add(ub[i])), "{ua:?} + {ub:?}");
        assert_eq!(subs, core::array::from_fn(|i| ua[i].saturating_sub(ub[i])), "{ua:?} - {ub:?}");
    }
}

#[test]
fn test_component_emulation() {
    let a = [11i32, -22, 33, -44];
    let r = to_reg(a);
    unsafe {
        assert_eq!(_mm_extract_epi32_emu::<0>(r), 11);
        assert_eq!(_mm_extract_epi32_emu::<1>(r), -22);
        assert_eq!(_mm_extract_epi32_emu::<2>(r), 33);
        assert_eq!(_mm_extract_epi32_emu::<3>(r), -44);

        assert_eq!(from_reg::<i32, 4>(_mm_insert_epi32_emu::<0>(r, 9)), [9, -22, 33, -44]);
        assert_eq!(from_reg::<i32, 4>(_mm_insert_epi32_emu::<1>(r, 9)), [11, 9, 33, -44]);
        assert_eq!(from_reg::<i32, 4>(_mm_insert_epi32_emu::<2>(r, 9)), [11, -22, 9, -44]);
        assert_eq!(from_reg::<i32, 4>(_mm_insert_epi32_emu::<3>(r, 9)), [11, -22, 33, 9]);
    }
}

#[test]
fn test_select_and_not() {
    let m = to_reg([0xffu8, 0, 0xff, 0, 0, 0, 0, 0, 0xff, 0xff, 0, 0, 0, 0, 0, 0xff]);
    let a = to_reg([1u8; 16]);
    let b = to_reg([2u8; 16]);
    let got: [u8; 16] = from_reg(unsafe { _mm_select_si128(m, a, b) });
    assert_eq!(got, [1, 2, 1, 2, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 2, 1]);

    let got: [u8; 16] = from_reg(unsafe { _mm_not_si128(m) });
    assert_eq!(got, [0, 0xff, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0]);
}

#[test]
fn test_pack_and_zero_extend() {
    let v = to_reg([300i32, -10, 200, 70_000]);
    assert_eq!(unsafe { _mm_pack_epi32_u8(v) }, 0xffc8_00ff);

    let bytes = to_reg([0x81u8, 0x02, 0xff, 0x00, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9]);
    let wide: [i32; 4] = from_reg(unsafe { _mm_cvtepu8_epi32_emu(bytes) });
    assert_eq!(wide, [0x81, 0x02, 0xff, 0x00]);
}
